//! Recommendation scoring, a pure function over the full record set.

use crate::types::ItemRecord;

/// Weight for normalized quality in the composite score.
const SCORE_WEIGHT: f64 = 0.4;
/// Weight for normalized price value.
const PRICE_WEIGHT: f64 = 0.3;
/// Weight for discount likelihood.
const DISCOUNT_WEIGHT: f64 = 0.3;

/// Items with no discount history are treated as "a long time ago".
const DEFAULT_DAYS_SINCE_DISCOUNT: i64 = 365;

/// A record plus the derived ranking fields. Ephemeral, never persisted.
#[derive(Debug, Clone)]
pub struct Recommendation {
    pub record: ItemRecord,
    pub avg_score: Option<f64>,
    pub normalized_price: f64,
    pub normalized_score: f64,
    pub discount_probability: f64,
    pub recommendation_score: f64,
}

fn avg_score(record: &ItemRecord) -> Option<f64> {
    let scores: Vec<f64> = [
        record.metascore.map(|s| s as f64),
        record.openscore.map(|s| s as f64),
        record.steam_score,
    ]
    .into_iter()
    .flatten()
    .collect();
    if scores.is_empty() {
        None
    } else {
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}

/// Rank the record set by a weighted blend of quality, price value and
/// discount likelihood. Recomputed from scratch on every call; ties keep
/// the input's relative order.
pub fn recommend(records: &[ItemRecord]) -> Vec<Recommendation> {
    let max_price = records
        .iter()
        .map(|r| r.current_price)
        .fold(0.0_f64, f64::max);

    let avg_scores: Vec<Option<f64>> = records.iter().map(avg_score).collect();
    let present: Vec<f64> = avg_scores.iter().copied().flatten().collect();
    let min_avg = present.iter().copied().fold(f64::INFINITY, f64::min);
    let max_avg = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let score_range = if present.is_empty() { 0.0 } else { max_avg - min_avg };

    let mut ranked: Vec<Recommendation> = records
        .iter()
        .zip(avg_scores)
        .map(|(record, avg)| {
            let normalized_price = if max_price > 0.0 {
                1.0 - record.current_price / max_price
            } else {
                0.0
            };
            let normalized_score = match avg {
                Some(avg) if score_range > 0.0 => (avg - min_avg) / score_range,
                _ => 0.0,
            };
            let days_since = record
                .days_since_last_discount
                .unwrap_or(DEFAULT_DAYS_SINCE_DISCOUNT);
            let discount_probability = 1.0 / (days_since as f64 + 1.0);
            let recommendation_score = SCORE_WEIGHT * normalized_score
                + PRICE_WEIGHT * normalized_price
                + DISCOUNT_WEIGHT * discount_probability;

            Recommendation {
                record: record.clone(),
                avg_score: avg,
                normalized_price,
                normalized_score,
                discount_probability,
                recommendation_score,
            }
        })
        .collect();

    // Stable descending sort: ties retain input order.
    ranked.sort_by(|a, b| {
        b.recommendation_score
            .partial_cmp(&a.recommendation_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked
}
