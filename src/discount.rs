//! Discount-history statistics: most recent drop, days since, mean interval.

use chrono::NaiveDate;
use log::warn;

/// Formats accepted from the history table, tried in order.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%m/%d/%Y",
    "%Y/%m/%d",
];

#[derive(Debug, Default, PartialEq)]
pub struct DiscountStats {
    pub last_discount: Option<NaiveDate>,
    pub days_since_last_discount: Option<i64>,
    pub avg_days_between_discounts: Option<f64>,
}

fn parse_history_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Derive statistics from raw history-table date strings. Unparseable
/// entries are skipped with a warning; an empty resulting date set leaves
/// every field absent.
///
/// `today` is explicit so the calculation stays a pure function.
pub fn discount_stats(raw_dates: &[String], today: NaiveDate) -> DiscountStats {
    let mut dates: Vec<NaiveDate> = Vec::new();
    for raw in raw_dates {
        match parse_history_date(raw) {
            Some(date) => dates.push(date),
            None => warn!("could not parse discount date {raw:?}"),
        }
    }

    if dates.is_empty() {
        return DiscountStats::default();
    }

    // Most recent first.
    dates.sort_unstable_by(|a, b| b.cmp(a));
    let last = dates[0];

    let mut stats = DiscountStats {
        last_discount: Some(last),
        days_since_last_discount: Some((today - last).num_days()),
        avg_days_between_discounts: None,
    };

    if dates.len() > 1 {
        // Consecutive gaps in the descending order; same-day duplicates
        // contribute a zero gap and are retained.
        let gaps: Vec<i64> = dates
            .windows(2)
            .map(|pair| (pair[0] - pair[1]).num_days())
            .filter(|gap| *gap >= 0)
            .collect();
        if !gaps.is_empty() {
            stats.avg_days_between_discounts =
                Some(gaps.iter().sum::<i64>() as f64 / gaps.len() as f64);
        }
    }

    stats
}
