//! Record types shared by the store, snapshot and recommendation layers

use serde::{Deserialize, Serialize};

/// One wishlist item, fully normalized. The unit of persistence.
///
/// `title` is the sole identity. Optional fields mean "source data absent or
/// malformed"; a score of `Some(0)` is a real zero, not a missing value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub title: String,
    /// Display-currency amount; 0.0 when the raw price text was unparseable.
    pub current_price: f64,
    pub metascore: Option<i64>,
    pub openscore: Option<i64>,
    /// Review percentage from the external ratings site; may be fractional.
    pub steam_score: Option<f64>,
    /// ISO calendar date (YYYY-MM-DD) of the most recent detected price drop.
    pub last_discount: Option<String>,
    pub avg_days_between_discounts: Option<f64>,
    pub days_since_last_discount: Option<i64>,
}
