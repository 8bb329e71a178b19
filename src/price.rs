//! Raw price text to a numeric amount.
//!
//! Wishlist prices arrive in mixed locale conventions: "1.234,56" and
//! "1,234.56" must resolve to the same number, and bare digit runs like
//! "1135000" encode the amount in minor units.

use log::warn;

/// Parse a heterogeneous price string. Never fails: anything unparseable
/// yields 0.0 with a warning.
pub fn parse_price(raw: &str) -> f64 {
    // Keep digits and both separator candidates, drop currency symbols etc.
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    if cleaned.is_empty() {
        return 0.0;
    }

    if cleaned.contains(',') {
        // Comma is the decimal separator, dot the thousands separator.
        let numeric = cleaned.replace('.', "").replace(',', ".");
        match numeric.parse::<f64>() {
            Ok(v) => v,
            Err(_) => {
                warn!("unparseable price text {raw:?} (cleaned {cleaned:?})");
                0.0
            }
        }
    } else if cleaned.contains('.') {
        match cleaned.parse::<f64>() {
            Ok(v) => v,
            Err(_) => {
                warn!("unparseable price text {raw:?} (cleaned {cleaned:?})");
                0.0
            }
        }
    } else {
        // Bare digit run: last two digits are the minor-unit amount, a
        // single digit is a whole-unit amount.
        debug_assert!(cleaned.chars().all(|c| c.is_ascii_digit()));
        if cleaned.len() >= 2 {
            let (units, cents) = cleaned.split_at(cleaned.len() - 2);
            let units = if units.is_empty() { "0" } else { units };
            format!("{units}.{cents}").parse().unwrap_or_else(|_| {
                warn!("unparseable price text {raw:?} (cleaned {cleaned:?})");
                0.0
            })
        } else {
            cleaned.parse().unwrap_or_else(|_| {
                warn!("unparseable price text {raw:?} (cleaned {cleaned:?})");
                0.0
            })
        }
    }
}
