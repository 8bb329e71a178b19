//! Flat-file CSV snapshot of the full result set, the second lookup tier.

use std::path::Path;

use crate::error::ScoutError;
use crate::types::ItemRecord;

/// Overwrite the snapshot with `records`.
pub fn export(path: impl AsRef<Path>, records: &[ItemRecord]) -> Result<(), ScoutError> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Load a previously exported snapshot. A missing file is a storage error,
/// a malformed row a parse error; the caller treats both as "tier absent".
pub fn load(path: impl AsRef<Path>) -> Result<Vec<ItemRecord>, ScoutError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}
