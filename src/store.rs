//! Persistent record store backed by SQLite.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::ScoutError;
use crate::types::ItemRecord;

pub struct RecordStore {
    conn: Connection,
}

impl RecordStore {
    /// Open (or create) the database and make sure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ScoutError> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.ensure_schema()?;
        Ok(store)
    }

    #[cfg(test)]
    fn open_in_memory() -> Result<Self, ScoutError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Idempotently create the items table.
    pub fn ensure_schema(&self) -> Result<(), ScoutError> {
        let schema = include_str!("../schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    pub fn exists(&self, title: &str) -> Result<bool, ScoutError> {
        let found: Option<i64> = self
            .conn
            .query_row("SELECT 1 FROM items WHERE title = ?1", [title], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(found.is_some())
    }

    /// Insert-or-replace keyed by title.
    pub fn upsert(&self, record: &ItemRecord) -> Result<(), ScoutError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO items
             (title, current_price, metascore, openscore, steam_score,
              last_discount, avg_days_between_discounts, days_since_last_discount)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                record.title,
                record.current_price,
                record.metascore,
                record.openscore,
                record.steam_score,
                record.last_discount,
                record.avg_days_between_discounts,
                record.days_since_last_discount,
            ],
        )?;
        Ok(())
    }

    /// All records ordered by title. Empty table yields an empty vec.
    pub fn load_all(&self) -> Result<Vec<ItemRecord>, ScoutError> {
        let mut stmt = self.conn.prepare(
            "SELECT title, current_price, metascore, openscore, steam_score,
                    last_discount, avg_days_between_discounts, days_since_last_discount
             FROM items ORDER BY title",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ItemRecord {
                title: row.get(0)?,
                current_price: row.get(1)?,
                metascore: row.get(2)?,
                openscore: row.get(3)?,
                steam_score: row.get(4)?,
                last_discount: row.get(5)?,
                avg_days_between_discounts: row.get(6)?,
                days_since_last_discount: row.get(7)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(title: &str) -> ItemRecord {
        ItemRecord {
            title: title.to_string(),
            current_price: 19.99,
            metascore: Some(84),
            openscore: None,
            steam_score: Some(85.32),
            last_discount: Some("2024-03-10".to_string()),
            avg_days_between_discounts: Some(29.5),
            days_since_last_discount: Some(12),
        }
    }

    #[test]
    fn load_all_on_fresh_table_is_empty() {
        let store = RecordStore::open_in_memory().unwrap();
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn round_trip_preserves_numeric_types() {
        let store = RecordStore::open_in_memory().unwrap();
        store.upsert(&sample("Hollow Knight")).unwrap();

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded, vec![sample("Hollow Knight")]);
        // Integer score stays integral, fractional score stays fractional.
        assert_eq!(loaded[0].metascore, Some(84));
        assert_eq!(loaded[0].steam_score, Some(85.32));
        assert_eq!(loaded[0].openscore, None);
    }

    #[test]
    fn exists_tracks_upserts() {
        let store = RecordStore::open_in_memory().unwrap();
        assert!(!store.exists("Celeste").unwrap());
        store.upsert(&sample("Celeste")).unwrap();
        assert!(store.exists("Celeste").unwrap());
    }

    #[test]
    fn reinsert_replaces_by_title() {
        let store = RecordStore::open_in_memory().unwrap();
        store.upsert(&sample("Celeste")).unwrap();

        let mut updated = sample("Celeste");
        updated.current_price = 9.99;
        store.upsert(&updated).unwrap();

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].current_price, 9.99);
    }

    #[test]
    fn load_all_is_ordered_by_title() {
        let store = RecordStore::open_in_memory().unwrap();
        store.upsert(&sample("Tunic")).unwrap();
        store.upsert(&sample("Celeste")).unwrap();
        let titles: Vec<_> = store
            .load_all()
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["Celeste", "Tunic"]);
    }
}
