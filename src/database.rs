//! Storage layer: the repository interface and its redb implementation
//!
//! Every mapping lives in a single embedded redb table. Each operation runs in
//! its own transaction, so single-row atomicity comes from redb itself.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::ShortMapping;

/// Main table for short link mappings
///
/// Key: mapping id (hyphenated UUID string)
/// Value: JSON-serialized `ShortMapping`
///
/// Example:
/// - Key: "6f1c2a8e-2d35-4a5b-9a7e-3c1b2f0d9e11"
/// - Value: '{"id":"6f1c...","original_url":"https://example.com",...}'
pub const TABLE_SHORT_URLS: TableDefinition<&str, &str> = TableDefinition::new("short_urls_v1");

/// Narrow storage interface used by the mapping service and the sweeper
#[async_trait]
pub trait Repository: Send + Sync + 'static {
    /// Persists a new mapping. Fails with `DuplicateKey` if the id is taken.
    async fn insert(&self, mapping: &ShortMapping) -> Result<(), StoreError>;

    /// Returns `None` when no mapping has this id.
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<ShortMapping>, StoreError>;

    /// Every stored mapping, expired or not.
    async fn find_all(&self) -> Result<Vec<ShortMapping>, StoreError>;

    /// Returns the number of rows removed (0 or 1).
    async fn delete_by_id(&self, id: &Uuid) -> Result<u64, StoreError>;

    /// Removes every mapping whose `expires_at` is set and strictly before `now`.
    async fn delete_expired_before(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;
}

/// Initializes the embedded database and creates the mappings table
///
/// ```no_run
/// # use shortlink::database::init_db;
/// let db = init_db("data.db").expect("Failed to initialize database");
/// ```
pub fn init_db(db_path: &str) -> Result<Database, redb::Error> {
    let db = Database::create(db_path)?;

    let write_txn = db.begin_write()?;
    {
        write_txn.open_table(TABLE_SHORT_URLS)?;
    }
    write_txn.commit()?;

    Ok(db)
}

/// [`Repository`] backed by a redb file
#[derive(Clone)]
pub struct RedbRepository {
    db: Arc<Database>,
}

impl RedbRepository {
    pub fn new(db: Database) -> Self {
        Self { db: Arc::new(db) }
    }

    /// Opens (or creates) the database file at `db_path`.
    pub fn open(db_path: &str) -> Result<Self, StoreError> {
        Ok(Self::new(init_db(db_path)?))
    }
}

#[async_trait]
impl Repository for RedbRepository {
    async fn insert(&self, mapping: &ShortMapping) -> Result<(), StoreError> {
        let key = mapping.id.to_string();
        let record_json = serde_json::to_string(mapping)?;

        let write_txn = self.db.begin_write().map_err(redb::Error::from)?;
        {
            let mut table = write_txn
                .open_table(TABLE_SHORT_URLS)
                .map_err(redb::Error::from)?;

            if table.get(key.as_str()).map_err(redb::Error::from)?.is_some() {
                return Err(StoreError::DuplicateKey(key));
            }

            table
                .insert(key.as_str(), record_json.as_str())
                .map_err(redb::Error::from)?;
        }
        write_txn.commit().map_err(redb::Error::from)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<ShortMapping>, StoreError> {
        let key = id.to_string();
        let read_txn = self.db.begin_read().map_err(redb::Error::from)?;
        let table = read_txn
            .open_table(TABLE_SHORT_URLS)
            .map_err(redb::Error::from)?;

        let guard = table.get(key.as_str()).map_err(redb::Error::from)?;
        let mapping = match guard {
            Some(value) => Some(serde_json::from_str(value.value())?),
            None => None,
        };

        Ok(mapping)
    }

    async fn find_all(&self) -> Result<Vec<ShortMapping>, StoreError> {
        let read_txn = self.db.begin_read().map_err(redb::Error::from)?;
        let table = read_txn
            .open_table(TABLE_SHORT_URLS)
            .map_err(redb::Error::from)?;

        let mut mappings = Vec::new();
        for entry in table.iter().map_err(redb::Error::from)? {
            let (_, value) = entry.map_err(redb::Error::from)?;
            mappings.push(serde_json::from_str::<ShortMapping>(value.value())?);
        }

        Ok(mappings)
    }

    async fn delete_by_id(&self, id: &Uuid) -> Result<u64, StoreError> {
        let key = id.to_string();
        let write_txn = self.db.begin_write().map_err(redb::Error::from)?;
        let mut table = write_txn
            .open_table(TABLE_SHORT_URLS)
            .map_err(redb::Error::from)?;
        let removed = table
            .remove(key.as_str())
            .map_err(redb::Error::from)?
            .is_some();
        drop(table);
        write_txn.commit().map_err(redb::Error::from)?;

        Ok(u64::from(removed))
    }

    async fn delete_expired_before(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let write_txn = self.db.begin_write().map_err(redb::Error::from)?;
        let removed = {
            let mut table = write_txn
                .open_table(TABLE_SHORT_URLS)
                .map_err(redb::Error::from)?;

            // Collect first: the range iterator borrows the table
            let mut expired = Vec::new();
            for entry in table.iter().map_err(redb::Error::from)? {
                let (key, value) = entry.map_err(redb::Error::from)?;
                let mapping: ShortMapping = serde_json::from_str(value.value())?;
                if mapping.is_expired_at(now) {
                    expired.push(key.value().to_owned());
                }
            }

            for key in &expired {
                table.remove(key.as_str()).map_err(redb::Error::from)?;
            }
            expired.len() as u64
        };
        write_txn.commit().map_err(redb::Error::from)?;

        Ok(removed)
    }
}
