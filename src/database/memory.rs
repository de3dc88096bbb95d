use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use super::Repository;
use crate::error::StoreError;
use crate::model::ShortMapping;

/// In-memory implementation of the [`Repository`] trait using DashMap.
///
/// Nothing is persisted. Useful for tests and for running the service
/// without a database file.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    storage: DashMap<Uuid, ShortMapping>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn insert(&self, mapping: &ShortMapping) -> Result<(), StoreError> {
        use dashmap::mapref::entry::Entry;

        match self.storage.entry(mapping.id) {
            Entry::Occupied(_) => Err(StoreError::DuplicateKey(mapping.id.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(mapping.clone());
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<ShortMapping>, StoreError> {
        Ok(self.storage.get(id).map(|entry| entry.value().clone()))
    }

    async fn find_all(&self) -> Result<Vec<ShortMapping>, StoreError> {
        Ok(self
            .storage
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn delete_by_id(&self, id: &Uuid) -> Result<u64, StoreError> {
        Ok(u64::from(self.storage.remove(id).is_some()))
    }

    async fn delete_expired_before(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut removed = 0;
        self.storage.retain(|_, mapping| {
            let keep = !mapping.is_expired_at(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }
}
