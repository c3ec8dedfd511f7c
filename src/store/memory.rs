//! In-memory keyed store.

use std::collections::BTreeMap;
use std::fmt::{Debug, Display};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::patch::Patch;

use super::errors::{StoreError, StoreResult};
use super::{DocumentStore, Keyed, Predicate};

/// Records held in a `BTreeMap` so scans come back in key order
pub struct MemoryStore<R: Keyed> {
    records: RwLock<BTreeMap<R::Key, R>>,
}

impl<R> MemoryStore<R>
where
    R: Keyed,
    R::Key: Ord,
{
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, BTreeMap<R::Key, R>>> {
        self.records
            .read()
            .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, BTreeMap<R::Key, R>>> {
        self.records
            .write()
            .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))
    }
}

impl<R> Default for MemoryStore<R>
where
    R: Keyed,
    R::Key: Ord,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R> DocumentStore for MemoryStore<R>
where
    R: Keyed + Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    R::Key: Ord + Clone + Debug + Display + DeserializeOwned + Send + Sync + 'static,
{
    type Key = R::Key;
    type Record = R;

    fn decode(&self, body: Value) -> Option<R> {
        serde_json::from_value(body).ok()
    }

    fn decode_key(&self, raw: &Value) -> Option<R::Key> {
        serde_json::from_value(raw.clone()).ok()
    }

    fn key_of(&self, record: &R) -> R::Key {
        record.key()
    }

    async fn find(&self, key: &R::Key) -> StoreResult<R> {
        self.read()?
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::not_found(key))
    }

    async fn find_all(&self, predicate: &Predicate<R>, value: &Value) -> StoreResult<Vec<R>> {
        Ok(self
            .read()?
            .values()
            .filter(|record| predicate(value, record))
            .cloned()
            .collect())
    }

    async fn upsert(&self, record: R) -> StoreResult<()> {
        self.write()?.insert(record.key(), record);
        Ok(())
    }

    async fn remove(&self, key: &R::Key) -> StoreResult<()> {
        match self.write()?.remove(key) {
            Some(_) => Ok(()),
            None => Err(StoreError::not_found(key)),
        }
    }

    async fn remove_all(&self, predicate: &Predicate<R>, value: &Value) -> StoreResult<usize> {
        let mut records = self.write()?;
        let before = records.len();
        records.retain(|_, record| !predicate(value, record));
        Ok(before - records.len())
    }

    async fn apply_patch(&self, patch: &Patch) -> StoreResult<usize> {
        let entries = patch.entries()?;
        let mut records = self.write()?;

        // Stage every entry first; nothing is committed unless all succeed.
        let mut staged: BTreeMap<R::Key, Option<R>> = BTreeMap::new();
        for (raw_key, op) in entries {
            let key: R::Key = serde_json::from_value(raw_key.clone())?;
            let current = match staged.get(&key) {
                Some(pending) => pending.clone(),
                None => records.get(&key).cloned(),
            };
            let before = current.as_ref().map(serde_json::to_value).transpose()?;
            let after = op.apply(before.as_ref())?;
            if after == before {
                continue;
            }
            let next = match after {
                Some(value) => {
                    let record: R = serde_json::from_value(value)?;
                    if record.key() != key {
                        return Err(StoreError::Conversion(format!(
                            "patch would move record {} to key {}",
                            key,
                            record.key()
                        )));
                    }
                    Some(record)
                }
                None => None,
            };
            staged.insert(key, next);
        }

        let count = staged.len();
        for (key, next) in staged {
            match next {
                Some(record) => {
                    records.insert(key, record);
                }
                None => {
                    records.remove(&key);
                }
            }
        }
        Ok(count)
    }
}
