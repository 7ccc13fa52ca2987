//! In-process document store
//!
//! Same contract as `SqliteStore`, without persistence. The `offline` switch
//! makes every call fail with `Network`, which is how degraded startup and
//! failed admin writes are exercised without a broken database.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;

use super::RecordStore;
use crate::entity::Entity;
use crate::{Error, Result};

#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Collection name -> records in insertion order
    collections: Mutex<HashMap<&'static str, Vec<(String, Value)>>>,
    offline: AtomicBool,
    calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline, every call fails with `Error::Network`
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of store calls attempted so far, including failed ones
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn begin_call(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Network("memory store is offline".to_string()));
        }
        Ok(())
    }
}

fn to_value<E: Entity>(record: &E) -> Result<Value> {
    serde_json::to_value(record)
        .map_err(|e| Error::Internal(format!("Failed to serialize {}: {}", E::KIND, e)))
}

fn from_value<E: Entity>(value: &Value) -> Result<E> {
    serde_json::from_value(value.clone())
        .map_err(|e| Error::Internal(format!("Corrupt {} document: {}", E::KIND, e)))
}

#[async_trait]
impl<E: Entity> RecordStore<E> for MemoryStore {
    async fn list(&self) -> Result<Vec<E>> {
        self.begin_call()?;
        let collections = self.collections.lock().await;

        let mut records = collections
            .get(E::KIND.collection())
            .map(|docs| {
                docs.iter()
                    .map(|(_, body)| from_value::<E>(body))
                    .collect::<Result<Vec<E>>>()
            })
            .unwrap_or_else(|| Ok(Vec::new()))?;

        // Stable sort keeps insertion order among equal (or absent) keys
        records.sort_by_key(|record| record.sort_key());
        Ok(records)
    }

    async fn get(&self, id: &E::Id) -> Result<E> {
        self.begin_call()?;
        let key = id.to_string();
        let collections = self.collections.lock().await;

        collections
            .get(E::KIND.collection())
            .and_then(|docs| docs.iter().find(|(doc_id, _)| *doc_id == key))
            .map(|(_, body)| from_value(body))
            .unwrap_or_else(|| Err(Error::NotFound(format!("{} '{}'", E::KIND, key))))
    }

    async fn create(&self, draft: E::Draft) -> Result<E> {
        self.begin_call()?;
        let id = E::assign_id(&draft);
        let record = E::from_draft(id, draft);
        let key = record.id().to_string();
        let body = to_value(&record)?;

        let mut collections = self.collections.lock().await;
        let docs = collections.entry(E::KIND.collection()).or_default();
        if docs.iter().any(|(doc_id, _)| *doc_id == key) {
            return Err(Error::AlreadyExists(format!("{} '{}'", E::KIND, key)));
        }
        docs.push((key, body));

        Ok(record)
    }

    async fn update(&self, id: &E::Id, patch: E::Patch) -> Result<E> {
        self.begin_call()?;
        let key = id.to_string();

        let mut collections = self.collections.lock().await;
        let slot = collections
            .get_mut(E::KIND.collection())
            .and_then(|docs| docs.iter_mut().find(|(doc_id, _)| *doc_id == key))
            .ok_or_else(|| Error::NotFound(format!("{} '{}'", E::KIND, key)))?;

        let mut record: E = from_value(&slot.1)?;
        record.apply_patch(patch);
        slot.1 = to_value(&record)?;

        Ok(record)
    }

    async fn delete(&self, id: &E::Id) -> Result<()> {
        self.begin_call()?;
        let key = id.to_string();

        let mut collections = self.collections.lock().await;
        let docs = collections
            .get_mut(E::KIND.collection())
            .ok_or_else(|| Error::NotFound(format!("{} '{}'", E::KIND, key)))?;

        let before = docs.len();
        docs.retain(|(doc_id, _)| *doc_id != key);
        if docs.len() == before {
            return Err(Error::NotFound(format!("{} '{}'", E::KIND, key)));
        }

        Ok(())
    }

    async fn create_batch(&self, drafts: Vec<E::Draft>) -> Result<usize> {
        self.begin_call()?;

        // Build the whole batch first so a collision leaves the collection untouched
        let mut staged = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let id = E::assign_id(&draft);
            let record = E::from_draft(id, draft);
            staged.push((record.id().to_string(), to_value(&record)?));
        }

        let mut collections = self.collections.lock().await;
        let docs = collections.entry(E::KIND.collection()).or_default();
        for (i, (key, _)) in staged.iter().enumerate() {
            let duplicate_in_store = docs.iter().any(|(doc_id, _)| doc_id == key);
            let duplicate_in_batch = staged[..i].iter().any(|(other, _)| other == key);
            if duplicate_in_store || duplicate_in_batch {
                return Err(Error::AlreadyExists(format!("{} '{}'", E::KIND, key)));
            }
        }

        let count = staged.len();
        docs.extend(staged);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Recitation, RecitationDetails, Station, StationDetails, Track};

    fn recitation(number: u32) -> Recitation {
        Recitation {
            number,
            details: RecitationDetails {
                name: format!("Surah {}", number),
                english_name: format!("Surah {}", number),
                audio_url: format!("https://example.com/{:03}.mp3", number),
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_list_sorts_recitations_by_number() {
        let store = MemoryStore::new();
        RecordStore::<Recitation>::create(&store, recitation(3)).await.unwrap();
        RecordStore::<Recitation>::create(&store, recitation(1)).await.unwrap();
        RecordStore::<Recitation>::create(&store, recitation(2)).await.unwrap();

        let listed = RecordStore::<Recitation>::list(&store).await.unwrap();
        let numbers: Vec<u32> = listed.iter().map(|r| r.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_offline_fails_and_counts_calls() {
        let store = MemoryStore::new();
        store.set_offline(true);

        let result = RecordStore::<Station>::list(&store).await;
        assert!(matches!(result, Err(Error::Network(_))));
        assert_eq!(store.call_count(), 1);
    }

    #[tokio::test]
    async fn test_batch_with_duplicate_writes_nothing() {
        let store = MemoryStore::new();
        let result =
            RecordStore::<Recitation>::create_batch(&store, vec![recitation(1), recitation(1)])
                .await;
        assert!(matches!(result, Err(Error::AlreadyExists(_))));

        let listed = RecordStore::<Recitation>::list(&store).await.unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_station_is_not_found() {
        let store = MemoryStore::new();
        let patch = StationDetails {
            name: "Jazz FM".to_string(),
            genre: "Jazz".to_string(),
            tracks: vec![Track {
                title: "Jazz FM".to_string(),
                artist: "Jazz".to_string(),
                audio_url: "https://example.com/jazz".to_string(),
            }],
        };

        let result = RecordStore::<Station>::update(&store, &"missing".to_string(), patch).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
