//! Catalog state manager
//!
//! Holds the in-memory mirror of every collection. The mirror only changes
//! after the record store confirms a write (write-then-reflect); a failed
//! store call leaves the current snapshot untouched.

use ahan_common::models::{Channel, MediaEntry, Recitation, Station};
use ahan_common::store::{CatalogStores, StoredEntity};
use ahan_common::Result;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

mod snapshot;

pub use snapshot::{apply, CatalogSnapshot, Mutation, MutationEvent};

/// Entities mirrored in the catalog snapshot
pub trait CatalogEntity: StoredEntity {
    fn records(snapshot: &CatalogSnapshot) -> &[Self];

    fn event(mutation: Mutation<Self>) -> MutationEvent;
}

impl CatalogEntity for Recitation {
    fn records(snapshot: &CatalogSnapshot) -> &[Self] {
        &snapshot.recitations
    }

    fn event(mutation: Mutation<Self>) -> MutationEvent {
        MutationEvent::Recitation(mutation)
    }
}

impl CatalogEntity for MediaEntry {
    fn records(snapshot: &CatalogSnapshot) -> &[Self] {
        &snapshot.media
    }

    fn event(mutation: Mutation<Self>) -> MutationEvent {
        MutationEvent::Media(mutation)
    }
}

impl CatalogEntity for Station {
    fn records(snapshot: &CatalogSnapshot) -> &[Self] {
        &snapshot.stations
    }

    fn event(mutation: Mutation<Self>) -> MutationEvent {
        MutationEvent::Station(mutation)
    }
}

impl CatalogEntity for Channel {
    fn records(snapshot: &CatalogSnapshot) -> &[Self] {
        &snapshot.channels
    }

    fn event(mutation: Mutation<Self>) -> MutationEvent {
        MutationEvent::Channel(mutation)
    }
}

/// Shared catalog mirror; readers get immutable `Arc` snapshots
#[derive(Debug, Default)]
pub struct Catalog {
    current: RwLock<Arc<CatalogSnapshot>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.current.read().await.clone()
    }

    /// Apply a confirmed mutation and publish the resulting snapshot
    pub async fn dispatch(&self, event: MutationEvent) -> Arc<CatalogSnapshot> {
        let mut current = self.current.write().await;
        let next = Arc::new(apply(&current, event));
        *current = next.clone();
        next
    }

    /// Record with the given identifier, from the current snapshot
    pub async fn find<E: CatalogEntity>(&self, id: &E::Id) -> Option<E> {
        let snapshot = self.snapshot().await;
        E::records(&snapshot).iter().find(|r| r.id() == id).cloned()
    }

    /// Replace collection `E` with the store's current contents
    pub async fn reload<E: CatalogEntity>(&self, stores: &CatalogStores) -> Result<usize> {
        let records = stores.of::<E>().list().await?;
        let count = records.len();
        self.dispatch(E::event(Mutation::Loaded(records))).await;
        Ok(count)
    }

    /// Create in the store, then insert the confirmed record locally
    pub async fn create<E: CatalogEntity>(
        &self,
        stores: &CatalogStores,
        draft: E::Draft,
    ) -> Result<E> {
        match stores.of::<E>().create(draft).await {
            Ok(record) => {
                info!("Created {} '{}'", E::KIND, record.id());
                self.dispatch(E::event(Mutation::Created(record.clone()))).await;
                Ok(record)
            }
            Err(e) => {
                warn!("Create {} failed: {}", E::KIND, e);
                Err(e)
            }
        }
    }

    /// Update in the store, then replace the confirmed record locally
    pub async fn update<E: CatalogEntity>(
        &self,
        stores: &CatalogStores,
        id: &E::Id,
        patch: E::Patch,
    ) -> Result<E> {
        match stores.of::<E>().update(id, patch).await {
            Ok(record) => {
                info!("Updated {} '{}'", E::KIND, id);
                self.dispatch(E::event(Mutation::Updated(record.clone()))).await;
                Ok(record)
            }
            Err(e) => {
                warn!("Update {} '{}' failed: {}", E::KIND, id, e);
                Err(e)
            }
        }
    }

    /// Delete in the store, then remove the record locally
    pub async fn delete<E: CatalogEntity>(&self, stores: &CatalogStores, id: &E::Id) -> Result<()> {
        match stores.of::<E>().delete(id).await {
            Ok(()) => {
                info!("Deleted {} '{}'", E::KIND, id);
                self.dispatch(E::event(Mutation::Deleted(id.clone()))).await;
                Ok(())
            }
            Err(e) => {
                warn!("Delete {} '{}' failed: {}", E::KIND, id, e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahan_common::models::{RecitationDetails, StationDetails, Track};
    use ahan_common::store::MemoryStore;
    use ahan_common::Error;

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

    fn station(name: &str) -> StationDetails {
        StationDetails {
            name: name.to_string(),
            genre: "Talk".to_string(),
            tracks: vec![Track {
                title: name.to_string(),
                artist: "Talk".to_string(),
                audio_url: "https://example.com/stream".to_string(),
            }],
        }
    }

    fn setup() -> (Arc<MemoryStore>, CatalogStores, Catalog) {
        let backend = Arc::new(MemoryStore::new());
        let stores = CatalogStores::from_backend(backend.clone());
        (backend, stores, Catalog::new())
    }

    #[tokio::test]
    async fn test_create_reflects_after_store_confirms() {
        let (_backend, stores, catalog) = setup();

        let created = catalog
            .create::<Station>(&stores, station("Talk Radio"))
            .await
            .unwrap();

        let snapshot = catalog.snapshot().await;
        assert_eq!(snapshot.stations, vec![created]);
    }

    #[tokio::test]
    async fn test_failed_create_leaves_snapshot_unchanged() {
        let (backend, stores, catalog) = setup();
        catalog
            .create::<Recitation>(&stores, recitation(1))
            .await
            .unwrap();
        let before = catalog.snapshot().await;

        backend.set_offline(true);
        let result = catalog.create::<Recitation>(&stores, recitation(2)).await;

        assert!(matches!(result, Err(Error::Network(_))));
        assert_eq!(*catalog.snapshot().await, *before);
    }

    #[tokio::test]
    async fn test_duplicate_recitation_is_rejected_without_local_change() {
        let (_backend, stores, catalog) = setup();
        catalog
            .create::<Recitation>(&stores, recitation(5))
            .await
            .unwrap();
        let before = catalog.snapshot().await;

        let result = catalog.create::<Recitation>(&stores, recitation(5)).await;

        assert!(matches!(result, Err(Error::AlreadyExists(_))));
        assert_eq!(*catalog.snapshot().await, *before);
    }

    #[tokio::test]
    async fn test_update_missing_record_is_not_found() {
        let (_backend, stores, catalog) = setup();
        let result = catalog
            .update::<Station>(&stores, &"nope".to_string(), station("X"))
            .await;

        assert!(matches!(result, Err(Error::NotFound(_))));
        assert!(catalog.snapshot().await.stations.is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let (_backend, stores, catalog) = setup();
        let created = catalog
            .create::<Station>(&stores, station("Gone Soon"))
            .await
            .unwrap();

        catalog.delete::<Station>(&stores, &created.id).await.unwrap();

        assert!(catalog.find::<Station>(&created.id).await.is_none());
    }

    #[tokio::test]
    async fn test_reload_mirrors_store() {
        let (_backend, stores, catalog) = setup();
        stores.of::<Recitation>().create(recitation(2)).await.unwrap();
        stores.of::<Recitation>().create(recitation(1)).await.unwrap();

        let count = catalog.reload::<Recitation>(&stores).await.unwrap();

        assert_eq!(count, 2);
        let numbers: Vec<u32> = catalog
            .snapshot()
            .await
            .recitations
            .iter()
            .map(|r| r.number)
            .collect();
        assert_eq!(numbers, vec![1, 2]);
    }
}
