//! Record store adapters
//!
//! The remote document store is the system of record for every catalog
//! collection. `RecordStore<E>` is the per-collection contract; calls never
//! retry, failures propagate to the caller unchanged.

use async_trait::async_trait;
use std::sync::Arc;

use crate::entity::Entity;
use crate::models::{Channel, MediaEntry, Recitation, Station};
use crate::Result;

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Per-collection document store contract
#[async_trait]
pub trait RecordStore<E: Entity>: Send + Sync {
    /// All records; ordered by `Entity::sort_key` when declared, otherwise insertion order
    async fn list(&self) -> Result<Vec<E>>;

    /// Fails with `NotFound` if absent
    async fn get(&self, id: &E::Id) -> Result<E>;

    /// Fails with `AlreadyExists` if the identifier collides.
    /// Returns the stored record, including a store-assigned identifier.
    async fn create(&self, draft: E::Draft) -> Result<E>;

    /// Fails with `NotFound` if absent. Returns the merged record.
    async fn update(&self, id: &E::Id, patch: E::Patch) -> Result<E>;

    /// Fails with `NotFound` if absent
    async fn delete(&self, id: &E::Id) -> Result<()>;

    /// Write every draft or none of them
    async fn create_batch(&self, drafts: Vec<E::Draft>) -> Result<usize>;
}

/// One store handle per catalog collection
#[derive(Clone)]
pub struct CatalogStores {
    pub recitations: Arc<dyn RecordStore<Recitation>>,
    pub media: Arc<dyn RecordStore<MediaEntry>>,
    pub stations: Arc<dyn RecordStore<Station>>,
    pub channels: Arc<dyn RecordStore<Channel>>,
}

impl CatalogStores {
    /// Serve all four collections from one backend
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: RecordStore<Recitation>
            + RecordStore<MediaEntry>
            + RecordStore<Station>
            + RecordStore<Channel>
            + 'static,
    {
        Self {
            recitations: backend.clone(),
            media: backend.clone(),
            stations: backend.clone(),
            channels: backend,
        }
    }

    /// Store handle for collection `E`
    pub fn of<E: StoredEntity>(&self) -> &dyn RecordStore<E> {
        E::select(self)
    }
}

impl std::fmt::Debug for CatalogStores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogStores").finish_non_exhaustive()
    }
}

/// Entities with a slot in `CatalogStores`
pub trait StoredEntity: Entity {
    fn select(stores: &CatalogStores) -> &dyn RecordStore<Self>;
}

impl StoredEntity for Recitation {
    fn select(stores: &CatalogStores) -> &dyn RecordStore<Self> {
        stores.recitations.as_ref()
    }
}

impl StoredEntity for MediaEntry {
    fn select(stores: &CatalogStores) -> &dyn RecordStore<Self> {
        stores.media.as_ref()
    }
}

impl StoredEntity for Station {
    fn select(stores: &CatalogStores) -> &dyn RecordStore<Self> {
        stores.stations.as_ref()
    }
}

impl StoredEntity for Channel {
    fn select(stores: &CatalogStores) -> &dyn RecordStore<Self> {
        stores.channels.as_ref()
    }
}

fn encode<E: Entity>(record: &E) -> Result<String> {
    serde_json::to_string(record)
        .map_err(|e| crate::Error::Internal(format!("Failed to serialize {}: {}", E::KIND, e)))
}

fn decode<E: Entity>(body: &str) -> Result<E> {
    serde_json::from_str(body)
        .map_err(|e| crate::Error::Internal(format!("Corrupt {} document: {}", E::KIND, e)))
}
