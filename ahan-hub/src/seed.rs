//! Seeding coordinator
//!
//! At startup each collection is checked for emptiness; an empty collection
//! receives the bundled defaults as one batch, then every collection is loaded
//! into the catalog. Failures are isolated per collection and the service
//! carries on with whatever loaded.
//!
//! Two processes starting against the same empty store at the same moment can
//! both observe "empty" and both seed. The emptiness check is the only guard.

use ahan_common::models::{Channel, MediaEntry, Recitation, Station};
use ahan_common::store::CatalogStores;
use ahan_common::{EntityKind, RecordStore, Result};
use serde::Serialize;
use tracing::{error, info};

use crate::catalog::{Catalog, CatalogEntity, Mutation};
use crate::defaults::{DefaultDataset, Seeded};

/// What happened to one collection during startup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionOutcome {
    pub kind: EntityKind,
    /// Defaults were written this run
    pub seeded: bool,
    /// Records loaded into the catalog
    pub loaded: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionFailure {
    pub kind: EntityKind,
    pub message: String,
}

/// Result of seeding and loading every collection
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StartupReport {
    pub outcomes: Vec<CollectionOutcome>,
    pub failures: Vec<CollectionFailure>,
}

impl StartupReport {
    pub fn is_degraded(&self) -> bool {
        !self.failures.is_empty()
    }

    /// User-facing connectivity notice, if any collection failed to load
    pub fn notice(&self) -> Option<String> {
        if !self.is_degraded() {
            return None;
        }

        let kinds: Vec<&str> = self.failures.iter().map(|f| f.kind.collection()).collect();
        Some(format!(
            "Could not reach the catalog store; some content may be missing ({}).",
            kinds.join(", ")
        ))
    }
}

/// Seed collection `E` if it is empty. Returns the collection contents and
/// whether defaults were written.
///
/// Never writes into a non-empty collection.
pub async fn seed_collection<E: Seeded>(
    store: &dyn RecordStore<E>,
    defaults: Vec<E::Draft>,
) -> Result<(Vec<E>, bool)> {
    let existing = store.list().await?;
    if !existing.is_empty() || defaults.is_empty() {
        return Ok((existing, false));
    }

    let written = store.create_batch(defaults).await?;
    info!("Seeded {} with {} default records", E::KIND, written);

    let reloaded = store.list().await?;
    Ok((reloaded, true))
}

async fn start_collection<E: Seeded + CatalogEntity>(
    stores: &CatalogStores,
    catalog: &Catalog,
    dataset: &DefaultDataset,
    seed_enabled: bool,
    report: &mut StartupReport,
) {
    let store = stores.of::<E>();
    let result = if seed_enabled {
        seed_collection::<E>(store, E::defaults(dataset)).await
    } else {
        store.list().await.map(|records| (records, false))
    };

    match result {
        Ok((records, seeded)) => {
            let loaded = records.len();
            catalog.dispatch(E::event(Mutation::Loaded(records))).await;
            info!("Loaded {} {} records", loaded, E::KIND);
            report.outcomes.push(CollectionOutcome {
                kind: E::KIND,
                seeded,
                loaded,
            });
        }
        Err(e) => {
            error!("Failed to seed/load {}: {}", E::KIND, e);
            report.failures.push(CollectionFailure {
                kind: E::KIND,
                message: e.to_string(),
            });
        }
    }
}

/// Seed (when enabled) and load all four collections into the catalog
pub async fn bootstrap(
    stores: &CatalogStores,
    catalog: &Catalog,
    dataset: &DefaultDataset,
    seed_enabled: bool,
) -> StartupReport {
    let mut report = StartupReport::default();

    start_collection::<Recitation>(stores, catalog, dataset, seed_enabled, &mut report).await;
    start_collection::<MediaEntry>(stores, catalog, dataset, seed_enabled, &mut report).await;
    start_collection::<Station>(stores, catalog, dataset, seed_enabled, &mut report).await;
    start_collection::<Channel>(stores, catalog, dataset, seed_enabled, &mut report).await;

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahan_common::models::{MediaDetails, RecitationDetails};
    use ahan_common::store::MemoryStore;
    use std::sync::Arc;

    fn dataset() -> DefaultDataset {
        DefaultDataset::bundled().unwrap()
    }

    #[tokio::test]
    async fn test_empty_collection_is_seeded_once() {
        let backend = Arc::new(MemoryStore::new());
        let defaults = dataset().recitations;

        let (first, seeded) = seed_collection::<Recitation>(backend.as_ref(), defaults.clone())
            .await
            .unwrap();
        assert!(seeded);
        assert_eq!(first.len(), defaults.len());

        let (second, seeded_again) =
            seed_collection::<Recitation>(backend.as_ref(), defaults.clone())
                .await
                .unwrap();
        assert!(!seeded_again);
        assert_eq!(second.len(), defaults.len());
    }

    #[tokio::test]
    async fn test_non_empty_collection_is_never_seeded() {
        let backend = Arc::new(MemoryStore::new());
        RecordStore::<MediaEntry>::create(
            backend.as_ref(),
            MediaDetails {
                title: "Curated".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let (records, seeded) = seed_collection::<MediaEntry>(backend.as_ref(), dataset().media)
            .await
            .unwrap();

        assert!(!seeded);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].details.title, "Curated");
    }

    #[tokio::test]
    async fn test_bootstrap_loads_all_collections() {
        let backend = Arc::new(MemoryStore::new());
        let stores = CatalogStores::from_backend(backend);
        let catalog = Catalog::new();
        let dataset = dataset();

        let report = bootstrap(&stores, &catalog, &dataset, true).await;

        assert!(!report.is_degraded());
        assert_eq!(report.outcomes.len(), 4);
        assert!(report.outcomes.iter().all(|o| o.seeded));

        let snapshot = catalog.snapshot().await;
        assert_eq!(snapshot.recitations.len(), dataset.recitations.len());
        assert_eq!(snapshot.media.len(), dataset.media.len());
        assert_eq!(snapshot.stations.len(), dataset.stations.len());
        assert_eq!(snapshot.channels.len(), dataset.channels.len());
    }

    #[tokio::test]
    async fn test_bootstrap_with_seeding_disabled_loads_only() {
        let backend = Arc::new(MemoryStore::new());
        RecordStore::<Recitation>::create(
            backend.as_ref(),
            Recitation {
                number: 7,
                details: RecitationDetails {
                    name: "الأعراف".to_string(),
                    english_name: "Al-A'raaf".to_string(),
                    audio_url: "https://example.com/007.mp3".to_string(),
                    ..Default::default()
                },
            },
        )
        .await
        .unwrap();
        let stores = CatalogStores::from_backend(backend);
        let catalog = Catalog::new();

        let report = bootstrap(&stores, &catalog, &dataset(), false).await;

        assert!(report.outcomes.iter().all(|o| !o.seeded));
        let snapshot = catalog.snapshot().await;
        assert_eq!(snapshot.recitations.len(), 1);
        assert!(snapshot.media.is_empty());
    }

    #[tokio::test]
    async fn test_one_failing_collection_does_not_block_the_others() {
        let healthy = Arc::new(MemoryStore::new());
        let unreachable = Arc::new(MemoryStore::new());
        unreachable.set_offline(true);

        let stores = CatalogStores {
            recitations: healthy.clone(),
            media: unreachable,
            stations: healthy.clone(),
            channels: healthy.clone(),
        };
        let catalog = Catalog::new();
        let dataset = dataset();

        let report = bootstrap(&stores, &catalog, &dataset, true).await;

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].kind, EntityKind::Media);
        assert_eq!(report.outcomes.len(), 3);
        assert!(report.outcomes.iter().all(|o| o.seeded));
        assert!(report.notice().is_some_and(|n| n.contains("media")));

        let snapshot = catalog.snapshot().await;
        assert!(snapshot.media.is_empty());
        assert_eq!(snapshot.recitations.len(), dataset.recitations.len());
        assert_eq!(snapshot.stations.len(), dataset.stations.len());
        assert_eq!(snapshot.channels.len(), dataset.channels.len());

        // The healthy backend was seeded for the other collections only
        let stored_media = RecordStore::<MediaEntry>::list(healthy.as_ref())
            .await
            .unwrap();
        assert!(stored_media.is_empty());
    }

    #[tokio::test]
    async fn test_offline_store_degrades_to_empty_catalog() {
        let backend = Arc::new(MemoryStore::new());
        backend.set_offline(true);
        let stores = CatalogStores::from_backend(backend);
        let catalog = Catalog::new();

        let report = bootstrap(&stores, &catalog, &dataset(), true).await;

        assert!(report.is_degraded());
        assert_eq!(report.failures.len(), 4);
        assert!(report.notice().is_some());
        assert_eq!(*catalog.snapshot().await, Default::default());
    }
}
