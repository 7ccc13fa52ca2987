//! Startup seeding against the SQLite document store
//!
//! Each test gets a fresh database file in a temp directory; reopening the
//! same file stands in for a service restart.

use ahan_common::config::DATABASE_FILE;
use ahan_common::db::init_database;
use ahan_common::models::{Station, StationDetails, Track};
use ahan_common::store::{CatalogStores, SqliteStore};
use ahan_common::RecordStore;
use ahan_hub::catalog::Catalog;
use ahan_hub::defaults::DefaultDataset;
use ahan_hub::seed::{bootstrap, StartupReport};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

async fn open_stores(root: &Path) -> (Arc<SqliteStore>, CatalogStores) {
    let pool = init_database(&root.join(DATABASE_FILE))
        .await
        .expect("Should initialize database");
    let backend = Arc::new(SqliteStore::new(pool));
    (backend.clone(), CatalogStores::from_backend(backend))
}

async fn start(stores: &CatalogStores) -> (Catalog, StartupReport) {
    let catalog = Catalog::new();
    let dataset = DefaultDataset::bundled().expect("bundled dataset");
    let report = bootstrap(stores, &catalog, &dataset, true).await;
    (catalog, report)
}

#[tokio::test]
async fn test_first_start_seeds_every_collection() {
    let temp_dir = TempDir::new().unwrap();
    let (_, stores) = open_stores(temp_dir.path()).await;
    let dataset = DefaultDataset::bundled().unwrap();

    let (catalog, report) = start(&stores).await;

    assert!(!report.is_degraded());
    assert!(report.outcomes.iter().all(|o| o.seeded));

    let snapshot = catalog.snapshot().await;
    assert_eq!(snapshot.recitations.len(), dataset.recitations.len());
    assert_eq!(snapshot.media.len(), dataset.media.len());
    assert_eq!(snapshot.stations.len(), dataset.stations.len());
    assert_eq!(snapshot.channels.len(), dataset.channels.len());

    let numbers: Vec<u32> = snapshot.recitations.iter().map(|r| r.number).collect();
    let mut sorted = numbers.clone();
    sorted.sort_unstable();
    assert_eq!(numbers, sorted);
}

#[tokio::test]
async fn test_restart_does_not_seed_again() {
    let temp_dir = TempDir::new().unwrap();
    {
        let (_, stores) = open_stores(temp_dir.path()).await;
        let (_, report) = start(&stores).await;
        assert!(report.outcomes.iter().all(|o| o.seeded));
    }

    let (_, stores) = open_stores(temp_dir.path()).await;
    let (catalog, report) = start(&stores).await;

    assert!(!report.is_degraded());
    assert!(report.outcomes.iter().all(|o| !o.seeded));

    let dataset = DefaultDataset::bundled().unwrap();
    let snapshot = catalog.snapshot().await;
    assert_eq!(snapshot.media.len(), dataset.media.len());
    assert_eq!(snapshot.channels.len(), dataset.channels.len());
}

#[tokio::test]
async fn test_curated_collection_is_left_alone() {
    let temp_dir = TempDir::new().unwrap();
    let (backend, stores) = open_stores(temp_dir.path()).await;
    RecordStore::<Station>::create(
        backend.as_ref(),
        StationDetails {
            name: "Curated FM".to_string(),
            genre: "Jazz".to_string(),
            tracks: vec![Track {
                title: "Live Stream".to_string(),
                artist: "Curated FM".to_string(),
                audio_url: "https://example.com/curated".to_string(),
            }],
        },
    )
    .await
    .unwrap();

    let (catalog, report) = start(&stores).await;

    let stations = report
        .outcomes
        .iter()
        .find(|o| o.kind == ahan_common::EntityKind::Station)
        .expect("stations outcome");
    assert!(!stations.seeded);
    assert_eq!(stations.loaded, 1);

    let snapshot = catalog.snapshot().await;
    assert_eq!(snapshot.stations.len(), 1);
    assert_eq!(snapshot.stations[0].details.name, "Curated FM");
    assert!(!snapshot.media.is_empty());
}
