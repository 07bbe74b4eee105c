//! Grid preferences persisted through a `PreferenceStore`.

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use gestion_lib::error::PrefsError;
use gestion_lib::grid::DataGrid;
use gestion_lib::grid::Density;
use gestion_lib::grid::GridOptions;
use gestion_lib::grid::GroupBy;
use gestion_lib::grid::SortConfig;
use gestion_lib::model::Column;
use gestion_lib::model::Row;
use gestion_lib::prefs::EntryInfo;
use gestion_lib::prefs::MemoryBackend;
use gestion_lib::prefs::PreferenceBackend;
use gestion_lib::prefs::PreferenceSnapshot;
use gestion_lib::prefs::PreferenceStore;
use gestion_lib::prefs::SqliteBackend;

fn columns() -> Vec<Column> {
    vec![
        Column::new("numero", "N°"),
        Column::new("client", "Client"),
        Column::new("statut", "Statut"),
    ]
}

fn grid(key: &str) -> DataGrid<Row> {
    DataGrid::new(columns(), GridOptions::default().memorize(key))
}

#[tokio::test]
async fn saved_page_size_survives_a_reload() {
    let store = PreferenceStore::in_memory();

    let mut first = grid("k1");
    first.set_page_size(25);
    assert!(first.save(&store).await);

    let mut reloaded = grid("k1");
    assert_eq!(reloaded.pagination().page_size(), 10);
    assert!(reloaded.restore(&store).await);
    assert_eq!(reloaded.pagination().page_size(), 25);
}

#[tokio::test]
async fn full_snapshot_round_trips_through_sqlite() {
    let store = PreferenceStore::new(SqliteBackend::open_in_memory().await.unwrap());

    let mut first = grid("factures");
    first.set_visible_columns(&["statut", "numero"]);
    first.set_sort(SortConfig::desc("numero"));
    first.set_group_by(GroupBy::column("statut"));
    first.set_density(Density::Compact);
    first.save(&store).await;

    let mut reloaded = grid("factures");
    reloaded.restore(&store).await;
    assert_eq!(reloaded.snapshot(), first.snapshot());
    assert_eq!(reloaded.visible_keys(), ["statut", "numero"]);
}

#[tokio::test]
async fn grids_without_a_key_never_touch_the_store() {
    let store = PreferenceStore::in_memory();
    let mut unnamed: DataGrid<Row> = DataGrid::new(columns(), GridOptions::default());
    unnamed.set_page_size(50);

    assert!(!unnamed.save(&store).await);
    assert!(!unnamed.restore(&store).await);
    assert!(store.list_grids().await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_stored_columns_are_dropped() {
    let store = PreferenceStore::in_memory();
    store
        .save(
            "clients",
            &PreferenceSnapshot {
                visible_columns: vec!["ancienne".into(), "client".into()],
                sort: SortConfig::asc("client"),
                group_by: GroupBy::None,
                page_size: 50,
                density: Density::Comfortable,
            },
        )
        .await
        .unwrap();

    let mut g = grid("clients");
    g.restore(&store).await;
    assert_eq!(g.visible_keys(), ["client"]);
    assert_eq!(g.density(), Density::Comfortable);

    // Nothing recognisable: keep the defaults
    store
        .save(
            "vide",
            &PreferenceSnapshot {
                visible_columns: vec!["ancienne".into()],
                sort: SortConfig::none(),
                group_by: GroupBy::None,
                page_size: 10,
                density: Density::Normal,
            },
        )
        .await
        .unwrap();
    let mut g = grid("vide");
    g.restore(&store).await;
    assert_eq!(g.visible_keys(), ["numero", "client", "statut"]);
}

#[tokio::test]
async fn reset_returns_to_defaults() {
    let store = PreferenceStore::in_memory();
    let mut g = DataGrid::<Row>::new(
        columns(),
        GridOptions::default().memorize("offres").page_size(25),
    );
    g.set_page_size(100);
    g.toggle_sort("client");
    g.save(&store).await;

    g.reset_preferences(&store).await;
    assert_eq!(g.pagination().page_size(), 25);
    assert_eq!(g.sort(), &SortConfig::none());
    assert_eq!(store.load("offres").await.unwrap(), None);
}

/// A store whose disk has gone away.
struct Unavailable;

#[async_trait]
impl PreferenceBackend for Unavailable {
    async fn read(&self, _key: &str) -> Result<Option<Vec<u8>>, PrefsError> {
        Err(PrefsError::Backend("disk unplugged".into()))
    }

    async fn write(&self, _key: &str, _payload: Vec<u8>) -> Result<DateTime<Utc>, PrefsError> {
        Err(PrefsError::Backend("disk unplugged".into()))
    }

    async fn remove(&self, _key: &str) -> Result<bool, PrefsError> {
        Err(PrefsError::Backend("disk unplugged".into()))
    }

    async fn entries(&self, _prefix: &str) -> Result<Vec<EntryInfo>, PrefsError> {
        Err(PrefsError::Backend("disk unplugged".into()))
    }
}

fn assert_defaults(g: &DataGrid<Row>) {
    assert_eq!(g.pagination().page_size(), 25);
    assert_eq!(g.sort(), &SortConfig::asc("client"));
    assert_eq!(g.visible_keys(), ["numero", "client"]);
    assert_eq!(g.density(), Density::Normal);
}

fn with_defaults(key: &str) -> DataGrid<Row> {
    DataGrid::new(
        columns(),
        GridOptions::default()
            .memorize(key)
            .page_size(25)
            .sort(SortConfig::asc("client"))
            .visible_columns(["numero", "client"]),
    )
}

#[tokio::test]
async fn corrupt_snapshot_leaves_defaults_in_place() {
    let backend = MemoryBackend::new();
    backend.write("grid:factures", vec![0xff, 0x01, 0x02]).await.unwrap();
    let store = PreferenceStore::new(backend);

    let mut g = with_defaults("factures");
    assert!(!g.restore(&store).await);
    assert_defaults(&g);
}

#[tokio::test]
async fn unavailable_store_is_ignored() {
    let store = PreferenceStore::new(Unavailable);

    let mut g = with_defaults("factures");
    assert!(!g.restore(&store).await);
    assert_defaults(&g);

    g.set_page_size(50);
    assert!(!g.save(&store).await);
    assert_eq!(g.pagination().page_size(), 50);

    g.reset_preferences(&store).await;
    assert_defaults(&g);
}
