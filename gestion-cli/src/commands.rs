//! Subcommand handlers.

use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use gestion_lib::GestionClient;
use gestion_lib::api;
use gestion_lib::auth::StoredTokenProvider;
use gestion_lib::config::GestionConfig;
use gestion_lib::export::CsvOptions;
use gestion_lib::export::Delimiter;
use gestion_lib::grid::DEFAULT_PAGE_SIZE;
use gestion_lib::grid::DataGrid;
use gestion_lib::grid::ExportScope;
use gestion_lib::grid::GridOptions;
use gestion_lib::grid::PageRequest;
use gestion_lib::grid::PagingMode;
use gestion_lib::model::Alignment;
use gestion_lib::model::Column;
use gestion_lib::model::DEFAULT_ID_KEY;
use gestion_lib::model::Row;
use gestion_lib::notify::ConnectionState;
use gestion_lib::notify::NotificationClient;
use gestion_lib::notify::ReconnectPolicy;
use gestion_lib::prefs::PreferenceStore;
use gestion_lib::prefs::SqliteBackend;
use log::debug;
use log::info;
use log::warn;
use tokio::sync::broadcast::error::RecvError;

use crate::args::Command;
use crate::args::DelimiterArg;
use crate::args::ExportArgs;
use crate::args::ExportFormat;
use crate::args::GridArgs;
use crate::args::ListenArgs;
use crate::args::PrefsCommand;
use crate::args::Scope;
use crate::args::ViewArgs;
use crate::error::CliError;
use crate::paths;
use crate::render;

pub async fn run(command: Command) -> Result<(), CliError> {
    let store = open_store().await;
    match command {
        Command::View(args) => view(args, &store).await,
        Command::Export(args) => export(args, &store).await,
        Command::Prefs(cmd) => prefs(cmd, &store).await,
        Command::Listen(args) => listen(args).await,
    }
}

/// Preference store on disk, or in memory when no data directory exists.
async fn open_store() -> PreferenceStore {
    let Some(path) = paths::preferences_db() else {
        warn!("no data directory, preferences will not persist");
        return PreferenceStore::in_memory();
    };
    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("cannot create {}: {}", parent.display(), e);
        return PreferenceStore::in_memory();
    }
    match SqliteBackend::open(&path).await {
        Ok(backend) => PreferenceStore::new(backend),
        Err(e) => {
            warn!("cannot open {}: {}", path.display(), e);
            PreferenceStore::in_memory()
        }
    }
}

// =============================================================================
// Grid commands
// =============================================================================

async fn view(args: ViewArgs, store: &PreferenceStore) -> Result<(), CliError> {
    let mut grid = load_grid(&args.grid, store).await?;
    if !args.collapsed {
        grid.expand_all_groups();
    }
    print!("{}", render::render(&grid.view()));
    Ok(())
}

async fn export(args: ExportArgs, store: &PreferenceStore) -> Result<(), CliError> {
    let grid = load_grid(&args.grid, store).await?;
    let scope = match args.scope {
        Scope::All => ExportScope::All,
        Scope::Page => ExportScope::CurrentPage,
    };
    let table = grid.export(scope);
    info!("exporting {} rows", table.len());

    let bytes = match args.format {
        ExportFormat::Csv => {
            let delimiter = match args.delimiter {
                DelimiterArg::Comma => Delimiter::Comma,
                DelimiterArg::Semicolon => Delimiter::Semicolon,
                DelimiterArg::Tab => Delimiter::Tab,
                DelimiterArg::Pipe => Delimiter::Pipe,
            };
            let options = CsvOptions::default()
                .delimiter(delimiter)
                .headers(!args.no_header);
            let mut buf = Vec::new();
            table.write_csv(&mut buf, &options)?;
            buf
        }
        ExportFormat::Json => {
            let mut text = serde_json::to_string_pretty(&table.to_json())
                .map_err(|e| CliError::Usage(e.to_string()))?;
            text.push('\n');
            text.into_bytes()
        }
    };

    match &args.output {
        Some(path) => {
            fs::write(path, &bytes)?;
            eprintln!("{} lignes exportées vers {}", table.len(), path.display());
        }
        None => std::io::stdout().write_all(&bytes)?,
    }
    Ok(())
}

/// Loads rows and builds a grid with the stored and requested state.
///
/// Command-line flags win over stored preferences.
async fn load_grid(args: &GridArgs, store: &PreferenceStore) -> Result<DataGrid<Row>, CliError> {
    let server = args.server_paging && args.source.resource.is_some();
    let requested: Arc<Mutex<Option<PageRequest>>> = Arc::new(Mutex::new(None));

    let (rows, total, client) = match (&args.source.file, args.source.resource()) {
        (Some(path), _) => {
            let text = fs::read_to_string(path)?;
            let rows = api::parse_rows(&text)?;
            (rows, None, None)
        }
        (None, Some(resource)) => {
            let client = api_client(store)?;
            if server {
                let page_size = match args.page_size {
                    Some(n) => n,
                    None => stored_page_size(store, args.grid.as_deref()).await,
                };
                let page = client
                    .page(&resource, PageRequest { page: 1, page_size })
                    .await?;
                (page.rows, Some(page.total), Some((client, resource)))
            } else {
                let rows = client.list(&resource).await?;
                (rows, None, Some((client, resource)))
            }
        }
        (None, None) => return Err(CliError::Usage("either --file or --resource is required".into())),
    };
    debug!("loaded {} rows", rows.len());

    let mut options = GridOptions::default();
    if let Some(id) = &args.grid {
        options = options.memorize(id.clone());
    }
    if server {
        let requested = requested.clone();
        options = options.paging(PagingMode::server(move |req| {
            *requested.lock().unwrap_or_else(PoisonError::into_inner) = Some(req);
        }));
    }

    let mut grid = DataGrid::new(infer_columns(&rows), options);
    grid.restore(store).await;

    match total {
        Some(total) => grid.set_page_rows(rows, total),
        None => grid.set_rows(rows),
    }

    if !args.columns.is_empty() && !grid.set_visible_columns(&args.columns) {
        return Err(CliError::Usage(format!(
            "none of the columns {:?} exist",
            args.columns
        )));
    }
    if let Some(density) = args.density {
        grid.set_density(density);
    }
    if let Some(group) = &args.group {
        grid.set_group_by(group.clone());
    }
    if let Some(sort) = &args.sort {
        grid.set_sort(sort.clone());
    }
    if let Some(size) = args.page_size
        && size != grid.pagination().page_size()
    {
        grid.set_page_size(size);
    }
    if let Some(term) = &args.search {
        grid.set_search(term.clone());
    }
    if !args.filters.is_empty() {
        grid.set_filters(args.filters.clone());
    }
    if args.page > 1 && !grid.set_page(args.page) {
        warn!(
            "page {} is out of range (1..={})",
            args.page,
            grid.pagination().total_pages()
        );
    }

    // Server mode: fetch whatever page the grid asked for last
    let pending = requested
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    if let (Some(request), Some((client, resource))) = (pending, &client) {
        debug!("fetching requested page {:?}", request);
        let page = client.page(resource, request).await?;
        grid.set_page_rows(page.rows, page.total);
    }

    if args.save && grid.save(store).await {
        eprintln!("préférences enregistrées pour '{}'", grid.memorize_key().unwrap_or_default());
    }
    Ok(grid)
}

fn api_client(store: &PreferenceStore) -> Result<GestionClient, CliError> {
    let config = GestionConfig::from_env()?;
    Ok(GestionClient::from_config(
        &config,
        StoredTokenProvider::new(store.clone()),
    )?)
}

async fn stored_page_size(store: &PreferenceStore, grid: Option<&str>) -> usize {
    let Some(grid) = grid else {
        return DEFAULT_PAGE_SIZE;
    };
    match store.load(grid).await {
        Ok(Some(snapshot)) => snapshot.page_size,
        _ => DEFAULT_PAGE_SIZE,
    }
}

/// One column per attribute seen in the rows, id first, the rest sorted.
///
/// Columns whose values are all numbers are right-aligned.
pub fn infer_columns(rows: &[Row]) -> Vec<Column> {
    let keys: BTreeSet<&str> = rows
        .iter()
        .flat_map(|r| r.fields().keys().map(String::as_str))
        .collect();

    let mut ordered: Vec<&str> = Vec::with_capacity(keys.len());
    if keys.contains(DEFAULT_ID_KEY) {
        ordered.push(DEFAULT_ID_KEY);
    }
    ordered.extend(keys.iter().copied().filter(|k| *k != DEFAULT_ID_KEY));

    ordered
        .into_iter()
        .map(|key| {
            let numeric = rows
                .iter()
                .all(|r| r.get(key).is_none_or(|v| v.is_null() || v.is_number()));
            let column = Column::new(key, key);
            if numeric { column.align(Alignment::Right) } else { column }
        })
        .collect()
}

// =============================================================================
// Preferences
// =============================================================================

async fn prefs(cmd: PrefsCommand, store: &PreferenceStore) -> Result<(), CliError> {
    match cmd {
        PrefsCommand::List => {
            for grid in store.saved_grids().await? {
                let saved_at = grid.saved_at.with_timezone(&chrono::Local);
                println!("{}\t{}", grid.id, saved_at.format("%Y-%m-%d %H:%M"));
            }
        }
        PrefsCommand::Show { grid } => match store.load(&grid).await? {
            Some(snapshot) => {
                let text = serde_json::to_string_pretty(&snapshot)
                    .map_err(|e| CliError::Usage(e.to_string()))?;
                println!("{}", text);
            }
            None => return Err(CliError::Usage(format!("no preferences stored for '{}'", grid))),
        },
        PrefsCommand::Reset { grid } => {
            if store.reset(&grid).await? {
                eprintln!("préférences de '{}' supprimées", grid);
            } else {
                eprintln!("aucune préférence enregistrée pour '{}'", grid);
            }
        }
        PrefsCommand::SetToken { token } => {
            StoredTokenProvider::new(store.clone())
                .save_token(&token)
                .await?;
            eprintln!("jeton enregistré");
        }
    }
    Ok(())
}

// =============================================================================
// Notifications
// =============================================================================

async fn listen(args: ListenArgs) -> Result<(), CliError> {
    let url = match args.url {
        Some(url) => url,
        None => GestionConfig::from_env()?.require_ws_url()?.to_string(),
    };

    let policy = ReconnectPolicy::default().max_attempts(args.max_attempts);
    let client = NotificationClient::new(url, policy);
    let mut events = client.subscribe();
    let mut state = client.watch_state();

    for message in args.send {
        client.send(message);
    }
    client.connect();
    eprintln!("écoute de {} (Ctrl+C pour quitter)", client.url());

    let result = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break Ok(()),
            event = events.recv() => match event {
                Ok(notification) => println!("{}", notification.summary()),
                Err(RecvError::Lagged(n)) => warn!("skipped {} notifications", n),
                Err(RecvError::Closed) => break Ok(()),
            },
            changed = state.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let current = *state.borrow_and_update();
                match current {
                    ConnectionState::Open => eprintln!("connecté"),
                    ConnectionState::Reconnecting { attempt } => {
                        eprintln!("connexion perdue, tentative {}", attempt);
                    }
                    ConnectionState::Failed => break Err(CliError::NotifyFailed(args.max_attempts)),
                    _ => {}
                }
            }
        }
    };

    client.disconnect().await;
    result
}
