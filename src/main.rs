use anyhow::{Context, Result as AnyhowResult};
use clap::Parser;
use docshelf::config::{self, Config};
use docshelf::model::{normalize_items, Item, ItemId, RawPage};
use docshelf::services::auth::AuthContext;
use docshelf::services::folders::{FolderFetcher, FolderQuery};
use docshelf::services::metadata::{HttpBackend, InMemoryBackend, MetadataBackend, MetadataManager};
use docshelf::services::tracing_setup;
use docshelf::view::folder_tree::FolderTreeView;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Browse document folders from a listing endpoint or a JSON fixture
#[derive(Parser, Debug)]
#[command(name = "docshelf")]
#[command(about = "Folder tree and windowed listing for document collections", long_about = None)]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Serve listings from a JSON file (an array of records or a listing page)
    #[arg(long, value_name = "PATH", conflicts_with = "url")]
    fixture: Option<PathBuf>,

    /// Base URL of the listing endpoint (overrides the configuration)
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Folder to start from
    #[arg(long, value_name = "ID")]
    root: Option<String>,

    /// Also load subfolders of subfolders
    #[arg(long)]
    recursive: bool,

    /// Maximum number of folders to load
    #[arg(long, value_name = "N")]
    limit: Option<usize>,

    /// Scroll offset of the rendered window, in pixels
    #[arg(long, value_name = "PX", default_value_t = 0.0)]
    scroll: f64,

    /// Expand every folder before rendering
    #[arg(long)]
    expand_all: bool,

    /// Path to log file (default: system temp dir)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,
}

/// Accepted fixture shapes
#[derive(Deserialize)]
#[serde(untagged)]
enum Fixture {
    Items(Vec<serde_json::Value>),
    Page(RawPage),
}

fn load_config(args: &Args) -> AnyhowResult<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(root) = &args.root {
        config.folders.root_id = Some(root.clone());
    }
    if args.recursive {
        config.folders.recursive = true;
    }
    if let Some(limit) = args.limit {
        config.folders.page_limit = limit;
    }
    if let Some(url) = &args.url {
        config.backend.base_url = Some(url.clone());
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn load_fixture(path: &Path) -> AnyhowResult<Vec<Item>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read fixture {}", path.display()))?;
    let fixture: Fixture = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse fixture {}", path.display()))?;

    Ok(match fixture {
        Fixture::Items(raw) => normalize_items(raw),
        Fixture::Page(page) => page.into_parts().0,
    })
}

fn create_backend(
    args: &Args,
    config: &config::BackendConfig,
) -> AnyhowResult<Arc<dyn MetadataBackend>> {
    if let Some(path) = &args.fixture {
        let items = load_fixture(path)?;
        tracing::info!("Loaded {} records from {}", items.len(), path.display());
        return Ok(Arc::new(InMemoryBackend::new(items)));
    }

    match &config.base_url {
        Some(url) => Ok(Arc::new(HttpBackend::new(
            url.clone(),
            Duration::from_millis(config.timeout_ms),
            AuthContext::from_env(config.token_env.clone()),
        ))),
        None => anyhow::bail!("No data source: pass --fixture or --url, or set backend.base_url"),
    }
}

fn main() -> AnyhowResult<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    if args.dump_config {
        let json =
            serde_json::to_string_pretty(&config).context("Failed to serialize config")?;
        println!("{}", json);
        return Ok(());
    }

    let log_file = args
        .log_file
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("docshelf.log"));
    if !tracing_setup::init_global(&log_file) {
        eprintln!("Warning: logging disabled ({} not writable)", log_file.display());
    }

    let backend = create_backend(&args, &config.backend)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(run(&args, &config, backend))
}

async fn run(args: &Args, config: &Config, backend: Arc<dyn MetadataBackend>) -> AnyhowResult<()> {
    let mut fetcher = FolderFetcher::new(
        MetadataManager::new(backend),
        FolderQuery::from_config(&config.folders),
    );

    let snapshot = fetcher.fetch_now().await;
    if let Some(error) = &snapshot.error {
        anyhow::bail!("Failed to load folders: {}", error);
    }

    let mut view = FolderTreeView::new(fetcher.tree(), &config.list);
    if args.expand_all {
        view.expand_all();
    }
    view.list_mut().scroll_to(args.scroll);

    let root = config
        .folders
        .root_id
        .clone()
        .map(ItemId)
        .map_or_else(|| "top level".to_string(), |id| format!("folder {id}"));
    println!(
        "{} folders below {} ({} visible rows)",
        snapshot.items.len(),
        root,
        view.visible_count()
    );

    let rendered = view.render(|row, selected| {
        let marker = match (row.has_children(), row.expanded) {
            (true, true) => "v ",
            (true, false) => "> ",
            (false, _) => "  ",
        };
        format!(
            "{}{}{}{}",
            if selected { "*" } else { " " },
            "  ".repeat(row.depth),
            marker,
            row.node.item.name
        )
    });

    for row in &rendered.rows {
        println!("{:>8.0}  {}", row.offset_top, row.content);
    }
    println!(
        "rows {:?} of {}, content height {:.0}px",
        view.list().visible_range().indices(),
        view.list().len(),
        rendered.total_height
    );

    Ok(())
}
