use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use songify_server::catalog_store::{CatalogStore, SqliteCatalogStore};
use songify_server::config;
use songify_server::database;
use songify_server::server::{run_server, RequestsLoggingLevel, ServerConfig};
use songify_server::user::{SqliteUserStore, UserManager};

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path '{}': {}", s, msg));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(original_path))
}

fn parse_dir(s: &str) -> Result<PathBuf, String> {
    let path = parse_path(s)?;
    if !path.exists() {
        return Err(format!("Directory does not exist: {}", s));
    }
    if !path.is_dir() {
        return Err(format!("Path is not a directory: {}", s));
    }
    Ok(path)
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory holding songify.db, created on first start.
    /// Can also be specified in config file.
    #[clap(long, value_parser = parse_dir)]
    pub db_dir: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Users whose handle ends with this suffix are made admins at startup.
    #[clap(long)]
    pub admin_handle_suffix: Option<String>,
}

impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            db_dir: args.db_dir.clone(),
            port: args.port,
            logging_level: args.logging_level.clone(),
            admin_handle_suffix: args.admin_handle_suffix.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  db_dir: {:?}", app_config.db_dir);
    info!("  port: {}", app_config.port);
    info!("  logging_level: {}", app_config.logging_level);

    if !app_config.db_path().exists() {
        info!("Creating new database at {:?}", app_config.db_path());
    }
    let conn = database::open(app_config.db_path())?;

    let catalog_store: Arc<dyn CatalogStore> = Arc::new(SqliteCatalogStore::new(conn.clone()));
    info!(
        "Catalog has {} albums, {} bands and {} songs",
        catalog_store.get_albums_count()?,
        catalog_store.get_bands_count()?,
        catalog_store.get_songs_count()?
    );

    let user_store = Arc::new(SqliteUserStore::new(conn));
    let user_manager = UserManager::new(catalog_store.clone(), user_store);

    if let Some(suffix) = &app_config.admin_handle_suffix {
        let promoted = user_manager.promote_admins_with_suffix(suffix)?;
        info!("{} user(s) with suffix {} promoted to admin", promoted, suffix);
    }

    let server_config = ServerConfig {
        requests_logging_level: app_config.logging_level,
        port: app_config.port,
    };

    info!("Ready to serve at port {}!", server_config.port);
    run_server(catalog_store, user_manager, server_config).await
}
