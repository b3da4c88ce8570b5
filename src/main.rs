use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use movie_catalog::config::{
    AppConfig, CliConfig, FileConfig, DEFAULT_DB_PATH, DEFAULT_READ_POOL_SIZE, DEFAULT_TIMEOUT_SEC,
};
use movie_catalog::remote::DEFAULT_OMDB_URL;
use movie_catalog::{
    CatalogError, CatalogService, Movie, OmdbClient, SqliteCatalogStore, ValueCapture,
};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const NO_MOVIES_FOUND: &str = "No movies found.";

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(
    name = "movie-catalog",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")"),
    about = "Personal movie catalog backed by SQLite, with OMDb lookups"
)]
struct CliArgs {
    /// Path to a TOML config file. Values in the file override CLI arguments.
    #[clap(long, global = true, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite catalog database file.
    #[clap(long, global = true, default_value = DEFAULT_DB_PATH)]
    pub db_path: PathBuf,

    /// OMDb API key, required by the remote commands.
    #[clap(long, global = true, env = "OMDB_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of the OMDb API.
    #[clap(long, global = true, default_value = DEFAULT_OMDB_URL)]
    pub omdb_url: String,

    /// Timeout in seconds for OMDb requests.
    #[clap(long, global = true, default_value_t = DEFAULT_TIMEOUT_SEC)]
    pub timeout_sec: u64,

    /// How much of each `Key: value` line an import keeps as the value.
    #[clap(long, global = true, value_enum, default_value_t = ValueCapture::FirstToken)]
    pub value_capture: ValueCapture,

    /// Number of read-only connections for concurrent reads.
    #[clap(long, global = true, default_value_t = DEFAULT_READ_POOL_SIZE)]
    pub read_pool_size: usize,

    /// Print results as JSON instead of text.
    #[clap(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Imports the movie blocks of a text file, skipping movies already stored.
    Import { file: PathBuf },

    /// Lists every movie in the local catalog.
    List,

    /// Searches the local catalog by a title fragment (case-insensitive).
    SearchTitle { fragment: String },

    /// Searches the local catalog by an actor name fragment (case-insensitive).
    SearchActor { fragment: String },

    /// Looks up a movie on OMDb by its exact title.
    Lookup {
        title: String,

        /// Also save the movie to the local catalog.
        #[clap(long)]
        save: bool,
    },

    /// Searches OMDb by free text.
    SearchRemote { query: String },
}

impl CliArgs {
    fn cli_config(&self) -> CliConfig {
        CliConfig {
            db_path: self.db_path.clone(),
            api_key: self.api_key.clone(),
            omdb_url: self.omdb_url.clone(),
            timeout_sec: self.timeout_sec,
            value_capture: self.value_capture,
            read_pool_size: self.read_pool_size,
        }
    }
}

fn print_movies(movies: &[Movie], as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(movies)?);
    } else if movies.is_empty() {
        println!("{}", NO_MOVIES_FOUND);
    } else {
        for movie in movies {
            println!("{}", movie);
        }
    }
    Ok(())
}

async fn run(cli_args: CliArgs) -> Result<()> {
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.cli_config(), file_config)?;
    debug!("Resolved config: db_path={:?}", config.db_path);

    let store = Arc::new(SqliteCatalogStore::new(
        &config.db_path,
        config.read_pool_size,
    )?);
    let fetcher = Arc::new(OmdbClient::new(
        &config.omdb_url,
        config.api_key.as_deref().unwrap_or_default(),
        config.timeout(),
    )?);
    let service = CatalogService::new(store, fetcher, config.value_capture);
    let as_json = cli_args.json;

    match cli_args.command {
        Command::Import { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read import file: {:?}", file))?;
            let summary = service.import_from_text(&text)?;
            if as_json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{}", summary.message());
                println!("{} added, {} skipped", summary.added, summary.skipped);
            }
        }
        Command::List => print_movies(&service.list_local()?, as_json)?,
        Command::SearchTitle { fragment } => {
            print_movies(&service.search_local_by_title(&fragment)?, as_json)?
        }
        Command::SearchActor { fragment } => {
            print_movies(&service.search_local_by_actor(&fragment)?, as_json)?
        }
        Command::Lookup { title, save } => {
            config.require_api_key()?;
            let movie = service.lookup_remote_exact(&title).await?;
            let outcome = if save {
                Some(service.save_from_remote(&movie)?)
            } else {
                None
            };

            if as_json {
                let output = json!({
                    "movie": movie,
                    "saved": outcome.map(|o| o.added),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("{}", movie.details());
                if let Some(outcome) = outcome {
                    println!();
                    println!("{}", outcome.message());
                }
            }
        }
        Command::SearchRemote { query } => {
            config.require_api_key()?;
            let results = service.lookup_remote_search(&query).await?;
            if as_json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else if let Some(detail) = &results.error_detail {
                println!("{}", detail);
            } else {
                print_movies(&results.movies, false)?;
            }
        }
    }

    Ok(())
}

/// Text shown to the user for a failed command. Catalog failures show their
/// own detail, remote ones verbatim.
fn describe_error(err: &anyhow::Error) -> String {
    match err.downcast_ref::<CatalogError>() {
        Some(catalog_error) => catalog_error.detail(),
        None => format!("{:#}", err),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli_args = CliArgs::parse();

    // Logs go to stderr so stdout only carries command output
    if let Err(e) = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
    {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(cli_args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            debug!("Command failed: {:?}", err);
            eprintln!("{}", describe_error(&err));
            ExitCode::FAILURE
        }
    }
}
