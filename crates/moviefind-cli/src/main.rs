//! moviefind - terminal movie browser with debounced TMDB search.

/// Application configuration (TOML).
mod config;
/// Search popularity backend selection.
mod metrics;

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{AppConfig, resolve_config_path};
use crate::metrics::MetricsBackend;
use moviefind_api::appwrite::{MetricsApi, TrendingMovie};
use moviefind_api::tmdb::{DiscoverMovieParams, SearchMovieParams, TmdbApi, TmdbClient, TmdbMovie};
use moviefind_db::resolve_data_dir;
use moviefind_tui::card::MovieCard;
use moviefind_tui::{SearchSettings, run_browser};

/// User-Agent sent to every HTTP API.
pub(crate) const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Log file written while the TUI owns the terminal.
const LOG_FILE_NAME: &str = "moviefind.log";

/// CLI argument parser.
#[derive(Parser)]
#[command(name = "moviefind", about, version)]
struct Cli {
    /// Override config/data directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run (default: browse).
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Browse and search movies in the terminal UI.
    Browse,
    /// Query TMDB API.
    Tmdb(TmdbCommand),
    /// Show the most searched terms.
    Trending(TrendingArgs),
    /// Print shell completions.
    Completions(CompletionsArgs),
}

/// Arguments for the `tmdb` subcommand.
#[derive(clap::Args)]
struct TmdbCommand {
    /// TMDB subcommand to run.
    #[command(subcommand)]
    command: TmdbSubcommands,
}

/// Available TMDB subcommands.
#[derive(Subcommand)]
enum TmdbSubcommands {
    /// Search for movies by title.
    Search(TmdbSearchArgs),
    /// List popular movies.
    Discover(TmdbDiscoverArgs),
}

/// Arguments for the `tmdb search` subcommand.
#[derive(clap::Args)]
struct TmdbSearchArgs {
    /// Search query (e.g. "dune").
    #[arg(long, required = true)]
    query: String,
    /// Response language (default: `tmdb.language` from config).
    #[arg(long)]
    language: Option<String>,
}

/// Arguments for the `tmdb discover` subcommand.
#[derive(clap::Args)]
struct TmdbDiscoverArgs {
    /// Response language (default: `tmdb.language` from config).
    #[arg(long)]
    language: Option<String>,
}

/// Arguments for the `trending` subcommand.
#[derive(clap::Args)]
struct TrendingArgs {
    /// Number of entries (default: `trending.limit` from config).
    #[arg(long)]
    limit: Option<u32>,
}

/// Arguments for the `completions` subcommand.
#[derive(clap::Args)]
struct CompletionsArgs {
    /// Target shell.
    shell: Shell,
}

/// Loads `config.toml` from `dir` or the default location.
fn load_config(dir: Option<&Path>) -> Result<AppConfig> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    AppConfig::load(&config_path).context("failed to load config")
}

/// Builds a `TmdbClient` from the `TMDB_API_TOKEN` environment variable.
///
/// # Errors
///
/// Returns an error if `TMDB_API_TOKEN` is not set or the client fails to build.
#[instrument(skip_all)]
fn build_tmdb_client() -> Result<TmdbClient> {
    let api_token = std::env::var("TMDB_API_TOKEN")
        .context("TMDB_API_TOKEN environment variable is required")?;

    TmdbClient::builder()
        .api_token(api_token)
        .user_agent(USER_AGENT)
        .build()
        .context("failed to build TMDB client")
}

/// Builds the configured popularity backend.
fn build_metrics_backend(config: &AppConfig, dir: Option<&Path>) -> Result<MetricsBackend> {
    let api_key = std::env::var("APPWRITE_API_KEY").ok();
    MetricsBackend::from_config(config, dir, api_key).context("failed to set up metrics backend")
}

/// Runs the `browse` subcommand.
///
/// # Errors
///
/// Returns an error if a client cannot be built or the TUI fails.
#[instrument(skip_all)]
async fn run_browse(dir: Option<&Path>) -> Result<()> {
    let config = load_config(dir)?;
    let tmdb = build_tmdb_client()?;
    let metrics = build_metrics_backend(&config, dir)?;

    let settings = SearchSettings {
        debounce: config.debounce(),
        trending_limit: config.trending.limit,
        language: config.tmdb.language.clone(),
        include_adult: config.tmdb.include_adult,
    };
    tracing::info!(
        "Launching browser (metrics: {}, debounce: {}ms)",
        metrics.name(),
        settings.debounce.as_millis()
    );

    run_browser(Arc::new(tmdb), Arc::new(metrics), settings)
        .await
        .context("movie browser TUI failed")
}

/// Runs the `tmdb search` subcommand.
///
/// # Errors
///
/// Returns an error if the TMDB client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_tmdb_search(args: &TmdbSearchArgs, dir: Option<&Path>) -> Result<()> {
    let config = load_config(dir)?;
    let client = build_tmdb_client()?;

    let params = SearchMovieParams::new(args.query.as_str())
        .language(args.language.as_deref().unwrap_or(&config.tmdb.language))
        .include_adult(config.tmdb.include_adult);
    let response = client
        .search_movie(&params)
        .await
        .context("TMDB movie search failed")?;

    log_movies(&response.results);
    Ok(())
}

/// Runs the `tmdb discover` subcommand.
///
/// # Errors
///
/// Returns an error if the TMDB client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_tmdb_discover(args: &TmdbDiscoverArgs, dir: Option<&Path>) -> Result<()> {
    let config = load_config(dir)?;
    let client = build_tmdb_client()?;

    let params = DiscoverMovieParams::default()
        .language(args.language.as_deref().unwrap_or(&config.tmdb.language))
        .include_adult(config.tmdb.include_adult);
    let response = client
        .discover_movie(&params)
        .await
        .context("TMDB discover request failed")?;

    log_movies(&response.results);
    Ok(())
}

/// Runs the `trending` subcommand.
///
/// # Errors
///
/// Returns an error if the backend cannot be built or the request fails.
#[instrument(skip_all)]
async fn run_trending(args: &TrendingArgs, dir: Option<&Path>) -> Result<()> {
    let config = load_config(dir)?;
    let backend = build_metrics_backend(&config, dir)?;
    let limit = args.limit.unwrap_or(config.trending.limit);

    let trending = backend
        .trending_movies(limit)
        .await
        .context("failed to fetch trending searches")?;

    log_trending(&trending);
    Ok(())
}

/// Writes shell completions to stdout.
///
/// # Errors
///
/// Returns an error if stdout cannot be flushed.
fn run_completions(args: &CompletionsArgs) -> Result<()> {
    let mut stdout = io::stdout();
    clap_complete::generate(args.shell, &mut Cli::command(), "moviefind", &mut stdout);
    io::Write::flush(&mut stdout).context("failed to write completions")
}

/// Logs a movie table.
fn log_movies(movies: &[TmdbMovie]) {
    tracing::info!("ID\tRating\tLang\tYear\tTitle");
    for movie in movies {
        let card = MovieCard::from_movie(movie);
        tracing::info!(
            "{}\t{}\t{}\t{}\t{}",
            movie.id,
            card.rating,
            card.language,
            card.year,
            card.title
        );
    }
    tracing::info!("Total: {} movies", movies.len());
}

/// Logs the ranked trending table.
fn log_trending(trending: &[TrendingMovie]) {
    if trending.is_empty() {
        tracing::info!("No searches recorded yet.");
        return;
    }

    tracing::info!("Rank\tCount\tTerm\t\tTitle");
    for (rank, entry) in (1_usize..).zip(trending) {
        tracing::info!(
            "{rank}\t{}\t{}\t\t{}",
            entry.count,
            entry.search_term,
            entry.title
        );
    }
}

/// Opens `{data_dir}/moviefind.log` for appending.
fn open_log_file(dir: Option<&Path>) -> Result<File> {
    let data_dir = resolve_data_dir(dir).context("failed to resolve data directory")?;
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create directory {}", data_dir.display()))?;

    let path = data_dir.join(LOG_FILE_NAME);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

/// Installs the global subscriber, writing to `log_file` or stdout.
fn init_tracing(log_file: Option<File>) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (writer, ansi) = match log_file {
        Some(file) => (BoxMakeWriter::new(Arc::new(file)), false),
        None => (BoxMakeWriter::new(io::stdout), true),
    };

    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_ansi(ansi)
            .with_writer(writer)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_ansi(ansi)
            .with_writer(writer);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let dir = cli.dir.as_deref();
    let command = cli.command.unwrap_or(Commands::Browse);

    let log_file = match command {
        Commands::Browse => Some(open_log_file(dir)?),
        _ => None,
    };
    init_tracing(log_file);

    match command {
        Commands::Browse => run_browse(dir).await,
        Commands::Tmdb(tmdb) => match tmdb.command {
            TmdbSubcommands::Search(args) => run_tmdb_search(&args, dir).await,
            TmdbSubcommands::Discover(args) => run_tmdb_discover(&args, dir).await,
        },
        Commands::Trending(args) => run_trending(&args, dir).await,
        Commands::Completions(args) => run_completions(&args),
    }
}
