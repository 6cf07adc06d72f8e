use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use matchfeed::config::Config;
use matchfeed::engine::{MatchRecordNormalizer, NormalizedMatch};
use matchfeed::feed::catalog::{Language, SportsCatalog};
use matchfeed::feed::exchange::{ExchangeFeed, ExchangeMode, ExchangeQuery};
use matchfeed::feed::line_feed::{LineFeed, LineQuery, SportInfoClient};
use matchfeed::feed::{FeedPage, MatchFeed};
use matchfeed::server::{self, ApiState};
use matchfeed::sink::{self, LiveSnapshot};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "matchfeed", version, about = "Sports betting feed poller and normalizer")]
struct Cli {
    #[arg(long, env = "MATCHFEED_CONFIG", default_value = "config.toml", global = true)]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Operator-curated top games across all sports
    TopGames {
        #[arg(long, default_value = "top_games_formatted.json")]
        output: PathBuf,
    },
    /// Pre-match 1x2 board for one sport; output named after the sport
    Sport {
        #[arg(long)]
        id: u32,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Poll in-play games until Ctrl-C
    Live {
        #[arg(long)]
        sports: Option<u32>,
    },
    /// Exchange line list: `live` polls until Ctrl-C, `sportsbook` fetches once
    Exchange {
        #[arg(value_enum)]
        mode: ExchangeMode,
        #[arg(long)]
        sport: Option<u32>,
    },
    /// Rebuild the sports catalog file from SportInfo in every language
    Catalog,
    /// Serve normalized exchange matches over HTTP
    Serve {
        #[arg(long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.config)?;
    init_tracing(&config)?;

    match cli.command {
        Command::TopGames { output } => run_top_games(&config, &output).await,
        Command::Sport { id, output } => run_sport(&config, id, output).await,
        Command::Live { sports } => run_live(&config, sports).await,
        Command::Exchange { mode, sport } => run_exchange(&config, mode, sport).await,
        Command::Catalog => run_catalog(&config).await,
        Command::Serve { bind } => run_serve(&config, bind).await,
    }
}

fn init_tracing(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match &config.logging.log_file {
        Some(path) => {
            let log_file = std::fs::File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            builder.with_writer(log_file).with_ansi(false).init();
        }
        None => builder.init(),
    }
    Ok(())
}

fn normalize_page(normalizer: &MatchRecordNormalizer, page: &FeedPage) -> Vec<NormalizedMatch> {
    let outcome = normalizer.normalize_batch(&page.records);
    tracing::info!(
        matches = outcome.matches.len(),
        skipped = page.skipped + outcome.skipped,
        "normalized feed page"
    );
    outcome.matches
}

async fn run_top_games(config: &Config, output: &Path) -> Result<()> {
    let normalizer = config.build_normalizer()?;
    let feed = LineFeed::new(&config.line_feed)?;
    let page = feed.fetch_matches(&LineQuery::TopGames).await?;
    let matches = normalize_page(&normalizer, &page);
    sink::write_json(output, &matches)
}

async fn run_sport(config: &Config, sport_id: u32, output: Option<PathBuf>) -> Result<()> {
    let normalizer = config.build_normalizer()?;
    let sport_name = normalizer
        .catalog()
        .display_name(sport_id, Language::English)
        .map(str::to_string)
        .with_context(|| {
            format!(
                "sport id {} not in {}; run `matchfeed catalog` first",
                sport_id,
                config.catalog.sports_file.display()
            )
        })?;
    let output = output.unwrap_or_else(|| PathBuf::from(sink::sport_file_name(&sport_name)));
    tracing::info!(sport = %sport_name, output = %output.display(), "fetching sport board");

    let feed = LineFeed::new(&config.line_feed)?;
    let page = feed.fetch_matches(&LineQuery::Sport(sport_id)).await?;
    let matches = normalize_page(&normalizer, &page);
    sink::write_json(&output, &matches)
}

async fn run_live(config: &Config, sports: Option<u32>) -> Result<()> {
    let normalizer = config.build_normalizer()?;
    let tz = config.normalizer.tz()?;
    let feed = LineFeed::new(&config.line_feed)?;
    let query = LineQuery::Live(sports);
    let interval = Duration::from_secs(config.live.poll_interval_s);
    tracing::info!(sports = ?sports, interval_s = config.live.poll_interval_s, "starting live updater");

    loop {
        match feed.fetch_matches(&query).await {
            Ok(page) => {
                if page.records.is_empty() {
                    tracing::warn!("no live games found");
                }
                let matches = normalize_page(&normalizer, &page);
                let snapshot = LiveSnapshot::new(chrono::Utc::now(), tz, matches);
                if let Err(e) = sink::write_json(&config.live.output_file, &snapshot) {
                    tracing::error!(error = %format!("{:#}", e), "failed to write live snapshot");
                }
            }
            Err(e) => tracing::error!(error = %format!("{:#}", e), "live fetch failed"),
        }

        if wait_or_shutdown(interval).await {
            tracing::info!("stopped by user");
            return Ok(());
        }
    }
}

async fn run_exchange(config: &Config, mode: ExchangeMode, sport: Option<u32>) -> Result<()> {
    let normalizer = config.build_normalizer()?;
    let feed = ExchangeFeed::new(&config.exchange_feed)?;
    let query = ExchangeQuery {
        mode,
        sport_id: sport,
        limit: config.exchange_feed.limit,
    };

    match mode {
        ExchangeMode::Sportsbook => {
            let page = feed.fetch_matches(&query).await?;
            let matches = normalize_page(&normalizer, &page);
            if matches.is_empty() {
                tracing::warn!("no sportsbook matches, nothing written");
                return Ok(());
            }
            sink::write_json(Path::new("sportsbook_matches.json"), &matches)
        }
        ExchangeMode::Live => {
            let interval = Duration::from_secs(config.exchange_feed.live_poll_interval_s);
            loop {
                match feed.fetch_matches(&query).await {
                    Ok(page) => {
                        let matches = normalize_page(&normalizer, &page);
                        if !matches.is_empty() {
                            if let Err(e) = sink::write_json(Path::new("live_matches.json"), &matches) {
                                tracing::error!(error = %format!("{:#}", e), "failed to write live matches");
                            }
                        }
                    }
                    Err(e) => tracing::error!(error = %format!("{:#}", e), "exchange fetch failed"),
                }

                if wait_or_shutdown(interval).await {
                    tracing::info!("stopped by user");
                    return Ok(());
                }
            }
        }
    }
}

async fn run_catalog(config: &Config) -> Result<()> {
    let client = SportInfoClient::new(&config.catalog, &config.line_feed)?;
    let mut catalog = SportsCatalog::default();
    for (lang, items) in client.fetch_all().await? {
        catalog.merge_language(lang, items);
    }
    tracing::info!(sports = catalog.len(), "sports catalog rebuilt");
    let entries: Vec<_> = catalog.entries().collect();
    sink::write_json(&config.catalog.sports_file, &entries)
}

async fn run_serve(config: &Config, bind: Option<String>) -> Result<()> {
    let state = Arc::new(ApiState {
        feed: ExchangeFeed::new(&config.exchange_feed)?,
        normalizer: config.build_normalizer()?,
        limit: config.server.limit,
    });
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());
    server::serve(&bind, state).await
}

/// Sleep for `interval`; returns true if Ctrl-C arrived first.
async fn wait_or_shutdown(interval: Duration) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(interval) => false,
        _ = tokio::signal::ctrl_c() => true,
    }
}
