use crate::engine::misc::{MiscCodeTable, VENUE_CODE};
use crate::engine::MatchRecordNormalizer;
use crate::feed::catalog::{Language, SportsCatalog};
use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub normalizer: NormalizerConfig,
    #[serde(default)]
    pub line_feed: LineFeedConfig,
    #[serde(default)]
    pub exchange_feed: ExchangeFeedConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub live: LiveConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NormalizerConfig {
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub language: Language,
    /// Extra or replacement misc codes, e.g. `"1" = "round"`.
    #[serde(default)]
    pub misc_codes: BTreeMap<String, String>,
    #[serde(default = "default_venue_code")]
    pub venue_code: i64,
}

fn default_timezone() -> String { "America/New_York".to_string() }
fn default_venue_code() -> i64 { VENUE_CODE }

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            language: Language::default(),
            misc_codes: BTreeMap::new(),
            venue_code: VENUE_CODE,
        }
    }
}

impl NormalizerConfig {
    pub fn tz(&self) -> Result<Tz> {
        Tz::from_str(&self.timezone).map_err(|_| {
            anyhow!(
                "Invalid normalizer.timezone: {} (expected IANA tz like America/New_York)",
                self.timezone
            )
        })
    }

    pub fn misc_table(&self) -> Result<MiscCodeTable> {
        let overrides = self
            .misc_codes
            .iter()
            .map(|(code, field)| {
                code.trim()
                    .parse::<i64>()
                    .map(|c| (c, field.clone()))
                    .with_context(|| format!("misc code must be an integer: {:?}", code))
            })
            .collect::<Result<Vec<_>>>()?;
        let mut table = MiscCodeTable::with_overrides(overrides);
        if self.venue_code != VENUE_CODE {
            table = table.with_venue_code(self.venue_code);
        }
        Ok(table)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LineFeedConfig {
    #[serde(default = "default_line_base")]
    pub base_url: String,
    #[serde(default = "default_lng")]
    pub lng: String,
    #[serde(default = "default_gr")]
    pub gr: u32,
    #[serde(default = "default_country")]
    pub country: u32,
    /// Timezone offset (hours) the operator uses for its own rendering.
    #[serde(default = "default_tz_offset")]
    pub tz: i32,
    #[serde(default = "default_mode")]
    pub mode: u32,
    #[serde(default = "default_top_limit")]
    pub top_games_limit: u32,
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout")]
    pub request_timeout_ms: u64,
}

fn default_line_base() -> String { "https://1xbet.com".to_string() }
fn default_lng() -> String { "en".to_string() }
fn default_gr() -> u32 { 70 }
fn default_country() -> u32 { 19 }
fn default_tz_offset() -> i32 { 6 }
fn default_mode() -> u32 { 4 }
fn default_top_limit() -> u32 { 5000 }
fn default_count() -> u32 { 50 }
fn default_user_agent() -> String { BROWSER_UA.to_string() }
fn default_timeout() -> u64 { 10_000 }

impl Default for LineFeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_line_base(),
            lng: default_lng(),
            gr: default_gr(),
            country: default_country(),
            tz: default_tz_offset(),
            mode: default_mode(),
            top_games_limit: default_top_limit(),
            count: default_count(),
            user_agent: default_user_agent(),
            request_timeout_ms: default_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExchangeFeedConfig {
    #[serde(default = "default_exchange_base")]
    pub base_url: String,
    #[serde(default = "default_exchange_limit")]
    pub limit: u32,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout")]
    pub request_timeout_ms: u64,
    /// Seconds between refreshes in `exchange live`.
    #[serde(default = "default_exchange_poll")]
    pub live_poll_interval_s: u64,
}

fn default_exchange_base() -> String { "https://8unx689.com".to_string() }
fn default_exchange_limit() -> u32 { 100 }
fn default_exchange_poll() -> u64 { 10 }

impl Default for ExchangeFeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_exchange_base(),
            limit: default_exchange_limit(),
            user_agent: default_user_agent(),
            request_timeout_ms: default_timeout(),
            live_poll_interval_s: default_exchange_poll(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    #[serde(default = "default_sport_info_base")]
    pub base_url: String,
    #[serde(default = "default_sports_file")]
    pub sports_file: PathBuf,
    /// Pause between per-language SportInfo requests.
    #[serde(default = "default_catalog_delay")]
    pub request_delay_ms: u64,
}

fn default_sport_info_base() -> String { "https://tepowue7.xyz/service-api".to_string() }
fn default_sports_file() -> PathBuf { PathBuf::from("sports_all_languages.json") }
fn default_catalog_delay() -> u64 { 1000 }

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_sport_info_base(),
            sports_file: default_sports_file(),
            request_delay_ms: default_catalog_delay(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LiveConfig {
    #[serde(default = "default_live_poll")]
    pub poll_interval_s: u64,
    #[serde(default = "default_live_file")]
    pub output_file: PathBuf,
}

fn default_live_poll() -> u64 { 15 }
fn default_live_file() -> PathBuf { PathBuf::from("live_sports_database.json") }

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            poll_interval_s: default_live_poll(),
            output_file: default_live_file(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Page size requested from the exchange per API call.
    #[serde(default = "default_server_limit")]
    pub limit: u32,
}

fn default_bind() -> String { "127.0.0.1:8000".to_string() }
fn default_server_limit() -> u32 { 50 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            limit: default_server_limit(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Used when RUST_LOG is unset.
    #[serde(default = "default_filter")]
    pub filter: String,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_filter() -> String { "matchfeed=info".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            log_file: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .with_context(|| "Failed to parse config TOML")?;
        config.normalizer.tz()?;
        Ok(config)
    }

    /// Normalizer with the configured timezone, language, code table and
    /// sports catalog (empty if the catalog file is missing).
    pub fn build_normalizer(&self) -> Result<MatchRecordNormalizer> {
        let catalog = SportsCatalog::load_or_empty(&self.catalog.sports_file)?;
        Ok(MatchRecordNormalizer::new(
            self.normalizer.tz()?,
            self.normalizer.language,
            self.normalizer.misc_table()?,
            catalog,
        ))
    }

    /// Missing file means built-in defaults; a present but broken file is an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}
