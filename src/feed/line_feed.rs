//! Operator A's LineFeed / LiveFeed endpoints.
//!
//! All three endpoints answer with the same `{"Value": [game, ...]}` envelope.

use super::catalog::Language;
use super::types::{LineEnvelope, LineGame, RawMatch, SportInfoItem};
use super::{decode_record, FeedPage, MatchFeed};
use crate::config::{CatalogConfig, LineFeedConfig};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineQuery {
    /// Operator-curated top games across all sports.
    TopGames,
    /// Pre-match 1x2 board for one sport id.
    Sport(u32),
    /// In-play games, optionally filtered to one sport id.
    Live(Option<u32>),
}

pub struct LineFeed {
    client: Client,
    config: LineFeedConfig,
}

impl LineFeed {
    pub fn new(config: &LineFeedConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .user_agent(config.user_agent.as_str())
            .build()
            .context("failed to build line feed HTTP client")?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn request(&self, query: &LineQuery) -> (String, Vec<(&'static str, String)>) {
        let c = &self.config;
        match *query {
            LineQuery::TopGames => (
                format!("{}/LineFeed/GetTopGamesStatZip", c.base_url),
                vec![
                    ("lng", c.lng.clone()),
                    ("gr", c.gr.to_string()),
                    ("limit", c.top_games_limit.to_string()),
                ],
            ),
            LineQuery::Sport(sport_id) => (
                format!("{}/LineFeed/Get1x2_VZip", c.base_url),
                vec![
                    ("sports", sport_id.to_string()),
                    ("count", c.count.to_string()),
                    ("lng", c.lng.clone()),
                    ("tz", c.tz.to_string()),
                    ("mode", c.mode.to_string()),
                    ("country", c.country.to_string()),
                    ("getEmpty", "true".to_string()),
                    ("gr", c.gr.to_string()),
                ],
            ),
            LineQuery::Live(sport_id) => {
                let mut params = vec![
                    ("count", c.count.to_string()),
                    ("lng", c.lng.clone()),
                    ("mode", c.mode.to_string()),
                    ("country", c.country.to_string()),
                ];
                if let Some(id) = sport_id {
                    params.push(("sports", id.to_string()));
                }
                (format!("{}/LiveFeed/BestGamesExtVZip", c.base_url), params)
            }
        }
    }
}

#[async_trait]
impl MatchFeed for LineFeed {
    type Query = LineQuery;

    async fn fetch_matches(&self, query: &LineQuery) -> Result<FeedPage> {
        let (url, params) = self.request(query);
        let resp = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .context("line feed request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("line feed error ({}): {}", status, body);
        }

        let body = resp.text().await.context("failed to read line feed body")?;
        parse_line_response(&body)
    }
}

/// Decode a `{"Value": [...]}` body. Entries that fail to decode are
/// counted and skipped; only an undecodable envelope is an error.
pub fn parse_line_response(json: &str) -> Result<FeedPage> {
    let envelope: LineEnvelope =
        serde_json::from_str(json).context("failed to parse line feed response")?;

    let mut page = FeedPage::default();
    for value in envelope.value {
        match decode_record::<LineGame>(value) {
            Ok(game) => page.records.push(RawMatch::from(game)),
            Err(e) => {
                tracing::warn!(error = %e, "skipping line feed entry");
                page.skipped += 1;
            }
        }
    }
    Ok(page)
}

/// SportInfo endpoint: every sport the operator lists, named in one language.
pub struct SportInfoClient {
    client: Client,
    base_url: String,
    request_delay: Duration,
}

impl SportInfoClient {
    pub fn new(catalog: &CatalogConfig, line: &LineFeedConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(line.request_timeout_ms))
            .user_agent(line.user_agent.as_str())
            .build()
            .context("failed to build SportInfo HTTP client")?;
        Ok(Self {
            client,
            base_url: catalog.base_url.clone(),
            request_delay: Duration::from_millis(catalog.request_delay_ms),
        })
    }

    pub async fn fetch(&self, lang: Language) -> Result<Vec<SportInfoItem>> {
        let url = format!("{}/RestCore/api/external/v1/Web/SportInfo", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[("ref", "1"), ("gr", "70"), ("fcountry", "19"), ("lng", lang.code())])
            .send()
            .await
            .with_context(|| format!("SportInfo request failed for {}", lang.code()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("SportInfo error ({}) for {}: {}", status, lang.code(), body);
        }

        let body = resp.text().await.context("failed to read SportInfo body")?;
        parse_sport_info(&body)
    }

    /// Fetch every language in turn, pausing between requests.
    pub async fn fetch_all(&self) -> Result<Vec<(Language, Vec<SportInfoItem>)>> {
        let mut pages = Vec::with_capacity(Language::ALL.len());
        for (i, lang) in Language::ALL.into_iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.request_delay).await;
            }
            tracing::info!(lang = lang.code(), "fetching sport names");
            pages.push((lang, self.fetch(lang).await?));
        }
        Ok(pages)
    }
}

pub fn parse_sport_info(json: &str) -> Result<Vec<SportInfoItem>> {
    serde_json::from_str(json).context("failed to parse SportInfo response")
}
