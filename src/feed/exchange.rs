//! Operator B's line list, a five-level hierarchy:
//! line type → sport → region → league → line.

use super::types::{
    ExchangeLeague, ExchangeLine, ExchangeLiveStats, ExchangeRegion, ExchangeResponse, ExchangeSport,
    MarketGroup, RawLiveScore, RawMatch, RawOutcome, SelectionTag,
};
use super::{decode_record, FeedPage, MatchFeed};
use crate::config::ExchangeFeedConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, REFERER};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const LIVE_TYPE_TITLE: &str = "LIVE";
const LIVESTREAM_WIDGET: &str = "LiveStreamWidget";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeMode {
    Live,
    Sportsbook,
}

impl ExchangeMode {
    /// `t[]` query value.
    fn line_type(self) -> &'static str {
        match self {
            ExchangeMode::Live => "2",
            ExchangeMode::Sportsbook => "1",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeQuery {
    pub mode: ExchangeMode,
    pub sport_id: Option<u32>,
    pub limit: u32,
}

pub struct ExchangeFeed {
    client: Client,
    base_url: String,
}

impl ExchangeFeed {
    pub fn new(config: &ExchangeFeedConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .user_agent(config.user_agent.as_str())
            .build()
            .context("failed to build exchange HTTP client")?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn params(query: &ExchangeQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("t[]", query.mode.line_type().to_string()),
            ("ss", "all".to_string()),
            ("l", query.limit.to_string()),
            ("ltr", "0".to_string()),
        ];
        if let Some(id) = query.sport_id {
            params.push(("lc[]", id.to_string()));
        }
        params
    }
}

#[async_trait]
impl MatchFeed for ExchangeFeed {
    type Query = ExchangeQuery;

    async fn fetch_matches(&self, query: &ExchangeQuery) -> Result<FeedPage> {
        let url = format!("{}/api/v3/user/line/list", self.base_url);
        let resp = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json, text/plain, */*")
            .header(REFERER, format!("{}/", self.base_url))
            .query(&Self::params(query))
            .send()
            .await
            .context("exchange request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("exchange API error ({}): {}", status, body);
        }

        let body = resp.text().await.context("failed to read exchange body")?;
        parse_exchange_response(&body)
    }
}

/// Flatten the hierarchy into raw records. Lines without a match id are
/// dropped; lines that fail to decode are counted as skipped.
pub fn parse_exchange_response(json: &str) -> Result<FeedPage> {
    let response: ExchangeResponse =
        serde_json::from_str(json).context("failed to parse exchange response")?;

    let mut page = FeedPage::default();
    for group in response.lines_hierarchy {
        let match_type = group.line_type_title;
        for sport in &group.line_category_dto_collection {
            for region in &sport.line_supercategory_dto_collection {
                for league in &region.line_subcategory_dto_collection {
                    let ctx = LineContext { match_type: match_type.as_deref(), sport, region, league };
                    for value in &league.line_dto_collection {
                        match decode_record::<ExchangeLine>(value.clone()) {
                            Ok(line) => {
                                if let Some(raw) = ctx.flatten(line) {
                                    page.records.push(raw);
                                }
                            }
                            Err(e) => {
                                tracing::warn!(league = ?league.title, error = %e, "skipping exchange line");
                                page.skipped += 1;
                            }
                        }
                    }
                }
            }
        }
    }
    Ok(page)
}

/// Titles inherited from the enclosing levels of the hierarchy.
struct LineContext<'a> {
    match_type: Option<&'a str>,
    sport: &'a ExchangeSport,
    region: &'a ExchangeRegion,
    league: &'a ExchangeLeague,
}

impl LineContext<'_> {
    fn flatten(&self, line: ExchangeLine) -> Option<RawMatch> {
        let m = line.match_info?;
        let id = m.id?;

        let live = (self.match_type == Some(LIVE_TYPE_TITLE)).then(|| {
            let stat = m.stat.unwrap_or_default();
            RawLiveScore::Exchange(ExchangeLiveStats {
                status: stat.status,
                current_score: m.score,
                current_period: m.set_number,
                match_time: stat.time,
                period_scores: stat.segment_scores,
            })
        });

        let livestream_url = m
            .widgets
            .into_iter()
            .find(|w| w.name.as_deref() == Some(LIVESTREAM_WIDGET))
            .and_then(|w| w.url);

        let outcomes = line
            .outcomes
            .into_iter()
            .map(|o| RawOutcome {
                market: o.group_alias.map(MarketGroup::Alias),
                selection: o.alias.map(SelectionTag::Alias),
                price: o.odd,
            })
            .collect();

        Some(RawMatch {
            id: Some(id),
            match_type: self.match_type.map(str::to_string),
            team1: m.team1.and_then(|t| t.title),
            team2: m.team2.and_then(|t| t.title),
            league: self.league.title.clone(),
            // Category ids are this operator's own; the sports catalog is keyed
            // by the line feed's ids, so only the title is carried.
            sport_id: None,
            sport_name: self.sport.title.clone(),
            region: self.region.title.clone(),
            start: m.begin_at,
            outcomes,
            live,
            livestream_url,
            ..RawMatch::default()
        })
    }
}
