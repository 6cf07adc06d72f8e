use super::live_score::{parse_live_score, LiveScore};
use super::misc::{extract_misc_details, MiscCodeTable};
use super::odds::{extract_odds, normalize_win_probability, upstream_win_probability, Odds, WinProbability};
use super::slug::build_slug;
use super::start_time::{to_local, utc_instant, LocalStart};
use super::NormalizeError;
use crate::feed::catalog::{Language, SportsCatalog};
use crate::feed::types::RawMatch;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Flat, display-ready projection of one upstream record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMatch {
    pub slug: String,
    pub match_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_type: Option<String>,
    pub sport: Option<String>,
    pub region: Option<String>,
    pub league: Option<String>,
    pub team1: Option<String>,
    pub team2: Option<String>,
    pub start_utc: Option<DateTime<Utc>>,
    pub start_local: Option<LocalStart>,
    pub venue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub odds: Option<Odds>,
    pub win_probability: Option<WinProbability>,
    pub details: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_score: Option<LiveScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub livestream_url: Option<String>,
}

/// Result of normalizing a batch. Skipped records are counted, never fatal.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub matches: Vec<NormalizedMatch>,
    pub skipped: usize,
}

/// Stateless record transform. Holds only read-only configuration, so one
/// instance can be shared across tasks.
#[derive(Debug, Clone)]
pub struct MatchRecordNormalizer {
    timezone: Tz,
    language: Language,
    misc_codes: MiscCodeTable,
    catalog: SportsCatalog,
}

impl MatchRecordNormalizer {
    pub fn new(timezone: Tz, language: Language, misc_codes: MiscCodeTable, catalog: SportsCatalog) -> Self {
        Self {
            timezone,
            language,
            misc_codes,
            catalog,
        }
    }

    pub fn catalog(&self) -> &SportsCatalog {
        &self.catalog
    }

    pub fn sport_name(&self, raw: &RawMatch) -> Option<String> {
        raw.sport_id
            .and_then(|id| self.catalog.display_name(id, self.language))
            .map(str::to_string)
            .or_else(|| raw.sport_name.clone())
    }

    pub fn normalize(&self, raw: &RawMatch) -> Result<NormalizedMatch, NormalizeError> {
        let team1 = non_empty(raw.team1.as_deref());
        let team2 = non_empty(raw.team2.as_deref());
        if raw.id.is_none() && team1.is_none() && team2.is_none() {
            return Err(NormalizeError::MissingIdentity);
        }

        let sport = self.sport_name(raw);

        let start_utc = utc_instant(raw.start.as_ref())
            .inspect_err(|e| tracing::debug!(match_id = ?raw.id, error = %e, "unknown start time"))
            .ok();
        let start_local = start_utc.map(|utc| to_local(utc, self.timezone));

        let odds = extract_odds(&raw.outcomes);
        let win_probability = raw
            .win_probability
            .as_ref()
            .and_then(upstream_win_probability)
            .or_else(|| odds.as_ref().and_then(normalize_win_probability));

        let (misc_venue, details) = extract_misc_details(&raw.misc, &self.misc_codes);
        let venue = non_empty(raw.location.as_deref()).or(misc_venue);

        let slug = build_slug(
            team1.as_deref(),
            team2.as_deref(),
            sport.as_deref(),
            start_local.as_ref().map(|s| s.date.as_str()),
            start_local.as_ref().map(|s| s.time.as_str()),
        );

        Ok(NormalizedMatch {
            slug,
            match_id: raw.id,
            match_type: raw.match_type.clone(),
            sport,
            region: raw.region.clone(),
            league: raw.league.clone(),
            team1,
            team2,
            start_utc,
            start_local,
            venue,
            match_format: raw.match_format.clone(),
            description: raw.description.clone(),
            odds,
            win_probability,
            details: (!details.is_empty()).then_some(details),
            live_score: raw.live.as_ref().map(parse_live_score),
            livestream_url: raw.livestream_url.clone(),
        })
    }

    /// Normalize each record independently; bad records are logged and skipped.
    pub fn normalize_batch<'a>(&self, raws: impl IntoIterator<Item = &'a RawMatch>) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for raw in raws {
            match self.normalize(raw) {
                Ok(m) => outcome.matches.push(m),
                Err(e) => {
                    tracing::warn!(match_id = ?raw.id, error = %e, "skipping record");
                    outcome.skipped += 1;
                }
            }
        }
        outcome
    }
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}
