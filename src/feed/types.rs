use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Provider-agnostic match record handed to the normalizer.
///
/// Feed adapters flatten their wire shapes into this; nothing here is
/// validated beyond what serde needs to decode it.
#[derive(Debug, Clone, Default)]
pub struct RawMatch {
    pub id: Option<i64>,
    pub match_type: Option<String>,
    pub team1: Option<String>,
    pub team2: Option<String>,
    pub league: Option<String>,
    pub sport_id: Option<u32>,
    pub sport_name: Option<String>,
    pub region: Option<String>,
    /// Epoch seconds as sent upstream (number or numeric string).
    pub start: Option<Value>,
    pub outcomes: Vec<RawOutcome>,
    pub win_probability: Option<RawWinProbability>,
    pub misc: Vec<MiscEntry>,
    pub location: Option<String>,
    pub match_format: Option<String>,
    pub description: Option<String>,
    pub live: Option<RawLiveScore>,
    pub livestream_url: Option<String>,
}

/// Market group tag: the line feed sends numeric groups, the exchange sends aliases.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MarketGroup {
    Code(i64),
    Alias(String),
}

impl MarketGroup {
    /// Group 1 / "1x2" is the head-to-head match result market.
    pub fn is_primary(&self) -> bool {
        match self {
            MarketGroup::Code(code) => *code == 1,
            MarketGroup::Alias(alias) => alias.eq_ignore_ascii_case("1x2"),
        }
    }
}

/// Selection tag inside a market. Numeric codes and string aliases differ:
/// code 2 is the draw, alias "2" is the away side.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SelectionTag {
    Code(i64),
    Alias(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Team1,
    Draw,
    Team2,
}

impl SelectionTag {
    pub fn side(&self) -> Option<Side> {
        match self {
            SelectionTag::Code(1) => Some(Side::Team1),
            SelectionTag::Code(2) => Some(Side::Draw),
            SelectionTag::Code(3) => Some(Side::Team2),
            SelectionTag::Code(_) => None,
            SelectionTag::Alias(alias) => match alias.trim() {
                "1" => Some(Side::Team1),
                "x" | "X" => Some(Side::Draw),
                "2" => Some(Side::Team2),
                _ => None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawOutcome {
    pub market: Option<MarketGroup>,
    pub selection: Option<SelectionTag>,
    pub price: Option<Value>,
}

/// Upstream precomputed win probability, already expressed as fractions.
///
/// Fields stay raw so a malformed fraction spoils only this block, not the
/// whole record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawWinProbability {
    #[serde(rename = "P1", default)]
    pub p1: Option<Value>,
    #[serde(rename = "PX", default)]
    pub px: Option<Value>,
    #[serde(rename = "P2", default)]
    pub p2: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MiscEntry {
    #[serde(rename = "K", default)]
    pub key: Option<Value>,
    #[serde(rename = "V", default)]
    pub value: Value,
}

impl MiscEntry {
    /// Numeric code, accepting `2` and `"2"`.
    pub fn code(&self) -> Option<i64> {
        match self.key.as_ref()? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Live-score block; the shape depends on which provider sent it.
#[derive(Debug, Clone, PartialEq)]
pub enum RawLiveScore {
    Scoreboard(LineScoreboard),
    Exchange(ExchangeLiveStats),
}

/// Upstream sends `null` where it means "empty list".
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Line feed wire types ─────────────────────────────────────────────

/// Response envelope of every LineFeed/LiveFeed endpoint.
#[derive(Debug, Deserialize)]
pub struct LineEnvelope {
    #[serde(rename = "Value", default, deserialize_with = "null_as_default")]
    pub value: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct LineGame {
    #[serde(rename = "I", default)]
    pub id: Option<i64>,
    #[serde(rename = "O1", default)]
    pub team1: Option<String>,
    #[serde(rename = "O2", default)]
    pub team2: Option<String>,
    #[serde(rename = "L", default)]
    pub league: Option<String>,
    #[serde(rename = "SN", default)]
    pub sport_name: Option<String>,
    #[serde(rename = "SI", default)]
    pub sport_id: Option<u32>,
    #[serde(rename = "CN", default)]
    pub country: Option<String>,
    #[serde(rename = "S", default)]
    pub start: Option<Value>,
    #[serde(rename = "E", default, deserialize_with = "null_as_default")]
    pub events: Vec<LineEvent>,
    #[serde(rename = "WP", default)]
    pub win_probability: Option<RawWinProbability>,
    #[serde(rename = "MIS", default, deserialize_with = "null_as_default")]
    pub misc: Vec<MiscEntry>,
    #[serde(rename = "MIO", default)]
    pub match_info: Option<LineMatchInfo>,
    #[serde(rename = "DI", default)]
    pub description: Option<String>,
    #[serde(rename = "SC", default)]
    pub scoreboard: Option<LineScoreboard>,
}

#[derive(Debug, Deserialize)]
pub struct LineEvent {
    #[serde(rename = "G", default)]
    pub group: Option<MarketGroup>,
    #[serde(rename = "T", default)]
    pub selection: Option<SelectionTag>,
    #[serde(rename = "C", default)]
    pub price: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LineMatchInfo {
    #[serde(rename = "Loc", default)]
    pub location: Option<String>,
    #[serde(rename = "MaF", default)]
    pub match_format: Option<String>,
    #[serde(rename = "TSt", default)]
    pub stage: Option<String>,
}

/// `SC` object. Racket sports fill `FS`/`PS`/`SS`, team sports fill `S`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LineScoreboard {
    #[serde(rename = "SLS", default)]
    pub status: Option<String>,
    #[serde(rename = "CPS", default)]
    pub current_period: Option<Value>,
    #[serde(rename = "S", default, deserialize_with = "null_as_default")]
    pub scores: Vec<KeyedScore>,
    #[serde(rename = "FS", default)]
    pub full_score: Option<PairScore>,
    #[serde(rename = "PS", default, deserialize_with = "null_as_default")]
    pub period_scores: Vec<PeriodScore>,
    #[serde(rename = "SS", default)]
    pub sub_score: Option<PairScore>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KeyedScore {
    #[serde(rename = "Key", default)]
    pub key: String,
    #[serde(rename = "Value", default)]
    pub value: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PairScore {
    #[serde(rename = "S1", default)]
    pub s1: Option<Value>,
    #[serde(rename = "S2", default)]
    pub s2: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PeriodScore {
    #[serde(rename = "Value", default)]
    pub value: PairScore,
}

impl From<LineGame> for RawMatch {
    fn from(game: LineGame) -> Self {
        let info = game.match_info.unwrap_or_default();
        let description = game.description.or(info.stage);
        RawMatch {
            id: game.id,
            match_type: None,
            team1: game.team1,
            team2: game.team2,
            league: game.league,
            sport_id: game.sport_id,
            sport_name: game.sport_name,
            region: game.country,
            start: game.start,
            outcomes: game
                .events
                .into_iter()
                .map(|e| RawOutcome {
                    market: e.group,
                    selection: e.selection,
                    price: e.price,
                })
                .collect(),
            win_probability: game.win_probability,
            misc: game.misc,
            location: info.location,
            match_format: info.match_format,
            description,
            live: game.scoreboard.map(RawLiveScore::Scoreboard),
            livestream_url: None,
        }
    }
}

// ── Exchange (line hierarchy) wire types ────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ExchangeResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub lines_hierarchy: Vec<ExchangeSportGroup>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExchangeSportGroup {
    #[serde(default)]
    pub line_type_title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub line_category_dto_collection: Vec<ExchangeSport>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExchangeSport {
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub line_supercategory_dto_collection: Vec<ExchangeRegion>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExchangeRegion {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub line_subcategory_dto_collection: Vec<ExchangeLeague>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExchangeLeague {
    #[serde(default)]
    pub title: Option<String>,
    /// Kept as raw values so one bad line does not fail the whole response.
    #[serde(default, deserialize_with = "null_as_default")]
    pub line_dto_collection: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct ExchangeLine {
    #[serde(rename = "match", default)]
    pub match_info: Option<ExchangeMatch>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub outcomes: Vec<ExchangeOutcome>,
}

#[derive(Debug, Deserialize)]
pub struct ExchangeMatch {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub team1: Option<ExchangeTeam>,
    #[serde(default)]
    pub team2: Option<ExchangeTeam>,
    #[serde(default)]
    pub begin_at: Option<Value>,
    #[serde(default)]
    pub score: Option<String>,
    #[serde(default)]
    pub set_number: Option<Value>,
    #[serde(default)]
    pub stat: Option<ExchangeStat>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub widgets: Vec<ExchangeWidget>,
}

#[derive(Debug, Deserialize)]
pub struct ExchangeTeam {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExchangeStat {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub time: Option<Value>,
    #[serde(default)]
    pub segment_scores: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct ExchangeWidget {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExchangeOutcome {
    #[serde(default)]
    pub group_alias: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub odd: Option<Value>,
}

/// Live block of an exchange match, copied out of `match` and `match.stat`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExchangeLiveStats {
    pub status: Option<String>,
    pub current_score: Option<String>,
    pub current_period: Option<Value>,
    pub match_time: Option<Value>,
    pub period_scores: Option<Value>,
}

// ── SportInfo (catalog source) ──────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SportInfoItem {
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
}
