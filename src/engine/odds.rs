//! Head-to-head odds extraction and margin-free win probabilities.
//!
//! Prices are decimal (European) odds. A price of 2.0 pays double the stake
//! and implies a 50 % chance before the bookmaker's margin is removed.

use crate::feed::types::{RawOutcome, RawWinProbability, Side};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Team prices needed before a probability is derived. Draw is optional.
const MIN_PRICES: usize = 2;

/// Flattened 1x2 prices. Only outcomes actually found are serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Odds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team1_win: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draw: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team2_win: Option<f64>,
}

impl Odds {
    pub fn len(&self) -> usize {
        [self.team1_win, self.draw, self.team2_win]
            .iter()
            .filter(|p| p.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn set(&mut self, side: Side, price: f64) {
        match side {
            Side::Team1 => self.team1_win = Some(price),
            Side::Draw => self.draw = Some(price),
            Side::Team2 => self.team2_win = Some(price),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbabilitySource {
    /// Copied from the feed's own `WP` object.
    Upstream,
    /// Derived from the 1x2 prices.
    Implied,
}

/// Win chances in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinProbability {
    pub team1_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draw_percent: Option<f64>,
    pub team2_percent: f64,
    pub source: ProbabilitySource,
}

impl WinProbability {
    pub fn total(&self) -> f64 {
        self.team1_percent + self.draw_percent.unwrap_or(0.0) + self.team2_percent
    }
}

/// Parse a decimal price sent as a JSON number or numeric string.
/// Zero, negative and non-finite prices are rejected.
pub fn parse_price(value: &Value) -> Option<f64> {
    let price = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (price.is_finite() && price > 0.0).then_some(price)
}

/// Pull the 1x2 prices out of a record's outcome list.
///
/// Returns `None` when nothing usable was found, so "market not offered" stays
/// distinguishable from an offered market.
pub fn extract_odds(outcomes: &[RawOutcome]) -> Option<Odds> {
    let mut odds = Odds::default();
    for outcome in outcomes {
        if !outcome.market.as_ref().is_some_and(|m| m.is_primary()) {
            continue;
        }
        let Some(side) = outcome.selection.as_ref().and_then(|s| s.side()) else {
            continue;
        };
        match outcome.price.as_ref().and_then(parse_price) {
            Some(price) => odds.set(side, price),
            None => tracing::debug!(?side, price = ?outcome.price, "skipping unusable price"),
        }
    }
    (!odds.is_empty()).then_some(odds)
}

/// Remove the bookmaker margin from 1x2 prices.
///
/// Each present price contributes `1/o`, an absent draw contributes 0, and the
/// shares are rescaled to sum to 100 and rounded independently, so the total
/// can be off by one hundredth. Returns `None` for degenerate markets.
pub fn normalize_win_probability(odds: &Odds) -> Option<WinProbability> {
    let (Some(team1), Some(team2)) = (odds.team1_win, odds.team2_win) else {
        return None;
    };
    if odds.len() < MIN_PRICES {
        return None;
    }
    let prices = [Some(team1), odds.draw, Some(team2)];
    if prices.iter().flatten().any(|p| !p.is_finite() || *p <= 0.0) {
        return None;
    }

    let implied: Vec<f64> = prices.iter().map(|p| p.map_or(0.0, |o| 1.0 / o)).collect();
    let total: f64 = implied.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return None;
    }

    let rounded: Vec<f64> = implied
        .iter()
        .map(|p| round_hundredths(p / total * 100.0))
        .collect();

    Some(WinProbability {
        team1_percent: rounded[0],
        draw_percent: odds.draw.map(|_| rounded[1]),
        team2_percent: rounded[2],
        source: ProbabilitySource::Implied,
    })
}

/// Copy the feed's precomputed fractions as percentages, without rescaling.
///
/// A missing team fraction counts as 0. Returns `None` when neither team
/// fraction is present or any present fraction is unreadable, so the caller
/// can fall back to the odds.
pub fn upstream_win_probability(raw: &RawWinProbability) -> Option<WinProbability> {
    if raw.p1.is_none() && raw.p2.is_none() {
        return None;
    }
    // Outer None: unreadable. Inner None: not sent.
    let read = |v: &Option<Value>| match v {
        Some(v) => parse_fraction(v).map(Some),
        None => Some(None),
    };
    let (p1, px, p2) = (read(&raw.p1)?, read(&raw.px)?, read(&raw.p2)?);

    Some(WinProbability {
        team1_percent: p1.unwrap_or(0.0) * 100.0,
        draw_percent: px.map(|p| p * 100.0),
        team2_percent: p2.unwrap_or(0.0) * 100.0,
        source: ProbabilitySource::Upstream,
    })
}

/// Read a probability fraction from a number or numeric string.
fn parse_fraction(value: &Value) -> Option<f64> {
    let p = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (p.is_finite() && p >= 0.0).then_some(p)
}

/// Round a percentage to two decimals.
fn round_hundredths(share: f64) -> f64 {
    (share * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::types::{MarketGroup, SelectionTag};
    use serde_json::json;

    fn line(group: i64, sel: i64, price: Value) -> RawOutcome {
        RawOutcome {
            market: Some(MarketGroup::Code(group)),
            selection: Some(SelectionTag::Code(sel)),
            price: Some(price),
        }
    }

    fn exchange(sel: &str, price: Value) -> RawOutcome {
        RawOutcome {
            market: Some(MarketGroup::Alias("1x2".into())),
            selection: Some(SelectionTag::Alias(sel.into())),
            price: Some(price),
        }
    }

    fn odds(t1: f64, draw: Option<f64>, t2: f64) -> Odds {
        Odds { team1_win: Some(t1), draw, team2_win: Some(t2) }
    }

    #[test]
    fn test_extract_line_codes() {
        let got = extract_odds(&[
            line(1, 1, json!(1.85)),
            line(1, 2, json!(3.4)),
            line(1, 3, json!(4.2)),
            line(17, 1, json!(1.5)),
        ])
        .unwrap();
        assert_eq!(got, odds(1.85, Some(3.4), 4.2));
    }

    #[test]
    fn test_extract_exchange_aliases_with_string_prices() {
        let got = extract_odds(&[
            exchange("1", json!("2.10")),
            exchange("x", json!("3.25")),
            exchange("2", json!(3.6)),
        ])
        .unwrap();
        assert_eq!(got, odds(2.1, Some(3.25), 3.6));
    }

    #[test]
    fn test_extract_absent_without_primary_market() {
        assert_eq!(extract_odds(&[line(2, 1, json!(1.9)), line(8, 3, json!(2.0))]), None);
        assert_eq!(extract_odds(&[]), None);
    }

    #[test]
    fn test_extract_skips_zero_and_garbage_prices() {
        let got = extract_odds(&[
            line(1, 1, json!(2.0)),
            line(1, 2, json!(0)),
            line(1, 3, json!(4.0)),
        ])
        .unwrap();
        assert_eq!(got.draw, None);
        assert_eq!(got.len(), 2);

        let none = extract_odds(&[exchange("1", json!("n/a")), exchange("2", Value::Null)]);
        assert_eq!(none, None);
    }

    #[test]
    fn test_extract_later_valid_price_wins() {
        let got = extract_odds(&[line(1, 1, json!(2.0)), line(1, 1, json!(2.2))]).unwrap();
        assert_eq!(got.team1_win, Some(2.2));
    }

    #[test]
    fn test_odds_serialize_only_present_keys() {
        let s = serde_json::to_value(odds(2.0, None, 1.8)).unwrap();
        assert_eq!(s, json!({"team1_win": 2.0, "team2_win": 1.8}));
    }

    #[test]
    fn test_normalize_three_way_reference() {
        let wp = normalize_win_probability(&odds(2.0, Some(3.0), 4.0)).unwrap();
        assert!((wp.team1_percent - 46.15).abs() < 1e-9);
        assert!((wp.draw_percent.unwrap() - 30.77).abs() < 1e-9);
        assert!((wp.team2_percent - 23.08).abs() < 1e-9);
        assert_eq!(wp.source, ProbabilitySource::Implied);
    }

    #[test]
    fn test_normalize_sums_to_hundred() {
        let grid = [1.01, 1.2, 1.333, 1.85, 2.0, 2.7, 3.1, 3.3, 5.5, 7.0, 13.0, 41.0];
        for &a in &grid {
            for &x in &grid {
                for &b in &grid {
                    let wp = normalize_win_probability(&odds(a, Some(x), b)).unwrap();
                    assert!((wp.total() - 100.0).abs() <= 0.01 + 1e-9, "{a} {x} {b} -> {}", wp.total());
                }
            }
        }
    }

    #[test]
    fn test_normalize_equal_prices_round_each_share() {
        let wp = normalize_win_probability(&odds(3.0, Some(3.0), 3.0)).unwrap();
        assert_eq!(wp.team1_percent, 33.33);
        assert_eq!(wp.draw_percent, Some(33.33));
        assert_eq!(wp.team2_percent, 33.33);
        assert!((wp.total() - 100.0).abs() <= 0.01 + 1e-9);
    }

    #[test]
    fn test_normalize_two_way_has_no_draw() {
        let wp = normalize_win_probability(&odds(1.5, None, 2.6)).unwrap();
        assert_eq!(wp.draw_percent, None);
        assert!((wp.total() - 100.0).abs() <= 0.01 + 1e-9);
        assert!(wp.team1_percent > wp.team2_percent);

        let s = serde_json::to_value(&wp).unwrap();
        assert!(s.get("draw_percent").is_none());
    }

    #[test]
    fn test_normalize_even_two_way() {
        let wp = normalize_win_probability(&odds(1.9, None, 1.9)).unwrap();
        assert_eq!(wp.team1_percent, 50.0);
        assert_eq!(wp.team2_percent, 50.0);
    }

    #[test]
    fn test_normalize_degenerate_markets() {
        assert!(normalize_win_probability(&Odds::default()).is_none());
        let one_side = Odds { team1_win: Some(1.5), draw: Some(3.0), team2_win: None };
        assert!(normalize_win_probability(&one_side).is_none());
        assert!(normalize_win_probability(&odds(0.0, None, 2.0)).is_none());
        assert!(normalize_win_probability(&odds(-1.5, None, 2.0)).is_none());
    }

    #[test]
    fn test_upstream_copied_verbatim() {
        let raw = RawWinProbability {
            p1: Some(json!(0.5)),
            px: Some(json!(0.25)),
            p2: Some(json!(0.25)),
        };
        let wp = upstream_win_probability(&raw).unwrap();
        assert_eq!(wp.team1_percent, 50.0);
        assert_eq!(wp.draw_percent, Some(25.0));
        assert_eq!(wp.team2_percent, 25.0);
        assert_eq!(wp.source, ProbabilitySource::Upstream);

        // No rescaling even when the fractions do not add up.
        let raw = RawWinProbability { p1: Some(json!(0.6)), px: None, p2: Some(json!(0.3)) };
        let wp = upstream_win_probability(&raw).unwrap();
        assert_eq!(wp.draw_percent, None);
        assert!((wp.total() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_upstream_string_fractions() {
        let raw = RawWinProbability { p1: Some(json!("0.5")), px: None, p2: Some(json!(" 0.5 ")) };
        let wp = upstream_win_probability(&raw).unwrap();
        assert_eq!(wp.team1_percent, 50.0);
        assert_eq!(wp.team2_percent, 50.0);
    }

    #[test]
    fn test_upstream_unreadable_is_absent() {
        let garbage = RawWinProbability { p1: Some(json!("n/a")), px: None, p2: Some(json!(0.4)) };
        assert!(upstream_win_probability(&garbage).is_none());

        let bad_draw = RawWinProbability { p1: Some(json!(0.4)), px: Some(json!([])), p2: Some(json!(0.4)) };
        assert!(upstream_win_probability(&bad_draw).is_none());

        let negative = RawWinProbability { p1: Some(json!(-0.1)), px: None, p2: Some(json!(0.4)) };
        assert!(upstream_win_probability(&negative).is_none());

        assert!(upstream_win_probability(&RawWinProbability::default()).is_none());

        // One team fraction alone still counts; the other is 0.
        let one = RawWinProbability { p1: Some(json!(0.8)), px: None, p2: None };
        assert_eq!(upstream_win_probability(&one).unwrap().team2_percent, 0.0);
    }

    #[test]
    fn test_parse_price_variants() {
        assert_eq!(parse_price(&json!(1.5)), Some(1.5));
        assert_eq!(parse_price(&json!(" 2.25 ")), Some(2.25));
        assert_eq!(parse_price(&json!(0)), None);
        assert_eq!(parse_price(&json!("")), None);
        assert_eq!(parse_price(&json!(true)), None);
    }
}
