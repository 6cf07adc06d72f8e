use crate::feed::types::{ExchangeLiveStats, LineScoreboard, RawLiveScore};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Flattened in-play state. Which fields are filled depends on the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiveScore {
    pub status: Option<String>,
    pub current_period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team1_score: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team2_score: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_score: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_time_minutes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_scores: Option<Value>,
}

pub fn parse_live_score(raw: &RawLiveScore) -> LiveScore {
    match raw {
        RawLiveScore::Scoreboard(sc) => from_scoreboard(sc),
        RawLiveScore::Exchange(stats) => from_exchange(stats),
    }
}

fn from_scoreboard(sc: &LineScoreboard) -> LiveScore {
    let mut live = LiveScore {
        status: sc.status.clone(),
        current_period: sc.current_period.as_ref().and_then(text),
        ..LiveScore::default()
    };

    for part in &sc.scores {
        match part.key.as_str() {
            "Team1Scores" => live.team1_score = text(&part.value),
            "Team2Scores" => live.team2_score = text(&part.value),
            _ => {}
        }
    }

    // Racket sports: sets from FS, games in the current set from PS[0], points from SS.
    if let (Some(points), Some(current_set)) = (&sc.sub_score, sc.period_scores.first()) {
        let sets = sc.full_score.clone().unwrap_or_default();
        let games = &current_set.value;
        live.team1_score = Some(racket_line(sets.s1.as_ref(), games.s1.as_ref(), points.s1.as_ref()));
        live.team2_score = Some(racket_line(sets.s2.as_ref(), games.s2.as_ref(), points.s2.as_ref()));
    }

    live
}

fn from_exchange(stats: &ExchangeLiveStats) -> LiveScore {
    LiveScore {
        status: stats.status.clone(),
        current_period: stats.current_period.as_ref().and_then(text),
        current_score: stats.current_score.clone(),
        match_time_minutes: stats.match_time.as_ref().and_then(minutes),
        period_scores: stats.period_scores.clone().filter(|v| !v.is_null()),
        ..LiveScore::default()
    }
}

fn racket_line(sets: Option<&Value>, games: Option<&Value>, points: Option<&Value>) -> String {
    let show = |v: Option<&Value>| v.and_then(text).unwrap_or_else(|| "0".to_string());
    format!("Sets: {}, Games: {}, Points: {}", show(sets), show(games), show(points))
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn minutes(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scoreboard(json: &str) -> RawLiveScore {
        RawLiveScore::Scoreboard(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn test_team_sport_scores() {
        let live = parse_live_score(&scoreboard(
            r#"{
                "SLS": "2nd half",
                "CPS": "2",
                "S": [
                    {"Key": "Team1Scores", "Value": "2"},
                    {"Key": "Team2Scores", "Value": "1"},
                    {"Key": "Stat", "Value": "ignored"}
                ]
            }"#,
        ));
        assert_eq!(live.status.as_deref(), Some("2nd half"));
        assert_eq!(live.current_period.as_deref(), Some("2"));
        assert_eq!(live.team1_score.as_deref(), Some("2"));
        assert_eq!(live.team2_score.as_deref(), Some("1"));
    }

    #[test]
    fn test_racket_sport_scores() {
        let live = parse_live_score(&scoreboard(
            r#"{
                "SLS": "2nd set",
                "FS": {"S1": 1},
                "PS": [{"Value": {"S1": 3, "S2": 4}}],
                "SS": {"S1": "40", "S2": "15"}
            }"#,
        ));
        assert_eq!(live.team1_score.as_deref(), Some("Sets: 1, Games: 3, Points: 40"));
        assert_eq!(live.team2_score.as_deref(), Some("Sets: 0, Games: 4, Points: 15"));
    }

    #[test]
    fn test_racket_needs_both_blocks() {
        let live = parse_live_score(&scoreboard(r#"{"SS": {"S1": "40", "S2": "15"}}"#));
        assert_eq!(live.team1_score, None);
    }

    #[test]
    fn test_exchange_stats() {
        let live = parse_live_score(&RawLiveScore::Exchange(ExchangeLiveStats {
            status: Some("in_progress".into()),
            current_score: Some("1:0".into()),
            current_period: Some(json!(2)),
            match_time: Some(json!("67")),
            period_scores: Some(json!([{"team1": 1, "team2": 0}])),
        }));
        assert_eq!(live.current_period.as_deref(), Some("2"));
        assert_eq!(live.match_time_minutes, Some(67));
        assert_eq!(live.current_score.as_deref(), Some("1:0"));
        assert!(live.period_scores.is_some());
    }
}
