/// Build a readable key like `team_a_vs_team_b_football_01_01_1970_12_00_am`.
///
/// Empty parts are skipped and `vs` only appears between two teams. The same
/// inputs always give the same slug; two matches with the same teams, sport
/// and advertised time collide.
pub fn build_slug(
    team1: Option<&str>,
    team2: Option<&str>,
    sport: Option<&str>,
    date: Option<&str>,
    time: Option<&str>,
) -> String {
    fn present(s: Option<&str>) -> Option<&str> {
        s.map(str::trim).filter(|s| !s.is_empty())
    }

    let mut parts: Vec<&str> = Vec::with_capacity(6);
    match (present(team1), present(team2)) {
        (Some(a), Some(b)) => parts.extend([a, "vs", b]),
        (a, b) => parts.extend(a.into_iter().chain(b)),
    }
    parts.extend([sport, date, time].into_iter().filter_map(present));

    parts
        .join("_")
        .chars()
        .map(|c| match c {
            ' ' | '-' | ':' => '_',
            c => c,
        })
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_slug() {
        let slug = build_slug(
            Some("Team A"),
            Some("Team B"),
            Some("Football"),
            Some("01-01-1970"),
            Some("12:00 AM"),
        );
        assert_eq!(slug, "team_a_vs_team_b_football_01_01_1970_12_00_am");
    }

    #[test]
    fn test_skips_missing_parts() {
        let slug = build_slug(Some("Oxford"), None, Some("Rowing"), None, Some(""));
        assert_eq!(slug, "oxford_rowing");
    }

    #[test]
    fn test_hyphenated_names() {
        let slug = build_slug(Some("Saint-Etienne"), Some("Paris SG"), None, None, None);
        assert_eq!(slug, "saint_etienne_vs_paris_sg");
    }

    #[test]
    fn test_deterministic_and_colliding() {
        let a = build_slug(Some("X"), Some("Y"), Some("Baseball"), Some("07-04-2025"), Some("01:05 PM"));
        let b = build_slug(Some("X"), Some("Y"), Some("Baseball"), Some("07-04-2025"), Some("01:05 PM"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_all_empty() {
        assert_eq!(build_slug(None, None, None, None, None), "");
    }
}
