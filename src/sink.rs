use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// What the live poller writes on every tick.
#[derive(Debug, Serialize, Deserialize)]
pub struct LiveSnapshot<T> {
    /// Wall-clock time of the write, in the configured timezone.
    pub updated_at: DateTime<FixedOffset>,
    pub data: Vec<T>,
}

impl<T> LiveSnapshot<T> {
    pub fn new(now: DateTime<Utc>, tz: Tz, data: Vec<T>) -> Self {
        Self {
            updated_at: now.with_timezone(&tz).fixed_offset(),
            data,
        }
    }
}

/// `Ice Hockey` → `ice_hockey_matches.json`.
pub fn sport_file_name(sport_name: &str) -> String {
    format!("{}_matches.json", sport_name.trim().to_lowercase().replace(' ', "_"))
}

/// Pretty-print `value` to `path`, replacing any previous file in one step.
/// Readers never see a half-written file.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output dir {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("failed to replace {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote output");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::tempdir;

    #[test]
    fn test_write_json_replaces_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("matches.json");

        write_json(&path, &json!([{"slug": "a_vs_b"}])).unwrap();
        write_json(&path, &json!([{"slug": "c_vs_d"}, {"slug": "e_vs_f"}])).unwrap();

        let back: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back.as_array().unwrap().len(), 2);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_output_is_pretty_and_keeps_unicode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sports.json");
        write_json(&path, &json!({"name": "Fútbol"})).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("Fútbol"));
        assert!(text.contains('\n'));
    }

    #[test]
    fn test_sport_file_name() {
        assert_eq!(sport_file_name("Ice Hockey"), "ice_hockey_matches.json");
        assert_eq!(sport_file_name("Cricket"), "cricket_matches.json");
    }

    #[test]
    fn test_live_snapshot_offset() {
        let now = DateTime::from_timestamp(1738351800, 0).unwrap();
        let snapshot = LiveSnapshot::new(now, chrono_tz::America::New_York, vec![1, 2]);
        let v = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(v["updated_at"], "2025-01-31T14:30:00-05:00");
        assert_eq!(v["data"], json!([1, 2]));
    }
}
