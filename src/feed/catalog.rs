//! Sport id → display name, in the languages the operator publishes.
//!
//! Loaded once from `sports_all_languages.json`; the `catalog` command rebuilds
//! that file from the SportInfo endpoint.

use super::types::SportInfoItem;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Bangla,
    French,
    Spanish,
    Hindi,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::English,
        Language::Bangla,
        Language::French,
        Language::Spanish,
        Language::Hindi,
    ];

    /// `lng` query value for the feed endpoints.
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Bangla => "bn",
            Language::French => "fr",
            Language::Spanish => "es",
            Language::Hindi => "hi",
        }
    }
}

/// One row of the catalog file. Field names match the file on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SportEntry {
    pub sports_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_eng: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_bangla: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_france: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_spanish: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_hindi: Option<String>,
}

impl SportEntry {
    pub fn name(&self, lang: Language) -> Option<&str> {
        let name = match lang {
            Language::English => &self.name_eng,
            Language::Bangla => &self.name_bangla,
            Language::French => &self.name_france,
            Language::Spanish => &self.name_spanish,
            Language::Hindi => &self.name_hindi,
        };
        name.as_deref().filter(|n| !n.is_empty())
    }

    fn set_name(&mut self, lang: Language, name: String) {
        let slot = match lang {
            Language::English => &mut self.name_eng,
            Language::Bangla => &mut self.name_bangla,
            Language::French => &mut self.name_france,
            Language::Spanish => &mut self.name_spanish,
            Language::Hindi => &mut self.name_hindi,
        };
        *slot = Some(name);
    }
}

#[derive(Debug, Clone, Default)]
pub struct SportsCatalog {
    entries: BTreeMap<u32, SportEntry>,
}

impl SportsCatalog {
    pub fn from_entries(entries: impl IntoIterator<Item = SportEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| (e.sports_id, e)).collect(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read sports catalog: {}", path.display()))?;
        let entries: Vec<SportEntry> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse sports catalog: {}", path.display()))?;
        Ok(Self::from_entries(entries))
    }

    /// Like `load`, but a missing file yields an empty catalog.
    pub fn load_or_empty(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "sports catalog not found, using feed sport names");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn get(&self, sport_id: u32) -> Option<&SportEntry> {
        self.entries.get(&sport_id)
    }

    /// Name in `lang`, falling back to English.
    pub fn display_name(&self, sport_id: u32, lang: Language) -> Option<&str> {
        let entry = self.get(sport_id)?;
        entry.name(lang).or_else(|| entry.name(Language::English))
    }

    /// Fold one SportInfo page (all sports in one language) into the catalog.
    /// Items without an id are skipped.
    pub fn merge_language(&mut self, lang: Language, items: Vec<SportInfoItem>) {
        for item in items {
            let Some(id) = item.id else { continue };
            let entry = self.entries.entry(id).or_insert_with(|| SportEntry {
                sports_id: id,
                ..SportEntry::default()
            });
            if let Some(name) = item.name {
                entry.set_name(lang, name);
            }
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &SportEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> SportsCatalog {
        let entries: Vec<SportEntry> = serde_json::from_str(
            r#"[
                {"sports_id": 1, "name_eng": "Football", "name_france": "Football", "name_spanish": "Fútbol"},
                {"sports_id": 66, "name_eng": "Cricket", "name_hindi": ""}
            ]"#,
        )
        .unwrap();
        SportsCatalog::from_entries(entries)
    }

    #[test]
    fn test_display_name_in_language() {
        assert_eq!(fixture().display_name(1, Language::Spanish), Some("Fútbol"));
    }

    #[test]
    fn test_display_name_falls_back_to_english() {
        let catalog = fixture();
        assert_eq!(catalog.display_name(66, Language::Hindi), Some("Cricket"));
        assert_eq!(catalog.display_name(66, Language::Bangla), Some("Cricket"));
    }

    #[test]
    fn test_unknown_sport() {
        assert_eq!(fixture().display_name(4, Language::English), None);
    }

    #[test]
    fn test_merge_language_pages() {
        let mut catalog = SportsCatalog::default();
        let en: Vec<SportInfoItem> =
            serde_json::from_str(r#"[{"id": 1, "name": "Football"}, {"name": "orphan"}]"#).unwrap();
        let fr: Vec<SportInfoItem> =
            serde_json::from_str(r#"[{"id": 1, "name": "Football"}, {"id": 4, "name": "Basket-ball"}]"#).unwrap();
        catalog.merge_language(Language::English, en);
        catalog.merge_language(Language::French, fr);

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(1).unwrap().name_eng.as_deref(), Some("Football"));
        assert_eq!(catalog.display_name(4, Language::French), Some("Basket-ball"));
        assert_eq!(catalog.get(4).unwrap().name_eng, None);
    }

    #[test]
    fn test_catalog_file_round_trip_shape() {
        let catalog = fixture();
        let json = serde_json::to_value(catalog.entries().collect::<Vec<_>>()).unwrap();
        assert_eq!(json[0]["sports_id"], 1);
        assert!(json[1].get("name_bangla").is_none());
    }

    #[test]
    fn test_language_codes() {
        let codes: Vec<_> = Language::ALL.iter().map(|l| l.code()).collect();
        assert_eq!(codes, ["en", "bn", "fr", "es", "hi"]);
    }
}
