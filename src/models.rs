use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Language/market scope for clustering. Stories never merge across locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Jp,
    En,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Jp => "jp",
            Locale::En => "en",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One fetched article reference. `link` is the identity key within a story.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub title: String,
    pub link: String,
    pub source: String,
    // persisted as "date" for compatibility with existing state files
    #[serde(rename = "date")]
    pub published: NaiveDate,
}

/// A cluster of items believed to describe the same event.
///
/// `centroid` is the unit-normalized running mean of the embeddings of all
/// items at the time each was assigned. Raw item embeddings are not
/// persisted, so the centroid is carried as stored state, never recomputed
/// from the items on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Story {
    pub id: u64,
    pub locale: Locale,
    pub centroid: Vec<f32>,
    pub items: Vec<Item>,
}

impl Story {
    /// Date of the most recent item. Stories are never empty.
    pub fn last_updated(&self) -> NaiveDate {
        self.items
            .iter()
            .map(|it| it.published)
            .max()
            .unwrap_or_default()
    }

    pub fn contains_link(&self, link: &str) -> bool {
        self.items.iter().any(|it| it.link == link)
    }
}

/// The persisted story collection, shared by all locales.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Store {
    pub stories: Vec<Story>,
}

impl Store {
    /// Next story id: max over the whole store + 1. Ids are never reused.
    pub fn next_id(&self) -> u64 {
        self.stories.iter().map(|s| s.id).max().unwrap_or(0) + 1
    }

    pub fn stories_for(&self, locale: Locale) -> impl Iterator<Item = &Story> {
        self.stories.iter().filter(move |s| s.locale == locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Locale::Jp).unwrap(), "\"jp\"");
        let l: Locale = serde_json::from_str("\"en\"").unwrap();
        assert_eq!(l, Locale::En);
    }

    #[test]
    fn item_date_field_name_is_stable() {
        let item = Item {
            title: "A raises funding".into(),
            link: "https://example.com/a".into(),
            source: "Example Wire".into(),
            published: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["date"], "2024-01-01");
        assert!(json.get("published").is_none());
    }

    #[test]
    fn next_id_is_max_plus_one_across_locales() {
        let mut store = Store::default();
        assert_eq!(store.next_id(), 1);
        store.stories.push(Story {
            id: 3,
            locale: Locale::Jp,
            centroid: vec![1.0, 0.0],
            items: vec![],
        });
        store.stories.push(Story {
            id: 7,
            locale: Locale::En,
            centroid: vec![0.0, 1.0],
            items: vec![],
        });
        assert_eq!(store.next_id(), 8);
    }
}
