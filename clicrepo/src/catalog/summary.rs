//! Catalog entries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::filter::{normalize, parse_date};

/// One project as listed in the repository index (`projects.json`).
///
/// Only the fields needed to browse the catalog; the full manifest is
/// loaded on demand with [`Catalog::load_project`](super::Catalog::load_project).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub path: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default)]
    pub lang_codes: Vec<String>,
    #[serde(default)]
    pub level_codes: Vec<String>,
    #[serde(default)]
    pub area_codes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Plain text, or an object of translations keyed by language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
}

impl ProjectSummary {
    /// Publication date, if present and parsable.
    pub fn sort_date(&self) -> Option<NaiveDate> {
        self.date.as_deref().and_then(parse_date)
    }

    /// Description flattened to text. Translations are joined by newlines.
    pub fn description_text(&self) -> String {
        match &self.description {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Object(map)) => map
                .values()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join("\n"),
            _ => String::new(),
        }
    }

    /// Description in `lang`, falling back to any available text.
    pub fn description_in(&self, lang: &str) -> String {
        match &self.description {
            Some(Value::Object(map)) => map
                .get(lang)
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| self.description_text()),
            _ => self.description_text(),
        }
    }

    /// Whether `needle` (already normalized) occurs in the title, author
    /// or description.
    pub(crate) fn contains_text(&self, needle: &str) -> bool {
        normalize(&self.title).contains(needle)
            || normalize(&self.author).contains(needle)
            || normalize(&self.description_text()).contains(needle)
    }
}
