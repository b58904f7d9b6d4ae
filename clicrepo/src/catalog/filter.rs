//! Catalog filtering and sorting.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use super::summary::ProjectSummary;

/// Criteria for narrowing down the catalog. Every criterion set must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    /// Language code (e.g. `ca`, `en`).
    pub language: Option<String>,
    /// Educational level code (e.g. `EP`).
    pub level: Option<String>,
    /// Subject area code (e.g. `math`).
    pub area: Option<String>,
    /// Free text matched against title, author and description.
    pub text: Option<String>,
}

impl ProjectFilter {
    /// A filter matching everything.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    pub fn with_area(mut self, area: impl Into<String>) -> Self {
        self.area = Some(area.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Whether no criterion is set.
    pub fn is_empty(&self) -> bool {
        self.language.is_none() && self.level.is_none() && self.area.is_none() && self.text.is_none()
    }

    /// Whether `project` satisfies every criterion.
    pub fn matches(&self, project: &ProjectSummary) -> bool {
        let has_code = |codes: &[String], wanted: &Option<String>| match wanted {
            Some(code) => codes.iter().any(|c| c.eq_ignore_ascii_case(code)),
            None => true,
        };

        if !has_code(&project.lang_codes, &self.language)
            || !has_code(&project.level_codes, &self.level)
            || !has_code(&project.area_codes, &self.area)
        {
            return false;
        }

        match self.text.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => project.contains_text(&normalize(text)),
            _ => true,
        }
    }
}

/// Field the catalog is sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Date,
    Title,
    Author,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "date" => Ok(SortKey::Date),
            "title" => Ok(SortKey::Title),
            "author" => Ok(SortKey::Author),
            other => Err(format!(
                "unknown sort key '{}' (expected date, title or author)",
                other
            )),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortKey::Date => "date",
            SortKey::Title => "title",
            SortKey::Author => "author",
        };
        f.write_str(name)
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Sort `projects` in place. Projects without a usable date always go last.
pub fn sort_projects(projects: &mut [&ProjectSummary], key: SortKey, order: SortOrder) {
    let directed = |ord: Ordering| match order {
        SortOrder::Ascending => ord,
        SortOrder::Descending => ord.reverse(),
    };

    match key {
        SortKey::Date => projects.sort_by(|a, b| match (a.sort_date(), b.sort_date()) {
            (Some(x), Some(y)) => directed(x.cmp(&y)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }),
        SortKey::Title => {
            projects.sort_by_cached_key(|p| normalize(&p.title));
            if order == SortOrder::Descending {
                projects.reverse();
            }
        }
        SortKey::Author => {
            projects.sort_by_cached_key(|p| normalize(&p.author));
            if order == SortOrder::Descending {
                projects.reverse();
            }
        }
    }
}

/// Parse a catalog date: `dd/mm/yy`, `dd/mm/yyyy` or `yyyy-mm-dd`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.contains('-') {
        return NaiveDate::parse_from_str(s, "%Y-%m-%d").ok();
    }

    let year_len = s.rsplit('/').next().map(str::len)?;
    let format = if year_len == 2 { "%d/%m/%y" } else { "%d/%m/%Y" };
    NaiveDate::parse_from_str(s, format).ok()
}

/// Lowercase and fold the accented Latin letters used in the catalog.
pub(crate) fn normalize(s: &str) -> String {
    s.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'à' | 'á' | 'â' | 'ä' | 'ã' => 'a',
            'è' | 'é' | 'ê' | 'ë' => 'e',
            'ì' | 'í' | 'î' | 'ï' => 'i',
            'ò' | 'ó' | 'ô' | 'ö' | 'õ' => 'o',
            'ù' | 'ú' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            'ñ' => 'n',
            'ŀ' | '·' => 'l',
            other => other,
        })
        .collect()
}
