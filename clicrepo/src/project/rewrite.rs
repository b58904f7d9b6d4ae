//! Path rewriting for exported archives.
//!
//! Repository projects keep their content inside a subdirectory named after
//! the player (e.g. `jclic.js/`). Exported packages flatten that directory, so
//! the same prefix has to disappear from every archive entry name and from
//! every reference inside the embedded manifest. Both sides go through
//! [`PathRewrite::entry_name`], so a manifest reference always equals the
//! entry it points at.

use std::borrow::Cow;

use regex::Regex;
use serde_json::Value;

/// Rule that strips the main-file directory prefix from paths.
#[derive(Debug, Clone)]
pub struct PathRewrite {
    /// Directory prefix including the trailing slash, empty for identity.
    prefix: String,
    /// Literal pattern matching the prefix anywhere in a text.
    pattern: Option<Regex>,
}

impl PathRewrite {
    /// Build the rule from a project's main file path.
    ///
    /// `jclic.js/activity.jclic` yields the prefix `jclic.js/`. A main file
    /// at the project root yields the identity rule.
    pub fn from_main_file(main_file: &str) -> Result<Self, regex::Error> {
        let main_file = main_file.trim_start_matches("./").trim_start_matches('/');
        match main_file.rfind('/') {
            Some(idx) => {
                let prefix = main_file[..=idx].to_string();
                let pattern = Regex::new(&regex::escape(&prefix))?;
                Ok(Self {
                    prefix,
                    pattern: Some(pattern),
                })
            }
            None => Ok(Self::identity()),
        }
    }

    /// A rule that leaves every path untouched.
    pub fn identity() -> Self {
        Self {
            prefix: String::new(),
            pattern: None,
        }
    }

    /// The stripped prefix (empty for the identity rule).
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether this rule changes anything at all.
    pub fn is_identity(&self) -> bool {
        self.pattern.is_none()
    }

    /// Strip the prefix from a single path.
    ///
    /// Every occurrence is removed, repeating until none is left, so the
    /// result never contains the prefix and rewriting it again is a no-op.
    pub fn entry_name<'a>(&self, path: &'a str) -> Cow<'a, str> {
        let Some(pattern) = &self.pattern else {
            return Cow::Borrowed(path);
        };
        let mut out = pattern.replace_all(path, "");
        // Removing one match can splice a new one together (`aa//x` -> `a/x`)
        while pattern.is_match(&out) {
            out = Cow::Owned(pattern.replace_all(&out, "").into_owned());
        }
        out
    }

    /// Apply [`entry_name`](Self::entry_name) to every string in a JSON
    /// document.
    ///
    /// `files` and `mainFile` end up exactly equal to the archive entry
    /// names; object keys are left alone.
    pub fn apply_json(&self, value: &mut Value) {
        if self.is_identity() {
            return;
        }
        match value {
            Value::String(s) => {
                let rewritten = self.entry_name(s).into_owned();
                *s = rewritten;
            }
            Value::Array(items) => items.iter_mut().for_each(|v| self.apply_json(v)),
            Value::Object(map) => map.values_mut().for_each(|v| self.apply_json(v)),
            _ => {}
        }
    }
}
