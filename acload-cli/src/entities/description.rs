//! Language-tagged short/long text attached to every entity

use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_language() -> String {
    "en".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Description {
    pub short: String,
    pub long: String,
    #[serde(default = "default_language")]
    pub language: String,
}

impl Description {
    /// English description
    pub fn new(short: impl Into<String>, long: impl Into<String>) -> Self {
        Self {
            short: short.into(),
            long: long.into(),
            language: default_language(),
        }
    }

    /// Description where the long text repeats the short text
    pub fn short_only(short: impl Into<String>) -> Self {
        let short = short.into();
        Self::new(short.clone(), short)
    }

    /// Collect descriptions from a query response object.
    ///
    /// Queries return descriptions in several layouts: the create layout
    /// (`descriptions[]` of `short`/`long`/`language`), a list using
    /// `shortDescription`/`longDescription`/`languageISOCode`, a singular
    /// `description` object, or the texts flattened onto the object itself.
    pub fn from_remote(object: &Value) -> Vec<Description> {
        if let Some(list) = object.get("descriptions").and_then(Value::as_array) {
            let parsed: Vec<_> = list.iter().filter_map(Self::from_remote_entry).collect();
            if !parsed.is_empty() {
                return parsed;
            }
        }

        if let Some(single) = object.get("description").filter(|v| v.is_object()) {
            if let Some(d) = Self::from_remote_entry(single) {
                return vec![d];
            }
        }

        Self::from_remote_entry(object).into_iter().collect()
    }

    fn from_remote_entry(entry: &Value) -> Option<Description> {
        let text = |keys: &[&str]| {
            keys.iter()
                .find_map(|k| entry.get(*k).and_then(Value::as_str))
                .map(str::to_string)
        };

        let short = text(&["short", "shortDescription"])?;
        let long = text(&["long", "longDescription"]).unwrap_or_else(|| short.clone());
        let language = text(&["language", "languageISOCode", "languageIsoCode"])
            .map(|l| l.to_lowercase())
            .unwrap_or_else(default_language);

        Some(Description {
            short,
            long,
            language,
        })
    }
}
