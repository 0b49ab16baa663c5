//! Indicator group records (`/indicatorgroups`)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Description, Entity, EntityKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorGroup {
    pub descriptions: Vec<Description>,
    pub internal_id: String,
    /// Remote ids of member indicators, in row order
    #[serde(default)]
    pub indicators: Vec<String>,
}

impl IndicatorGroup {
    pub fn new(internal_id: impl Into<String>, description: Description) -> Self {
        Self {
            descriptions: vec![description],
            internal_id: internal_id.into(),
            indicators: Vec::new(),
        }
    }
}

impl Entity for IndicatorGroup {
    const KIND: EntityKind = EntityKind::IndicatorGroup;

    fn internal_id(&self) -> &str {
        &self.internal_id
    }

    fn reconcile(remote: Value) -> Result<Self> {
        let internal_id = remote
            .get("internalId")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        // Queries expand members into indicator objects
        let indicators = remote
            .get("indicators")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|i| match i {
                        Value::String(s) => Some(s.clone()),
                        other => other.get("id").and_then(Value::as_str).map(str::to_string),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            descriptions: Description::from_remote(&remote),
            internal_id,
            indicators,
        })
    }

    fn references_mut(&mut self) -> Vec<&mut String> {
        self.indicators.iter_mut().collect()
    }
}
