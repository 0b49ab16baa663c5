//! Equipment records (`/equipment`)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Description, Entity, EntityKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub descriptions: Vec<Description>,
    pub internal_id: String,
    #[serde(rename = "operatorID")]
    pub operator_id: String,
    /// Remote id of a published model
    pub model_id: String,
    #[serde(rename = "sourceBPRole", default = "defaults::source_bp_role")]
    pub source_bp_role: String,
    #[serde(default = "defaults::model_known")]
    pub model_known: bool,
    #[serde(default = "defaults::life_cycle")]
    pub life_cycle: String,
}

mod defaults {
    pub fn source_bp_role() -> String {
        "1".to_string()
    }
    pub fn model_known() -> bool {
        true
    }
    pub fn life_cycle() -> String {
        "2".to_string()
    }
}

impl Equipment {
    pub fn new(
        internal_id: impl Into<String>,
        description: Description,
        operator_id: impl Into<String>,
        model_id: impl Into<String>,
    ) -> Self {
        Self {
            descriptions: vec![description],
            internal_id: internal_id.into(),
            operator_id: operator_id.into(),
            model_id: model_id.into(),
            source_bp_role: defaults::source_bp_role(),
            model_known: defaults::model_known(),
            life_cycle: defaults::life_cycle(),
        }
    }
}

impl Entity for Equipment {
    const KIND: EntityKind = EntityKind::Equipment;

    fn internal_id(&self) -> &str {
        &self.internal_id
    }

    fn reconcile(remote: Value) -> Result<Self> {
        let text = |keys: &[&str]| {
            keys.iter()
                .find_map(|k| remote.get(*k).and_then(Value::as_str))
                .unwrap_or_default()
                .to_string()
        };

        let life_cycle = match remote.get("lifeCycle") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => defaults::life_cycle(),
        };

        Ok(Self {
            descriptions: Description::from_remote(&remote),
            internal_id: text(&["internalId"]),
            operator_id: text(&["operatorID", "operatorId", "operator"]),
            model_id: text(&["modelId", "modelID"]),
            source_bp_role: match text(&["sourceBPRole"]) {
                role if role.is_empty() => defaults::source_bp_role(),
                role => role,
            },
            model_known: remote
                .get("modelKnown")
                .and_then(Value::as_bool)
                .unwrap_or_else(defaults::model_known),
            life_cycle,
        })
    }

    fn references_mut(&mut self) -> Vec<&mut String> {
        vec![&mut self.model_id]
    }
}
