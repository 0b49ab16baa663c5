//! Model template records (`/templates`)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Description, Entity, EntityKind};

/// `{ "id": ... }` wrapper used for template member lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdString {
    pub id: String,
}

impl IdString {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

fn default_template_type() -> String {
    "3".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub descriptions: Vec<Description>,
    pub internal_id: String,
    #[serde(default)]
    pub indicator_groups: Vec<IdString>,
    #[serde(default)]
    pub industry_standards: Vec<String>,
    #[serde(default)]
    pub attribute_groups: Vec<IdString>,
    #[serde(rename = "type", default = "default_template_type")]
    pub template_type: String,
}

impl Template {
    pub fn new(internal_id: impl Into<String>, description: Description) -> Self {
        Self {
            descriptions: vec![description],
            internal_id: internal_id.into(),
            indicator_groups: Vec::new(),
            industry_standards: Vec::new(),
            attribute_groups: Vec::new(),
            template_type: default_template_type(),
        }
    }
}

impl Entity for Template {
    const KIND: EntityKind = EntityKind::Template;

    fn internal_id(&self) -> &str {
        &self.internal_id
    }

    fn reconcile(remote: Value) -> Result<Self> {
        let descriptions = Description::from_remote(&remote);
        let mut object = remote;
        if let Some(map) = object.as_object_mut() {
            map.insert("descriptions".to_string(), serde_json::to_value(&descriptions)?);
            // Queries report the template type as a nested code object
            if let Some(code) = map.get("type").and_then(|t| t.get("code")).cloned() {
                map.insert("type".to_string(), code);
            }
        }
        Ok(serde_json::from_value(object)?)
    }

    fn references_mut(&mut self) -> Vec<&mut String> {
        self.indicator_groups.iter_mut().map(|g| &mut g.id).collect()
    }
}
