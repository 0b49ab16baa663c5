//! Model records (`/models`)
//!
//! A model is created against exactly one primary template and must be
//! published before equipment can reference it.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Description, Entity, EntityKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryTemplate {
    pub id: String,
    #[serde(default = "primary_default")]
    pub primary: bool,
}

fn primary_default() -> bool {
    true
}

impl PrimaryTemplate {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            primary: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub descriptions: Vec<Description>,
    pub internal_id: String,
    pub templates: Vec<PrimaryTemplate>,
    #[serde(rename = "organizationID")]
    pub organization_id: String,
}

impl Model {
    pub fn new(
        internal_id: impl Into<String>,
        description: Description,
        template: impl Into<String>,
        organization_id: impl Into<String>,
    ) -> Self {
        Self {
            descriptions: vec![description],
            internal_id: internal_id.into(),
            templates: vec![PrimaryTemplate::new(template)],
            organization_id: organization_id.into(),
        }
    }

    /// Id of the primary template, if any
    pub fn primary_template(&self) -> Option<&str> {
        self.templates
            .iter()
            .find(|t| t.primary)
            .map(|t| t.id.as_str())
    }
}

impl Entity for Model {
    const KIND: EntityKind = EntityKind::Model;

    fn internal_id(&self) -> &str {
        &self.internal_id
    }

    fn reconcile(remote: Value) -> Result<Self> {
        let text = |key: &str| {
            remote
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        let mut templates: Vec<PrimaryTemplate> = match remote.get("templates") {
            Some(list @ Value::Array(_)) => serde_json::from_value(list.clone())?,
            _ => Vec::new(),
        };
        // Queries may only report the primary template as a flat id
        if templates.is_empty() {
            let flat = text("primaryTemplateId");
            if !flat.is_empty() {
                templates.push(PrimaryTemplate::new(flat));
            }
        }

        let organization_id = match text("organizationID") {
            id if id.is_empty() => text("organizationId"),
            id => id,
        };

        Ok(Self {
            descriptions: Description::from_remote(&remote),
            internal_id: text("internalId"),
            templates,
            organization_id,
        })
    }

    fn references_mut(&mut self) -> Vec<&mut String> {
        self.templates.iter_mut().map(|t| &mut t.id).collect()
    }
}
