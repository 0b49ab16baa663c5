//! Indicator records (`/indicators`)

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Description, Entity, EntityKind};

/// Indicator type code; the service only accepts "measured" for loaded data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorType {
    #[serde(rename = "type")]
    pub type_name: String,
    pub code: String,
    pub language_iso_code: String,
    pub description: String,
}

impl Default for IndicatorType {
    fn default() -> Self {
        Self {
            type_name: "IndicatorType".to_string(),
            code: "1".to_string(),
            language_iso_code: "en".to_string(),
            description: "measured".to_string(),
        }
    }
}

/// Dimension and unit of measure; the service requires both or neither
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitOfMeasure {
    pub dimension: String,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Indicator {
    pub descriptions: Vec<Description>,
    pub internal_id: String,
    #[serde(default = "default_indicator_type")]
    pub indicator_type: Vec<IndicatorType>,
    #[serde(default = "defaults::data_type")]
    pub data_type: String,
    #[serde(default = "defaults::aggregation_concept")]
    pub aggregation_concept: String,
    #[serde(default = "defaults::expected_behaviour")]
    pub expected_behaviour: String,
    #[serde(default = "defaults::indicator_category")]
    pub indicator_category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indicator_uom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indicator_color_code: Option<String>,
}

fn default_indicator_type() -> Vec<IndicatorType> {
    vec![IndicatorType::default()]
}

mod defaults {
    pub fn data_type() -> String {
        "numeric".to_string()
    }
    pub fn aggregation_concept() -> String {
        "6".to_string()
    }
    pub fn expected_behaviour() -> String {
        "3".to_string()
    }
    pub fn indicator_category() -> String {
        "1".to_string()
    }
}

impl Indicator {
    pub fn new(internal_id: impl Into<String>, description: Description) -> Self {
        Self {
            descriptions: vec![description],
            internal_id: internal_id.into(),
            indicator_type: default_indicator_type(),
            data_type: defaults::data_type(),
            aggregation_concept: defaults::aggregation_concept(),
            expected_behaviour: defaults::expected_behaviour(),
            indicator_category: defaults::indicator_category(),
            dimension1: None,
            indicator_uom: None,
            indicator_color_code: None,
        }
    }

    pub fn with_unit(mut self, uom: Option<UnitOfMeasure>) -> Self {
        match uom {
            Some(u) => {
                self.dimension1 = Some(u.dimension);
                self.indicator_uom = Some(u.unit);
            }
            None => {
                self.dimension1 = None;
                self.indicator_uom = None;
            }
        }
        self
    }

    /// Dimension/unit pair, if the indicator carries one
    pub fn unit(&self) -> Option<UnitOfMeasure> {
        match (&self.dimension1, &self.indicator_uom) {
            (Some(dimension), Some(unit)) => Some(UnitOfMeasure {
                dimension: dimension.clone(),
                unit: unit.clone(),
            }),
            _ => None,
        }
    }
}

impl UnitOfMeasure {
    /// Build from optional cells, rejecting a half-filled pair
    pub fn from_parts(dimension: Option<String>, unit: Option<String>) -> Result<Option<Self>> {
        match (dimension, unit) {
            (Some(dimension), Some(unit)) => Ok(Some(Self { dimension, unit })),
            (None, None) => Ok(None),
            (Some(d), None) => bail!("dimension '{}' given without a unit of measure", d),
            (None, Some(u)) => bail!("unit of measure '{}' given without a dimension", u),
        }
    }
}

impl Entity for Indicator {
    const KIND: EntityKind = EntityKind::Indicator;

    fn internal_id(&self) -> &str {
        &self.internal_id
    }

    fn reconcile(remote: Value) -> Result<Self> {
        let descriptions = Description::from_remote(&remote);
        let mut object = remote;
        if let Some(map) = object.as_object_mut() {
            map.insert("descriptions".to_string(), serde_json::to_value(&descriptions)?);
            // Queries report the unit as a nested object on some tenants
            if let Some(uom) = map.get("indicatorUom").and_then(|u| u.get("id")).cloned() {
                map.insert("indicatorUom".to_string(), uom);
            }
        }
        Ok(serde_json::from_value(object)?)
    }
}
