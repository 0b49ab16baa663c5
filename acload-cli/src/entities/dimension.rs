//! Units-of-measure dimensions (`/uom/dimensions`), read only

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub units: Vec<Unit>,
}

impl Dimension {
    pub fn has_unit(&self, unit: &str) -> bool {
        self.units.iter().any(|u| u.id.eq_ignore_ascii_case(unit))
    }

    /// Look up a dimension by id, case-insensitively
    pub fn find<'a>(dimensions: &'a [Dimension], id: &str) -> Option<&'a Dimension> {
        dimensions.iter().find(|d| d.id.eq_ignore_ascii_case(id))
    }
}
