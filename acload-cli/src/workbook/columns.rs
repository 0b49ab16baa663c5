//! Fixed sheet names and column layout of the load workbook
//!
//! Row 1 of every sheet is a header; data starts on row 2. Column indices
//! are zero based.

use crate::entities::EntityKind;

/// Sheets a load workbook must contain
pub const SHEET_NAMES: [&str; 5] = [
    "Indicator",
    "Indicator Group",
    "Model Template",
    "Model",
    "Equipment",
];

/// Columns shared by every sheet
pub mod common {
    pub const INTERNAL_ID: u16 = 0;
    pub const DESCRIPTION: u16 = 1;
    /// Remote id written back after create, cleared after delete
    pub const AC_ID: u16 = 2;
}

pub mod indicator {
    pub const DATA_TYPE: u16 = 3;
    pub const DIMENSION: u16 = 4;
    pub const UOM: u16 = 5;
    pub const EXPECTED_BEHAVIOUR: u16 = 6;
    pub const INDICATOR_CATEGORY: u16 = 7;
    pub const COLOR: u16 = 8;
}

pub mod indicator_group {
    /// Internal id of a member indicator, one per row
    pub const INDICATOR: u16 = 3;
}

pub mod template {
    /// Internal id of a member indicator group, one per row
    pub const INDICATOR_GROUP: u16 = 3;
}

pub mod model {
    pub const TEMPLATE: u16 = 3;
    pub const ORGANIZATION: u16 = 4;
}

pub mod equipment {
    pub const MODEL: u16 = 3;
    pub const OPERATOR: u16 = 4;
}

/// Sheet holding records of `kind`
pub fn sheet_name(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Indicator => SHEET_NAMES[0],
        EntityKind::IndicatorGroup => SHEET_NAMES[1],
        EntityKind::Template => SHEET_NAMES[2],
        EntityKind::Model => SHEET_NAMES[3],
        EntityKind::Equipment => SHEET_NAMES[4],
    }
}
