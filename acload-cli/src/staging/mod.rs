//! Staging: tabular rows into one record per local id
//!
//! Rows are grouped by their local id column. Groups are emitted in order of
//! first appearance and every row of a group contributes its reference cell,
//! in row order. A key that reappears after another key has intervened is an
//! error: the workbook must keep each entity's rows together.

pub mod resolve;
pub mod sheets;

use std::collections::HashMap;

pub use resolve::{ResolutionPool, UnresolvedReferences};
pub use sheets::{StagedSheet, StagedWorkbook, stage_workbook};

use crate::entities::Unsaved;

/// Rows sharing one local id
#[derive(Debug, Clone, PartialEq)]
pub struct Group<R> {
    pub key: String,
    /// Sheet row index of the first row in the group
    pub first_row: usize,
    pub rows: Vec<R>,
}

/// Record built from a group, references still holding local ids
#[derive(Debug, Clone, PartialEq)]
pub struct Staged<E> {
    pub first_row: usize,
    pub record: Unsaved<E>,
}

/// Structural problems found while staging
#[derive(Debug, Clone, PartialEq)]
pub enum StagingError {
    /// The same local id appears in two separate runs of rows
    NonContiguousKey {
        sheet: String,
        key: String,
        first_row: usize,
        row: usize,
    },
    /// A required cell is empty
    MissingValue {
        sheet: String,
        row: usize,
        column: &'static str,
    },
    /// A row's values cannot form a valid record
    InvalidRow {
        sheet: String,
        row: usize,
        reason: String,
    },
}

impl std::fmt::Display for StagingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Row indices are zero based; spreadsheets number from 1
        match self {
            StagingError::NonContiguousKey {
                sheet,
                key,
                first_row,
                row,
            } => write!(
                f,
                "Sheet '{}': '{}' on row {} was already used on row {} with other rows in between; keep each id's rows together",
                sheet,
                key,
                row + 1,
                first_row + 1
            ),
            StagingError::MissingValue { sheet, row, column } => {
                write!(f, "Sheet '{}' row {}: {} is empty", sheet, row + 1, column)
            }
            StagingError::InvalidRow { sheet, row, reason } => {
                write!(f, "Sheet '{}' row {}: {}", sheet, row + 1, reason)
            }
        }
    }
}

impl std::error::Error for StagingError {}

/// Group `(row index, row)` pairs by key.
///
/// Rows whose key is `None` are skipped and do not break contiguity.
pub fn group_rows<R, I, F>(sheet: &str, rows: I, key_of: F) -> Result<Vec<Group<R>>, StagingError>
where
    I: IntoIterator<Item = (usize, R)>,
    F: Fn(&R) -> Option<String>,
{
    let mut groups: Vec<Group<R>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (row_idx, row) in rows {
        let Some(key) = key_of(&row) else {
            log::warn!("Sheet '{}' row {}: no internal id, skipped", sheet, row_idx + 1);
            continue;
        };

        if let Some(current) = groups.last_mut() {
            if current.key == key {
                current.rows.push(row);
                continue;
            }
        }

        if let Some(&earlier) = index.get(&key) {
            return Err(StagingError::NonContiguousKey {
                sheet: sheet.to_string(),
                key,
                first_row: groups[earlier].first_row,
                row: row_idx,
            });
        }

        index.insert(key.clone(), groups.len());
        groups.push(Group {
            key,
            first_row: row_idx,
            rows: vec![row],
        });
    }

    Ok(groups)
}
