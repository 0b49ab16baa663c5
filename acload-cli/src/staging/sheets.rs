//! Per-sheet record builders for the load workbook

use crate::entities::{
    Description, Entity, Equipment, IdString, Indicator, IndicatorGroup, Model, Template,
    UnitOfMeasure, Unsaved,
};
use crate::workbook::columns::{self, common};
use crate::workbook::{DataFile, Sheet};

use super::{Group, Staged, StagingError, group_rows};

/// A row group that could not become a record
#[derive(Debug, Clone, PartialEq)]
pub struct Rejected {
    pub local_id: String,
    pub error: StagingError,
}

/// Records staged from one sheet
#[derive(Debug, Clone, PartialEq)]
pub struct StagedSheet<E> {
    pub records: Vec<Staged<E>>,
    pub rejected: Vec<Rejected>,
}

impl<E> Default for StagedSheet<E> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

/// Every sheet of a load workbook, staged
#[derive(Debug, Clone, PartialEq)]
pub struct StagedWorkbook {
    pub indicators: StagedSheet<Indicator>,
    pub indicator_groups: StagedSheet<IndicatorGroup>,
    pub templates: StagedSheet<Template>,
    pub models: StagedSheet<Model>,
    pub equipment: StagedSheet<Equipment>,
}

/// Stage all five sheets without touching the remote service.
///
/// Fails outright on structural problems (a local id split across separate
/// runs of rows); row-level problems are collected per sheet as rejections.
pub fn stage_workbook(file: &DataFile) -> anyhow::Result<StagedWorkbook> {
    Ok(StagedWorkbook {
        indicators: stage_sheet(file.sheet(Indicator::KIND)?, build_indicator)?,
        indicator_groups: stage_sheet(file.sheet(IndicatorGroup::KIND)?, build_indicator_group)?,
        templates: stage_sheet(file.sheet(Template::KIND)?, build_template)?,
        models: stage_sheet(file.sheet(Model::KIND)?, build_model)?,
        equipment: stage_sheet(file.sheet(Equipment::KIND)?, build_equipment)?,
    })
}

/// Group a sheet's rows by internal id and build one record per group
pub fn stage_sheet<E, F>(sheet: &Sheet, build: F) -> Result<StagedSheet<E>, StagingError>
where
    E: Entity,
    F: Fn(&Sheet, &Group<usize>) -> Result<E, StagingError>,
{
    let rows = sheet.data_rows().map(|(idx, _)| (idx, idx));
    let groups = group_rows(&sheet.name, rows, |idx| {
        sheet.cell_string(*idx, common::INTERNAL_ID)
    })?;

    let mut staged = StagedSheet::default();
    for group in &groups {
        match build(sheet, group) {
            Ok(fields) => staged.records.push(Staged {
                first_row: group.first_row,
                record: Unsaved::new(fields),
            }),
            Err(error) => {
                log::warn!("{}", error);
                staged.rejected.push(Rejected {
                    local_id: group.key.clone(),
                    error,
                });
            }
        }
    }

    log::debug!(
        "Staged {} records from sheet '{}' ({} rejected)",
        staged.records.len(),
        sheet.name,
        staged.rejected.len()
    );
    Ok(staged)
}

fn required(sheet: &Sheet, row: usize, col: u16, column: &'static str) -> Result<String, StagingError> {
    sheet
        .cell_string(row, col)
        .ok_or_else(|| StagingError::MissingValue {
            sheet: sheet.name.clone(),
            row,
            column,
        })
}

fn description(sheet: &Sheet, group: &Group<usize>) -> Result<Description, StagingError> {
    required(sheet, group.first_row, common::DESCRIPTION, "description").map(Description::short_only)
}

/// Non-empty reference cells of every row in the group, in row order
fn references(sheet: &Sheet, group: &Group<usize>, col: u16) -> Vec<String> {
    group
        .rows
        .iter()
        .filter_map(|row| sheet.cell_string(*row, col))
        .collect()
}

/// Exactly one distinct reference across the group
fn single_reference(
    sheet: &Sheet,
    group: &Group<usize>,
    col: u16,
    column: &'static str,
) -> Result<String, StagingError> {
    let mut refs = references(sheet, group, col);
    refs.dedup();
    match refs.len() {
        0 => Err(StagingError::MissingValue {
            sheet: sheet.name.clone(),
            row: group.first_row,
            column,
        }),
        1 => Ok(refs.remove(0)),
        _ => Err(StagingError::InvalidRow {
            sheet: sheet.name.clone(),
            row: group.first_row,
            reason: format!("'{}' lists more than one {}: {}", group.key, column, refs.join(", ")),
        }),
    }
}

fn warn_extra_rows(sheet: &Sheet, group: &Group<usize>) {
    if group.rows.len() > 1 {
        log::warn!(
            "Sheet '{}': '{}' spans {} rows; only row {} is used",
            sheet.name,
            group.key,
            group.rows.len(),
            group.first_row + 1
        );
    }
}

fn build_indicator(sheet: &Sheet, group: &Group<usize>) -> Result<Indicator, StagingError> {
    use columns::indicator as cols;

    warn_extra_rows(sheet, group);
    let row = group.first_row;

    let unit = UnitOfMeasure::from_parts(
        sheet.cell_string(row, cols::DIMENSION),
        sheet.cell_string(row, cols::UOM),
    )
    .map_err(|e| StagingError::InvalidRow {
        sheet: sheet.name.clone(),
        row,
        reason: e.to_string(),
    })?;

    let mut indicator = Indicator::new(&group.key, description(sheet, group)?).with_unit(unit);
    if let Some(data_type) = sheet.cell_string(row, cols::DATA_TYPE) {
        indicator.data_type = data_type.to_lowercase();
    }
    if let Some(behaviour) = sheet.cell_string(row, cols::EXPECTED_BEHAVIOUR) {
        indicator.expected_behaviour = behaviour;
    }
    if let Some(category) = sheet.cell_string(row, cols::INDICATOR_CATEGORY) {
        indicator.indicator_category = category;
    }
    indicator.indicator_color_code = sheet.cell_string(row, cols::COLOR);

    Ok(indicator)
}

fn build_indicator_group(sheet: &Sheet, group: &Group<usize>) -> Result<IndicatorGroup, StagingError> {
    let mut record = IndicatorGroup::new(&group.key, description(sheet, group)?);
    record.indicators = references(sheet, group, columns::indicator_group::INDICATOR);
    Ok(record)
}

fn build_template(sheet: &Sheet, group: &Group<usize>) -> Result<Template, StagingError> {
    let mut record = Template::new(&group.key, description(sheet, group)?);
    record.indicator_groups = references(sheet, group, columns::template::INDICATOR_GROUP)
        .into_iter()
        .map(IdString::new)
        .collect();
    Ok(record)
}

fn build_model(sheet: &Sheet, group: &Group<usize>) -> Result<Model, StagingError> {
    use columns::model as cols;

    let template = single_reference(sheet, group, cols::TEMPLATE, "template")?;
    let organization = required(sheet, group.first_row, cols::ORGANIZATION, "organization id")?;
    Ok(Model::new(&group.key, description(sheet, group)?, template, organization))
}

fn build_equipment(sheet: &Sheet, group: &Group<usize>) -> Result<Equipment, StagingError> {
    use columns::equipment as cols;

    let model = single_reference(sheet, group, cols::MODEL, "model")?;
    let operator = required(sheet, group.first_row, cols::OPERATOR, "operator id")?;
    Ok(Equipment::new(&group.key, description(sheet, group)?, operator, model))
}
