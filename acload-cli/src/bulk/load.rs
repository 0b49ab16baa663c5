//! Creation of every record in a load workbook
//!
//! Phases run in dependency order. Each phase resolves its references
//! against the records the previous phase created, so a failed dependency
//! shows up as an unresolved reference on its dependents instead of a
//! rejected request.

use anyhow::Result;

use crate::api::{AssetCentral, Transport};
use crate::entities::{Dimension, Entity, EntityKind, Indicator};
use crate::staging::{ResolutionPool, Staged, StagedSheet, StagingError, stage_workbook};
use crate::workbook::DataFile;
use crate::workbook::columns::{common, sheet_name};

use super::report::{BulkOperation, BulkReport, PhaseReport};

/// Create every record of the workbook and write the remote ids back into it.
///
/// Fails before any remote call when the sheet layout or row grouping is
/// broken. Past that point per-record failures are collected in the report.
/// The caller saves the file.
pub async fn load<T: Transport>(ac: &AssetCentral<T>, file: &mut DataFile) -> Result<BulkReport> {
    file.validate_layout()?;
    let staged = stage_workbook(file)?;
    let mut report = BulkReport::new(BulkOperation::Load);

    let dimensions = fetch_dimensions(ac, &staged.indicators).await;
    let check_indicator = |indicator: &Indicator| check_unit(indicator, dimensions.as_deref());

    let (indicators, phase) = run_phase(ac, file, staged.indicators, None, check_indicator).await?;
    report.phases.push(phase);

    let (groups, phase) =
        run_phase(ac, file, staged.indicator_groups, Some(&indicators), accept).await?;
    report.phases.push(phase);

    let (templates, phase) = run_phase(ac, file, staged.templates, Some(&groups), accept).await?;
    report.phases.push(phase);

    let (models, phase) = run_phase(ac, file, staged.models, Some(&templates), accept).await?;
    report.phases.push(phase);

    let (_, phase) = run_phase(ac, file, staged.equipment, Some(&models), accept).await?;
    report.phases.push(phase);

    Ok(report)
}

/// Create one sheet's records and write their ids back.
///
/// Returns the pool of records that are ready to be referenced; for models
/// that means created and published.
async fn run_phase<T, E, V>(
    ac: &AssetCentral<T>,
    file: &mut DataFile,
    staged: StagedSheet<E>,
    dependencies: Option<&ResolutionPool>,
    check: V,
) -> Result<(ResolutionPool, PhaseReport)>
where
    T: Transport,
    E: Entity,
    V: Fn(&E) -> Result<(), String>,
{
    let kind = E::KIND;
    let mut phase = PhaseReport::new(kind);
    let mut pool = ResolutionPool::new(kind);
    let mut created = Vec::new();

    log::info!("Loading {} {} records", staged.records.len(), kind);

    for rejected in staged.rejected {
        phase.fail(rejected.local_id, rejected.error);
    }

    for Staged { first_row, mut record } in staged.records {
        let local_id = record.local_id().to_string();

        if let Err(reason) = check(&record.fields) {
            let error = StagingError::InvalidRow {
                sheet: sheet_name(kind).to_string(),
                row: first_row,
                reason,
            };
            phase.fail(local_id, error);
            continue;
        }

        if let Some(dependencies) = dependencies {
            if let Err(e) = dependencies.resolve(&mut record) {
                phase.fail(local_id, e);
                continue;
            }
        }

        let saved = match ac.insert(record).await {
            Ok(saved) => saved,
            Err(e) => {
                phase.fail(local_id, e);
                continue;
            }
        };
        log::info!("Created {} '{}' ({})", kind, local_id, saved.remote_id);
        created.push((local_id.clone(), saved.remote_id.clone()));

        if kind == EntityKind::Model {
            // Equipment can only reference published models
            if let Err(e) = ac.publish_model(&saved.remote_id).await {
                pool.hold_back(&local_id, "created but not published");
                phase.fail(local_id, e.context("created but not published"));
                continue;
            }
            phase.published += 1;
        }

        pool.add(&saved);
        phase.succeeded.push(local_id);
    }

    let sheet = file.sheet_mut(kind)?;
    for (local_id, remote_id) in &created {
        sheet.write_where(common::INTERNAL_ID, local_id, common::AC_ID, remote_id.as_str());
    }

    Ok((pool, phase))
}

fn accept<E>(_: &E) -> Result<(), String> {
    Ok(())
}

/// Dimensions to check indicator units against, when any indicator has one
async fn fetch_dimensions<T: Transport>(
    ac: &AssetCentral<T>,
    indicators: &StagedSheet<Indicator>,
) -> Option<Vec<Dimension>> {
    let needed = indicators
        .records
        .iter()
        .any(|s| s.record.fields.unit().is_some());
    if !needed {
        return None;
    }

    match ac.dimensions().await {
        Ok(dimensions) => Some(dimensions),
        Err(e) => {
            log::warn!("Could not list dimensions, units are not checked before upload: {:#}", e);
            None
        }
    }
}

fn check_unit(indicator: &Indicator, dimensions: Option<&[Dimension]>) -> Result<(), String> {
    let (Some(uom), Some(dimensions)) = (indicator.unit(), dimensions) else {
        return Ok(());
    };

    match Dimension::find(dimensions, &uom.dimension) {
        None => Err(format!("unknown dimension '{}'", uom.dimension)),
        Some(dimension) if !dimension.has_unit(&uom.unit) => Err(format!(
            "dimension '{}' has no unit of measure '{}'",
            dimension.id, uom.unit
        )),
        Some(_) => Ok(()),
    }
}
