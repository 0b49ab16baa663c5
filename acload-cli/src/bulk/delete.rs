//! Removal of every record a load workbook points at

use std::collections::HashMap;

use anyhow::Result;

use crate::api::{AssetCentral, Transport};
use crate::entities::EntityKind;
use crate::workbook::DataFile;
use crate::workbook::columns::common;

use super::report::{BulkOperation, BulkReport, PhaseReport};

/// Delete the remote record behind every filled id cell, dependents first.
///
/// Each distinct id is deleted once. Cells are cleared only when their id
/// was deleted, so a failed run can be retried with the same file. The
/// caller saves the file.
pub async fn delete<T: Transport>(ac: &AssetCentral<T>, file: &mut DataFile) -> Result<BulkReport> {
    file.validate_layout()?;
    let mut report = BulkReport::new(BulkOperation::Delete);

    for kind in EntityKind::delete_order() {
        let phase = delete_sheet(ac, file, kind).await?;
        report.phases.push(phase);
    }

    Ok(report)
}

async fn delete_sheet<T: Transport>(
    ac: &AssetCentral<T>,
    file: &mut DataFile,
    kind: EntityKind,
) -> Result<PhaseReport> {
    let sheet = file.sheet_mut(kind)?;
    let mut phase = PhaseReport::new(kind);

    let targets: Vec<(usize, String, String)> = sheet
        .data_rows()
        .filter_map(|(row, _)| {
            let remote_id = sheet.cell_string(row, common::AC_ID)?;
            let local_id = sheet
                .cell_string(row, common::INTERNAL_ID)
                .unwrap_or_else(|| remote_id.clone());
            Some((row, local_id, remote_id))
        })
        .collect();

    log::info!("Deleting {} {} rows", targets.len(), kind);

    // Remote id -> whether its delete succeeded
    let mut handled: HashMap<String, bool> = HashMap::new();

    for (row, local_id, remote_id) in targets {
        match handled.get(&remote_id) {
            Some(true) => {
                sheet.clear(row, common::AC_ID);
                phase.skipped += 1;
                continue;
            }
            Some(false) => {
                log::warn!(
                    "{} '{}' ({}) left in place, its delete already failed",
                    kind,
                    local_id,
                    remote_id
                );
                phase.skipped += 1;
                continue;
            }
            None => {}
        }

        match ac.delete_remote_str(kind, &remote_id).await {
            Ok(()) => {
                log::info!("Deleted {} '{}' ({})", kind, local_id, remote_id);
                sheet.clear(row, common::AC_ID);
                handled.insert(remote_id.clone(), true);
                phase.succeeded.push(remote_id);
            }
            Err(e) => {
                phase.fail(local_id, e);
                handled.insert(remote_id, false);
            }
        }
    }

    Ok(phase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeAssetCentral;
    use crate::bulk::{fixtures, load};
    use crate::workbook::columns::common::AC_ID;
    use reqwest::Method;

    async fn loaded() -> (AssetCentral<FakeAssetCentral>, DataFile) {
        let fake = FakeAssetCentral::new();
        fake.add_dimension("TEMPERATURE", &["CEL"]);
        let ac = AssetCentral::new(fake);
        let mut file = fixtures::workbook();
        let report = load(&ac, &mut file).await.unwrap();
        assert!(!report.has_failures(), "{:?}", report);
        (ac, file)
    }

    fn filled_ids(file: &DataFile) -> usize {
        file.sheets()
            .iter()
            .map(|s| {
                s.data_rows()
                    .filter(|(row, _)| s.cell_string(*row, AC_ID).is_some())
                    .count()
            })
            .sum()
    }

    #[tokio::test]
    async fn test_delete_everything_dependents_first() {
        let (ac, mut file) = loaded().await;
        let before = ac.transport().requests().len();

        let report = delete(&ac, &mut file).await.unwrap();

        assert!(!report.has_failures(), "{:?}", report);
        assert_eq!(report.succeeded(), 7);
        for kind in EntityKind::LOAD_ORDER {
            assert_eq!(ac.transport().count(kind), 0, "{} left behind", kind);
        }
        assert_eq!(filled_ids(&file), 0);

        let kinds: Vec<EntityKind> = ac.transport().requests()[before..]
            .iter()
            .filter(|r| r.method == Method::DELETE)
            .map(|r| {
                EntityKind::LOAD_ORDER
                    .into_iter()
                    .find(|k| r.path.starts_with(k.path()))
                    .unwrap()
            })
            .collect();
        let mut expected = vec![EntityKind::Equipment, EntityKind::Equipment, EntityKind::Model];
        expected.extend([
            EntityKind::Template,
            EntityKind::IndicatorGroup,
            EntityKind::Indicator,
            EntityKind::Indicator,
        ]);
        assert_eq!(kinds, expected);
    }

    #[tokio::test]
    async fn test_repeated_id_deleted_once() {
        let (ac, mut file) = loaded().await;

        let report = delete(&ac, &mut file).await.unwrap();

        let groups = report.phase(EntityKind::IndicatorGroup).unwrap();
        assert_eq!(groups.succeeded.len(), 1);
        assert_eq!(groups.skipped, 1);
        let sheet = file.sheet(EntityKind::IndicatorGroup).unwrap();
        assert_eq!(sheet.cell_string(1, AC_ID), None);
        assert_eq!(sheet.cell_string(2, AC_ID), None);
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_id() {
        let (ac, mut file) = loaded().await;
        // Forget the indicator group; its indicators stay referenced
        let groups = file.sheet_mut(EntityKind::IndicatorGroup).unwrap();
        groups.clear(1, AC_ID);
        groups.clear(2, AC_ID);

        let report = delete(&ac, &mut file).await.unwrap();

        let indicators = report.phase(EntityKind::Indicator).unwrap();
        assert_eq!(indicators.failures.len(), 2);
        assert!(indicators.failures[0].error.contains("HTTP 409"));
        assert_eq!(indicators.failures[0].local_id, "IND1");
        assert_eq!(ac.transport().count(EntityKind::Indicator), 2);
        assert_eq!(ac.transport().count(EntityKind::Template), 0);

        let sheet = file.sheet(EntityKind::Indicator).unwrap();
        assert!(sheet.cell_string(1, AC_ID).is_some());
        assert!(sheet.cell_string(2, AC_ID).is_some());
    }

    #[tokio::test]
    async fn test_unknown_id_is_a_failure() {
        let ac = AssetCentral::new(FakeAssetCentral::new());
        let mut file = fixtures::workbook();
        file.sheet_mut(EntityKind::Model)
            .unwrap()
            .set_string(1, AC_ID, "00000000000000000000000000000000");

        let report = delete(&ac, &mut file).await.unwrap();

        assert_eq!(report.succeeded(), 0);
        assert_eq!(report.failed(), 1);
        assert!(report.phase(EntityKind::Model).unwrap().failures[0]
            .error
            .contains("HTTP 404"));
        assert_eq!(filled_ids(&file), 1);
    }

    #[tokio::test]
    async fn test_repeats_of_failed_id_are_counted() {
        let ac = AssetCentral::new(FakeAssetCentral::new());
        let mut file = fixtures::workbook();
        let sheet = file.sheet_mut(EntityKind::Equipment).unwrap();
        sheet.set_string(1, AC_ID, "GONE");
        sheet.set_string(2, AC_ID, "GONE");

        let report = delete(&ac, &mut file).await.unwrap();

        let equipment = report.phase(EntityKind::Equipment).unwrap();
        assert_eq!(equipment.failures.len(), 1);
        assert_eq!(equipment.skipped, 1);
        let deletes = ac
            .transport()
            .requests()
            .iter()
            .filter(|r| r.method == Method::DELETE)
            .count();
        assert_eq!(deletes, 1);
        assert_eq!(filled_ids(&file), 2);
    }

    #[tokio::test]
    async fn test_empty_workbook_makes_no_requests() {
        let ac = AssetCentral::new(FakeAssetCentral::new());
        let mut file = fixtures::workbook();

        let report = delete(&ac, &mut file).await.unwrap();

        assert_eq!(report.phases.len(), 5);
        assert_eq!(report.phases[0].kind, EntityKind::Equipment);
        assert!(ac.transport().requests().is_empty());
    }
}
