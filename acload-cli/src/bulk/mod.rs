//! Bulk load and delete runs over a workbook
//!
//! A run stages the whole workbook first, then issues one awaited request at
//! a time. Failures of individual records are logged and collected in a
//! [`BulkReport`]; only layout and setup problems end a run early.

pub mod delete;
pub mod load;
pub mod report;

use std::path::Path;

use anyhow::{Context, Result};

use crate::api::{AssetCentral, Transport};
use crate::workbook::DataFile;

pub use delete::delete;
pub use load::load;
pub use report::{BulkOperation, BulkReport, Failure, PhaseReport};

/// Open `path`, run `operation` over it and save the updated ids once
pub async fn run_file<T: Transport>(
    ac: &AssetCentral<T>,
    operation: BulkOperation,
    path: &Path,
) -> Result<BulkReport> {
    let mut file = DataFile::open(path)?;

    let report = match operation {
        BulkOperation::Load => load(ac, &mut file).await?,
        BulkOperation::Delete => delete(ac, &mut file).await?,
    };

    file.save()
        .with_context(|| format!("Remote changes were made but {} could not be updated", path.display()))?;
    log::info!("Updated {}", file.path().display());
    Ok(report)
}
