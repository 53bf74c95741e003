use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::chart::{StyleReport, generate_chart_sheet, style_chart_sheets};
use crate::copy::{BulkCopyReport, bulk_copy, paste_values_within};
use crate::error::Result;
use crate::io::{excel_read, excel_write, operated_path, validate_input};
use crate::layout::{IntraCopy, Layout};
use crate::model::Workbook;
use crate::sheets::{duplicate_targets, rename_originals};

/// What an `operate` run did to the workbook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperateReport {
    /// Names the duplicated sheets received, in target order.
    pub created: Vec<String>,
    pub renamed: Vec<String>,
    pub bulk: BulkCopyReport,
    pub charts: usize,
    pub style: StyleReport,
}

/// Result of processing a workbook file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperateOutcome {
    pub output: PathBuf,
    pub report: OperateReport,
}

/// Runs the full transformation on an in-memory workbook.
///
/// Order: duplicate targets, rename originals, paste within the renamed
/// originals, bulk copy from the baseline sheet, regenerate chart sheets,
/// style them.
#[instrument(level = "info", skip_all)]
pub fn operate(workbook: &mut Workbook, layout: &Layout) -> Result<OperateReport> {
    let mut report = OperateReport {
        created: duplicate_targets(workbook, &layout.duplication)?,
        renamed: rename_originals(workbook, &layout.duplication)?,
        ..OperateReport::default()
    };

    let intra_copies = layout
        .intra_copies
        .iter()
        .map(IntraCopy::placement)
        .collect::<Result<Vec<_>>>()?;
    for (range, anchor) in &intra_copies {
        for name in &layout.duplication.original_names {
            if let Some(sheet) = workbook.sheet_mut(name) {
                paste_values_within(sheet, range, *anchor)?;
            }
        }
    }

    report.bulk = bulk_copy(workbook, &layout.bulk_source, &layout.bulk_jobs)?;
    info!(
        copied = report.bulk.copied.len(),
        skipped = report.bulk.skipped.len(),
        "bulk copy finished"
    );

    for plan in &layout.chart_sheets {
        report.charts += generate_chart_sheet(workbook, plan, &layout.chart_grid)?;
    }

    report.style = style_chart_sheets(workbook, &layout.chart_sheet_names(), &layout.chart_style);
    Ok(report)
}

/// Loads `input`, runs [`operate`] and saves next to it as
/// `<stem>_operated<suffix>`. Nothing is written if any step fails.
#[instrument(level = "info", skip_all, fields(input = %input.display()))]
pub fn operate_file(input: &Path, layout: &Layout) -> Result<OperateOutcome> {
    validate_input(input)?;
    let mut workbook = excel_read::read_workbook(input)?;
    info!(sheets = workbook.sheets().len(), "workbook loaded");

    let report = operate(&mut workbook, layout)?;

    let output = operated_path(input);
    excel_write::write_workbook(&output, &workbook)?;
    info!(output = %output.display(), "workbook saved");
    Ok(OperateOutcome { output, report })
}
