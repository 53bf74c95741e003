//! Value-only paste between cell ranges, within one sheet or across sheets.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::Result;
use crate::model::{Anchor, CellRange, CellRef, CellValue, Workbook, Worksheet};

/// One transfer from the bulk-copy source sheet to a set of destinations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyJob {
    pub source_range: String,
    pub destinations: Vec<String>,
    pub anchor: Anchor,
}

impl CopyJob {
    pub fn new(source_range: &str, destinations: &[String], anchor: Anchor) -> Self {
        Self {
            source_range: source_range.to_string(),
            destinations: destinations.to_vec(),
            anchor,
        }
    }

    /// Source range and anchor, checked to fit the sheet.
    pub fn placement(&self) -> Result<(CellRange, CellRef)> {
        let range = CellRange::parse(&self.source_range)?;
        let anchor = self.anchor.to_cell()?;
        range.placed_at(anchor)?;
        Ok((range, anchor))
    }
}

/// Outcome of a bulk copy run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkCopyReport {
    /// `(job index, destination sheet)` pairs that received values.
    pub copied: Vec<(usize, String)>,
    /// Destination names that were not present in the workbook.
    pub skipped: Vec<String>,
}

/// Converts numeric-looking text to a number; every other value passes through.
///
/// Text qualifies when, once trimmed and with at most one `.` and one `-`
/// removed, only ASCII digits remain and the trimmed text parses as `f64`.
pub fn coerce_numeric(value: Option<&CellValue>) -> Option<CellValue> {
    match value {
        None => None,
        Some(CellValue::Text(text)) => Some(
            parse_numeric_text(text)
                .map(CellValue::Number)
                .unwrap_or_else(|| CellValue::Text(text.clone())),
        ),
        Some(other) => Some(other.clone()),
    }
}

fn parse_numeric_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let digits = trimmed.replacen('.', "", 1).replacen('-', "", 1);
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    trimmed.parse().ok()
}

/// Populated values of `range`, coerced, keyed by their offset from the
/// range's top-left corner. Empty cells are simply absent.
fn read_block(sheet: &Worksheet, range: &CellRange) -> Vec<(u32, u32, CellValue)> {
    sheet
        .cells_in(range)
        .filter_map(|(at, cell)| {
            coerce_numeric(cell.value.as_ref())
                .map(|value| (at.row - range.first.row, at.col - range.first.col, value))
        })
        .collect()
}

/// Clears `target` and writes the block into it, so empty source cells
/// empty their destination.
fn write_block(sheet: &mut Worksheet, target: &CellRange, block: Vec<(u32, u32, CellValue)>) {
    sheet.clear_values(target);
    for (row, col, value) in block {
        sheet.set_value(target.first.offset(row, col), Some(value));
    }
}

/// Pastes the values of `range` on `sheet` at `anchor` on the same sheet.
pub fn paste_values_within(sheet: &mut Worksheet, range: &CellRange, anchor: CellRef) -> Result<()> {
    let target = range.placed_at(anchor)?;
    let block = read_block(sheet, range);
    write_block(sheet, &target, block);
    Ok(())
}

/// Workbook-level paste; both sheets must exist. `source` and `destination`
/// may name the same sheet.
pub fn copy_values(
    workbook: &mut Workbook,
    source: &str,
    range: &CellRange,
    destination: &str,
    anchor: CellRef,
) -> Result<()> {
    let target = range.placed_at(anchor)?;
    let block = read_block(workbook.require(source)?, range);
    write_block(workbook.require_mut(destination)?, &target, block);
    Ok(())
}

/// Runs every job from `source`, skipping destinations the workbook lacks.
/// The source sheet itself is required.
#[instrument(level = "info", skip(workbook, jobs), fields(job_count = jobs.len()))]
pub fn bulk_copy(workbook: &mut Workbook, source: &str, jobs: &[CopyJob]) -> Result<BulkCopyReport> {
    workbook.require(source)?;
    let placements = jobs
        .iter()
        .map(CopyJob::placement)
        .collect::<Result<Vec<_>>>()?;
    let mut report = BulkCopyReport::default();

    for (index, (job, (range, anchor))) in jobs.iter().zip(placements).enumerate() {
        for destination in &job.destinations {
            if !workbook.contains(destination) {
                debug!(destination = %destination, "destination sheet absent, skipping");
                report.skipped.push(destination.clone());
                continue;
            }
            copy_values(workbook, source, &range, destination, anchor)?;
            report.copied.push((index, destination.clone()));
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> Option<CellValue> {
        coerce_numeric(Some(&CellValue::Text(value.to_string())))
    }

    #[test]
    fn numeric_text_becomes_number() {
        assert_eq!(text("42"), Some(CellValue::Number(42.0)));
        assert_eq!(text(" 3.25 "), Some(CellValue::Number(3.25)));
        assert_eq!(text("-0.5"), Some(CellValue::Number(-0.5)));
        assert_eq!(text("-.5"), Some(CellValue::Number(-0.5)));
    }

    #[test]
    fn other_text_passes_through() {
        for raw in ["abc", "1-2", "+5", "1e3", "1.2.3", "", " ", "--1"] {
            assert_eq!(text(raw), Some(CellValue::Text(raw.to_string())), "{raw:?}");
        }
    }

    #[test]
    fn non_text_values_pass_through() {
        assert_eq!(coerce_numeric(None), None);
        assert_eq!(
            coerce_numeric(Some(&CellValue::Number(1.5))),
            Some(CellValue::Number(1.5))
        );
        assert_eq!(
            coerce_numeric(Some(&CellValue::Boolean(true))),
            Some(CellValue::Boolean(true))
        );
    }

    #[test]
    fn overlapping_paste_reads_before_writing() {
        let mut sheet = Worksheet::new("s");
        for row in 1..=3 {
            sheet.set_value(CellRef::new(row, 1), Some(CellValue::Number(row as f64)));
        }
        let range = CellRange::parse("A1:A3").unwrap();
        paste_values_within(&mut sheet, &range, CellRef::new(2, 1)).unwrap();

        let column: Vec<_> = (1..=4)
            .map(|row| sheet.value(CellRef::new(row, 1)).and_then(CellValue::as_number))
            .collect();
        assert_eq!(column, vec![Some(1.0), Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn whole_sheet_range_copies_only_populated_cells() {
        let mut workbook = Workbook::new();
        let source = workbook.push_sheet(Worksheet::new("src")).unwrap();
        source.set_value(CellRef::new(5, 3), Some(CellValue::Text("1.5".into())));
        let destination = workbook.push_sheet(Worksheet::new("dst")).unwrap();
        destination.set_value(CellRef::new(900_000, 16_000), Some(CellValue::Number(2.0)));

        let range = CellRange::parse("A1:XFD1048576").unwrap();
        copy_values(&mut workbook, "src", &range, "dst", CellRef::new(1, 1)).unwrap();

        let destination = workbook.sheet("dst").unwrap();
        assert_eq!(destination.cell_count(), 1);
        assert_eq!(destination.value(CellRef::new(5, 3)), Some(&CellValue::Number(1.5)));
    }

    #[test]
    fn job_running_off_the_sheet_is_rejected_before_copying() {
        let mut workbook = Workbook::new();
        let source = workbook.push_sheet(Worksheet::new("src")).unwrap();
        source.set_value(CellRef::new(1, 1), Some(CellValue::Number(1.0)));
        workbook.push_sheet(Worksheet::new("dst")).unwrap();

        let destinations = ["dst".to_string()];
        let jobs = [
            CopyJob::new("A1:A2", &destinations, Anchor::new("B", 1)),
            CopyJob::new("A1:C1", &destinations, Anchor::new("XFC", 1)),
        ];
        let error = bulk_copy(&mut workbook, "src", &jobs).unwrap_err();
        assert!(matches!(error, crate::error::ToolError::InvalidAddress(_)));
        assert_eq!(workbook.sheet("dst").unwrap().cell_count(), 0);
    }
}
