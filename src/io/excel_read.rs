use std::path::Path;

use calamine::{Data, Range, Reader, Xlsx, open_workbook};
use tracing::{debug, instrument};

use crate::error::Result;
use crate::io::{package, styles};
use crate::model::{CellRef, CellValue, Workbook, Worksheet};

/// Reads every sheet of an `.xlsx`/`.xlsm` workbook into the in-memory model.
/// Cells keep their cached values; formula text is kept alongside. Cell
/// formats, sheet layout and any macro project come from the package itself.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn read_workbook(path: &Path) -> Result<Workbook> {
    let mut reader: Xlsx<_> = open_workbook(path)?;
    let mut workbook = Workbook::new();

    for name in reader.sheet_names() {
        let values = reader.worksheet_range(&name)?;
        let formulas = reader.worksheet_formula(&name)?;

        let sheet = workbook.push_sheet(Worksheet::new(name.clone()))?;
        ingest_values(sheet, &values);
        ingest_formulas(sheet, &formulas);
        debug!(sheet = %name, cells = sheet.cell_count(), "loaded sheet");
    }

    let mut archive = package::open_package(path)?;
    styles::attach_presentation(&mut archive, &mut workbook)?;
    workbook.set_vba_project(package::read_vba_project(&mut archive)?);

    Ok(workbook)
}

fn ingest_values(sheet: &mut Worksheet, range: &Range<Data>) {
    let Some((start_row, start_col)) = range.start() else {
        return;
    };

    for (row, col, cell) in range.used_cells() {
        if let Some(value) = data_to_value(cell) {
            let at = grid_to_cell(start_row, start_col, row, col);
            sheet.set_value(at, Some(value));
        }
    }
}

fn ingest_formulas(sheet: &mut Worksheet, range: &Range<String>) {
    let Some((start_row, start_col)) = range.start() else {
        return;
    };

    for (row, col, formula) in range.used_cells() {
        let formula = formula.trim();
        if formula.is_empty() {
            continue;
        }
        let at = grid_to_cell(start_row, start_col, row, col);
        let cached = sheet.value(at).cloned();
        sheet.set_formula(at, formula.trim_start_matches('='), cached);
    }
}

fn grid_to_cell(start_row: u32, start_col: u32, row: usize, col: usize) -> CellRef {
    CellRef::new(start_row + row as u32 + 1, start_col + col as u32 + 1)
}

fn data_to_value(cell: &Data) -> Option<CellValue> {
    match cell {
        Data::Empty => None,
        Data::Float(value) => Some(CellValue::Number(*value)),
        Data::Int(value) => Some(CellValue::Number(*value as f64)),
        Data::String(value) => Some(CellValue::Text(value.clone())),
        Data::Bool(value) => Some(CellValue::Boolean(*value)),
        Data::DateTime(value) => Some(CellValue::DateTime(value.as_f64())),
        Data::DateTimeIso(value) | Data::DurationIso(value) => {
            Some(CellValue::Text(value.clone()))
        }
        Data::Error(code) => Some(CellValue::Error(code.to_string())),
    }
}
