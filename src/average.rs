//! Mean of one cell across several sheets, written to a fresh workbook.

use std::path::Path;

use tracing::{info, instrument};

use crate::error::{Result, ToolError};
use crate::io::{excel_read, excel_write, validate_input};
use crate::model::{CellRef, CellValue, Workbook, Worksheet};

/// Where to read from and where to write the mean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AverageJob {
    pub sheets: Vec<String>,
    pub cell: String,
    pub output_sheet: String,
}

impl Default for AverageJob {
    fn default() -> Self {
        Self {
            sheets: ["1", "2", "3", "4", "5"].map(String::from).to_vec(),
            cell: "B11".into(),
            output_sheet: "6".into(),
        }
    }
}

/// Default output file name of the average command.
pub const DEFAULT_OUTPUT: &str = "완성본.xlsx";

/// Reads `cell` from each sheet. Every sheet must exist and hold a number.
pub fn collect_values(workbook: &Workbook, sheets: &[String], cell: &str) -> Result<Vec<f64>> {
    let at = CellRef::parse(cell)?;
    sheets
        .iter()
        .map(|name| {
            let sheet = workbook.require(name)?;
            match sheet.value(at) {
                Some(CellValue::Number(value)) => Ok(*value),
                other => Err(ToolError::NotNumeric {
                    sheet: name.clone(),
                    cell: at.to_string(),
                    value: other.map_or_else(|| "empty".to_string(), ToString::to_string),
                }),
            }
        })
        .collect()
}

pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(ToolError::EmptyAverage);
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Single-sheet workbook holding `value` at `cell`.
pub fn build_output(value: f64, sheet_name: &str, cell: &str) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let sheet = workbook.push_sheet(Worksheet::new(sheet_name))?;
    sheet.set_value(CellRef::parse(cell)?, Some(CellValue::Number(value)));
    Ok(workbook)
}

/// Reads the input, averages the configured cells and saves the result.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), output = %output.display())
)]
pub fn average_file(input: &Path, output: &Path, job: &AverageJob) -> Result<f64> {
    validate_input(input)?;
    let workbook = excel_read::read_workbook(input)?;

    let values = collect_values(&workbook, &job.sheets, &job.cell)?;
    info!(?values, "values read");
    let average = mean(&values)?;
    info!(average, "mean computed");

    let result = build_output(average, &job.output_sheet, &job.cell)?;
    excel_write::write_workbook(output, &result)?;
    Ok(average)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_values() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap(), 3.0);
        assert!(matches!(mean(&[]), Err(ToolError::EmptyAverage)));
    }

    #[test]
    fn non_numeric_cells_are_rejected() {
        let mut workbook = Workbook::new();
        let at = CellRef::parse("B11").unwrap();
        workbook
            .push_sheet(Worksheet::new("1"))
            .unwrap()
            .set_value(at, Some(CellValue::Number(2.0)));
        workbook
            .push_sheet(Worksheet::new("2"))
            .unwrap()
            .set_value(at, Some(CellValue::Boolean(true)));
        workbook.push_sheet(Worksheet::new("3")).unwrap();

        let sheets = |names: &[&str]| names.iter().map(|n| n.to_string()).collect::<Vec<_>>();

        assert_eq!(collect_values(&workbook, &sheets(&["1"]), "B11").unwrap(), vec![2.0]);
        assert!(matches!(
            collect_values(&workbook, &sheets(&["1", "2"]), "B11"),
            Err(ToolError::NotNumeric { sheet, value, .. }) if sheet == "2" && value == "TRUE"
        ));
        assert!(matches!(
            collect_values(&workbook, &sheets(&["3"]), "B11"),
            Err(ToolError::NotNumeric { value, .. }) if value == "empty"
        ));
        assert!(matches!(
            collect_values(&workbook, &sheets(&["9"]), "B11"),
            Err(ToolError::MissingSheet(name)) if name == "9"
        ));
    }
}
