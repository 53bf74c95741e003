//! In-memory representation of a workbook: ordered worksheets, sparse cells,
//! their presentation and the scatter charts each sheet owns.

pub mod address;
pub mod chart;
pub mod format;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolError};

pub use address::{Anchor, CellRange, CellRef};
pub use chart::{Axis, ScatterChart, Series, SeriesRef};
pub use format::{CellFormat, ColumnWidth, NumberFormat};

/// Literal value stored in a cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    /// Floating point number.
    Number(f64),
    /// Plain string.
    Text(String),
    /// Boolean literal.
    Boolean(bool),
    /// Excel serial date/time.
    DateTime(f64),
    /// Error code such as `#DIV/0!`.
    Error(String),
}

impl CellValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(value) | CellValue::DateTime(value) => write!(f, "{value}"),
            CellValue::Text(value) => write!(f, "{value:?}"),
            CellValue::Boolean(value) => write!(f, "{}", if *value { "TRUE" } else { "FALSE" }),
            CellValue::Error(code) => f.write_str(code),
        }
    }
}

/// A populated cell. `value` is the literal (or the cached result of the
/// formula when one is present).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    pub value: Option<CellValue>,
    pub formula: Option<String>,
}

/// Named grid of cells plus the charts placed on it.
///
/// Formats live apart from values so that pasting or clearing a value leaves
/// the cell's look alone.
#[derive(Debug, Clone, PartialEq)]
pub struct Worksheet {
    name: String,
    cells: BTreeMap<CellRef, Cell>,
    formats: BTreeMap<CellRef, CellFormat>,
    column_widths: Vec<ColumnWidth>,
    row_heights: BTreeMap<u32, f64>,
    merged: Vec<CellRange>,
    charts: Vec<ScatterChart>,
}

impl Worksheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
            formats: BTreeMap::new(),
            column_widths: Vec::new(),
            row_heights: BTreeMap::new(),
            merged: Vec::new(),
            charts: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cell(&self, at: CellRef) -> Option<&Cell> {
        self.cells.get(&at)
    }

    pub fn value(&self, at: CellRef) -> Option<&CellValue> {
        self.cells.get(&at).and_then(|cell| cell.value.as_ref())
    }

    /// Stores a literal value, dropping any formula held by the cell. `None`
    /// clears the cell.
    pub fn set_value(&mut self, at: CellRef, value: Option<CellValue>) {
        match value {
            Some(value) => {
                self.cells.insert(
                    at,
                    Cell {
                        value: Some(value),
                        formula: None,
                    },
                );
            }
            None => {
                self.cells.remove(&at);
            }
        }
    }

    /// Stores a formula together with its cached result.
    pub fn set_formula(&mut self, at: CellRef, formula: impl Into<String>, cached: Option<CellValue>) {
        self.cells.insert(
            at,
            Cell {
                value: cached,
                formula: Some(formula.into()),
            },
        );
    }

    /// Populated cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (CellRef, &Cell)> {
        self.cells.iter().map(|(at, cell)| (*at, cell))
    }

    /// Populated cells inside `range`, row-major.
    pub fn cells_in<'a>(&'a self, range: &'a CellRange) -> impl Iterator<Item = (CellRef, &'a Cell)> + 'a {
        self.cells
            .range(range.first..=range.last)
            .filter(|(at, _)| at.col >= range.first.col && at.col <= range.last.col)
            .map(|(at, cell)| (*at, cell))
    }

    /// Removes every value and formula inside `range`. Formats stay.
    pub fn clear_values(&mut self, range: &CellRange) {
        let doomed: Vec<CellRef> = self.cells_in(range).map(|(at, _)| at).collect();
        for at in doomed {
            self.cells.remove(&at);
        }
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn format(&self, at: CellRef) -> Option<&CellFormat> {
        self.formats.get(&at)
    }

    /// Sets the cell's format; the default format removes the entry.
    pub fn set_format(&mut self, at: CellRef, format: CellFormat) {
        if format.is_default() {
            self.formats.remove(&at);
        } else {
            self.formats.insert(at, format);
        }
    }

    pub fn formats(&self) -> impl Iterator<Item = (CellRef, &CellFormat)> {
        self.formats.iter().map(|(at, format)| (*at, format))
    }

    pub fn column_widths(&self) -> &[ColumnWidth] {
        &self.column_widths
    }

    pub fn set_column_width(&mut self, width: ColumnWidth) {
        self.column_widths.push(width);
    }

    /// Rows with an explicit height, in points.
    pub fn row_heights(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.row_heights.iter().map(|(row, height)| (*row, *height))
    }

    pub fn set_row_height(&mut self, row: u32, points: f64) {
        self.row_heights.insert(row, points);
    }

    pub fn merged_ranges(&self) -> &[CellRange] {
        &self.merged
    }

    pub fn merge(&mut self, range: CellRange) {
        self.merged.push(range);
    }

    pub fn charts(&self) -> &[ScatterChart] {
        &self.charts
    }

    pub fn charts_mut(&mut self) -> &mut [ScatterChart] {
        &mut self.charts
    }

    pub fn add_chart(&mut self, chart: ScatterChart) {
        self.charts.push(chart);
    }

    /// Removes every chart on the sheet and returns how many were discarded.
    pub fn clear_charts(&mut self) -> usize {
        let removed = self.charts.len();
        self.charts.clear();
        removed
    }

    /// Copy of the sheet's cells and layout under a new name. Charts stay
    /// with the original.
    pub fn duplicate(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: self.cells.clone(),
            formats: self.formats.clone(),
            column_widths: self.column_widths.clone(),
            row_heights: self.row_heights.clone(),
            merged: self.merged.clone(),
            charts: Vec::new(),
        }
    }
}

/// Macro project of a macro-enabled workbook, kept byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VbaProject {
    /// Contents of `xl/vbaProject.bin`.
    pub project: Vec<u8>,
    /// Contents of `xl/vbaProjectSignature.bin`, for signed projects.
    pub signature: Option<Vec<u8>>,
}

/// Ordered collection of uniquely named worksheets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Worksheet>,
    vba_project: Option<VbaProject>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vba_project(&self) -> Option<&VbaProject> {
        self.vba_project.as_ref()
    }

    pub fn set_vba_project(&mut self, project: Option<VbaProject>) {
        self.vba_project = project;
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(Worksheet::name).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sheets.iter().any(|sheet| sheet.name == name)
    }

    pub fn sheets(&self) -> &[Worksheet] {
        &self.sheets
    }

    pub fn sheet(&self, name: &str) -> Option<&Worksheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Worksheet> {
        self.sheets.iter_mut().find(|sheet| sheet.name == name)
    }

    /// Looks up a sheet the caller cannot proceed without.
    pub fn require(&self, name: &str) -> Result<&Worksheet> {
        self.sheet(name)
            .ok_or_else(|| ToolError::MissingSheet(name.to_string()))
    }

    pub fn require_mut(&mut self, name: &str) -> Result<&mut Worksheet> {
        self.sheet_mut(name)
            .ok_or_else(|| ToolError::MissingSheet(name.to_string()))
    }

    /// Appends a sheet at the end of the workbook.
    pub fn push_sheet(&mut self, sheet: Worksheet) -> Result<&mut Worksheet> {
        if self.contains(&sheet.name) {
            return Err(ToolError::InvalidWorkbook(format!(
                "duplicate sheet name '{}'",
                sheet.name
            )));
        }
        self.sheets.push(sheet);
        let last = self.sheets.len() - 1;
        Ok(&mut self.sheets[last])
    }

    /// Returns the named sheet, appending an empty one if it does not exist yet.
    pub fn get_or_create(&mut self, name: &str) -> &mut Worksheet {
        match self.sheets.iter().position(|sheet| sheet.name == name) {
            Some(index) => &mut self.sheets[index],
            None => {
                self.sheets.push(Worksheet::new(name));
                let last = self.sheets.len() - 1;
                &mut self.sheets[last]
            }
        }
    }

    pub fn rename_sheet(&mut self, from: &str, to: &str) -> Result<()> {
        if from != to && self.contains(to) {
            return Err(ToolError::InvalidWorkbook(format!(
                "cannot rename '{from}': sheet '{to}' already exists"
            )));
        }
        let sheet = self.require_mut(from)?;
        sheet.name = to.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_value_drops_formula_and_none_clears() {
        let mut sheet = Worksheet::new("data");
        let at = CellRef::new(1, 1);
        sheet.set_formula(at, "SUM(B1:B3)", Some(CellValue::Number(6.0)));
        assert_eq!(sheet.cell(at).and_then(|c| c.formula.as_deref()), Some("SUM(B1:B3)"));

        sheet.set_value(at, Some(CellValue::Number(6.0)));
        assert_eq!(sheet.cell(at).unwrap().formula, None);

        sheet.set_value(at, None);
        assert!(sheet.cell(at).is_none());
    }

    #[test]
    fn values_and_formats_are_independent() {
        let mut sheet = Worksheet::new("data");
        let at = CellRef::new(2, 2);
        let bold = CellFormat {
            bold: true,
            ..CellFormat::default()
        };
        sheet.set_format(at, bold.clone());
        sheet.set_value(at, Some(CellValue::Number(1.0)));
        sheet.clear_values(&CellRange::parse("A1:C3").unwrap());

        assert!(sheet.cell(at).is_none());
        assert_eq!(sheet.format(at), Some(&bold));

        sheet.set_format(at, CellFormat::default());
        assert_eq!(sheet.formats().count(), 0);
    }

    #[test]
    fn cells_in_stays_inside_the_columns() {
        let mut sheet = Worksheet::new("data");
        for (row, col) in [(1, 1), (1, 2), (2, 1), (2, 3), (3, 2)] {
            sheet.set_value(CellRef::new(row, col), Some(CellValue::Number(1.0)));
        }
        let range = CellRange::parse("B1:C2").unwrap();
        let found: Vec<String> = sheet.cells_in(&range).map(|(at, _)| at.to_string()).collect();
        assert_eq!(found, vec!["B1", "C2"]);
    }

    #[test]
    fn duplicate_keeps_layout_but_not_charts() {
        let mut sheet = Worksheet::new("src");
        sheet.set_row_height(3, 24.0);
        sheet.merge(CellRange::parse("A1:C1").unwrap());
        sheet.set_column_width(ColumnWidth {
            first: 2,
            last: 2,
            pixels: 100,
        });
        sheet.add_chart(ScatterChart::new(CellRef::new(1, 1)));

        let copy = sheet.duplicate("copy");
        assert_eq!(copy.row_heights().collect::<Vec<_>>(), vec![(3, 24.0)]);
        assert_eq!(copy.merged_ranges(), sheet.merged_ranges());
        assert_eq!(copy.column_widths(), sheet.column_widths());
        assert!(copy.charts().is_empty());
    }

    #[test]
    fn rename_refuses_collisions() {
        let mut workbook = Workbook::new();
        workbook.push_sheet(Worksheet::new("a")).unwrap();
        workbook.push_sheet(Worksheet::new("b")).unwrap();
        assert!(workbook.rename_sheet("a", "b").is_err());
        workbook.rename_sheet("a", "c").unwrap();
        assert_eq!(workbook.sheet_names(), vec!["c", "b"]);
    }
}
