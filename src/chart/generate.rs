use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::model::address::column_index;
use crate::model::{CellRef, ScatterChart, Series, SeriesRef, Workbook};

/// Which source sheets feed which chart sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSheetPlan {
    pub destination: String,
    pub sources: Vec<String>,
}

impl ChartSheetPlan {
    pub fn new(destination: &str, sources: &[String]) -> Self {
        Self {
            destination: destination.to_string(),
            sources: sources.to_vec(),
        }
    }
}

/// Placement and data columns shared by every chart sheet.
///
/// Source `k` gets two chart columns: `first_anchor_column + k * source_stride`
/// for the paired charts and that plus `right_offset` for the single-series
/// ones. Row `i` of `anchor_rows` plots `paired_columns[i]` on the left and
/// `single_columns[i]` on the right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartGrid {
    pub x_column: String,
    pub first_row: u32,
    pub last_row: u32,
    pub first_anchor_column: String,
    pub source_stride: u32,
    pub right_offset: u32,
    pub anchor_rows: Vec<u32>,
    pub paired_columns: Vec<[String; 2]>,
    pub single_columns: Vec<String>,
    pub before_name: String,
    pub after_name: String,
    pub single_name: String,
}

impl Default for ChartGrid {
    fn default() -> Self {
        let pair = |a: &str, b: &str| [a.to_string(), b.to_string()];
        Self {
            x_column: "K".into(),
            first_row: 12,
            last_row: 2058,
            first_anchor_column: "A".into(),
            source_stride: 16,
            right_offset: 8,
            anchor_rows: vec![1, 15, 31],
            paired_columns: vec![pair("L", "M"), pair("N", "O"), pair("R", "S")],
            single_columns: vec!["U".into(), "V".into(), "W".into()],
            before_name: "정반 가진 전".into(),
            after_name: "정반 가진 후".into(),
            single_name: "정반 가진 전/후".into(),
        }
    }
}

impl ChartGrid {
    fn column_ref(&self, sheet: &str, col: u32) -> SeriesRef {
        SeriesRef {
            sheet: sheet.to_string(),
            col,
            first_row: self.first_row,
            last_row: self.last_row,
        }
    }

    fn series(&self, sheet: &str, x_col: u32, y_col: u32, name: &str) -> Series {
        Series {
            name: name.to_string(),
            x: self.column_ref(sheet, x_col),
            y: self.column_ref(sheet, y_col),
            smooth: true,
            show_markers: false,
        }
    }

    /// The six charts of one source sheet: paired charts first, then singles.
    pub fn charts_for_source(&self, source: &str, index: u32) -> Result<Vec<ScatterChart>> {
        let x_col = column_index(&self.x_column)?;
        let left = column_index(&self.first_anchor_column)? + index * self.source_stride;
        let right = left + self.right_offset;
        let mut charts = Vec::with_capacity(self.anchor_rows.len() * 2);

        for (row, [before, after]) in self.anchor_rows.iter().zip(&self.paired_columns) {
            let mut chart = blank_chart(CellRef::new(*row, left));
            chart
                .series
                .push(self.series(source, x_col, column_index(before)?, &self.before_name));
            chart
                .series
                .push(self.series(source, x_col, column_index(after)?, &self.after_name));
            charts.push(chart);
        }

        for (row, column) in self.anchor_rows.iter().zip(&self.single_columns) {
            let mut chart = blank_chart(CellRef::new(*row, right));
            chart
                .series
                .push(self.series(source, x_col, column_index(column)?, &self.single_name));
            charts.push(chart);
        }

        Ok(charts)
    }
}

fn blank_chart(anchor: CellRef) -> ScatterChart {
    let mut chart = ScatterChart::new(anchor);
    chart.vary_colors = false;
    chart.legend = true;
    chart.title = None;
    chart.x_axis.title = None;
    chart.y_axis.title = None;
    chart
}

/// Replaces the charts on the plan's destination sheet, creating the sheet if
/// needed. Source sheets that are absent contribute no charts.
#[instrument(level = "info", skip_all, fields(destination = %plan.destination))]
pub fn generate_chart_sheet(
    workbook: &mut Workbook,
    plan: &ChartSheetPlan,
    grid: &ChartGrid,
) -> Result<usize> {
    let mut charts = Vec::new();
    for (index, source) in plan.sources.iter().enumerate() {
        if !workbook.contains(source) {
            debug!(source = %source, "chart source sheet absent, skipping");
            continue;
        }
        charts.extend(grid.charts_for_source(source, index as u32)?);
    }

    let destination = workbook.get_or_create(&plan.destination);
    let discarded = destination.clear_charts();
    let created = charts.len();
    for chart in charts {
        destination.add_chart(chart);
    }

    info!(created, discarded, "chart sheet regenerated");
    Ok(created)
}
