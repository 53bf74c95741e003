//! Sheet names, ranges and anchors the `operate` workflow runs against.
//!
//! [`Layout::default`] describes the vibration-measurement workbook. A JSON
//! file may override any top-level field; fields it omits keep their
//! defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::chart::{ChartGrid, ChartSheetPlan, ChartStyle};
use crate::copy::CopyJob;
use crate::error::Result;
use crate::model::{Anchor, CellRange, CellRef};
use crate::sheets::DuplicationPlan;

/// Value paste applied inside each renamed original sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntraCopy {
    pub range: String,
    pub anchor: Anchor,
}

impl IntraCopy {
    /// Range and anchor, checked to fit the sheet.
    pub fn placement(&self) -> Result<(CellRange, CellRef)> {
        let range = CellRange::parse(&self.range)?;
        let anchor = self.anchor.to_cell()?;
        range.placed_at(anchor)?;
        Ok((range, anchor))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub duplication: DuplicationPlan,
    pub intra_copies: Vec<IntraCopy>,
    /// Sheet holding the no-excitation baseline that feeds the bulk copy.
    pub bulk_source: String,
    pub bulk_jobs: Vec<CopyJob>,
    pub chart_sheets: Vec<ChartSheetPlan>,
    pub chart_grid: ChartGrid,
    pub chart_style: ChartStyle,
}

fn axis_names(pattern: &str) -> Vec<String> {
    ["x", "y", "z"]
        .iter()
        .map(|axis| pattern.replace("{}", axis))
        .collect()
}

impl Default for Layout {
    fn default() -> Self {
        let targets = axis_names("정반,xy stage-가진 {}축(3)");
        let copy_names = axis_names("xy stage-가진 {}축");
        let original_names = axis_names("정반-가진 {}축");

        let bulk_jobs = vec![
            CopyJob::new("B11:D2058", &original_names, Anchor::new("B", 11)),
            CopyJob::new("H11:H2058", &original_names, Anchor::new("H", 11)),
            CopyJob::new("E11:G2058", &copy_names, Anchor::new("B", 11)),
            CopyJob::new("I11:I2058", &copy_names, Anchor::new("H", 11)),
        ];
        let chart_sheets = vec![
            ChartSheetPlan::new("정반 가진 데이터 그림", &original_names),
            ChartSheetPlan::new("XY 가진 데이터 그림", &copy_names),
        ];

        Self {
            intra_copies: vec![
                IntraCopy {
                    range: "B11:D2058".into(),
                    anchor: Anchor::new("E", 11),
                },
                IntraCopy {
                    range: "H11:H2058".into(),
                    anchor: Anchor::new("I", 11),
                },
            ],
            bulk_source: "정반,xy stage-가진 안함".into(),
            bulk_jobs,
            chart_sheets,
            chart_grid: ChartGrid::default(),
            chart_style: ChartStyle::default(),
            duplication: DuplicationPlan {
                targets,
                copy_names,
                original_names,
            },
        }
    }
}

impl Layout {
    /// Reads a JSON layout file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Names of the sheets that receive charts.
    pub fn chart_sheet_names(&self) -> Vec<String> {
        self.chart_sheets
            .iter()
            .map(|plan| plan.destination.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_names_the_measurement_sheets() {
        let layout = Layout::default();
        assert_eq!(layout.duplication.targets[1], "정반,xy stage-가진 y축(3)");
        assert_eq!(layout.duplication.copy_names[2], "xy stage-가진 z축");
        assert_eq!(layout.duplication.original_names[0], "정반-가진 x축");
        assert_eq!(
            layout.chart_sheet_names(),
            vec!["정반 가진 데이터 그림", "XY 가진 데이터 그림"]
        );
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let layout: Layout =
            serde_json::from_str(r#"{"bulk_source": "baseline", "chart_style": {"x_max": 500.0}}"#)
                .expect("layout parsed");
        assert_eq!(layout.bulk_source, "baseline");
        assert_eq!(layout.chart_style.x_max, 500.0);
        assert_eq!(layout.chart_style.x_major_unit, 50.0);
        assert_eq!(layout.bulk_jobs, Layout::default().bulk_jobs);
    }
}
