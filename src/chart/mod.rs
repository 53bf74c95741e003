//! Scatter chart sheets: building the chart set from source sheets and
//! applying the shared look to it.

pub mod generate;
pub mod style;

pub use generate::{ChartGrid, ChartSheetPlan, generate_chart_sheet};
pub use style::{ChartStyle, StyleError, StyleReport, style_chart_sheets};
