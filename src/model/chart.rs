use crate::model::address::CellRef;

/// Default chart size in pixels, matching what the writer uses when no size
/// is set.
pub const DEFAULT_CHART_WIDTH: u32 = 480;
pub const DEFAULT_CHART_HEIGHT: u32 = 288;

#[derive(Debug, Clone, PartialEq)]
pub struct AxisTitle {
    pub text: String,
    pub bold: bool,
}

/// Axis attributes. `None` or `false` leaves the attribute to the application
/// default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Axis {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub major_unit: Option<f64>,
    pub minor_unit: Option<f64>,
    pub hidden: bool,
    /// Tick labels pinned next to the axis rather than left to the default.
    pub labels_next_to_axis: bool,
    /// The other axis crosses this one at its automatic zero point.
    pub crosses_automatically: bool,
    pub major_ticks_outside: bool,
    pub minor_ticks_outside: bool,
    pub number_format: Option<String>,
    pub title: Option<AxisTitle>,
    /// RGB colour of the major gridlines; `None` hides them.
    pub major_gridlines: Option<u32>,
    /// RGB colour of the minor gridlines; `None` hides them.
    pub minor_gridlines: Option<u32>,
}

/// Single column of cells on a sheet, used as X or Y data of a series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRef {
    pub sheet: String,
    pub col: u32,
    pub first_row: u32,
    pub last_row: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub x: SeriesRef,
    pub y: SeriesRef,
    pub smooth: bool,
    pub show_markers: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterChart {
    pub anchor: CellRef,
    pub series: Vec<Series>,
    pub vary_colors: bool,
    /// Legend on the right-hand side; hidden when `false`.
    pub legend: bool,
    pub title: Option<String>,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub width: u32,
    pub height: u32,
}

impl ScatterChart {
    pub fn new(anchor: CellRef) -> Self {
        Self {
            anchor,
            series: Vec::new(),
            vary_colors: false,
            legend: true,
            title: None,
            x_axis: Axis::default(),
            y_axis: Axis::default(),
            width: DEFAULT_CHART_WIDTH,
            height: DEFAULT_CHART_HEIGHT,
        }
    }

    pub fn is_single_series(&self) -> bool {
        self.series.len() == 1
    }
}
