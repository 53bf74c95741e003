use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::model::chart::AxisTitle;
use crate::model::{ScatterChart, Workbook};

/// Failure to apply a single style property. These never abort a run.
#[derive(Debug, Error, PartialEq)]
pub enum StyleError {
    #[error("axis range {min}..{max} is empty")]
    InvalidRange { min: f64, max: f64 },

    #[error("axis unit must be positive, got {0}")]
    InvalidUnit(f64),

    #[error("number format is empty")]
    EmptyNumberFormat,

    #[error("invalid colour '{0}', expected six hex digits")]
    InvalidColor(String),

    #[error("size scale must be a positive finite number, got {0}")]
    InvalidScale(f64),
}

/// Look applied to every chart on the chart sheets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartStyle {
    pub x_min: f64,
    pub x_max: f64,
    pub x_major_unit: f64,
    pub x_minor_unit: Option<f64>,
    pub x_number_format: String,
    pub x_title: String,
    pub single_series_y_title: String,
    pub multi_series_y_title: String,
    pub major_gridline_color: String,
    pub minor_gridline_color: String,
    pub size_scale: f64,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            x_min: 0.0,
            x_max: 300.0,
            x_major_unit: 50.0,
            x_minor_unit: Some(50.0),
            x_number_format: "0".into(),
            x_title: "Frequency (Hz)".into(),
            single_series_y_title: "Ratio".into(),
            multi_series_y_title: "Power Spectrum (μG/√Hz)".into(),
            major_gridline_color: "BFBFBF".into(),
            minor_gridline_color: "E6E6E6".into(),
            size_scale: 0.95,
        }
    }
}

/// Tally of a styling pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StyleReport {
    pub charts: usize,
    pub failed_properties: usize,
}

/// Parses `BFBFBF` or `#BFBFBF` into an RGB value.
pub fn parse_color(text: &str) -> Result<u32, StyleError> {
    let hex = text.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.bytes().all(|byte| byte.is_ascii_hexdigit()) {
        return Err(StyleError::InvalidColor(text.to_string()));
    }
    u32::from_str_radix(hex, 16).map_err(|_| StyleError::InvalidColor(text.to_string()))
}

/// Runs one style step; a failure is logged and reported as `false`.
fn best_effort<F>(chart: &mut ScatterChart, location: &str, property: &str, step: F) -> bool
where
    F: FnOnce(&mut ScatterChart) -> Result<(), StyleError>,
{
    match step(chart) {
        Ok(()) => true,
        Err(error) => {
            warn!(chart = %location, property, %error, "style property not applied");
            false
        }
    }
}

fn positive(unit: f64) -> Result<f64, StyleError> {
    if unit.is_finite() && unit > 0.0 {
        Ok(unit)
    } else {
        Err(StyleError::InvalidUnit(unit))
    }
}

impl ChartStyle {
    fn x_scale(&self, chart: &mut ScatterChart) -> Result<(), StyleError> {
        if self.x_min.is_nan() || self.x_max.is_nan() || self.x_min >= self.x_max {
            return Err(StyleError::InvalidRange {
                min: self.x_min,
                max: self.x_max,
            });
        }
        let major = positive(self.x_major_unit)?;
        let minor = self.x_minor_unit.map(positive).transpose()?;

        let axis = &mut chart.x_axis;
        axis.min = Some(self.x_min);
        axis.max = Some(self.x_max);
        axis.major_unit = Some(major);
        axis.minor_unit = minor;
        Ok(())
    }

    fn y_scale(&self, chart: &mut ScatterChart) -> Result<(), StyleError> {
        chart.y_axis.min = None;
        chart.y_axis.max = None;
        Ok(())
    }

    fn visibility(&self, chart: &mut ScatterChart) -> Result<(), StyleError> {
        for axis in [&mut chart.x_axis, &mut chart.y_axis] {
            axis.hidden = false;
            axis.labels_next_to_axis = true;
            axis.crosses_automatically = true;
            axis.major_ticks_outside = true;
            axis.minor_ticks_outside = true;
        }
        Ok(())
    }

    fn x_number_format(&self, chart: &mut ScatterChart) -> Result<(), StyleError> {
        if self.x_number_format.trim().is_empty() {
            return Err(StyleError::EmptyNumberFormat);
        }
        chart.x_axis.number_format = Some(self.x_number_format.clone());
        Ok(())
    }

    fn titles(&self, chart: &mut ScatterChart) -> Result<(), StyleError> {
        chart.x_axis.title = Some(AxisTitle {
            text: self.x_title.clone(),
            bold: true,
        });
        let y_title = if chart.is_single_series() {
            &self.single_series_y_title
        } else {
            &self.multi_series_y_title
        };
        chart.y_axis.title = Some(AxisTitle {
            text: y_title.clone(),
            bold: false,
        });
        Ok(())
    }

    fn gridlines(&self, chart: &mut ScatterChart) -> Result<(), StyleError> {
        let major = parse_color(&self.major_gridline_color)?;
        let minor = parse_color(&self.minor_gridline_color)?;
        for axis in [&mut chart.x_axis, &mut chart.y_axis] {
            axis.major_gridlines = Some(major);
            axis.minor_gridlines = Some(minor);
        }
        Ok(())
    }

    fn size(&self, chart: &mut ScatterChart) -> Result<(), StyleError> {
        if !(self.size_scale.is_finite() && self.size_scale > 0.0) {
            return Err(StyleError::InvalidScale(self.size_scale));
        }
        chart.width = ((chart.width as f64) * self.size_scale).round().max(1.0) as u32;
        chart.height = ((chart.height as f64) * self.size_scale).round().max(1.0) as u32;
        Ok(())
    }

    /// Applies every property to one chart; returns how many steps failed.
    pub fn apply(&self, chart: &mut ScatterChart, location: &str) -> usize {
        let steps: [(&str, fn(&Self, &mut ScatterChart) -> Result<(), StyleError>); 7] = [
            ("x-axis scale", Self::x_scale),
            ("y-axis scale", Self::y_scale),
            ("axis visibility", Self::visibility),
            ("x-axis number format", Self::x_number_format),
            ("axis titles", Self::titles),
            ("gridlines", Self::gridlines),
            ("size", Self::size),
        ];

        let mut failed = 0;
        for (property, step) in steps {
            if !best_effort(chart, location, property, |chart| step(self, chart)) {
                failed += 1;
            }
        }
        failed
    }
}

/// Styles every chart on the named sheets. Sheets that do not exist are
/// skipped.
#[instrument(level = "info", skip_all, fields(sheet_count = sheets.len()))]
pub fn style_chart_sheets(workbook: &mut Workbook, sheets: &[String], style: &ChartStyle) -> StyleReport {
    let mut report = StyleReport::default();

    for name in sheets {
        let Some(sheet) = workbook.sheet_mut(name) else {
            debug!(sheet = %name, "chart sheet absent, not styled");
            continue;
        };

        for chart in sheet.charts_mut() {
            let location = format!("{name}!{}", chart.anchor);
            report.failed_properties += style.apply(chart, &location);
            report.charts += 1;
        }
    }

    info!(
        charts = report.charts,
        failed = report.failed_properties,
        "chart styling finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::generate::ChartGrid;
    use crate::model::chart::{DEFAULT_CHART_HEIGHT, DEFAULT_CHART_WIDTH};

    fn sample_charts() -> Vec<ScatterChart> {
        ChartGrid::default().charts_for_source("src", 0).unwrap()
    }

    #[test]
    fn default_style_sets_every_property() {
        let style = ChartStyle::default();
        let mut charts = sample_charts();
        let paired = &mut charts[0];
        assert_eq!(style.apply(paired, "test"), 0);

        assert_eq!(paired.x_axis.min, Some(0.0));
        assert_eq!(paired.x_axis.max, Some(300.0));
        assert_eq!(paired.x_axis.major_unit, Some(50.0));
        assert_eq!(paired.x_axis.number_format.as_deref(), Some("0"));
        assert_eq!(paired.y_axis.min, None);
        assert!(paired.y_axis.crosses_automatically);
        assert!(paired.y_axis.labels_next_to_axis);
        assert!(paired.x_axis.minor_ticks_outside);
        assert_eq!(
            paired.x_axis.title,
            Some(AxisTitle {
                text: "Frequency (Hz)".into(),
                bold: true
            })
        );
        assert_eq!(
            paired.y_axis.title.as_ref().map(|t| t.text.as_str()),
            Some("Power Spectrum (μG/√Hz)")
        );
        assert_eq!(paired.y_axis.major_gridlines, Some(0xBFBFBF));
        assert_eq!(paired.x_axis.minor_gridlines, Some(0xE6E6E6));
        assert_eq!(paired.width, 456);
        assert!(paired.height < DEFAULT_CHART_HEIGHT);

        let single = &mut charts[3];
        style.apply(single, "test");
        assert_eq!(
            single.y_axis.title.as_ref().map(|t| t.text.as_str()),
            Some("Ratio")
        );
    }

    #[test]
    fn failing_property_does_not_block_the_rest() {
        let style = ChartStyle {
            x_max: -1.0,
            major_gridline_color: "not-a-colour".into(),
            ..ChartStyle::default()
        };
        let mut chart = sample_charts().remove(0);

        assert_eq!(style.apply(&mut chart, "test"), 2);
        assert_eq!(chart.x_axis.min, None);
        assert_eq!(chart.x_axis.major_gridlines, None);
        assert!(chart.x_axis.title.is_some());
        assert_eq!(chart.x_axis.number_format.as_deref(), Some("0"));
        assert!(chart.width < DEFAULT_CHART_WIDTH);
    }

    #[test]
    fn parses_colours() {
        assert_eq!(parse_color("#BFBFBF"), Ok(0xBFBFBF));
        assert_eq!(parse_color("e6e6e6"), Ok(0xE6E6E6));
        assert!(parse_color("12345").is_err());
        assert!(parse_color("GGGGGG").is_err());
        assert_eq!(
            parse_color("+ABCDE"),
            Err(StyleError::InvalidColor("+ABCDE".into()))
        );
        assert!(parse_color("-00001").is_err());
    }
}
