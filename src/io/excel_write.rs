use std::fs;
use std::path::Path;

use rust_xlsxwriter::{
    Chart, ChartAxis, ChartAxisCrossing, ChartAxisLabelPosition, ChartAxisTickType, ChartFont,
    ChartLegendPosition, ChartLine, ChartMarker, ChartType, ColNum, Color, Format, FormatPattern,
    Formula, RowNum,
};
use tracing::{debug, instrument};

use crate::error::{Result, ToolError};
use crate::io::{is_macro_enabled, package};
use crate::model::chart::{Axis, ScatterChart, SeriesRef};
use crate::model::{
    Cell, CellFormat, CellRef, CellValue, NumberFormat, VbaProject, Workbook, Worksheet,
};

/// Fallback for date cells that carry no number format of their own.
const DATE_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Writes the workbook model, charts included, to the given path.
///
/// An `.xlsm` target is always saved macro-enabled: with the workbook's macro
/// project when it has one, otherwise with the macro-enabled content type only.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn write_workbook(path: &Path, workbook: &Workbook) -> Result<()> {
    let mut workbook_writer = rust_xlsxwriter::Workbook::new();

    for sheet in workbook.sheets() {
        let worksheet = workbook_writer.add_worksheet();
        worksheet.set_name(sheet.name())?;
        write_layout(worksheet, sheet)?;

        for (at, cell) in sheet.cells() {
            let (row, col) = grid_position(at)?;
            let format = cell_format(sheet.format(at), cell.value.as_ref());
            write_cell(worksheet, row, col, cell, &format)?;
        }
        for (at, format) in sheet.formats() {
            if sheet.cell(at).is_none() {
                let (row, col) = grid_position(at)?;
                worksheet.write_blank(row, col, &cell_format(Some(format), None))?;
            }
        }

        for chart in sheet.charts() {
            let (row, col) = grid_position(chart.anchor)?;
            let rendered = render_chart(chart)?;
            worksheet.insert_chart(row, col, &rendered)?;
        }
        debug!(
            sheet = sheet.name(),
            cells = sheet.cell_count(),
            charts = sheet.charts().len(),
            "sheet written"
        );
    }

    match (is_macro_enabled(path), workbook.vba_project()) {
        (true, Some(project)) => {
            attach_vba_project(&mut workbook_writer, project)?;
            workbook_writer.save(path)?;
        }
        (true, None) => {
            let buffer = workbook_writer.save_to_buffer()?;
            package::save_macro_enabled(path, buffer)?;
        }
        (false, project) => {
            if project.is_some() {
                debug!("macro project not written to a non macro-enabled file");
            }
            workbook_writer.save(path)?;
        }
    }
    Ok(())
}

fn attach_vba_project(writer: &mut rust_xlsxwriter::Workbook, project: &VbaProject) -> Result<()> {
    // The writer only takes the project as a file path.
    let staging = tempfile::tempdir()?;
    let project_path = staging.path().join("vbaProject.bin");
    fs::write(&project_path, &project.project)?;

    match &project.signature {
        Some(signature) => {
            let signature_path = staging.path().join("vbaProjectSignature.bin");
            fs::write(&signature_path, signature)?;
            writer.add_vba_project_with_signature(&project_path, &signature_path)?;
        }
        None => {
            writer.add_vba_project(&project_path)?;
        }
    }
    Ok(())
}

/// Column widths, row heights and merged ranges. Runs before the cells so
/// their values and formats win over the merge padding.
fn write_layout(worksheet: &mut rust_xlsxwriter::Worksheet, sheet: &Worksheet) -> Result<()> {
    for width in sheet.column_widths() {
        let (_, first) = grid_position(CellRef::new(1, width.first))?;
        let (_, last) = grid_position(CellRef::new(1, width.last))?;
        worksheet.set_column_range_width_pixels(first, last, width.pixels)?;
    }
    for (row, height) in sheet.row_heights() {
        let (row, _) = grid_position(CellRef::new(row, 1))?;
        worksheet.set_row_height(row, height)?;
    }
    for range in sheet.merged_ranges() {
        if range.first == range.last {
            continue;
        }
        let (first_row, first_col) = grid_position(range.first)?;
        let (last_row, last_col) = grid_position(range.last)?;
        let anchor_format = cell_format(sheet.format(range.first), None);
        worksheet.merge_range(first_row, first_col, last_row, last_col, "", &Format::new())?;
        // merge_range leaves an empty string in the anchor cell.
        worksheet.write_blank(first_row, first_col, &anchor_format)?;
    }
    Ok(())
}

fn cell_format(format: Option<&CellFormat>, value: Option<&CellValue>) -> Format {
    let mut rendered = Format::new();
    let number_format = format.and_then(|format| format.number_format.as_ref());
    match number_format {
        Some(NumberFormat::Builtin(index)) => rendered = rendered.set_num_format_index(*index),
        Some(NumberFormat::Custom(code)) => rendered = rendered.set_num_format(code.as_str()),
        None if matches!(value, Some(CellValue::DateTime(_))) => {
            rendered = rendered.set_num_format(DATE_FORMAT);
        }
        None => {}
    }

    let Some(format) = format else {
        return rendered;
    };
    if format.bold {
        rendered = rendered.set_bold();
    }
    if format.italic {
        rendered = rendered.set_italic();
    }
    if let Some(color) = format.font_color {
        rendered = rendered.set_font_color(Color::RGB(color));
    }
    if let Some(color) = format.fill_color {
        rendered = rendered
            .set_pattern(FormatPattern::Solid)
            .set_background_color(Color::RGB(color));
    }
    rendered
}

fn write_cell(
    worksheet: &mut rust_xlsxwriter::Worksheet,
    row: RowNum,
    col: ColNum,
    cell: &Cell,
    format: &Format,
) -> Result<()> {
    if let Some(formula) = &cell.formula {
        let mut formula = Formula::new(formula);
        if let Some(cached) = &cell.value {
            formula = formula.set_result(formula_result(cached));
        }
        worksheet.write_formula_with_format(row, col, formula, format)?;
        return Ok(());
    }

    match &cell.value {
        Some(CellValue::Number(value)) | Some(CellValue::DateTime(value)) => {
            worksheet.write_number_with_format(row, col, *value, format)?;
        }
        Some(CellValue::Text(value)) => {
            worksheet.write_string_with_format(row, col, value, format)?;
        }
        Some(CellValue::Boolean(value)) => {
            worksheet.write_boolean_with_format(row, col, *value, format)?;
        }
        Some(CellValue::Error(code)) => {
            worksheet.write_string_with_format(row, col, code, format)?;
        }
        None => {}
    }
    Ok(())
}

fn formula_result(value: &CellValue) -> String {
    match value {
        CellValue::Text(text) => text.clone(),
        other => other.to_string(),
    }
}

fn grid_position(at: CellRef) -> Result<(RowNum, ColNum)> {
    let row = at
        .row
        .checked_sub(1)
        .ok_or_else(|| ToolError::InvalidAddress(at.to_string()))?;
    let col = at
        .col
        .checked_sub(1)
        .and_then(|col| ColNum::try_from(col).ok())
        .ok_or_else(|| ToolError::InvalidAddress(at.to_string()))?;
    Ok((row, col))
}

fn series_range(reference: &SeriesRef) -> Result<(&str, RowNum, ColNum, RowNum, ColNum)> {
    let (first_row, col) = grid_position(CellRef::new(reference.first_row, reference.col))?;
    let (last_row, _) = grid_position(CellRef::new(reference.last_row, reference.col))?;
    Ok((reference.sheet.as_str(), first_row, col, last_row, col))
}

fn render_chart(chart: &ScatterChart) -> Result<Chart> {
    let smooth = chart.series.iter().all(|series| series.smooth);
    let chart_type = if smooth {
        ChartType::ScatterSmooth
    } else {
        ChartType::ScatterStraight
    };
    let mut rendered = Chart::new(chart_type);

    if chart.vary_colors {
        debug!(anchor = %chart.anchor, "per-point colouring is not emitted for scatter charts");
    }

    for series in &chart.series {
        let categories = series_range(&series.x)?;
        let values = series_range(&series.y)?;

        let target = rendered.add_series();
        target
            .set_name(series.name.as_str())
            .set_categories(categories)
            .set_values(values)
            .set_smooth(series.smooth);

        if !series.show_markers {
            let mut marker = ChartMarker::new();
            marker.set_none();
            target.set_marker(&marker);
        }
    }

    match &chart.title {
        Some(title) => {
            rendered.title().set_name(title.as_str());
        }
        None => {
            rendered.title().set_hidden();
        }
    }

    if chart.legend {
        rendered.legend().set_position(ChartLegendPosition::Right);
    } else {
        rendered.legend().set_hidden();
    }

    render_axis(&chart.x_axis, rendered.x_axis());
    render_axis(&chart.y_axis, rendered.y_axis());

    rendered.set_width(chart.width).set_height(chart.height);
    Ok(rendered)
}

fn render_axis(axis: &Axis, target: &mut ChartAxis) {
    if let Some(min) = axis.min {
        target.set_min(min);
    }
    if let Some(max) = axis.max {
        target.set_max(max);
    }
    if let Some(unit) = axis.major_unit {
        target.set_major_unit(unit);
    }
    if let Some(unit) = axis.minor_unit {
        target.set_minor_unit(unit);
    }
    target.set_hidden(axis.hidden);

    if axis.labels_next_to_axis {
        target.set_label_position(ChartAxisLabelPosition::NextTo);
    }
    if axis.crosses_automatically {
        target.set_crossing(ChartAxisCrossing::Automatic);
    }
    if axis.major_ticks_outside {
        target.set_major_tick_type(ChartAxisTickType::Outside);
    }
    if axis.minor_ticks_outside {
        target.set_minor_tick_type(ChartAxisTickType::Outside);
    }
    if let Some(format) = &axis.number_format {
        target.set_num_format(format.as_str());
    }

    if let Some(title) = &axis.title {
        target.set_name(title.text.as_str());
        if title.bold {
            let mut font = ChartFont::new();
            font.set_bold();
            target.set_name_font(&font);
        }
    }

    if let Some(color) = axis.major_gridlines {
        let mut line = ChartLine::new();
        line.set_color(Color::RGB(color));
        target.set_major_gridlines(true).set_major_gridlines_line(&line);
    }
    if let Some(color) = axis.minor_gridlines {
        let mut line = ChartLine::new();
        line.set_color(Color::RGB(color));
        target.set_minor_gridlines(true).set_minor_gridlines_line(&line);
    }
}
