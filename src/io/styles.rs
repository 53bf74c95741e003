//! Reads cell formats, column widths, row heights and merged ranges straight
//! from the package XML and attaches them to already loaded sheets.

use std::collections::HashMap;
use std::io::{Read, Seek};

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::{debug, warn};
use zip::ZipArchive;

use crate::error::Result;
use crate::io::package::{attribute, read_part_text, sheet_parts};
use crate::model::{CellFormat, CellRange, CellRef, ColumnWidth, NumberFormat, Workbook, Worksheet};

#[derive(Debug, Default)]
struct Font {
    bold: bool,
    italic: bool,
    color: Option<u32>,
}

#[derive(Debug, Default)]
struct Xf {
    num_fmt_id: u32,
    font_id: usize,
    fill_id: usize,
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    Other,
    Fonts,
    Fills,
    CellXfs,
}

/// Loads the presentation of every sheet in `workbook` from the package.
pub fn attach_presentation<R: Read + Seek>(archive: &mut ZipArchive<R>, workbook: &mut Workbook) -> Result<()> {
    let cell_formats = match read_part_text(archive, "xl/styles.xml")? {
        Some(xml) => parse_cell_formats(&xml)?,
        None => Vec::new(),
    };

    for (name, part) in sheet_parts(archive)? {
        let Some(sheet) = workbook.sheet_mut(&name) else {
            continue;
        };
        let Some(xml) = read_part_text(archive, &part)? else {
            warn!(sheet = %name, part = %part, "worksheet part missing from package");
            continue;
        };
        parse_sheet_layout(&xml, &cell_formats, sheet)?;
        debug!(
            sheet = %name,
            formats = sheet.formats().count(),
            merges = sheet.merged_ranges().len(),
            "loaded sheet presentation"
        );
    }
    Ok(())
}

/// Resolves `cellXfs` into one [`CellFormat`] per style index.
fn parse_cell_formats(xml: &str) -> Result<Vec<CellFormat>> {
    let mut custom_formats: HashMap<u32, String> = HashMap::new();
    let mut fonts: Vec<Font> = Vec::new();
    let mut fills: Vec<Option<u32>> = Vec::new();
    let mut solid_fill = false;
    let mut xfs: Vec<Xf> = Vec::new();
    let mut section = Section::Other;

    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                match e.local_name().as_ref() {
                    b"fonts" => section = Section::Fonts,
                    b"fills" => section = Section::Fills,
                    b"cellXfs" => section = Section::CellXfs,
                    _ => {}
                }
                style_element(&e, section, &mut custom_formats, &mut fonts, &mut fills, &mut solid_fill, &mut xfs)?;
            }
            Event::Empty(e) => {
                style_element(&e, section, &mut custom_formats, &mut fonts, &mut fills, &mut solid_fill, &mut xfs)?;
            }
            Event::End(e) => {
                if matches!(e.local_name().as_ref(), b"fonts" | b"fills" | b"cellXfs") {
                    section = Section::Other;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(xfs
        .iter()
        .map(|xf| {
            let font = fonts.get(xf.font_id);
            CellFormat {
                number_format: number_format(xf.num_fmt_id, &custom_formats),
                bold: font.is_some_and(|font| font.bold),
                italic: font.is_some_and(|font| font.italic),
                font_color: font.and_then(|font| font.color),
                fill_color: fills.get(xf.fill_id).copied().flatten(),
            }
        })
        .collect())
}

fn style_element(
    e: &BytesStart<'_>,
    section: Section,
    custom_formats: &mut HashMap<u32, String>,
    fonts: &mut Vec<Font>,
    fills: &mut Vec<Option<u32>>,
    solid_fill: &mut bool,
    xfs: &mut Vec<Xf>,
) -> Result<()> {
    match (section, e.local_name().as_ref()) {
        (_, b"numFmt") => {
            let id = attribute(e, b"numFmtId")?.and_then(|id| id.parse().ok());
            if let (Some(id), Some(code)) = (id, attribute(e, b"formatCode")?) {
                custom_formats.insert(id, code);
            }
        }
        (Section::Fonts, b"font") => fonts.push(Font::default()),
        (Section::Fonts, b"b") => {
            if let Some(font) = fonts.last_mut() {
                font.bold = flag(e)?;
            }
        }
        (Section::Fonts, b"i") => {
            if let Some(font) = fonts.last_mut() {
                font.italic = flag(e)?;
            }
        }
        (Section::Fonts, b"color") => {
            if let Some(font) = fonts.last_mut() {
                font.color = attribute(e, b"rgb")?.as_deref().and_then(parse_argb);
            }
        }
        (Section::Fills, b"fill") => {
            fills.push(None);
            *solid_fill = false;
        }
        (Section::Fills, b"patternFill") => {
            *solid_fill = attribute(e, b"patternType")?.as_deref() == Some("solid");
        }
        (Section::Fills, b"fgColor") if *solid_fill => {
            if let Some(fill) = fills.last_mut() {
                *fill = attribute(e, b"rgb")?.as_deref().and_then(parse_argb);
            }
        }
        (Section::CellXfs, b"xf") => {
            let number = |value: Option<String>| value.and_then(|v| v.parse::<usize>().ok()).unwrap_or(0);
            xfs.push(Xf {
                num_fmt_id: number(attribute(e, b"numFmtId")?) as u32,
                font_id: number(attribute(e, b"fontId")?),
                fill_id: number(attribute(e, b"fillId")?),
            });
        }
        _ => {}
    }
    Ok(())
}

/// `<b/>` is on; `<b val="0"/>` is off.
fn flag(e: &BytesStart<'_>) -> Result<bool> {
    Ok(!matches!(attribute(e, b"val")?.as_deref(), Some("0" | "false")))
}

fn number_format(id: u32, custom_formats: &HashMap<u32, String>) -> Option<NumberFormat> {
    if id == 0 {
        return None;
    }
    if let Some(code) = custom_formats.get(&id) {
        return Some(NumberFormat::Custom(code.clone()));
    }
    u8::try_from(id).ok().map(NumberFormat::Builtin)
}

/// `FFBFBFBF` (ARGB) or `BFBFBF` into an RGB value.
fn parse_argb(text: &str) -> Option<u32> {
    let rgb = text.get(text.len().checked_sub(6)?..)?;
    if !rgb.bytes().all(|byte| byte.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(rgb, 16).ok()
}

/// Excel stores column widths in character units; the writer takes pixels.
fn width_to_pixels(width: f64) -> u16 {
    (width * 7.0).round().clamp(0.0, f64::from(u16::MAX)) as u16
}

fn parse_sheet_layout(xml: &str, cell_formats: &[CellFormat], sheet: &mut Worksheet) -> Result<()> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"c" => {
                    let style = attribute(&e, b"s")?.and_then(|s| s.parse::<usize>().ok());
                    let format = style.and_then(|index| cell_formats.get(index));
                    if let (Some(format), Some(at)) = (format, attribute(&e, b"r")?) {
                        if !format.is_default() {
                            sheet.set_format(CellRef::parse(&at)?, format.clone());
                        }
                    }
                }
                b"col" => {
                    let bound = |value: Option<String>| value.and_then(|v| v.parse::<u32>().ok());
                    let first = bound(attribute(&e, b"min")?);
                    let last = bound(attribute(&e, b"max")?);
                    let width = attribute(&e, b"width")?.and_then(|w| w.parse::<f64>().ok());
                    if let (Some(first), Some(last), Some(width)) = (first, last, width) {
                        sheet.set_column_width(ColumnWidth {
                            first,
                            last,
                            pixels: width_to_pixels(width),
                        });
                    }
                }
                b"row" => {
                    let custom = matches!(attribute(&e, b"customHeight")?.as_deref(), Some("1" | "true"));
                    let row = attribute(&e, b"r")?.and_then(|r| r.parse::<u32>().ok());
                    let height = attribute(&e, b"ht")?.and_then(|h| h.parse::<f64>().ok());
                    if let (true, Some(row), Some(height)) = (custom, row, height) {
                        sheet.set_row_height(row, height);
                    }
                }
                b"mergeCell" => {
                    if let Some(range) = attribute(&e, b"ref")? {
                        sheet.merge(CellRange::parse(&range)?);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(())
}
