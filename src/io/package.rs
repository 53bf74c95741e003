//! Direct access to the zip package behind an `.xlsx`/`.xlsm` file, for the
//! parts the cell reader does not surface.

use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::Result;
use crate::model::VbaProject;

pub const VBA_PROJECT_PART: &str = "xl/vbaProject.bin";
pub const VBA_SIGNATURE_PART: &str = "xl/vbaProjectSignature.bin";
const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const WORKBOOK_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
pub const MACRO_WORKBOOK_CONTENT_TYPE: &str = "application/vnd.ms-excel.sheet.macroEnabled.main+xml";

pub fn open_package(path: &Path) -> Result<ZipArchive<File>> {
    Ok(ZipArchive::new(File::open(path)?)?)
}

/// Reads a whole part; `None` when the package has no such part.
pub fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<Vec<u8>>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(error) => return Err(error.into()),
    };
    let mut bytes = Vec::with_capacity(file.size() as usize);
    file.read_to_end(&mut bytes)?;
    Ok(Some(bytes))
}

pub fn read_part_text<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<String>> {
    match read_part(archive, name)? {
        Some(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        None => Ok(None),
    }
}

/// Value of the attribute whose local name is `key` (`r:id` matches `id`).
pub fn attribute(element: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// The macro project stored in the package, if any.
pub fn read_vba_project<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Option<VbaProject>> {
    let Some(project) = read_part(archive, VBA_PROJECT_PART)? else {
        return Ok(None);
    };
    let signature = read_part(archive, VBA_SIGNATURE_PART)?;
    debug!(
        bytes = project.len(),
        signed = signature.is_some(),
        "macro project found"
    );
    Ok(Some(VbaProject { project, signature }))
}

/// `(sheet name, part path)` pairs in workbook order, resolved through the
/// workbook relationships.
pub fn sheet_parts<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Vec<(String, String)>> {
    let workbook = read_part_text(archive, "xl/workbook.xml")?.unwrap_or_default();
    let relationships = read_part_text(archive, "xl/_rels/workbook.xml.rels")?.unwrap_or_default();

    let mut targets = Vec::new();
    let mut reader = Reader::from_str(&relationships);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) = (attribute(&e, b"Id")?, attribute(&e, b"Target")?) {
                    targets.push((id, resolve_target(&target)));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let mut sheets = Vec::new();
    let mut reader = Reader::from_str(&workbook);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                let (Some(name), Some(id)) = (attribute(&e, b"name")?, attribute(&e, b"id")?) else {
                    continue;
                };
                if let Some((_, target)) = targets.iter().find(|(rid, _)| *rid == id) {
                    sheets.push((name, target.clone()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(sheets)
}

fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{target}"),
    }
}

/// Writes `package` to `path` with the workbook part declared macro-enabled.
/// Every other part is copied unchanged.
pub fn save_macro_enabled(path: &Path, package: Vec<u8>) -> Result<()> {
    let mut archive = ZipArchive::new(Cursor::new(package))?;
    let mut writer = ZipWriter::new(File::create(path)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for index in 0..archive.len() {
        let entry = archive.by_index(index)?;
        if entry.name() != CONTENT_TYPES_PART {
            writer.raw_copy_file(entry)?;
            continue;
        }
        let mut content_types = String::new();
        let mut entry = entry;
        entry.read_to_string(&mut content_types)?;
        let patched = content_types.replace(WORKBOOK_CONTENT_TYPE, MACRO_WORKBOOK_CONTENT_TYPE);
        writer.start_file(CONTENT_TYPES_PART, options)?;
        writer.write_all(patched.as_bytes())?;
    }

    writer.finish()?;
    Ok(())
}
