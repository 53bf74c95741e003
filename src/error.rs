use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur when the
/// tool loads, transforms, or saves a workbook.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when a layout file cannot be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Errors from the zip container of an `.xlsx`/`.xlsm` package.
    #[error("package error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Malformed XML inside a package part.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the input is not an `.xlsx` or `.xlsm` workbook.
    #[error("unsupported file type (only .xlsx and .xlsm are accepted): {0}")]
    UnsupportedExtension(PathBuf),

    /// Raised when a sheet the workflow cannot run without is absent.
    #[error("required sheet is missing: '{0}'")]
    MissingSheet(String),

    /// Raised when a cell that must hold a number holds something else.
    #[error("value of {cell} on sheet '{sheet}' is not numeric: {value}")]
    NotNumeric {
        sheet: String,
        cell: String,
        value: String,
    },

    /// Raised when an average is requested over no values.
    #[error("cannot average an empty list of values")]
    EmptyAverage,

    /// Raised when an A1-style cell or range reference cannot be parsed.
    #[error("invalid cell reference '{0}'")]
    InvalidAddress(String),

    /// Raised when the workbook model cannot be represented in a file.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
