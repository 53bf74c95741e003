//! Cell and sheet presentation carried alongside the values: number formats,
//! basic font and fill attributes, column widths, row heights and merges.

/// Number format of a cell: one of Excel's built-in ids or a format code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumberFormat {
    Builtin(u8),
    Custom(String),
}

/// Per-cell format. The default value means "General, plain font, no fill".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellFormat {
    pub number_format: Option<NumberFormat>,
    pub bold: bool,
    pub italic: bool,
    /// RGB font colour; `None` keeps the theme colour.
    pub font_color: Option<u32>,
    /// RGB colour of a solid fill.
    pub fill_color: Option<u32>,
}

impl CellFormat {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Width in pixels applied to the columns `first..=last` (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnWidth {
    pub first: u32,
    pub last: u32,
    pub pixels: u16,
}
