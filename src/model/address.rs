use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolError};

/// Largest column index Excel accepts (`XFD`).
pub const MAX_COLUMN: u32 = 16_384;
/// Largest row index Excel accepts.
pub const MAX_ROW: u32 = 1_048_576;

/// A single cell position. Rows and columns are 1-based, matching A1 notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Parses an A1-style reference such as `B11` or `$AG$1`.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || ToolError::InvalidAddress(text.to_string());
        let clean = text.trim().replace('$', "");
        let split = clean
            .find(|ch: char| ch.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (letters, digits) = clean.split_at(split);
        let col = column_index(letters).map_err(|_| invalid())?;
        let row: u32 = digits.parse().map_err(|_| invalid())?;
        if row == 0 || row > MAX_ROW {
            return Err(invalid());
        }
        Ok(Self { row, col })
    }

    /// Returns the position shifted by the given row and column offsets.
    pub fn offset(self, rows: u32, cols: u32) -> Self {
        Self {
            row: self.row + rows,
            col: self.col + cols,
        }
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letters(self.col), self.row)
    }
}

impl FromStr for CellRef {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Rectangular block of cells, normalised so `first` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub first: CellRef,
    pub last: CellRef,
}

impl CellRange {
    /// Parses `B11:D2058`; a lone `H11` is treated as a one-cell range.
    pub fn parse(text: &str) -> Result<Self> {
        let mut parts = text.split(':');
        let a = parts.next().unwrap_or("");
        let b = parts.next().unwrap_or(a);
        if parts.next().is_some() {
            return Err(ToolError::InvalidAddress(text.to_string()));
        }

        let lhs = CellRef::parse(a)?;
        let rhs = CellRef::parse(b)?;
        Ok(Self {
            first: CellRef::new(lhs.row.min(rhs.row), lhs.col.min(rhs.col)),
            last: CellRef::new(lhs.row.max(rhs.row), lhs.col.max(rhs.col)),
        })
    }

    pub fn height(&self) -> u32 {
        self.last.row - self.first.row + 1
    }

    pub fn width(&self) -> u32 {
        self.last.col - self.first.col + 1
    }

    pub fn contains(&self, at: CellRef) -> bool {
        (self.first.row..=self.last.row).contains(&at.row)
            && (self.first.col..=self.last.col).contains(&at.col)
    }

    /// The block of the same shape with its top-left corner at `anchor`.
    /// Fails when that block would run past the last row or column.
    pub fn placed_at(&self, anchor: CellRef) -> Result<Self> {
        let last_row = anchor
            .row
            .checked_add(self.height() - 1)
            .filter(|row| *row <= MAX_ROW);
        let last_col = anchor
            .col
            .checked_add(self.width() - 1)
            .filter(|col| *col <= MAX_COLUMN);
        match (last_row, last_col) {
            (Some(row), Some(col)) if anchor.row > 0 && anchor.col > 0 => Ok(Self {
                first: anchor,
                last: CellRef::new(row, col),
            }),
            _ => Err(ToolError::InvalidAddress(format!("{self} placed at {anchor}"))),
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.first, self.last)
    }
}

impl FromStr for CellRange {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Converts column letters (`A`, `Z`, `AA`) into a 1-based index.
pub fn column_index(letters: &str) -> Result<u32> {
    let invalid = || ToolError::InvalidAddress(letters.to_string());
    if letters.is_empty() {
        return Err(invalid());
    }

    let mut col: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return Err(invalid());
        }
        let uc = ch.to_ascii_uppercase() as u8;
        col = col
            .checked_mul(26)
            .and_then(|value| value.checked_add(u32::from(uc - b'A' + 1)))
            .ok_or_else(invalid)?;
    }
    if col > MAX_COLUMN {
        return Err(invalid());
    }
    Ok(col)
}

/// Converts a 1-based column index back into letters.
pub fn column_letters(col: u32) -> String {
    let mut result = String::new();
    let mut n = col;
    while n > 0 {
        let rem = (n - 1) % 26;
        result.insert(0, (b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    result
}

/// Destination anchor expressed the way copy jobs are written: a column and a
/// starting row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    pub column: String,
    pub row: u32,
}

impl Anchor {
    pub fn new(column: impl Into<String>, row: u32) -> Self {
        Self {
            column: column.into(),
            row,
        }
    }

    pub fn to_cell(&self) -> Result<CellRef> {
        if self.row == 0 || self.row > MAX_ROW {
            return Err(ToolError::InvalidAddress(format!(
                "{}{}",
                self.column, self.row
            )));
        }
        Ok(CellRef::new(self.row, column_index(&self.column)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters_round_trip() {
        assert_eq!(column_index("A").unwrap(), 1);
        assert_eq!(column_index("K").unwrap(), 11);
        assert_eq!(column_index("AG").unwrap(), 33);
        assert_eq!(column_index("ao").unwrap(), 41);
        assert_eq!(column_letters(27), "AA");
        assert_eq!(column_letters(MAX_COLUMN), "XFD");
    }

    #[test]
    fn rejects_invalid_columns() {
        assert!(column_index("").is_err());
        assert!(column_index("A1").is_err());
        assert!(column_index("XFE").is_err());
    }

    #[test]
    fn parses_cells_and_ranges() {
        assert_eq!(CellRef::parse("$B$11").unwrap(), CellRef::new(11, 2));
        assert!(CellRef::parse("B0").is_err());
        assert!(CellRef::parse("11").is_err());

        let range = CellRange::parse("D2058:B11").unwrap();
        assert_eq!(range.first, CellRef::new(11, 2));
        assert_eq!(range.last, CellRef::new(2058, 4));
        assert_eq!(range.height(), 2048);
        assert_eq!(range.width(), 3);
        assert_eq!(range.to_string(), "B11:D2058");

        let single = CellRange::parse("H11").unwrap();
        assert_eq!(single.first, single.last);
        assert!(CellRange::parse("A1:B2:C3").is_err());
    }

    #[test]
    fn placement_must_fit_the_sheet() {
        let range = CellRange::parse("B11:D2058").unwrap();
        let placed = range.placed_at(CellRef::new(11, 5)).unwrap();
        assert_eq!(placed.to_string(), "E11:G2058");
        assert!(placed.contains(CellRef::new(2058, 7)));
        assert!(!placed.contains(CellRef::new(2059, 7)));

        assert!(range.placed_at(CellRef::new(MAX_ROW - 100, 1)).is_err());
        assert!(range.placed_at(CellRef::new(1, MAX_COLUMN - 1)).is_err());

        let whole_sheet = CellRange::parse("A1:XFD1048576").unwrap();
        assert!(whole_sheet.placed_at(CellRef::new(1, 1)).is_ok());
        assert!(matches!(
            whole_sheet.placed_at(CellRef::new(2, 1)),
            Err(ToolError::InvalidAddress(_))
        ));
    }
}
