pub mod excel_read;
pub mod excel_write;
pub mod package;
pub mod styles;

use std::path::{Path, PathBuf};

use crate::error::{Result, ToolError};

/// File extensions the workflow accepts, compared case-insensitively.
pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["xlsx", "xlsm"];

/// Checks that the input exists and is a workbook type the reader handles.
pub fn validate_input(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(ToolError::MissingInput(path.to_path_buf()));
    }

    let supported = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|candidate| ext.eq_ignore_ascii_case(candidate))
        })
        .unwrap_or(false);
    if !supported {
        return Err(ToolError::UnsupportedExtension(path.to_path_buf()));
    }
    Ok(())
}

/// Whether the path names a macro-enabled workbook.
pub fn is_macro_enabled(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsm"))
}

/// `<stem>_operated<suffix>` next to the input file.
pub fn operated_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = input
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    input.with_file_name(format!("{stem}_operated{suffix}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operated_path_keeps_directory_and_suffix() {
        let input = Path::new("/data/2025.10.01 XY 스테이지 더미 측정.xlsm");
        assert_eq!(
            operated_path(input),
            PathBuf::from("/data/2025.10.01 XY 스테이지 더미 측정_operated.xlsm")
        );
    }

    #[test]
    fn macro_enabled_by_extension() {
        assert!(is_macro_enabled(Path::new("a.XLSM")));
        assert!(!is_macro_enabled(Path::new("a.xlsx")));
        assert!(!is_macro_enabled(Path::new("xlsm")));
    }

    #[test]
    fn rejects_missing_before_extension() {
        let result = validate_input(Path::new("/definitely/not/here.csv"));
        assert!(matches!(result, Err(ToolError::MissingInput(_))));
    }
}
