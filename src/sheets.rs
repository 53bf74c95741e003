//! Worksheet duplication and renaming.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::model::Workbook;

/// Naming tables driving duplication. The three lists are zipped by index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicationPlan {
    /// Sheets that must exist and are copied.
    pub targets: Vec<String>,
    /// Name requested for the copy of each target.
    pub copy_names: Vec<String>,
    /// Name each original target is renamed to afterwards.
    pub original_names: Vec<String>,
}

/// Returns `desired` if unused, otherwise the first free `desired (n)`.
pub fn unique_name(workbook: &Workbook, desired: &str) -> String {
    if !workbook.contains(desired) {
        return desired.to_string();
    }

    let mut counter = 1;
    loop {
        let candidate = format!("{desired} ({counter})");
        if !workbook.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Copies each target sheet under its copy name. Every target must exist.
/// Returns the names the copies received.
#[instrument(level = "info", skip_all, fields(targets = plan.targets.len()))]
pub fn duplicate_targets(workbook: &mut Workbook, plan: &DuplicationPlan) -> Result<Vec<String>> {
    let mut created = Vec::with_capacity(plan.targets.len());

    for (target, copy_name) in plan.targets.iter().zip(&plan.copy_names) {
        let name = unique_name(workbook, copy_name);
        let copy = workbook.require(target)?.duplicate(name.clone());
        workbook.push_sheet(copy)?;
        info!(source = %target, copy = %name, "sheet duplicated");
        created.push(name);
    }

    Ok(created)
}

/// Renames each original target. Targets no longer present are skipped.
#[instrument(level = "info", skip_all)]
pub fn rename_originals(workbook: &mut Workbook, plan: &DuplicationPlan) -> Result<Vec<String>> {
    let mut renamed = Vec::new();

    for (target, new_name) in plan.targets.iter().zip(&plan.original_names) {
        if !workbook.contains(target) {
            debug!(sheet = %target, "original sheet absent, not renamed");
            continue;
        }
        let name = unique_name(workbook, new_name);
        workbook.rename_sheet(target, &name)?;
        debug!(from = %target, to = %name, "sheet renamed");
        renamed.push(name);
    }

    Ok(renamed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;
    use crate::model::{CellRef, CellValue, Worksheet};

    fn workbook_with(names: &[&str]) -> Workbook {
        let mut workbook = Workbook::new();
        for name in names {
            workbook.push_sheet(Worksheet::new(*name)).unwrap();
        }
        workbook
    }

    fn plan() -> DuplicationPlan {
        DuplicationPlan {
            targets: vec!["a".into(), "b".into()],
            copy_names: vec!["a copy".into(), "b copy".into()],
            original_names: vec!["a orig".into(), "b orig".into()],
        }
    }

    #[test]
    fn unique_name_skips_taken_suffixes() {
        let workbook = workbook_with(&["X", "X (1)"]);
        assert_eq!(unique_name(&workbook, "X"), "X (2)");
        assert_eq!(unique_name(&workbook, "Y"), "Y");
    }

    #[test]
    fn duplicates_cells_and_appends_copies() {
        let mut workbook = workbook_with(&["a", "b", "a copy"]);
        workbook
            .sheet_mut("a")
            .unwrap()
            .set_value(CellRef::new(11, 2), Some(CellValue::Number(7.0)));

        let created = duplicate_targets(&mut workbook, &plan()).unwrap();
        assert_eq!(created, vec!["a copy (1)".to_string(), "b copy".to_string()]);
        assert_eq!(
            workbook.sheet_names(),
            vec!["a", "b", "a copy", "a copy (1)", "b copy"]
        );
        assert_eq!(
            workbook.sheet("a copy (1)").unwrap().value(CellRef::new(11, 2)),
            Some(&CellValue::Number(7.0))
        );
    }

    #[test]
    fn missing_target_is_an_error() {
        let mut workbook = workbook_with(&["a"]);
        let err = duplicate_targets(&mut workbook, &plan()).unwrap_err();
        assert!(matches!(err, ToolError::MissingSheet(name) if name == "b"));
    }

    #[test]
    fn rename_skips_missing_originals() {
        let mut workbook = workbook_with(&["b"]);
        let renamed = rename_originals(&mut workbook, &plan()).unwrap();
        assert_eq!(renamed, vec!["b orig".to_string()]);
        assert_eq!(workbook.sheet_names(), vec!["b orig"]);
    }
}
