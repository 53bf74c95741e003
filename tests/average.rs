use tempfile::tempdir;
use vibe_sheets::ToolError;
use vibe_sheets::average::{self, AverageJob};
use vibe_sheets::io::{excel_read, excel_write};
use vibe_sheets::model::{CellRef, CellValue, Workbook, Worksheet};

fn input_workbook(values: &[(&str, Option<CellValue>)]) -> Workbook {
    let mut workbook = Workbook::new();
    let at = CellRef::parse("B11").expect("cell reference");
    for (name, value) in values {
        workbook
            .push_sheet(Worksheet::new(*name))
            .expect("sheet added")
            .set_value(at, value.clone());
    }
    workbook
}

#[test]
fn averages_b11_into_new_workbook() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("원본.xlsx");
    let output = temp_dir.path().join(average::DEFAULT_OUTPUT);

    let mut workbook = input_workbook(&[
        ("1", Some(CellValue::Number(1.0))),
        ("2", Some(CellValue::Number(2.5))),
        ("3", Some(CellValue::Number(3.0))),
        ("4", Some(CellValue::Number(4.5))),
        ("5", None),
        ("notes", Some(CellValue::Text("ignored".into()))),
    ]);
    // Sheet 5 holds a formula; its cached result is what gets averaged.
    workbook.sheet_mut("5").expect("sheet 5").set_formula(
        CellRef::parse("B11").expect("cell reference"),
        "SUM(C1:C2)",
        Some(CellValue::Number(9.0)),
    );
    excel_write::write_workbook(&input, &workbook).expect("input written");

    let value = average::average_file(&input, &output, &AverageJob::default()).expect("average");
    assert_eq!(value, 4.0);

    let result = excel_read::read_workbook(&output).expect("output read");
    assert_eq!(result.sheet_names(), vec!["6"]);
    let sheet = result.sheet("6").expect("output sheet");
    assert_eq!(
        sheet.value(CellRef::parse("B11").expect("cell reference")),
        Some(&CellValue::Number(4.0))
    );
    assert_eq!(sheet.cell_count(), 1);
}

#[test]
fn text_cell_is_rejected_and_nothing_is_written() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("input.xlsx");
    let output = temp_dir.path().join("out.xlsx");

    let workbook = input_workbook(&[
        ("1", Some(CellValue::Number(1.0))),
        ("2", Some(CellValue::Text("3.0".into()))),
        ("3", Some(CellValue::Number(3.0))),
        ("4", Some(CellValue::Number(4.0))),
        ("5", Some(CellValue::Number(5.0))),
    ]);
    excel_write::write_workbook(&input, &workbook).expect("input written");

    let error = average::average_file(&input, &output, &AverageJob::default())
        .expect_err("text is not numeric");
    assert!(
        matches!(&error, ToolError::NotNumeric { sheet, cell, .. } if sheet == "2" && cell == "B11"),
        "unexpected error: {error}"
    );
    assert!(!output.exists());
}

#[test]
fn missing_sheet_is_rejected() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("input.xlsm");
    let output = temp_dir.path().join("out.xlsx");

    let workbook = input_workbook(&[("1", Some(CellValue::Number(1.0)))]);
    excel_write::write_workbook(&input, &workbook).expect("input written");

    let error = average::average_file(&input, &output, &AverageJob::default())
        .expect_err("sheet 2 is missing");
    assert!(matches!(error, ToolError::MissingSheet(name) if name == "2"));
}

#[test]
fn custom_job_reads_other_sheets_and_cell() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("input.xlsx");
    let output = temp_dir.path().join("mean.xlsx");

    let mut workbook = Workbook::new();
    for (name, value) in [("a", 10.0), ("b", 20.0)] {
        workbook
            .push_sheet(Worksheet::new(name))
            .expect("sheet added")
            .set_value(CellRef::parse("C3").expect("cell"), Some(CellValue::Number(value)));
    }
    excel_write::write_workbook(&input, &workbook).expect("input written");

    let job = AverageJob {
        sheets: vec!["a".into(), "b".into()],
        cell: "C3".into(),
        output_sheet: "mean".into(),
    };
    assert_eq!(average::average_file(&input, &output, &job).expect("average"), 15.0);

    let result = excel_read::read_workbook(&output).expect("output read");
    let sheet = result.sheet("mean").expect("output sheet");
    assert_eq!(
        sheet.value(CellRef::parse("C3").expect("cell")),
        Some(&CellValue::Number(15.0))
    );
}
