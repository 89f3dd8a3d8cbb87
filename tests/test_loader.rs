//! Tests for workbook loading and sheet validation

use ipklens::pipeline::*;
use polars::prelude::*;
use tempfile::TempDir;

#[path = "common/mod.rs"]
mod common;

use common::*;

#[test]
fn test_load_xlsx_normalizes_key_columns() {
    let (_temp_dir, path) = create_temp_xlsx();

    let workbook = load_workbook(&path, &SheetNames::default()).unwrap();

    assert_eq!(workbook.enrollment.height(), 21);
    assert_eq!(workbook.courses.height(), 1);
    assert_eq!(workbook.survey.height(), 3);

    assert_eq!(workbook.enrollment.column("NIM").unwrap().dtype(), &DataType::String);
    assert_eq!(
        workbook.enrollment.column("SEMESTER_AMBIL").unwrap().dtype(),
        &DataType::String
    );
    assert_eq!(
        workbook.enrollment.column("ANGKATAN").unwrap().dtype(),
        &DataType::Int64
    );

    // Numeric cells like 1001.0 and 2011.0 become "1001" and "2011"
    let nim = workbook.enrollment.column("NIM").unwrap().str().unwrap().get(0);
    assert_eq!(nim, Some("1001"));
    let semester = workbook
        .enrollment
        .column("SEMESTER_AMBIL")
        .unwrap()
        .str()
        .unwrap()
        .get(0);
    assert_eq!(semester, Some("2011"));

    let survey_nim = workbook.survey.column("NIM").unwrap().str().unwrap().get(2);
    assert_eq!(survey_nim, Some("1003"));
}

#[test]
fn test_missing_file_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("absent.xlsx");

    let err = load_workbook(&path, &SheetNames::default()).unwrap_err();
    assert!(matches!(err, LoadError::FileNotFound { .. }));
    assert!(err.to_string().contains("absent.xlsx"));
}

#[test]
fn test_missing_sheet_names_the_sheet() {
    let (_temp_dir, path) = create_temp_xlsx();
    let sheets = SheetNames {
        survey: "Kuesioner".to_string(),
        ..SheetNames::default()
    };

    let err = load_workbook(&path, &sheets).unwrap_err();
    match err {
        LoadError::MissingSheet { sheet, available } => {
            assert_eq!(sheet, "Kuesioner");
            assert!(available.contains(&"Responden".to_string()));
        }
        other => panic!("expected MissingSheet, got {:?}", other),
    }
}

#[test]
fn test_missing_enrollment_column() {
    let enrollment = seven_semester_enrollment().drop("SKS").unwrap();

    let err = Workbook::from_frames(
        enrollment,
        courses_frame(),
        survey_frame(),
        &SheetNames::default(),
    )
    .unwrap_err();

    match err {
        LoadError::MissingColumn { sheet, column } => {
            assert_eq!(sheet, "Transkrip Mhs SI TA 2020-2024");
            assert_eq!(column, "SKS");
        }
        other => panic!("expected MissingColumn, got {:?}", other),
    }
}

#[test]
fn test_survey_without_student_id_is_rejected() {
    let survey = survey_frame().drop("NIM").unwrap();

    let err = Workbook::from_frames(
        seven_semester_enrollment(),
        courses_frame(),
        survey,
        &SheetNames::default(),
    )
    .unwrap_err();

    assert!(matches!(err, LoadError::MissingColumn { ref column, .. } if column == "NIM"));
}

#[test]
fn test_non_integer_cohort_is_rejected_with_row() {
    let enrollment = df! {
        "NIM" => ["1", "2"],
        "ANGKATAN" => ["2020", "dua ribu"],
        "SEMESTER_AMBIL" => ["2011", "2011"],
        "SKS" => [20.0, 20.0],
        "IPS" => [3.0, 3.0],
        "IPK" => [3.0, 3.0],
    }
    .unwrap();

    let err = Workbook::from_frames(
        enrollment,
        courses_frame(),
        survey_frame(),
        &SheetNames::default(),
    )
    .unwrap_err();

    match err {
        LoadError::InvalidValue {
            column, row, value, ..
        } => {
            assert_eq!(column, "ANGKATAN");
            assert_eq!(row, 3);
            assert_eq!(value, "dua ribu");
        }
        other => panic!("expected InvalidValue, got {:?}", other),
    }
}

#[test]
fn test_text_gpa_cells_become_null() {
    let enrollment = df! {
        "NIM" => ["1", "1"],
        "ANGKATAN" => [2020i64, 2020],
        "SEMESTER_AMBIL" => ["2011", "2021"],
        "SKS" => ["20", "-"],
        "IPS" => ["3.5", "3.25"],
        "IPK" => ["3.5", "n/a"],
    }
    .unwrap();

    let workbook = Workbook::from_frames(
        enrollment,
        courses_frame(),
        survey_frame(),
        &SheetNames::default(),
    )
    .unwrap();

    let ipk: Vec<Option<f64>> = workbook
        .enrollment
        .column("IPK")
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(ipk, vec![Some(3.5), None]);
    let sks = workbook.enrollment.column("SKS").unwrap().f64().unwrap().get(1);
    assert_eq!(sks, None);
}
