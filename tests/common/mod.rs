//! Shared test utilities and fixture generators

use std::path::{Path, PathBuf};

use ipklens::pipeline::{SheetNames, Workbook};
use polars::prelude::*;
use tempfile::TempDir;

/// Survey question for the `kepuasan_prodi` factor (numeric answer)
pub const Q_KEPUASAN: &str = "Seberapa puas Anda terhadap prodi yang Anda pilih ini?";
/// Survey question for the `kesesuaian_jurusan` factor (Ya/Tidak answer)
pub const Q_KESESUAIAN: &str =
    "Apakah Jurusan yang Anda pilih sudah sesuai dengan keinginan diri sendiri?";
/// Survey question for the `tempat_tinggal_sekarang` factor
pub const Q_TEMPAT_TINGGAL: &str = "Tempat tinggal sekarang";

/// One enrollment row: (NIM, cohort, semester, credits, IPS, IPK)
pub type EnrollmentRow<'a> = (&'a str, i64, &'a str, f64, f64, f64);

/// Build an enrollment table with the normalized column types
pub fn enrollment_frame(rows: &[EnrollmentRow]) -> DataFrame {
    df! {
        "NIM" => rows.iter().map(|r| r.0).collect::<Vec<_>>(),
        "ANGKATAN" => rows.iter().map(|r| r.1).collect::<Vec<_>>(),
        "SEMESTER_AMBIL" => rows.iter().map(|r| r.2).collect::<Vec<_>>(),
        "SKS" => rows.iter().map(|r| r.3).collect::<Vec<_>>(),
        "IPS" => rows.iter().map(|r| r.4).collect::<Vec<_>>(),
        "IPK" => rows.iter().map(|r| r.5).collect::<Vec<_>>(),
    }
    .unwrap()
}

/// Three students of cohort 2020, each enrolled for the first seven
/// canonical semesters with 20 credits per semester. IPK climbs by 0.1 per
/// semester from a per-student base.
pub fn seven_semester_rows() -> Vec<(String, i64, String, f64, f64, f64)> {
    let semesters = ["2011", "2021", "2111", "2121", "2211", "2221", "2311"];
    let mut rows = Vec::new();
    for (student, base) in [("1001", 2.5), ("1002", 3.0), ("1003", 3.2)] {
        for (i, semester) in semesters.iter().enumerate() {
            let ipk = base + 0.1 * i as f64;
            rows.push((
                student.to_string(),
                2020,
                semester.to_string(),
                20.0,
                ipk + 0.05,
                ipk,
            ));
        }
    }
    rows
}

pub fn seven_semester_enrollment() -> DataFrame {
    let rows = seven_semester_rows();
    let borrowed: Vec<EnrollmentRow> = rows
        .iter()
        .map(|r| (r.0.as_str(), r.1, r.2.as_str(), r.3, r.4, r.5))
        .collect();
    enrollment_frame(&borrowed)
}

/// Survey answers for the three students of [`seven_semester_enrollment`]
pub fn survey_frame() -> DataFrame {
    df! {
        "NIM" => ["1001", "1002", "1003"],
        "Timestamp" => ["2024-01-01", "2024-01-02", "2024-01-03"],
        Q_KEPUASAN => [Some("2"), Some("4"), Some("5")],
        Q_KESESUAIAN => ["Tidak", "Ya", "Ya"],
        Q_TEMPAT_TINGGAL => ["Kost", "Orang tua", "Asrama"],
    }
    .unwrap()
}

pub fn courses_frame() -> DataFrame {
    df! {
        "KODE_MK" => ["SI101", "SI102"],
        "NAMA_MK" => ["Algoritma", "Basis Data"],
    }
    .unwrap()
}

/// Three-student workbook built in memory
pub fn sample_workbook() -> Workbook {
    Workbook::from_frames(
        seven_semester_enrollment(),
        courses_frame(),
        survey_frame(),
        &SheetNames::default(),
    )
    .unwrap()
}

/// Master table with the given factor columns and IPK
pub fn master_frame(columns: Vec<Column>, ipk: Vec<Option<f64>>) -> DataFrame {
    let mut columns = columns;
    columns.push(Column::new("IPK".into(), ipk));
    DataFrame::new(columns).unwrap()
}

/// Write the sample workbook as an xlsx file. Student IDs and semester codes
/// are written as numbers, the way spreadsheet exports usually store them.
pub fn write_sample_xlsx(path: &Path) {
    let sheets = SheetNames::default();
    let mut workbook = rust_xlsxwriter::Workbook::new();

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(&sheets.enrollment).unwrap();
        for (col, name) in ["NIM", "ANGKATAN", "SEMESTER_AMBIL", "SKS", "IPS", "IPK"]
            .iter()
            .enumerate()
        {
            sheet.write_string(0, col as u16, *name).unwrap();
        }
        for (i, row) in seven_semester_rows().iter().enumerate() {
            let r = (i + 1) as u32;
            sheet.write_number(r, 0, row.0.parse::<f64>().unwrap()).unwrap();
            sheet.write_number(r, 1, row.1 as f64).unwrap();
            sheet.write_number(r, 2, row.2.parse::<f64>().unwrap()).unwrap();
            sheet.write_number(r, 3, row.3).unwrap();
            sheet.write_number(r, 4, row.4).unwrap();
            sheet.write_number(r, 5, row.5).unwrap();
        }
    }

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(&sheets.courses).unwrap();
        sheet.write_string(0, 0, "KODE_MK").unwrap();
        sheet.write_string(0, 1, "NAMA_MK").unwrap();
        sheet.write_string(1, 0, "SI101").unwrap();
        sheet.write_string(1, 1, "Algoritma").unwrap();
    }

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(&sheets.survey).unwrap();
        let header = ["NIM", Q_KEPUASAN, Q_KESESUAIAN, Q_TEMPAT_TINGGAL];
        for (col, name) in header.iter().enumerate() {
            sheet.write_string(0, col as u16, *name).unwrap();
        }
        let answers = [
            (1001.0, 2.0, "Tidak", "Kost"),
            (1002.0, 4.0, "Ya", "Orang tua"),
            (1003.0, 5.0, "Ya", "Asrama"),
        ];
        for (i, (nim, puas, sesuai, tinggal)) in answers.iter().enumerate() {
            let r = (i + 1) as u32;
            sheet.write_number(r, 0, *nim).unwrap();
            sheet.write_number(r, 1, *puas).unwrap();
            sheet.write_string(r, 2, *sesuai).unwrap();
            sheet.write_string(r, 3, *tinggal).unwrap();
        }
    }

    workbook.save(path).unwrap();
}

/// Create a temporary directory holding the sample xlsx workbook
pub fn create_temp_xlsx() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("students.xlsx");
    write_sample_xlsx(&path);
    (temp_dir, path)
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}

/// Assert that a DataFrame does NOT contain specific columns
pub fn assert_missing_columns(df: &DataFrame, unexpected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in unexpected_cols {
        assert!(
            !actual_cols.contains(&col.to_string()),
            "Unexpected column still present: '{}'",
            col
        );
    }
}

pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {} ± {}, got {}",
        expected,
        tolerance,
        actual
    );
}
