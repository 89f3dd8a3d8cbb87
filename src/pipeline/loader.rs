//! Workbook loader for the enrollment, course and survey sheets

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use polars::prelude::*;
use tracing::{debug, info};

use super::columns::{float_values, format_number, string_values};
use super::config::{SheetNames, ANGKATAN, ENROLLMENT_COLUMNS, IPK, IPS, NIM, SEMESTER_AMBIL, SKS};
use super::error::LoadError;

/// The three raw sheets of an input workbook, with key columns normalized:
/// student IDs and semester codes are text, cohort is Int64, credits and
/// GPAs are Float64.
#[derive(Debug, Clone)]
pub struct Workbook {
    pub enrollment: DataFrame,
    pub courses: DataFrame,
    pub survey: DataFrame,
}

impl Workbook {
    /// Validate and normalize already-loaded sheet tables
    pub fn from_frames(
        enrollment: DataFrame,
        courses: DataFrame,
        survey: DataFrame,
        sheets: &SheetNames,
    ) -> Result<Self, LoadError> {
        require_columns(&enrollment, &sheets.enrollment, &ENROLLMENT_COLUMNS)?;
        require_columns(&survey, &sheets.survey, &[NIM])?;

        let enrollment = normalize_enrollment(enrollment, &sheets.enrollment)?;
        let survey = normalize_survey(survey, &sheets.survey)?;

        Ok(Self {
            enrollment,
            courses,
            survey,
        })
    }
}

/// Load a workbook (xlsx, xls, xlsb or ods) and validate its three sheets
pub fn load_workbook(path: &Path, sheets: &SheetNames) -> Result<Workbook, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut workbook = open_workbook_auto(path).map_err(|source| LoadError::Workbook {
        path: path.to_path_buf(),
        source,
    })?;
    let available = workbook.sheet_names();

    let enrollment = read_sheet(&mut workbook, &sheets.enrollment, &available)?;
    let courses = read_sheet(&mut workbook, &sheets.courses, &available)?;
    let survey = read_sheet(&mut workbook, &sheets.survey, &available)?;

    info!(
        enrollment_rows = enrollment.height(),
        course_rows = courses.height(),
        survey_rows = survey.height(),
        "workbook loaded"
    );

    Workbook::from_frames(enrollment, courses, survey, sheets)
}

fn read_sheet(
    workbook: &mut Sheets<BufReader<File>>,
    name: &str,
    available: &[String],
) -> Result<DataFrame, LoadError> {
    if !available.iter().any(|s| s == name) {
        return Err(LoadError::MissingSheet {
            sheet: name.to_string(),
            available: available.to_vec(),
        });
    }

    let range = workbook
        .worksheet_range(name)
        .map_err(|source| LoadError::SheetRead {
            sheet: name.to_string(),
            source,
        })?;

    range_to_dataframe(name, &range)
}

enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) if s.trim().is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::Empty | Data::Error(_) => CellValue::Empty,
        other => CellValue::Text(other.to_string()),
    }
}

/// Convert a sheet range into a DataFrame.
///
/// The first row is the header. A column whose non-empty cells are all numeric
/// becomes Float64, anything else becomes String. Fully empty rows are skipped.
pub fn range_to_dataframe(sheet: &str, range: &Range<Data>) -> Result<DataFrame, LoadError> {
    let mut rows = range.rows();
    let header = rows.next().ok_or_else(|| LoadError::EmptySheet {
        sheet: sheet.to_string(),
    })?;

    let names = header_names(header);
    let width = names.len();

    let mut cells: Vec<Vec<CellValue>> = (0..width).map(|_| Vec::new()).collect();
    let mut skipped = 0usize;
    for row in rows {
        let values: Vec<CellValue> = (0..width)
            .map(|i| row.get(i).map(cell_value).unwrap_or(CellValue::Empty))
            .collect();
        if values.iter().all(|v| matches!(v, CellValue::Empty)) {
            skipped += 1;
            continue;
        }
        for (column, value) in cells.iter_mut().zip(values) {
            column.push(value);
        }
    }
    if skipped > 0 {
        debug!(sheet, skipped, "skipped empty rows");
    }

    let columns: Vec<Column> = names
        .into_iter()
        .zip(cells)
        .map(|(name, values)| build_column(name, values))
        .collect();

    DataFrame::new(columns).map_err(|source| LoadError::Table {
        sheet: sheet.to_string(),
        source,
    })
}

/// Header cells as column names. Blank headers become `Unnamed: <idx>` and
/// repeated names get a `.1`, `.2`, ... suffix so every name is unique.
fn header_names(header: &[Data]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    header
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            let base = match cell_value(cell) {
                CellValue::Number(n) => format_number(n),
                CellValue::Text(s) => s,
                CellValue::Empty => format!("Unnamed: {}", idx),
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{}.{}", base, count)
            };
            *count += 1;
            name
        })
        .collect()
}

fn build_column(name: String, values: Vec<CellValue>) -> Column {
    let all_numeric = values
        .iter()
        .all(|v| matches!(v, CellValue::Number(_) | CellValue::Empty));

    if all_numeric {
        let numbers: Vec<Option<f64>> = values
            .into_iter()
            .map(|v| match v {
                CellValue::Number(n) => Some(n),
                _ => None,
            })
            .collect();
        Column::new(name.into(), numbers)
    } else {
        let text: Vec<Option<String>> = values
            .into_iter()
            .map(|v| match v {
                CellValue::Number(n) => Some(format_number(n)),
                CellValue::Text(s) => Some(s),
                CellValue::Empty => None,
            })
            .collect();
        Column::new(name.into(), text)
    }
}

/// Fail with the first required column missing from `df`
pub fn require_columns(df: &DataFrame, sheet: &str, required: &[&str]) -> Result<(), LoadError> {
    let names = df.get_column_names();
    for column in required {
        if !names.iter().any(|n| n.as_str() == *column) {
            return Err(LoadError::MissingColumn {
                sheet: sheet.to_string(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

fn table_err(sheet: &str) -> impl Fn(PolarsError) -> LoadError + '_ {
    move |source| LoadError::Table {
        sheet: sheet.to_string(),
        source,
    }
}

fn normalize_enrollment(mut df: DataFrame, sheet: &str) -> Result<DataFrame, LoadError> {
    for key in [NIM, SEMESTER_AMBIL] {
        let values = string_values(df.column(key).map_err(table_err(sheet))?)
            .map_err(table_err(sheet))?;
        df.with_column(Column::new(key.into(), values))
            .map_err(table_err(sheet))?;
    }

    let cohort = cohort_values(&df, sheet)?;
    df.with_column(Column::new(ANGKATAN.into(), cohort))
        .map_err(table_err(sheet))?;

    for numeric in [SKS, IPS, IPK] {
        let values = float_values(df.column(numeric).map_err(table_err(sheet))?)
            .map_err(table_err(sheet))?;
        df.with_column(Column::new(numeric.into(), values))
            .map_err(table_err(sheet))?;
    }

    Ok(df)
}

/// Cohort must be an integer wherever it is present
fn cohort_values(df: &DataFrame, sheet: &str) -> Result<Vec<Option<i64>>, LoadError> {
    let col = df.column(ANGKATAN).map_err(table_err(sheet))?;
    let text = string_values(col).map_err(table_err(sheet))?;
    let numbers = float_values(col).map_err(table_err(sheet))?;

    text.into_iter()
        .zip(numbers)
        .enumerate()
        .map(|(idx, (raw, number))| match (raw, number) {
            (None, _) => Ok(None),
            (Some(_), Some(n)) if n.fract() == 0.0 => Ok(Some(n as i64)),
            (Some(raw), _) => Err(LoadError::InvalidValue {
                sheet: sheet.to_string(),
                column: ANGKATAN.to_string(),
                row: idx + 2,
                value: raw,
                expected: "an integer cohort year",
            }),
        })
        .collect()
}

fn normalize_survey(mut df: DataFrame, sheet: &str) -> Result<DataFrame, LoadError> {
    let ids = string_values(df.column(NIM).map_err(table_err(sheet))?).map_err(table_err(sheet))?;
    df.with_column(Column::new(NIM.into(), ids))
        .map_err(table_err(sheet))?;
    Ok(df)
}
