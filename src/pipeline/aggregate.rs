//! Per-student aggregation of enrollment records

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::Serialize;
use tracing::debug;

use super::columns::{float_values, string_values};
use super::config::{ANGKATAN, IPK, IPS, NIM, SEMESTER_AMBIL, SKS};
use super::semester::SemesterSequence;
use super::status::{classify, GraduationStatus};

/// One enrollment row of the transcript sheet
#[derive(Debug, Clone, PartialEq)]
pub struct EnrollmentRecord {
    pub nim: String,
    pub cohort: Option<i64>,
    pub semester: String,
    pub credits: Option<f64>,
    pub ips: Option<f64>,
    pub ipk: Option<f64>,
}

/// One row per student, derived from all of that student's enrollment rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentSummary {
    pub nim: String,
    pub cohort: Option<i64>,
    /// Distinct semester codes in canonical order
    pub semesters: Vec<String>,
    pub last_semester: String,
    pub total_semesters: usize,
    pub total_credits: f64,
    pub years_enrolled: f64,
    pub final_ips: Option<f64>,
    pub final_ipk: Option<f64>,
    pub status: GraduationStatus,
}

impl StudentSummary {
    pub fn has_semester(&self, code: &str) -> bool {
        self.semesters.iter().any(|s| s == code)
    }
}

/// Read typed enrollment records from the normalized enrollment table.
///
/// Rows without a student ID or semester code are skipped.
pub fn enrollment_records(df: &DataFrame) -> Result<Vec<EnrollmentRecord>> {
    let nims = string_values(df.column(NIM)?)?;
    let semesters = string_values(df.column(SEMESTER_AMBIL)?)?;
    let cohorts: Vec<Option<i64>> = df
        .column(ANGKATAN)?
        .cast(&DataType::Int64)
        .context("Cohort column is not integer")?
        .i64()?
        .into_iter()
        .collect();
    let credits = float_values(df.column(SKS)?)?;
    let ips = float_values(df.column(IPS)?)?;
    let ipk = float_values(df.column(IPK)?)?;

    let mut records = Vec::with_capacity(df.height());
    let mut skipped = 0usize;
    for i in 0..df.height() {
        match (&nims[i], &semesters[i]) {
            (Some(nim), Some(semester)) => records.push(EnrollmentRecord {
                nim: nim.clone(),
                cohort: cohorts[i],
                semester: semester.clone(),
                credits: credits[i],
                ips: ips[i],
                ipk: ipk[i],
            }),
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!(skipped, "enrollment rows without student ID or semester skipped");
    }

    Ok(records)
}

/// Latest non-null value by (semester rank, row order)
#[derive(Default)]
struct Latest {
    key: Option<(usize, usize)>,
    value: Option<f64>,
}

impl Latest {
    fn offer(&mut self, key: (usize, usize), value: Option<f64>) {
        if let Some(v) = value {
            if self.key.map_or(true, |k| key >= k) {
                self.key = Some(key);
                self.value = Some(v);
            }
        }
    }
}

#[derive(Default)]
struct StudentAccumulator<'a> {
    cohort: Option<i64>,
    semesters: Vec<&'a str>,
    credits: f64,
    ips: Latest,
    ipk: Latest,
}

/// Collapse enrollment records into one [`StudentSummary`] per student ID,
/// ordered by student ID.
///
/// Final IPS/IPK come from the row with the highest semester rank; rows of
/// equal rank resolve to the later row, and null values are passed over.
pub fn aggregate_students(
    records: &[EnrollmentRecord],
    sequence: &SemesterSequence,
) -> Vec<StudentSummary> {
    let mut groups: BTreeMap<&str, StudentAccumulator> = BTreeMap::new();

    for (row, record) in records.iter().enumerate() {
        let acc = groups.entry(record.nim.as_str()).or_default();
        if acc.cohort.is_none() {
            acc.cohort = record.cohort;
        }
        acc.semesters.push(record.semester.as_str());
        acc.credits += record.credits.unwrap_or(0.0);

        let key = (sequence.rank(&record.semester), row);
        acc.ips.offer(key, record.ips);
        acc.ipk.offer(key, record.ipk);
    }

    groups
        .into_iter()
        .map(|(nim, acc)| {
            let semesters = sequence.sort_distinct(acc.semesters);
            let last_semester = semesters.last().cloned().unwrap_or_default();
            let total_semesters = semesters.len();

            let mut summary = StudentSummary {
                nim: nim.to_string(),
                cohort: acc.cohort,
                semesters,
                last_semester,
                total_semesters,
                total_credits: acc.credits,
                years_enrolled: total_semesters as f64 / 2.0,
                final_ips: acc.ips.value,
                final_ipk: acc.ipk.value,
                status: GraduationStatus::MasihAktif,
            };
            summary.status = classify(&summary, sequence);
            summary
        })
        .collect()
}

/// Tabular view of the summaries; the semester list is joined with `,`.
pub fn summaries_to_dataframe(summaries: &[StudentSummary]) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        Column::new(
            NIM.into(),
            summaries.iter().map(|s| s.nim.clone()).collect::<Vec<_>>(),
        ),
        Column::new(
            ANGKATAN.into(),
            summaries.iter().map(|s| s.cohort).collect::<Vec<_>>(),
        ),
        Column::new(
            SEMESTER_AMBIL.into(),
            summaries
                .iter()
                .map(|s| s.semesters.join(","))
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "SEMESTER_TERAKHIR".into(),
            summaries
                .iter()
                .map(|s| s.last_semester.clone())
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "TOTAL_SEMESTER".into(),
            summaries
                .iter()
                .map(|s| s.total_semesters as u32)
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "TOTAL_SKS".into(),
            summaries.iter().map(|s| s.total_credits).collect::<Vec<_>>(),
        ),
        Column::new(
            "LAMA_KULIAH_TAHUN".into(),
            summaries.iter().map(|s| s.years_enrolled).collect::<Vec<_>>(),
        ),
        Column::new(
            IPS.into(),
            summaries.iter().map(|s| s.final_ips).collect::<Vec<_>>(),
        ),
        Column::new(
            IPK.into(),
            summaries.iter().map(|s| s.final_ipk).collect::<Vec<_>>(),
        ),
        Column::new(
            "KELULUSAN_STATUS".into(),
            summaries
                .iter()
                .map(|s| s.status.label().to_string())
                .collect::<Vec<_>>(),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(nim: &str, semester: &str, ipk: Option<f64>) -> EnrollmentRecord {
        EnrollmentRecord {
            nim: nim.to_string(),
            cohort: Some(2020),
            semester: semester.to_string(),
            credits: Some(3.0),
            ips: ipk,
            ipk,
        }
    }

    #[test]
    fn test_latest_prefers_higher_rank_over_row_order() {
        let records = vec![
            record("A", "2021", Some(3.2)),
            record("A", "2011", Some(2.9)),
        ];
        let summaries = aggregate_students(&records, &SemesterSequence::default());
        assert_eq!(summaries[0].final_ipk, Some(3.2));
        assert_eq!(summaries[0].last_semester, "2021");
    }

    #[test]
    fn test_latest_skips_null_values() {
        let records = vec![record("A", "2011", Some(3.0)), record("A", "2021", None)];
        let summaries = aggregate_students(&records, &SemesterSequence::default());
        assert_eq!(summaries[0].final_ipk, Some(3.0));
    }

    #[test]
    fn test_equal_rank_resolves_to_later_row() {
        let records = vec![
            record("A", "2011", Some(3.0)),
            record("A", "2011", Some(3.4)),
        ];
        let summaries = aggregate_students(&records, &SemesterSequence::default());
        assert_eq!(summaries[0].final_ipk, Some(3.4));
        assert_eq!(summaries[0].total_semesters, 1);
        assert_eq!(summaries[0].total_credits, 6.0);
    }
}
