//! Per-cohort descriptive tables

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::aggregate::{EnrollmentRecord, StudentSummary};
use super::semester::SemesterSequence;
use super::status::GraduationStatus;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortCount {
    pub cohort: i64,
    pub students: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortMean {
    pub cohort: i64,
    pub mean_ipk: f64,
    /// Students with a non-null final IPK
    pub students: usize,
}

/// Mean semester GPA of one cohort in one semester
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub semester: String,
    pub cohort: i64,
    pub mean_ips: f64,
    pub rows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusShare {
    pub status: GraduationStatus,
    pub count: usize,
    /// Fraction of the cohort, 0.0 to 1.0
    pub share: f64,
}

/// Distinct students per cohort, ascending by cohort.
/// Students without a cohort are not counted.
pub fn cohort_counts(summaries: &[StudentSummary]) -> Vec<CohortCount> {
    let mut students: BTreeMap<i64, BTreeSet<&str>> = BTreeMap::new();
    for summary in summaries {
        if let Some(cohort) = summary.cohort {
            students.entry(cohort).or_default().insert(summary.nim.as_str());
        }
    }
    students
        .into_iter()
        .map(|(cohort, ids)| CohortCount {
            cohort,
            students: ids.len(),
        })
        .collect()
}

/// Mean final IPK per cohort; students without an IPK are skipped
pub fn mean_ipk_by_cohort(summaries: &[StudentSummary]) -> Vec<CohortMean> {
    let mut sums: BTreeMap<i64, (f64, usize)> = BTreeMap::new();
    for summary in summaries {
        if let (Some(cohort), Some(ipk)) = (summary.cohort, summary.final_ipk) {
            let entry = sums.entry(cohort).or_insert((0.0, 0));
            entry.0 += ipk;
            entry.1 += 1;
        }
    }
    sums.into_iter()
        .map(|(cohort, (sum, count))| CohortMean {
            cohort,
            mean_ipk: sum / count as f64,
            students: count,
        })
        .collect()
}

/// Mean IPS per (semester, cohort) over enrollment rows with an IPS value.
///
/// `cohorts` restricts the output when given. Points are ordered by canonical
/// semester rank, then by cohort.
pub fn ips_trend(
    records: &[EnrollmentRecord],
    sequence: &SemesterSequence,
    cohorts: Option<&[i64]>,
) -> Vec<TrendPoint> {
    let mut sums: BTreeMap<(usize, String, i64), (f64, usize)> = BTreeMap::new();
    for record in records {
        let (Some(cohort), Some(ips)) = (record.cohort, record.ips) else {
            continue;
        };
        if cohorts.is_some_and(|wanted| !wanted.contains(&cohort)) {
            continue;
        }
        let key = (
            sequence.rank(&record.semester),
            record.semester.clone(),
            cohort,
        );
        let entry = sums.entry(key).or_insert((0.0, 0));
        entry.0 += ips;
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|((_, semester, cohort), (sum, rows))| TrendPoint {
            semester,
            cohort,
            mean_ips: sum / rows as f64,
            rows,
        })
        .collect()
}

/// Count and share of each status within one cohort, by descending count
/// and then label. Statuses with no students are omitted.
pub fn status_distribution(summaries: &[StudentSummary], cohort: i64) -> Vec<StatusShare> {
    let mut counts: BTreeMap<GraduationStatus, usize> = BTreeMap::new();
    for summary in summaries.iter().filter(|s| s.cohort == Some(cohort)) {
        *counts.entry(summary.status).or_insert(0) += 1;
    }
    let total: usize = counts.values().sum();

    let mut shares: Vec<StatusShare> = counts
        .into_iter()
        .map(|(status, count)| StatusShare {
            status,
            count,
            share: count as f64 / total as f64,
        })
        .collect();
    shares.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.status.label().cmp(b.status.label()))
    });
    shares
}

/// Most recent cohort present in the summaries
pub fn latest_cohort(summaries: &[StudentSummary]) -> Option<i64> {
    summaries.iter().filter_map(|s| s.cohort).max()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(cohort: i64, semester: &str, ips: Option<f64>) -> EnrollmentRecord {
        EnrollmentRecord {
            nim: "1".to_string(),
            cohort: Some(cohort),
            semester: semester.to_string(),
            credits: Some(3.0),
            ips,
            ipk: ips,
        }
    }

    #[test]
    fn test_trend_orders_by_canonical_rank() {
        let records = vec![
            record(2021, "2111", Some(3.0)),
            record(2020, "2111", Some(2.0)),
            record(2020, "2021", Some(3.5)),
            record(2020, "2021", Some(2.5)),
            record(2020, "9999", Some(1.0)),
            record(2020, "2011", None),
        ];
        let trend = ips_trend(&records, &SemesterSequence::default(), None);
        let keys: Vec<(&str, i64)> = trend.iter().map(|p| (p.semester.as_str(), p.cohort)).collect();
        assert_eq!(
            keys,
            vec![("2021", 2020), ("2111", 2020), ("2111", 2021), ("9999", 2020)]
        );
        assert_eq!(trend[0].mean_ips, 3.0);
        assert_eq!(trend[0].rows, 2);
    }

    #[test]
    fn test_trend_cohort_filter() {
        let records = vec![record(2020, "2011", Some(3.0)), record(2021, "2011", Some(2.0))];
        let trend = ips_trend(&records, &SemesterSequence::default(), Some(&[2021]));
        assert_eq!(trend.len(), 1);
        assert_eq!(trend[0].cohort, 2021);
    }
}
