//! Tests for per-cohort descriptive tables

use ipklens::pipeline::*;

#[path = "common/mod.rs"]
mod common;

use common::*;

fn summary(nim: &str, cohort: Option<i64>, ipk: Option<f64>, status: GraduationStatus) -> StudentSummary {
    StudentSummary {
        nim: nim.to_string(),
        cohort,
        semesters: vec!["2011".to_string()],
        last_semester: "2011".to_string(),
        total_semesters: 1,
        total_credits: 20.0,
        years_enrolled: 0.5,
        final_ips: ipk,
        final_ipk: ipk,
        status,
    }
}

fn summaries() -> Vec<StudentSummary> {
    use GraduationStatus::*;
    vec![
        summary("1", Some(2021), Some(3.0), MasihAktif),
        summary("2", Some(2020), Some(3.5), LulusTepatWaktu),
        summary("3", Some(2021), None, DropoutNonAktif),
        summary("4", Some(2021), Some(2.0), MasihAktif),
        summary("5", None, Some(4.0), MasihAktif),
        summary("6", Some(2021), Some(3.1), LulusLebihAwal),
    ]
}

#[test]
fn test_cohort_counts_ascending() {
    let counts = cohort_counts(&summaries());

    assert_eq!(
        counts,
        vec![
            CohortCount {
                cohort: 2020,
                students: 1
            },
            CohortCount {
                cohort: 2021,
                students: 4
            },
        ]
    );
}

#[test]
fn test_mean_ipk_skips_missing_values() {
    let means = mean_ipk_by_cohort(&summaries());

    assert_eq!(means.len(), 2);
    assert_eq!(means[0].cohort, 2020);
    assert_close(means[0].mean_ipk, 3.5, 1e-12);
    assert_eq!(means[1].students, 3);
    assert_close(means[1].mean_ipk, (3.0 + 2.0 + 3.1) / 3.0, 1e-12);
}

#[test]
fn test_status_distribution_order_and_shares() {
    let shares = status_distribution(&summaries(), 2021);

    let statuses: Vec<GraduationStatus> = shares.iter().map(|s| s.status).collect();
    assert_eq!(
        statuses,
        vec![
            GraduationStatus::MasihAktif,
            GraduationStatus::DropoutNonAktif,
            GraduationStatus::LulusLebihAwal,
        ]
    );
    assert_eq!(shares[0].count, 2);
    assert_close(shares[0].share, 0.5, 1e-12);
    let total: f64 = shares.iter().map(|s| s.share).sum();
    assert_close(total, 1.0, 1e-12);
}

#[test]
fn test_status_distribution_unknown_cohort_is_empty() {
    assert!(status_distribution(&summaries(), 1999).is_empty());
}

#[test]
fn test_latest_cohort() {
    assert_eq!(latest_cohort(&summaries()), Some(2021));
    assert_eq!(latest_cohort(&[]), None);
}

#[test]
fn test_trend_of_sample_enrollment() {
    let records = enrollment_records(&seven_semester_enrollment()).unwrap();

    let trend = ips_trend(&records, &SemesterSequence::default(), None);

    assert_eq!(trend.len(), 7);
    assert_eq!(trend[0].semester, "2011");
    assert_eq!(trend[0].rows, 3);
    // bases 2.5, 3.0, 3.2 plus the 0.05 IPS offset
    assert_close(trend[0].mean_ips, (2.55 + 3.05 + 3.25) / 3.0, 1e-9);
    assert_eq!(trend[6].semester, "2311");
}
