//! Graduation status inferred from enrollment history

use serde::{Serialize, Serializer};

use super::aggregate::StudentSummary;
use super::semester::SemesterSequence;

/// Completion status of a student
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GraduationStatus {
    /// Exactly 7 semesters
    LulusLebihAwal,
    /// Exactly 8 semesters
    LulusTepatWaktu,
    /// More than 8 semesters
    TidakLulusTepatWaktu,
    /// Fewer than 7 semesters and the semester after the last one was skipped
    DropoutNonAktif,
    MasihAktif,
}

impl GraduationStatus {
    pub const ALL: [GraduationStatus; 5] = [
        GraduationStatus::LulusLebihAwal,
        GraduationStatus::LulusTepatWaktu,
        GraduationStatus::TidakLulusTepatWaktu,
        GraduationStatus::DropoutNonAktif,
        GraduationStatus::MasihAktif,
    ];

    pub fn label(self) -> &'static str {
        match self {
            GraduationStatus::LulusLebihAwal => "Lulus Lebih Awal",
            GraduationStatus::LulusTepatWaktu => "Lulus Tepat Waktu",
            GraduationStatus::TidakLulusTepatWaktu => "Tidak Lulus Tepat Waktu",
            GraduationStatus::DropoutNonAktif => "Dropout/Non-aktif",
            GraduationStatus::MasihAktif => "Masih Aktif",
        }
    }
}

impl std::fmt::Display for GraduationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for GraduationStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Classify a student. The first matching rule wins:
///
/// 1. 7 semesters: graduated early
/// 2. 8 semesters: graduated on time
/// 3. more than 8: graduated late
/// 4. the last semester has a successor in `sequence` that was not taken: dropout
/// 5. otherwise still active
///
/// A last semester that is unknown, or is the final code of the sequence,
/// never triggers rule 4.
pub fn classify(summary: &StudentSummary, sequence: &SemesterSequence) -> GraduationStatus {
    match summary.total_semesters {
        7 => return GraduationStatus::LulusLebihAwal,
        8 => return GraduationStatus::LulusTepatWaktu,
        n if n > 8 => return GraduationStatus::TidakLulusTepatWaktu,
        _ => {}
    }

    match sequence.successor(&summary.last_semester) {
        Some(next) if !summary.has_semester(next) => GraduationStatus::DropoutNonAktif,
        _ => GraduationStatus::MasihAktif,
    }
}
