//! Compiled-in analysis configuration
//!
//! Lookup tables live in an [`AnalysisConfig`] value that callers build once
//! (normally via `Default`) and pass by reference into each pipeline stage.

use serde::Serialize;

use super::categories::CategoryKind;
use super::semester::SemesterSequence;

/// Student ID column, shared by the enrollment and survey sheets
pub const NIM: &str = "NIM";
/// Intake year column in the enrollment sheet
pub const ANGKATAN: &str = "ANGKATAN";
/// Semester code column in the enrollment sheet
pub const SEMESTER_AMBIL: &str = "SEMESTER_AMBIL";
/// Credits column in the enrollment sheet
pub const SKS: &str = "SKS";
/// Semester GPA column
pub const IPS: &str = "IPS";
/// Cumulative GPA column
pub const IPK: &str = "IPK";

/// Columns the enrollment sheet must provide
pub const ENROLLMENT_COLUMNS: [&str; 6] = [NIM, ANGKATAN, SEMESTER_AMBIL, SKS, IPS, IPK];

/// A named list of canonical factor identifiers analysed together
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactorGroup {
    pub name: String,
    pub factors: Vec<String>,
}

impl FactorGroup {
    pub fn new<I, S>(name: &str, factors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            factors: factors.into_iter().map(Into::into).collect(),
        }
    }
}

/// A survey question encoded through a category lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodedQuestion {
    pub question: String,
    pub factor: String,
    pub kind: CategoryKind,
}

/// A survey question whose answers are already numeric and only need a
/// canonical column name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenamedQuestion {
    pub question: String,
    pub factor: String,
}

/// Question-to-factor mapping for the survey sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SurveySchema {
    pub renamed: Vec<RenamedQuestion>,
    pub encoded: Vec<EncodedQuestion>,
}

/// Names of the three workbook sheets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetNames {
    pub enrollment: String,
    pub courses: String,
    pub survey: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            enrollment: "Transkrip Mhs SI TA 2020-2024".to_string(),
            courses: "MataKuliah".to_string(),
            survey: "Responden".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    pub sheets: SheetNames,
    pub semesters: SemesterSequence,
    pub factor_groups: Vec<FactorGroup>,
    pub survey: SurveySchema,
}

impl AnalysisConfig {
    /// Look up a factor group by its exact name
    pub fn group(&self, name: &str) -> Option<&FactorGroup> {
        self.factor_groups.iter().find(|g| g.name == name)
    }

    pub fn group_names(&self) -> Vec<&str> {
        self.factor_groups.iter().map(|g| g.name.as_str()).collect()
    }

    /// Every factor referenced by any group, deduplicated, in configuration order
    pub fn required_factors(&self) -> Vec<&str> {
        let mut factors: Vec<&str> = Vec::new();
        for factor in self.factor_groups.iter().flat_map(|g| g.factors.iter()) {
            if !factors.contains(&factor.as_str()) {
                factors.push(factor);
            }
        }
        factors
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sheets: SheetNames::default(),
            semesters: SemesterSequence::default(),
            factor_groups: default_factor_groups(),
            survey: default_survey_schema(),
        }
    }
}

fn default_factor_groups() -> Vec<FactorGroup> {
    vec![
        FactorGroup::new(
            "Faktor Keluarga",
            [
                "tempat_tinggal_sekarang",
                "pendapatan_ayah",
                "pendapatan_ibu",
                "uang_saku",
                "dukungan_keluarga_akademik",
                "dukungan_keluarga_finansial",
                "kondisi_ekonomi_keluarga",
                "uang_saku_cukup",
                "pendidikan_ortu_pengaruh",
                "dukungan_keluarga_jurusan",
            ],
        ),
        FactorGroup::new(
            "Faktor Ekonomi & Pekerjaan",
            ["beban_finansial", "bekerja_sambil_kuliah", "finansial_untuk_kuliah"],
        ),
        FactorGroup::new(
            "Faktor Pilihan Studi",
            ["kesesuaian_jurusan", "kepuasan_prodi"],
        ),
        FactorGroup::new(
            "Faktor Kesehatan & Gaya Hidup",
            [
                "keterbatasan_fisik",
                "pengaruh_fisik_belajar",
                "manajemen_stres",
                "suka_olahraga",
                "kegiatan_luar_kuliah",
                "manajemen_waktu",
                "frekuensi_tidak_hadir_kuliah",
            ],
        ),
        FactorGroup::new(
            "Faktor Akademik, Dosen, dan Lingkungan",
            [
                "kualitas_pengajaran_dosen",
                "beban_tugas_kuliah",
                "frekuensi_gangguan_belajar",
            ],
        ),
    ]
}

const RENAMED_QUESTIONS: [(&str, &str); 17] = [
    ("Seberapa sering Anda mendapatkan dukungan dari keluarga dalam hal akademik?", "dukungan_keluarga_akademik"),
    ("Bagaimana kondisi ekonomi keluarga Anda memengaruhi prestasi akademik Anda?", "kondisi_ekonomi_keluarga"),
    ("Apakah tingkat pendidikan orang tua Anda mempengaruhi cara Anda belajar?", "pendidikan_ortu_pengaruh"),
    ("Seberapa sering Anda berdiskusi tentang masalah akademik dengan orang tua/wali?", "diskusi_akademik_ortu"),
    ("Seberapa puas Anda terhadap prodi yang Anda pilih ini?", "kepuasan_prodi"),
    ("Bagaimana Anda menilai beban finansial (biaya kuliah, biaya hidup) yang Anda rasakan?", "beban_finansial"),
    ("Seberapa besar pengaruh bimbingan akademik dari dosen terhadap prestasi akademik Anda?", "pengaruh_bimbingan_dosen"),
    ("Apakah dengan fisik Anda yang sekarang memengaruhi proses belajar Anda?", "pengaruh_fisik_belajar"),
    ("Seberapa baik Anda mengelola stres yang berhubungan dengan perkuliahan?", "manajemen_stres"),
    ("Seberapa baik Anda mengelola waktu antara kuliah, pekerjaan, dan kegiatan lain?", "manajemen_waktu"),
    ("Seberapa sering Anda pernah tidak hadir kuliah karena sulit membagi waktu antara kuliah dengan kegiatan lain?", "frekuensi_tidak_hadir_kuliah"),
    ("Seberapa sering Anda mendapatkan bimbingan akademik dari dosen?", "frekuensi_bimbingan_dosen"),
    ("Apakah Anda merasa puas dengan kualitas pengajaran dosen di jurusan Anda?", "kualitas_pengajaran_dosen"),
    ("Seberapa lengkap fasilitas pembelajaran yang tersedia di kampus Anda?", "kelengkapan_fasilitas"),
    ("Seberapa sering Anda menggunakan fasilitas pembelajaran di kampus?", "frekuensi_penggunaan_fasilitas"),
    ("Seberapa sering Anda mengalami gangguan saat belajar?", "frekuensi_gangguan_belajar"),
    ("Apakah Anda merasa beban tugas kuliah yang diberikan terlalu berat?", "beban_tugas_kuliah"),
];

const ENCODED_QUESTIONS: [(&str, &str, CategoryKind); 15] = [
    ("Tempat tinggal sekarang", "tempat_tinggal_sekarang", CategoryKind::Residence),
    ("Berapa pendapatan Ayah Anda per bulan?", "pendapatan_ayah", CategoryKind::Income),
    ("Berapa pendapatan Ibu Anda per bulan?", "pendapatan_ibu", CategoryKind::Income),
    ("Berapa uang saku Anda per bulan?", "uang_saku", CategoryKind::Allowance),
    ("Apakah Anda bekerja sambil kuliah?", "bekerja_sambil_kuliah", CategoryKind::YesNo),
    ("Apakah Anda mendapatkan dukungan finansial yang cukup dari keluarga untuk keperluan kuliah?", "dukungan_keluarga_finansial", CategoryKind::YesNo),
    ("Apakah uang saku Anda tersebut cukup untuk menghidupi Anda selama sebulan?", "uang_saku_cukup", CategoryKind::YesNo),
    ("Apakah keluarga mendukung Anda berkuliah di jurusan yang saat ini Anda jalani?", "dukungan_keluarga_jurusan", CategoryKind::YesNo),
    ("Apakah Jurusan yang Anda pilih sudah sesuai dengan keinginan diri sendiri?", "kesesuaian_jurusan", CategoryKind::YesNo),
    ("Apakah Anda mendapatkan dukungan finansial penuh dari keluarga untuk keperluan kuliah?", "finansial_untuk_kuliah", CategoryKind::YesNo),
    ("Apakah Anda memiliki keterbatasan fisik?", "keterbatasan_fisik", CategoryKind::YesNo),
    ("Apakah Anda memiliki akses yang baik terhadap layanan kesehatan?", "akses_baik_kesehatan", CategoryKind::YesNo),
    ("Apakah anda memiliki jaminan kesehatan?", "jaminan_kesehatan", CategoryKind::YesNo),
    ("Apakah Anda suka berolahraga?", "suka_olahraga", CategoryKind::YesNo),
    ("Apakah Anda memiliki kegiatan di luar kuliah yang mempengaruhi waktu belajar Anda?", "kegiatan_luar_kuliah", CategoryKind::YesNo),
];

fn default_survey_schema() -> SurveySchema {
    SurveySchema {
        renamed: RENAMED_QUESTIONS
            .iter()
            .map(|(question, factor)| RenamedQuestion {
                question: question.to_string(),
                factor: factor.to_string(),
            })
            .collect(),
        encoded: ENCODED_QUESTIONS
            .iter()
            .map(|(question, factor, kind)| EncodedQuestion {
                question: question.to_string(),
                factor: factor.to_string(),
                kind: *kind,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_five_groups() {
        let config = AnalysisConfig::default();
        assert_eq!(config.factor_groups.len(), 5);
        assert!(config.group("Faktor Pilihan Studi").is_some());
        assert!(config.group("faktor pilihan studi").is_none());
    }

    #[test]
    fn test_every_group_factor_has_a_survey_source() {
        let config = AnalysisConfig::default();
        let produced: Vec<&str> = config
            .survey
            .renamed
            .iter()
            .map(|q| q.factor.as_str())
            .chain(config.survey.encoded.iter().map(|q| q.factor.as_str()))
            .collect();
        for factor in config.required_factors() {
            assert!(produced.contains(&factor), "no source for {}", factor);
        }
    }

    #[test]
    fn test_required_factors_are_distinct() {
        let config = AnalysisConfig::default();
        let factors = config.required_factors();
        let mut sorted = factors.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), factors.len());
        assert_eq!(factors.len(), 25);
    }
}
