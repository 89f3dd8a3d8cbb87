//! Enumerated answer categories for encoded survey questions
//!
//! Every categorical survey question maps onto one of the category types below.
//! Parsing an answer never fails: it yields an [`Answer`] that distinguishes a
//! coded value from an unrecognized text and from an empty cell.

use serde::Serialize;

/// Outcome of encoding a single survey answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// The answer matched a category and carries its numeric code
    Coded(i32),
    /// The cell held text that matches no category of the factor
    Unrecognized(String),
    /// The cell was empty
    Missing,
}

impl Answer {
    pub fn code(&self) -> Option<i32> {
        match self {
            Answer::Coded(code) => Some(*code),
            _ => None,
        }
    }
}

/// A closed set of answer labels with fixed numeric codes.
pub trait Category: Copy + Sized + 'static {
    const ALL: &'static [Self];

    /// Exact answer text as it appears in the survey export
    fn label(self) -> &'static str;

    fn code(self) -> i32;

    fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL.iter().copied().find(|c| c.label() == text)
    }
}

/// Current place of residence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Residence {
    Asrama,
    BersamaSaudara,
    Kontrakan,
    Kost,
    OrangTua,
}

impl Category for Residence {
    const ALL: &'static [Self] = &[
        Residence::Asrama,
        Residence::BersamaSaudara,
        Residence::Kontrakan,
        Residence::Kost,
        Residence::OrangTua,
    ];

    fn label(self) -> &'static str {
        match self {
            Residence::Asrama => "Asrama",
            Residence::BersamaSaudara => "Bersama Saudara",
            Residence::Kontrakan => "Kontrakan",
            Residence::Kost => "Kost",
            Residence::OrangTua => "Orang tua",
        }
    }

    fn code(self) -> i32 {
        match self {
            Residence::Asrama => 1,
            Residence::BersamaSaudara => 2,
            Residence::Kontrakan => 3,
            Residence::Kost => 4,
            Residence::OrangTua => 5,
        }
    }
}

/// Monthly parental income bracket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncomeBracket {
    None,
    Below1M,
    From1To5M,
    From5To10M,
    Above10M,
}

impl Category for IncomeBracket {
    const ALL: &'static [Self] = &[
        IncomeBracket::None,
        IncomeBracket::Below1M,
        IncomeBracket::From1To5M,
        IncomeBracket::From5To10M,
        IncomeBracket::Above10M,
    ];

    fn label(self) -> &'static str {
        match self {
            IncomeBracket::None => "Tidak berpenghasilan",
            IncomeBracket::Below1M => "Kurang dari 1 juta",
            IncomeBracket::From1To5M => "1 juta - 5 juta",
            IncomeBracket::From5To10M => "5 juta - 10 juta",
            IncomeBracket::Above10M => "Lebih dari 10 juta",
        }
    }

    fn code(self) -> i32 {
        match self {
            IncomeBracket::None => 0,
            IncomeBracket::Below1M => 1,
            IncomeBracket::From1To5M => 2,
            IncomeBracket::From5To10M => 3,
            IncomeBracket::Above10M => 4,
        }
    }
}

/// Monthly pocket money bracket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowanceBracket {
    Below500K,
    From500KTo1M,
    From1MTo3M,
    Above3M,
}

impl Category for AllowanceBracket {
    const ALL: &'static [Self] = &[
        AllowanceBracket::Below500K,
        AllowanceBracket::From500KTo1M,
        AllowanceBracket::From1MTo3M,
        AllowanceBracket::Above3M,
    ];

    fn label(self) -> &'static str {
        match self {
            AllowanceBracket::Below500K => "Kurang dari Rp 500.000",
            AllowanceBracket::From500KTo1M => "Rp 500.000 - Rp 1.000.000",
            AllowanceBracket::From1MTo3M => "Rp 1.000.000 - Rp 3.000.000",
            AllowanceBracket::Above3M => "Lebih dari Rp 3.000.000",
        }
    }

    fn code(self) -> i32 {
        match self {
            AllowanceBracket::Below500K => 0,
            AllowanceBracket::From500KTo1M => 1,
            AllowanceBracket::From1MTo3M => 2,
            AllowanceBracket::Above3M => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YesNo {
    Ya,
    Tidak,
}

impl Category for YesNo {
    const ALL: &'static [Self] = &[YesNo::Ya, YesNo::Tidak];

    fn label(self) -> &'static str {
        match self {
            YesNo::Ya => "Ya",
            YesNo::Tidak => "Tidak",
        }
    }

    fn code(self) -> i32 {
        match self {
            YesNo::Ya => 1,
            YesNo::Tidak => 0,
        }
    }
}

/// Which category type a survey question is encoded with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Residence,
    Income,
    Allowance,
    YesNo,
}

impl CategoryKind {
    /// Encode one raw cell value
    pub fn encode(self, raw: Option<&str>) -> Answer {
        match self {
            CategoryKind::Residence => encode_with::<Residence>(raw),
            CategoryKind::Income => encode_with::<IncomeBracket>(raw),
            CategoryKind::Allowance => encode_with::<AllowanceBracket>(raw),
            CategoryKind::YesNo => encode_with::<YesNo>(raw),
        }
    }

    /// Every accepted answer label, in code order
    pub fn labels(self) -> Vec<&'static str> {
        fn labels_of<C: Category>() -> Vec<&'static str> {
            C::ALL.iter().map(|c| c.label()).collect()
        }
        match self {
            CategoryKind::Residence => labels_of::<Residence>(),
            CategoryKind::Income => labels_of::<IncomeBracket>(),
            CategoryKind::Allowance => labels_of::<AllowanceBracket>(),
            CategoryKind::YesNo => labels_of::<YesNo>(),
        }
    }
}

fn encode_with<C: Category>(raw: Option<&str>) -> Answer {
    match raw.map(str::trim) {
        None | Some("") => Answer::Missing,
        Some(text) => match C::parse(text) {
            Some(category) => Answer::Coded(category.code()),
            None => Answer::Unrecognized(text.to_string()),
        },
    }
}
