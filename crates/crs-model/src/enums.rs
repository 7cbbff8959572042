//! Type-safe ordinal mapping tables.
//!
//! The scoring model was trained on integer encodings of the lender's
//! grade, sub-grade, employment length and loan term. Each table is an enum
//! with a fixed label set and a fixed integer code, so the encodings cannot
//! drift at runtime.
//!
//! | Table        | Labels                                   | Codes     |
//! |--------------|------------------------------------------|-----------|
//! | `grade`      | `A`..`G`                                 | 1..7      |
//! | `sub_grade`  | `A1`..`G5` (grade, then digit)           | 1..35     |
//! | `emp_length` | `< 1 year`, `1 year`..`9 years`, `10+ years`, `Unknown` | 0..10, -1 |
//! | `term`       | `36 months`, `60 months`                 | 0, 1      |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ModelError, Result};
use crate::lookup::labels_match;
use crate::options::MatchingMode;

/// Lender-assigned risk grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl Grade {
    /// All grades, best to worst.
    pub const ALL: [Grade; 7] = [
        Grade::A,
        Grade::B,
        Grade::C,
        Grade::D,
        Grade::E,
        Grade::F,
        Grade::G,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::E => "E",
            Grade::F => "F",
            Grade::G => "G",
        }
    }

    /// Ordinal code used by the model (A=1 .. G=7).
    pub fn code(&self) -> i32 {
        match self {
            Grade::A => 1,
            Grade::B => 2,
            Grade::C => 3,
            Grade::D => 4,
            Grade::E => 5,
            Grade::F => 6,
            Grade::G => 7,
        }
    }

    pub fn parse(value: &str, mode: MatchingMode) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|grade| labels_match(grade.as_str(), value, mode))
            .ok_or_else(|| ModelError::UnknownCategory {
                table: "grade",
                value: value.to_string(),
            })
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grade {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s, MatchingMode::Strict)
    }
}

/// Grade letter plus a tier digit 1..=5.
///
/// Serialized as its label (`"B3"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubGrade {
    grade: Grade,
    tier: u8,
}

impl SubGrade {
    pub const TIERS: u8 = 5;

    pub fn new(grade: Grade, tier: u8) -> Option<Self> {
        (1..=Self::TIERS)
            .contains(&tier)
            .then_some(Self { grade, tier })
    }

    pub fn grade(&self) -> Grade {
        self.grade
    }

    pub fn tier(&self) -> u8 {
        self.tier
    }

    /// Ordinal code used by the model (A1=1 .. G5=35).
    pub fn code(&self) -> i32 {
        (self.grade.code() - 1) * i32::from(Self::TIERS) + i32::from(self.tier)
    }

    /// Inverse of [`SubGrade::code`].
    pub fn from_code(code: i32) -> Option<Self> {
        if !(1..=35).contains(&code) {
            return None;
        }
        let index = usize::try_from(code - 1).ok()?;
        let grade = Grade::ALL[index / usize::from(Self::TIERS)];
        let tier = u8::try_from(index % usize::from(Self::TIERS)).ok()? + 1;
        Self::new(grade, tier)
    }

    /// All 35 sub-grades in code order.
    pub fn all() -> impl Iterator<Item = SubGrade> {
        Grade::ALL.into_iter().flat_map(|grade| {
            (1..=Self::TIERS).map(move |tier| SubGrade { grade, tier })
        })
    }

    pub fn label(&self) -> String {
        format!("{}{}", self.grade, self.tier)
    }

    pub fn parse(value: &str, mode: MatchingMode) -> Result<Self> {
        Self::all()
            .find(|sub_grade| labels_match(&sub_grade.label(), value, mode))
            .ok_or_else(|| ModelError::UnknownCategory {
                table: "sub_grade",
                value: value.to_string(),
            })
    }
}

impl fmt::Display for SubGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.grade, self.tier)
    }
}

impl FromStr for SubGrade {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s, MatchingMode::Strict)
    }
}

impl TryFrom<String> for SubGrade {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<SubGrade> for String {
    fn from(sub_grade: SubGrade) -> Self {
        sub_grade.label()
    }
}

/// Years in current employment as reported on the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmpLength {
    LessThanOneYear,
    /// 1 to 9 whole years.
    Years(u8),
    TenOrMore,
    Unknown,
}

impl EmpLength {
    /// Label used for missing employment length before lookup.
    pub const UNKNOWN_LABEL: &'static str = "Unknown";

    /// All twelve table entries in code order, `Unknown` last.
    pub fn all() -> impl Iterator<Item = EmpLength> {
        std::iter::once(EmpLength::LessThanOneYear)
            .chain((1..=9).map(EmpLength::Years))
            .chain([EmpLength::TenOrMore, EmpLength::Unknown])
    }

    pub fn label(&self) -> String {
        match self {
            EmpLength::LessThanOneYear => "< 1 year".to_string(),
            EmpLength::Years(1) => "1 year".to_string(),
            EmpLength::Years(n) => format!("{n} years"),
            EmpLength::TenOrMore => "10+ years".to_string(),
            EmpLength::Unknown => Self::UNKNOWN_LABEL.to_string(),
        }
    }

    /// Ordinal code used by the model (`< 1 year`=0 .. `10+ years`=10, `Unknown`=-1).
    pub fn code(&self) -> i32 {
        match self {
            EmpLength::LessThanOneYear => 0,
            EmpLength::Years(n) => i32::from(*n),
            EmpLength::TenOrMore => 10,
            EmpLength::Unknown => -1,
        }
    }

    pub fn parse(value: &str, mode: MatchingMode) -> Result<Self> {
        Self::all()
            .find(|length| labels_match(&length.label(), value, mode))
            .ok_or_else(|| ModelError::UnknownCategory {
                table: "emp_length",
                value: value.to_string(),
            })
    }
}

impl fmt::Display for EmpLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for EmpLength {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s, MatchingMode::Strict)
    }
}

/// Loan term in months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanTerm {
    ThirtySixMonths,
    SixtyMonths,
}

impl LoanTerm {
    pub fn months(&self) -> u32 {
        match self {
            LoanTerm::ThirtySixMonths => 36,
            LoanTerm::SixtyMonths => 60,
        }
    }

    /// Binary code used by the model (60 months = 1).
    pub fn code(&self) -> i32 {
        match self {
            LoanTerm::ThirtySixMonths => 0,
            LoanTerm::SixtyMonths => 1,
        }
    }

    /// Substring rule from the training pipeline: anything mentioning "60"
    /// is a 60 month loan, everything else is treated as 36 months.
    pub fn from_text_lossy(value: &str) -> Self {
        if value.contains("60") {
            LoanTerm::SixtyMonths
        } else {
            LoanTerm::ThirtySixMonths
        }
    }

    /// Explicit parse: the text must carry exactly one integer, 36 or 60.
    pub fn parse_strict(value: &str) -> Result<Self> {
        let numbers: Vec<&str> = value
            .split(|ch: char| !ch.is_ascii_digit())
            .filter(|token| !token.is_empty())
            .collect();
        match numbers.as_slice() {
            ["36"] => Ok(LoanTerm::ThirtySixMonths),
            ["60"] => Ok(LoanTerm::SixtyMonths),
            _ => Err(ModelError::UnknownCategory {
                table: "term",
                value: value.to_string(),
            }),
        }
    }
}

impl fmt::Display for LoanTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " {} months", self.months())
    }
}
