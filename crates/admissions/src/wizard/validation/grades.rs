use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Grades offered in the admission process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "prekinder")]
    Prekinder,
    #[serde(rename = "kinder")]
    Kinder,
    #[serde(rename = "1basico")]
    Basico1,
    #[serde(rename = "2basico")]
    Basico2,
    #[serde(rename = "3basico")]
    Basico3,
    #[serde(rename = "4basico")]
    Basico4,
    #[serde(rename = "5basico")]
    Basico5,
    #[serde(rename = "6basico")]
    Basico6,
    #[serde(rename = "7basico")]
    Basico7,
    #[serde(rename = "8basico")]
    Basico8,
    #[serde(rename = "1medio")]
    Medio1,
    #[serde(rename = "2medio")]
    Medio2,
    #[serde(rename = "3medio")]
    Medio3,
    #[serde(rename = "4medio")]
    Medio4,
}

impl Grade {
    pub const fn ordered() -> [Self; 14] {
        [
            Self::Prekinder,
            Self::Kinder,
            Self::Basico1,
            Self::Basico2,
            Self::Basico3,
            Self::Basico4,
            Self::Basico5,
            Self::Basico6,
            Self::Basico7,
            Self::Basico8,
            Self::Medio1,
            Self::Medio2,
            Self::Medio3,
            Self::Medio4,
        ]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Prekinder => "prekinder",
            Self::Kinder => "kinder",
            Self::Basico1 => "1basico",
            Self::Basico2 => "2basico",
            Self::Basico3 => "3basico",
            Self::Basico4 => "4basico",
            Self::Basico5 => "5basico",
            Self::Basico6 => "6basico",
            Self::Basico7 => "7basico",
            Self::Basico8 => "8basico",
            Self::Medio1 => "1medio",
            Self::Medio2 => "2medio",
            Self::Medio3 => "3medio",
            Self::Medio4 => "4medio",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Prekinder => "Pre-Kínder",
            Self::Kinder => "Kínder",
            Self::Basico1 => "1° Básico",
            Self::Basico2 => "2° Básico",
            Self::Basico3 => "3° Básico",
            Self::Basico4 => "4° Básico",
            Self::Basico5 => "5° Básico",
            Self::Basico6 => "6° Básico",
            Self::Basico7 => "7° Básico",
            Self::Basico8 => "8° Básico",
            Self::Medio1 => "1° Medio",
            Self::Medio2 => "2° Medio",
            Self::Medio3 => "3° Medio",
            Self::Medio4 => "4° Medio",
        }
    }

    /// Inclusive age range (in years) accepted for the grade.
    pub const fn age_range(self) -> (u32, u32) {
        match self {
            Self::Prekinder => (3, 5),
            Self::Kinder => (4, 6),
            Self::Basico1 => (5, 7),
            Self::Basico2 => (6, 8),
            Self::Basico3 => (7, 9),
            Self::Basico4 => (8, 10),
            Self::Basico5 => (9, 11),
            Self::Basico6 => (10, 12),
            Self::Basico7 => (11, 13),
            Self::Basico8 => (12, 14),
            Self::Medio1 => (13, 15),
            Self::Medio2 => (14, 16),
            Self::Medio3 => (15, 17),
            Self::Medio4 => (16, 18),
        }
    }

    /// From 2° Básico on, applicants must name the school they attend.
    pub const fn requires_current_school(self) -> bool {
        !matches!(self, Self::Prekinder | Self::Kinder | Self::Basico1)
    }
}

impl FromStr for Grade {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim().to_lowercase();
        Self::ordered()
            .into_iter()
            .find(|grade| grade.as_str() == wanted)
            .ok_or_else(|| format!("unknown grade '{raw}'"))
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn requires_current_school(grade: Grade) -> bool {
    grade.requires_current_school()
}

/// Completed years between `birth` and `on`; zero for future birth dates.
pub fn age_in_years(birth: NaiveDate, on: NaiveDate) -> u32 {
    if on < birth {
        return 0;
    }
    let mut years = on.year() - birth.year();
    if (on.month(), on.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

/// Result of checking an applicant's age against a grade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgeCheck {
    pub valid: bool,
    pub age: u32,
    pub min_age: u32,
    pub max_age: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub fn validate_birth_date_for_grade(birth: NaiveDate, grade: Grade, on: NaiveDate) -> AgeCheck {
    let age = age_in_years(birth, on);
    let (min_age, max_age) = grade.age_range();
    let valid = (min_age..=max_age).contains(&age);
    let message = (!valid).then(|| {
        format!(
            "La edad del estudiante ({age} años) no corresponde a {}: se esperan entre {min_age} y {max_age} años",
            grade.label()
        )
    });

    AgeCheck {
        valid,
        age,
        min_age,
        max_age,
        message,
    }
}
