use serde::{Deserialize, Serialize, Serializer};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use crate::errors::{AppError, AppResult};
use super::round_amount;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExamType {
    Internal,
    Midterm,
    Final,
    Assignment,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Marks {
    pub id: String,
    pub student_id: String,
    pub course_id: String,
    pub exam_type: ExamType,
    pub marks_obtained: Decimal,
    pub total_marks: Decimal,
    pub exam_date: DateTime<Utc>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewMarks {
    pub student_id: String,
    pub course_id: String,
    pub exam_type: ExamType,
    pub marks_obtained: Decimal,
    pub total_marks: Decimal,
    pub exam_date: DateTime<Utc>,
    pub remarks: Option<String>,
}

impl Marks {
    /// Score as a percentage of the total, rounded to two places.
    pub fn percentage(&self) -> Decimal {
        percentage(self.marks_obtained, self.total_marks)
    }

    pub fn grade(&self) -> Grade {
        Grade::from_percentage(self.percentage())
    }
}

pub fn percentage(obtained: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        return Decimal::ZERO;
    }
    round_amount(obtained * Decimal::ONE_HUNDRED / total)
}

/// Write-boundary rule for a marks entry: 0 <= obtained <= total, total > 0.
pub fn check_scores(obtained: Decimal, total: Decimal) -> AppResult<()> {
    if total <= Decimal::ZERO {
        return Err(AppError::Validation(
            "Total marks must be greater than zero".into(),
        ));
    }
    if obtained < Decimal::ZERO {
        return Err(AppError::Validation(
            "Marks obtained cannot be negative".into(),
        ));
    }
    if obtained > total {
        return Err(AppError::Validation(
            "Marks obtained cannot be greater than total marks".into(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grade {
    APlus,
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_percentage(percentage: Decimal) -> Self {
        let bands = [
            (90, Grade::APlus),
            (80, Grade::A),
            (70, Grade::B),
            (60, Grade::C),
            (50, Grade::D),
        ];
        bands
            .into_iter()
            .find(|(floor, _)| percentage >= Decimal::from(*floor))
            .map(|(_, grade)| grade)
            .unwrap_or(Grade::F)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl Serialize for Grade {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(value: &str) -> Decimal {
        value.parse().expect("decimal literal")
    }

    #[test]
    fn grade_bands_use_inclusive_floors() {
        assert_eq!(Grade::from_percentage(dec("100")), Grade::APlus);
        assert_eq!(Grade::from_percentage(dec("90")), Grade::APlus);
        assert_eq!(Grade::from_percentage(dec("89.99")), Grade::A);
        assert_eq!(Grade::from_percentage(dec("80")), Grade::A);
        assert_eq!(Grade::from_percentage(dec("70")), Grade::B);
        assert_eq!(Grade::from_percentage(dec("60")), Grade::C);
        assert_eq!(Grade::from_percentage(dec("50")), Grade::D);
        assert_eq!(Grade::from_percentage(dec("49.99")), Grade::F);
        assert_eq!(Grade::from_percentage(Decimal::ZERO), Grade::F);
    }

    #[test]
    fn percentage_rounds_to_two_places() {
        assert_eq!(percentage(dec("2"), dec("3")), dec("66.67"));
        assert_eq!(percentage(dec("45"), dec("50")), dec("90"));
        assert_eq!(percentage(dec("1"), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn rejects_obtained_above_total() {
        let err = check_scores(dec("51"), dec("50")).expect_err("over total");
        assert!(err.to_string().contains("cannot be greater than total"));
        assert!(check_scores(dec("50"), dec("50")).is_ok());
        assert!(check_scores(dec("-1"), dec("50")).is_err());
        assert!(check_scores(dec("0"), dec("0")).is_err());
    }

    #[test]
    fn grade_serializes_as_letter() {
        let value = serde_json::to_value(Grade::APlus).expect("serialize grade");
        assert_eq!(value, "A+");
    }
}
