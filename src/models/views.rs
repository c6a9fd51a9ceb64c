// Read-side shapes assembled by the join layer. Nothing here is stored.
use serde::Serialize;
use std::collections::BTreeMap;
use rust_decimal::Decimal;
use super::{Course, FeeStatus, Fees, Grade, Marks, Student, User};

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StudentWithDetails {
    #[serde(flatten)]
    pub student: Student,
    pub user: User,
    pub course: Course,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MarksWithDetails {
    #[serde(flatten)]
    pub marks: Marks,
    pub student: StudentWithDetails,
    pub course: Course,
    #[serde(with = "rust_decimal::serde::float")]
    pub percentage: Decimal,
    pub grade: Grade,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FeesWithStudent {
    #[serde(flatten)]
    pub fees: Fees,
    pub student: StudentWithDetails,
    pub balance: Decimal,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_students: usize,
    pub total_faculty: usize,
    pub total_courses: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_fee_collection: Decimal,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CourseEnrollment {
    pub course_id: String,
    pub code: String,
    pub name: String,
    pub enrolled_count: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub enrollment_percentage: Decimal,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub stats: DashboardStats,
    pub course_enrollments: Vec<CourseEnrollment>,
    pub fee_status_distribution: BTreeMap<FeeStatus, usize>,
    #[serde(with = "rust_decimal::serde::float")]
    pub average_marks: Decimal,
    pub top_performers: Vec<MarksWithDetails>,
}
