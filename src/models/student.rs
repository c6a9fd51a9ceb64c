use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    #[default]
    Active,
    Inactive,
    Graduated,
    Suspended,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub student_id: String,  // human-readable, e.g. STU007
    pub user_id: String,
    pub course_id: String,
    pub admission_date: DateTime<Utc>,
    pub semester: u32,
    pub status: StudentStatus,
}

#[derive(Debug, Clone)]
pub struct NewStudent {
    pub student_id: String,
    pub user_id: String,
    pub course_id: String,
    pub admission_date: DateTime<Utc>,
    pub semester: u32,
    pub status: StudentStatus,
}

/// Formats the n-th admission number as `STU` plus a three digit sequence.
pub fn format_student_id(sequence: usize) -> String {
    format!("STU{:03}", sequence)
}
