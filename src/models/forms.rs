// Request bodies and query strings. Each body normalizes and checks itself
// before a handler sees it (see `handlers::extract::ValidJson`).
use serde::de::{value::StrDeserializer, DeserializeOwned, IntoDeserializer};
use serde::{Deserialize, Deserializer};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use crate::errors::{AppError, AppResult};
use super::{ExamType, FeeStatus, Role, StudentStatus};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Shape validation run on every JSON body. May normalize fields in place
/// (trimming, lower-casing emails).
pub trait Validate {
    fn validate(&mut self) -> AppResult<()>;
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl Validate for LoginForm {
    fn validate(&mut self) -> AppResult<()> {
        self.email = normalize_email(&self.email)?;
        check_password(&self.password)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl Validate for RegisterForm {
    fn validate(&mut self) -> AppResult<()> {
        self.email = normalize_email(&self.email)?;
        check_password(&self.password)?;
        self.first_name = required("firstName", &self.first_name)?;
        self.last_name = required("lastName", &self.last_name)?;
        self.phone = optional(self.phone.take());
        self.address = optional(self.address.take());
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordForm {
    pub email: String,
}

impl Validate for ForgotPasswordForm {
    fn validate(&mut self) -> AppResult<()> {
        self.email = normalize_email(&self.email)?;
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserUpdateForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

impl Validate for UserUpdateForm {
    fn validate(&mut self) -> AppResult<()> {
        self.first_name = self.first_name.as_deref().map(|n| required("firstName", n)).transpose()?;
        self.last_name = self.last_name.as_deref().map(|n| required("lastName", n)).transpose()?;
        self.phone = self.phone.take().map(|p| p.trim().to_string());
        self.address = self.address.take().map(|a| a.trim().to_string());
        let touched = self.first_name.is_some()
            || self.last_name.is_some()
            || self.phone.is_some()
            || self.address.is_some()
            || self.role.is_some()
            || self.is_active.is_some();
        if !touched {
            return Err(AppError::Validation("No fields to update".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseForm {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub credits: Option<u32>,
    pub department: String,
    pub faculty_id: Option<String>,
}

impl Validate for CourseForm {
    fn validate(&mut self) -> AppResult<()> {
        self.code = required("code", &self.code)?.to_ascii_uppercase();
        self.name = required("name", &self.name)?;
        self.department = required("department", &self.department)?;
        self.description = optional(self.description.take());
        self.faculty_id = optional(self.faculty_id.take());
        if self.credits == Some(0) {
            return Err(AppError::Validation("Credits must be at least 1".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CourseUpdateForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub credits: Option<u32>,
    pub department: Option<String>,
    pub faculty_id: Option<String>,
    pub is_active: Option<bool>,
}

impl Validate for CourseUpdateForm {
    fn validate(&mut self) -> AppResult<()> {
        self.name = self.name.as_deref().map(|n| required("name", n)).transpose()?;
        self.department = self
            .department
            .as_deref()
            .map(|d| required("department", d))
            .transpose()?;
        if self.credits == Some(0) {
            return Err(AppError::Validation("Credits must be at least 1".into()));
        }
        Ok(())
    }
}

/// Admission: creates the student's login and the student record together.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub course_id: String,
    #[serde(deserialize_with = "date_input::required")]
    pub admission_date: DateTime<Utc>,
}

impl Validate for AdmissionForm {
    fn validate(&mut self) -> AppResult<()> {
        self.first_name = required("firstName", &self.first_name)?;
        self.last_name = required("lastName", &self.last_name)?;
        self.email = normalize_email(&self.email)?;
        self.course_id = required("courseId", &self.course_id)?;
        self.phone = optional(self.phone.take());
        self.address = optional(self.address.take());
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StudentUpdateForm {
    pub course_id: Option<String>,
    pub semester: Option<u32>,
    pub status: Option<StudentStatus>,
}

impl Validate for StudentUpdateForm {
    fn validate(&mut self) -> AppResult<()> {
        if self.semester == Some(0) {
            return Err(AppError::Validation("Semester must be at least 1".into()));
        }
        if self.course_id.is_none() && self.semester.is_none() && self.status.is_none() {
            return Err(AppError::Validation("No fields to update".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarksForm {
    pub student_id: String,
    pub course_id: String,
    pub exam_type: ExamType,
    pub marks_obtained: Decimal,
    pub total_marks: Decimal,
    #[serde(deserialize_with = "date_input::required")]
    pub exam_date: DateTime<Utc>,
    pub remarks: Option<String>,
}

impl Validate for MarksForm {
    fn validate(&mut self) -> AppResult<()> {
        self.student_id = required("studentId", &self.student_id)?;
        self.course_id = required("courseId", &self.course_id)?;
        self.remarks = optional(self.remarks.take());
        super::marks::check_scores(self.marks_obtained, self.total_marks)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MarksUpdateForm {
    pub exam_type: Option<ExamType>,
    pub marks_obtained: Option<Decimal>,
    pub total_marks: Option<Decimal>,
    #[serde(default, deserialize_with = "date_input::optional")]
    pub exam_date: Option<DateTime<Utc>>,
    pub remarks: Option<String>,
}

impl Validate for MarksUpdateForm {
    // obtained <= total is checked against the stored record on apply
    fn validate(&mut self) -> AppResult<()> {
        if self.exam_type.is_none()
            && self.marks_obtained.is_none()
            && self.total_marks.is_none()
            && self.exam_date.is_none()
            && self.remarks.is_none()
        {
            return Err(AppError::Validation("No fields to update".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeesForm {
    pub student_id: String,
    pub academic_year: String,
    pub semester: u32,
    pub total_amount: Decimal,
    pub paid_amount: Option<Decimal>,
    #[serde(deserialize_with = "date_input::required")]
    pub due_date: DateTime<Utc>,
    #[serde(default, deserialize_with = "date_input::optional")]
    pub payment_date: Option<DateTime<Utc>>,
    pub status: Option<FeeStatus>,
}

impl Validate for FeesForm {
    fn validate(&mut self) -> AppResult<()> {
        self.student_id = required("studentId", &self.student_id)?;
        self.academic_year = required("academicYear", &self.academic_year)?;
        if self.semester == 0 {
            return Err(AppError::Validation("Semester must be at least 1".into()));
        }
        if self.total_amount <= Decimal::ZERO {
            return Err(AppError::Validation(
                "Total amount must be greater than zero".into(),
            ));
        }
        if self.paid_amount.is_some_and(|paid| paid < Decimal::ZERO) {
            return Err(AppError::Validation(
                "Paid amount cannot be negative".into(),
            ));
        }
        Ok(())
    }
}

/// `PATCH /api/fees/:id`: a payment, an explicit status, a new due date, or
/// any combination. A payment is either an increment (`amount`) or the new
/// running total (`paidAmount`), never both.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FeesPatchForm {
    pub amount: Option<Decimal>,
    pub paid_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "date_input::optional")]
    pub payment_date: Option<DateTime<Utc>>,
    pub status: Option<FeeStatus>,
    #[serde(default, deserialize_with = "date_input::optional")]
    pub due_date: Option<DateTime<Utc>>,
}

impl Validate for FeesPatchForm {
    fn validate(&mut self) -> AppResult<()> {
        if self.amount.is_some() && self.paid_amount.is_some() {
            return Err(AppError::Validation(
                "Send either amount or paidAmount, not both".into(),
            ));
        }
        if self.amount.is_some_and(|amount| amount < Decimal::ZERO) {
            return Err(AppError::Validation(
                "Payment amount cannot be negative".into(),
            ));
        }
        if self.paid_amount.is_some_and(|paid| paid < Decimal::ZERO) {
            return Err(AppError::Validation(
                "Paid amount cannot be negative".into(),
            ));
        }
        if self.payment_date.is_some() && !self.is_payment() {
            return Err(AppError::Validation(
                "paymentDate needs amount or paidAmount".into(),
            ));
        }
        if !self.is_payment() && self.status.is_none() && self.due_date.is_none() {
            return Err(AppError::Validation(
                "Nothing to update: supply amount, paidAmount, status or dueDate".into(),
            ));
        }
        Ok(())
    }
}

impl FeesPatchForm {
    pub fn is_payment(&self) -> bool {
        self.amount.is_some() || self.paid_amount.is_some()
    }
}

// Query strings: a blank value (`?studentId=`) means "no filter".

#[derive(Debug, Default, Deserialize)]
pub struct UsersQuery {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub role: Option<Role>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursesQuery {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub faculty_id: Option<String>,
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarksQuery {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub student_id: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub course_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeesQuery {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub student_id: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub status: Option<FeeStatus>,
}

fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => {
            let value: StrDeserializer<'_, D::Error> = raw.trim().into_deserializer();
            T::deserialize(value).map(Some)
        }
        _ => Ok(None),
    }
}

pub fn normalize_email(raw: &str) -> AppResult<String> {
    let email = raw.trim().to_ascii_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(AppError::Validation("Invalid email format".into()));
    }
    Ok(email)
}

fn check_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

fn required(field: &str, value: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Dates arrive either as RFC 3339 timestamps or as bare `YYYY-MM-DD` form
/// values; bare dates mean midnight UTC.
pub mod date_input {
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
        let raw = raw.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Ok(ts.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|midnight| Utc.from_utc_datetime(&midnight))
            .ok_or_else(|| format!("Invalid date '{}'", raw))
    }

    pub fn required<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub fn optional<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if !raw.trim().is_empty() => {
                parse(&raw).map(Some).map_err(serde::de::Error::custom)
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use serde_json::json;

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(
            normalize_email("  Jane.Doe@College.EDU ").expect("valid"),
            "jane.doe@college.edu"
        );
        for bad in ["", "jane", "@college.edu", "jane@", "jane@college", "a b@c.de", "a@b@c.de"] {
            assert!(normalize_email(bad).is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn login_requires_six_character_password() {
        let mut form = LoginForm {
            email: "admin@college.edu".into(),
            password: "12345".into(),
        };
        let err = form.validate().expect_err("short password");
        assert_eq!(err.to_string(), "Password must be at least 6 characters");
    }

    #[test]
    fn register_defaults_role_and_drops_blank_optionals() {
        let mut form: RegisterForm = serde_json::from_value(json!({
            "email": "Prof@College.edu",
            "password": "secret1",
            "firstName": " Ada ",
            "lastName": "Lovelace",
            "phone": "   "
        }))
        .expect("parse register form");
        form.validate().expect("valid form");

        assert_eq!(form.role, Role::Student);
        assert_eq!(form.email, "prof@college.edu");
        assert_eq!(form.first_name, "Ada");
        assert_eq!(form.phone, None);
    }

    #[test]
    fn dates_accept_plain_days_and_timestamps() {
        let day = date_input::parse("2024-07-01").expect("plain date");
        assert_eq!((day.year(), day.month(), day.day()), (2024, 7, 1));

        let ts = date_input::parse("2024-07-01T10:30:00+05:30").expect("rfc3339");
        assert_eq!(ts.to_rfc3339(), "2024-07-01T05:00:00+00:00");

        assert!(date_input::parse("01/07/2024").is_err());
    }

    #[test]
    fn marks_form_accepts_string_or_number_scores() {
        let mut form: MarksForm = serde_json::from_value(json!({
            "studentId": "s-1",
            "courseId": "c-1",
            "examType": "midterm",
            "marksObtained": "42.5",
            "totalMarks": 50,
            "examDate": "2024-03-10"
        }))
        .expect("parse marks form");
        form.validate().expect("valid marks");
        assert_eq!(form.exam_type, ExamType::Midterm);

        form.marks_obtained = Decimal::from(51);
        assert!(form.validate().is_err());
    }

    #[test]
    fn fees_patch_needs_something_to_do() {
        let mut empty = FeesPatchForm::default();
        assert!(empty.validate().is_err());

        let mut overdue: FeesPatchForm =
            serde_json::from_value(json!({ "status": "overdue", "paymentDate": null }))
                .expect("parse patch");
        overdue.validate().expect("status-only patch");
        assert_eq!(overdue.status, Some(FeeStatus::Overdue));
        assert_eq!(overdue.payment_date, None);

        let mut both: FeesPatchForm =
            serde_json::from_value(json!({ "amount": 10, "paidAmount": "4000" }))
                .expect("parse patch");
        assert!(both.validate().is_err());

        let mut stray_date: FeesPatchForm =
            serde_json::from_value(json!({ "paymentDate": "2024-08-01" })).expect("parse patch");
        assert!(stray_date.validate().is_err());
    }

    #[test]
    fn update_forms_reject_unknown_fields() {
        assert!(serde_json::from_value::<FeesPatchForm>(json!({ "paid": 10 })).is_err());
        assert!(serde_json::from_value::<StudentUpdateForm>(json!({ "semster": 2 })).is_err());
        assert!(serde_json::from_value::<MarksUpdateForm>(json!({ "marks": 2 })).is_err());
        assert!(serde_json::from_value::<CourseUpdateForm>(json!({ "title": "X" })).is_err());
        assert!(serde_json::from_value::<UserUpdateForm>(json!({ "active": false })).is_err());
    }

    #[test]
    fn blank_query_values_mean_no_filter() {
        let query: FeesQuery = serde_json::from_value(json!({ "studentId": "", "status": " " }))
            .expect("parse blank query");
        assert!(query.student_id.is_none());
        assert!(query.status.is_none());

        let query: FeesQuery = serde_json::from_value(json!({ "status": "partial" }))
            .expect("parse status query");
        assert_eq!(query.status, Some(FeeStatus::Partial));

        let bad = serde_json::from_value::<UsersQuery>(json!({ "role": "dean" }));
        assert!(bad.is_err());
    }
}
