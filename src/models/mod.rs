mod user;
mod course;
mod student;
mod marks;
mod fees;
mod forms;
mod views;

use rust_decimal::{Decimal, RoundingStrategy};

pub use user::{NewUser, Role, User, UserSummary};
pub use course::{Course, NewCourse, DEFAULT_CREDITS};
pub use student::{format_student_id, NewStudent, Student, StudentStatus};
pub use marks::{check_scores, percentage, ExamType, Grade, Marks, NewMarks};
pub use fees::{FeeStatus, Fees, NewFees};
pub use forms::{
    AdmissionForm, CourseForm, CourseUpdateForm, CoursesQuery, FeesForm, FeesPatchForm,
    FeesQuery, ForgotPasswordForm, LoginForm, MarksForm, MarksQuery, MarksUpdateForm,
    RegisterForm, StudentUpdateForm, UserUpdateForm, UsersQuery, Validate,
};
pub use views::{
    CourseEnrollment, DashboardStats, FeesWithStudent, MarksWithDetails, ReportSummary,
    StudentWithDetails,
};

/// Money and marks are kept at exactly two decimal places.
pub fn round_amount(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_serialize_with_two_places() {
        let amount = round_amount(Decimal::from(10000));
        assert_eq!(amount.to_string(), "10000.00");
        assert_eq!(round_amount("0.125".parse().expect("decimal")).to_string(), "0.13");
    }
}
