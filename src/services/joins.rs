// Read-time joins over the tables. Every view is rebuilt from the normalized
// rows on each call; a reference that does not resolve is an error, never a
// hole in the response.
use std::collections::BTreeMap;
use rust_decimal::Decimal;
use crate::errors::{AppError, AppResult};
use crate::models::{
    percentage, round_amount, Course, CourseEnrollment, DashboardStats, FeeStatus, Fees,
    FeesWithStudent, Marks, MarksWithDetails, ReportSummary, Role, Student, StudentWithDetails,
};
use super::store::Tables;

const TOP_PERFORMERS: usize = 5;

impl Tables {
    fn course_ref(&self, entity: &'static str, id: &str, course_id: &str) -> AppResult<&Course> {
        self.courses
            .get(course_id)
            .ok_or_else(|| AppError::dangling(entity, id, "Course", course_id))
    }

    /// Student ⨝ User ⨝ Course.
    pub fn student_view(&self, student: &Student) -> AppResult<StudentWithDetails> {
        let user = self
            .users
            .get(&student.user_id)
            .ok_or_else(|| AppError::dangling("Student", &student.id, "User", &student.user_id))?;
        let course = self.course_ref("Student", &student.id, &student.course_id)?;

        Ok(StudentWithDetails {
            student: student.clone(),
            user: user.clone(),
            course: course.clone(),
        })
    }

    pub fn student_views(&self) -> AppResult<Vec<StudentWithDetails>> {
        self.students
            .iter()
            .map(|student| self.student_view(student))
            .collect()
    }

    fn student_view_by_id(
        &self,
        entity: &'static str,
        id: &str,
        student_id: &str,
    ) -> AppResult<StudentWithDetails> {
        let student = self
            .students
            .get(student_id)
            .ok_or_else(|| AppError::dangling(entity, id, "Student", student_id))?;
        self.student_view(student)
    }

    /// Marks ⨝ Student view ⨝ Course, with the derived percentage and grade.
    pub fn marks_view(&self, marks: &Marks) -> AppResult<MarksWithDetails> {
        let student = self.student_view_by_id("Marks", &marks.id, &marks.student_id)?;
        let course = self.course_ref("Marks", &marks.id, &marks.course_id)?;

        Ok(MarksWithDetails {
            marks: marks.clone(),
            student,
            course: course.clone(),
            percentage: marks.percentage(),
            grade: marks.grade(),
        })
    }

    pub fn marks_views(
        &self,
        student_id: Option<&str>,
        course_id: Option<&str>,
    ) -> AppResult<Vec<MarksWithDetails>> {
        let rows: Box<dyn Iterator<Item = &Marks> + '_> = match student_id {
            Some(student_id) => Box::new(self.marks_by_student(student_id)),
            None => Box::new(self.marks.iter()),
        };

        rows.filter(|m| course_id.map_or(true, |c| m.course_id == c))
            .map(|m| self.marks_view(m))
            .collect()
    }

    /// Fees ⨝ Student view, with the derived balance.
    pub fn fees_view(&self, fees: &Fees) -> AppResult<FeesWithStudent> {
        let student = self.student_view_by_id("Fees", &fees.id, &fees.student_id)?;

        Ok(FeesWithStudent {
            fees: fees.clone(),
            student,
            balance: fees.balance(),
        })
    }

    pub fn fees_views(
        &self,
        student_id: Option<&str>,
        status: Option<FeeStatus>,
    ) -> AppResult<Vec<FeesWithStudent>> {
        let rows: Box<dyn Iterator<Item = &Fees> + '_> = match student_id {
            Some(student_id) => Box::new(self.fees_by_student(student_id)),
            None => Box::new(self.fees.iter()),
        };

        rows.filter(|f| status.map_or(true, |s| f.status == s))
            .map(|f| self.fees_view(f))
            .collect()
    }

    pub fn dashboard_stats(&self) -> DashboardStats {
        DashboardStats {
            total_students: self.students.len(),
            total_faculty: self
                .users
                .iter()
                .filter(|user| user.role == Role::Faculty)
                .count(),
            total_courses: self.courses.iter().filter(|course| course.is_active).count(),
            total_fee_collection: round_amount(
                self.fees.iter().map(|fees| fees.paid_amount).sum::<Decimal>(),
            ),
        }
    }

    pub fn report_summary(&self) -> AppResult<ReportSummary> {
        let total_students = self.students.len();

        let course_enrollments = self
            .courses
            .iter()
            .filter(|course| course.is_active)
            .map(|course| {
                let enrolled_count = self
                    .students
                    .iter()
                    .filter(|student| student.course_id == course.id)
                    .count();
                CourseEnrollment {
                    course_id: course.id.clone(),
                    code: course.code.clone(),
                    name: course.name.clone(),
                    enrolled_count,
                    enrollment_percentage: percentage(
                        Decimal::from(enrolled_count),
                        Decimal::from(total_students),
                    ),
                }
            })
            .collect();

        let mut fee_status_distribution = BTreeMap::new();
        for fees in self.fees.iter() {
            *fee_status_distribution.entry(fees.status).or_insert(0) += 1;
        }

        let average_marks = if self.marks.is_empty() {
            Decimal::ZERO
        } else {
            let sum: Decimal = self.marks.iter().map(|m| m.marks_obtained).sum();
            round_amount(sum / Decimal::from(self.marks.len()))
        };

        let mut top_performers = self.marks_views(None, None)?;
        top_performers.sort_by(|a, b| b.percentage.cmp(&a.percentage));
        top_performers.truncate(TOP_PERFORMERS);

        Ok(ReportSummary {
            stats: self.dashboard_stats(),
            course_enrollments,
            fee_status_distribution,
            average_marks,
            top_performers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::models::{ExamType, NewCourse, NewFees, NewMarks, NewStudent, NewUser, StudentStatus};

    struct Fixture {
        tables: Tables,
        course_id: String,
        student_id: String,
    }

    fn fixture() -> Fixture {
        let mut tables = Tables::default();
        let course = tables.insert_course(NewCourse {
            code: "CS101".into(),
            name: "Computer Science".into(),
            description: None,
            credits: 4,
            department: "Computer Science".into(),
            faculty_id: None,
        });
        let user = tables.insert_user(NewUser {
            email: "jane@college.edu".into(),
            password_hash: "hash".into(),
            role: Role::Student,
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            phone: None,
            address: None,
        });
        let student = tables.insert_student(NewStudent {
            student_id: tables.next_student_id(),
            user_id: user.id,
            course_id: course.id.clone(),
            admission_date: Utc::now(),
            semester: 1,
            status: StudentStatus::Active,
        });
        Fixture {
            tables,
            course_id: course.id,
            student_id: student.id,
        }
    }

    fn marks(f: &mut Fixture, obtained: i64, total: i64) -> Marks {
        let (student_id, course_id) = (f.student_id.clone(), f.course_id.clone());
        f.tables.insert_marks(NewMarks {
            student_id,
            course_id,
            exam_type: ExamType::Internal,
            marks_obtained: Decimal::from(obtained),
            total_marks: Decimal::from(total),
            exam_date: Utc::now(),
            remarks: None,
        })
    }

    fn fees(f: &mut Fixture, student_id: &str, total: i64, paid: i64) -> Fees {
        let (total, paid) = (Decimal::from(total), Decimal::from(paid));
        f.tables.insert_fees(NewFees {
            student_id: student_id.to_string(),
            academic_year: "2024-25".into(),
            semester: 1,
            total_amount: total,
            paid_amount: paid,
            due_date: Utc::now(),
            payment_date: None,
            status: FeeStatus::from_amounts(paid, total),
        })
    }

    #[test]
    fn student_view_attaches_user_and_course() {
        let f = fixture();
        let views = f.tables.student_views().expect("student views");

        assert_eq!(views.len(), 1);
        assert_eq!(views[0].user.full_name(), "Jane Doe");
        assert_eq!(views[0].course.code, "CS101");
        assert_eq!(views[0].student.student_id, "STU001");
    }

    #[test]
    fn dangling_user_reference_is_an_error() {
        let mut f = fixture();
        let course_id = f.course_id.clone();
        f.tables.insert_student(NewStudent {
            student_id: "STU002".into(),
            user_id: "ghost".into(),
            course_id,
            admission_date: Utc::now(),
            semester: 1,
            status: StudentStatus::Active,
        });

        let err = f.tables.student_views().expect_err("dangling user");
        assert!(matches!(err, AppError::DanglingReference { target: "User", .. }));
    }

    #[test]
    fn fees_for_missing_student_surface_as_error() {
        let mut f = fixture();
        fees(&mut f, "ghost", 100, 0);

        let err = f.tables.fees_views(None, None).expect_err("dangling student");
        assert!(err.to_string().ends_with("references missing Student ghost"));
    }

    #[test]
    fn marks_search_filters_by_student_and_course() {
        let mut f = fixture();
        marks(&mut f, 45, 50);
        marks(&mut f, 30, 50);
        let student_id = f.student_id.clone();
        let course_id = f.course_id.clone();

        assert_eq!(f.tables.marks_views(None, None).expect("all").len(), 2);
        assert_eq!(
            f.tables
                .marks_views(Some(&student_id), Some(&course_id))
                .expect("filtered")
                .len(),
            2
        );
        assert!(f.tables.marks_views(Some("other"), None).expect("none").is_empty());
        assert!(f.tables.marks_views(None, Some("other")).expect("none").is_empty());

        let view = &f.tables.marks_views(None, None).expect("all")[0];
        assert_eq!(view.percentage, Decimal::from(90));
        assert_eq!(view.grade.as_str(), "A+");
    }

    #[test]
    fn dashboard_sums_paid_amounts_and_counts_roles() {
        let mut f = fixture();
        let student_id = f.student_id.clone();
        fees(&mut f, &student_id, 10000, 4000);
        fees(&mut f, &student_id, 5000, 5000);
        f.tables.insert_user(NewUser {
            email: "prof@college.edu".into(),
            password_hash: "hash".into(),
            role: Role::Faculty,
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            phone: None,
            address: None,
        });

        let stats = f.tables.dashboard_stats();
        assert_eq!(stats.total_students, 1);
        assert_eq!(stats.total_faculty, 1);
        assert_eq!(stats.total_courses, 1);
        assert_eq!(stats.total_fee_collection, Decimal::from(9000));

        let json = serde_json::to_value(&stats).expect("serialize stats");
        assert_eq!(json["totalFeeCollection"], 9000.0);
    }

    #[test]
    fn report_summary_ranks_and_distributes() {
        let mut f = fixture();
        for obtained in [10, 40, 25, 50, 35, 45] {
            marks(&mut f, obtained, 50);
        }
        let student_id = f.student_id.clone();
        fees(&mut f, &student_id, 100, 0);
        fees(&mut f, &student_id, 100, 50);
        fees(&mut f, &student_id, 100, 100);
        fees(&mut f, &student_id, 100, 100);

        let summary = f.tables.report_summary().expect("summary");

        let ranked: Vec<_> = summary
            .top_performers
            .iter()
            .map(|m| m.marks.marks_obtained)
            .collect();
        assert_eq!(ranked, [50, 45, 40, 35, 25].map(|v: i64| Decimal::from(v)));
        assert_eq!(summary.average_marks, round_amount("34.17".parse().expect("decimal")));
        assert_eq!(summary.fee_status_distribution.get(&FeeStatus::Paid), Some(&2));
        assert_eq!(summary.fee_status_distribution.get(&FeeStatus::Partial), Some(&1));
        assert_eq!(summary.fee_status_distribution.get(&FeeStatus::Pending), Some(&1));
        assert_eq!(summary.course_enrollments[0].enrolled_count, 1);
        assert_eq!(summary.course_enrollments[0].enrollment_percentage, Decimal::from(100));
    }
}
