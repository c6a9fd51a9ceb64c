use std::collections::HashMap;
use std::sync::Arc;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;
use crate::errors::{AppError, AppResult};
use crate::models::{
    format_student_id, round_amount, Course, DashboardStats, FeeStatus, Fees, FeesWithStudent,
    Marks, MarksWithDetails, NewCourse, NewFees, NewMarks, NewStudent, NewUser, ReportSummary,
    Role, Student, StudentStatus, StudentWithDetails, User,
};

pub trait Record {
    fn id(&self) -> &str;
}

macro_rules! record {
    ($($ty:ty),*) => {
        $(impl Record for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        })*
    };
}

record!(User, Course, Student, Marks, Fees);

/// Keyed collection that remembers insertion order for listing.
#[derive(Debug)]
pub struct Table<T> {
    rows: HashMap<String, T>,
    order: Vec<String>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<T: Record + Clone> Table<T> {
    pub fn insert(&mut self, row: T) -> T {
        let id = row.id().to_string();
        if self.rows.insert(id.clone(), row.clone()).is_none() {
            self.order.push(id);
        }
        row
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.rows.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.rows.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.order.iter().filter_map(|id| self.rows.get(id))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// The whole system of record. Reads and writes go through `StoreService`,
/// which holds this behind a single lock.
#[derive(Debug, Default)]
pub struct Tables {
    pub users: Table<User>,
    pub courses: Table<Course>,
    pub students: Table<Student>,
    pub marks: Table<Marks>,
    pub fees: Table<Fees>,
}

impl Tables {
    // Users

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|user| user.email == email)
    }

    pub fn insert_user(&mut self, new: NewUser) -> User {
        self.users.insert(User {
            id: new_id(),
            email: new.email,
            password_hash: new.password_hash,
            role: new.role,
            first_name: new.first_name,
            last_name: new.last_name,
            phone: new.phone,
            address: new.address,
            is_active: true,
        })
    }

    // Courses

    pub fn course_by_code(&self, code: &str) -> Option<&Course> {
        self.courses
            .iter()
            .find(|course| course.code.eq_ignore_ascii_case(code))
    }

    pub fn insert_course(&mut self, new: NewCourse) -> Course {
        self.courses.insert(Course {
            id: new_id(),
            code: new.code,
            name: new.name,
            description: new.description,
            credits: new.credits,
            department: new.department,
            faculty_id: new.faculty_id,
            is_active: true,
        })
    }

    // Students

    // Count-based, so unique only while students are never removed.
    pub fn next_student_id(&self) -> String {
        format_student_id(self.students.len() + 1)
    }

    pub fn student_by_student_id(&self, student_id: &str) -> Option<&Student> {
        self.students
            .iter()
            .find(|student| student.student_id.eq_ignore_ascii_case(student_id))
    }

    pub fn student_by_user_id(&self, user_id: &str) -> Option<&Student> {
        self.students.iter().find(|student| student.user_id == user_id)
    }

    pub fn insert_student(&mut self, new: NewStudent) -> Student {
        self.students.insert(Student {
            id: new_id(),
            student_id: new.student_id,
            user_id: new.user_id,
            course_id: new.course_id,
            admission_date: new.admission_date,
            semester: new.semester,
            status: new.status,
        })
    }

    // Marks

    pub fn marks_by_student<'a>(&'a self, student_id: &'a str) -> impl Iterator<Item = &'a Marks> {
        self.marks.iter().filter(move |m| m.student_id == student_id)
    }

    pub fn insert_marks(&mut self, new: NewMarks) -> Marks {
        self.marks.insert(Marks {
            id: new_id(),
            student_id: new.student_id,
            course_id: new.course_id,
            exam_type: new.exam_type,
            marks_obtained: round_amount(new.marks_obtained),
            total_marks: round_amount(new.total_marks),
            exam_date: new.exam_date,
            remarks: new.remarks,
        })
    }

    // Fees

    pub fn fees_by_student<'a>(&'a self, student_id: &'a str) -> impl Iterator<Item = &'a Fees> {
        self.fees.iter().filter(move |f| f.student_id == student_id)
    }

    pub fn insert_fees(&mut self, new: NewFees) -> Fees {
        self.fees.insert(Fees {
            id: new_id(),
            student_id: new.student_id,
            academic_year: new.academic_year,
            semester: new.semester,
            total_amount: round_amount(new.total_amount),
            paid_amount: round_amount(new.paid_amount),
            due_date: new.due_date,
            payment_date: new.payment_date,
            status: new.status,
        })
    }
}

/// Applies `apply` to the row with `id`, keeping the row unchanged if it fails.
fn update_row<T, F>(table: &mut Table<T>, what: &str, id: &str, apply: F) -> AppResult<T>
where
    T: Record + Clone,
    F: FnOnce(&mut T) -> AppResult<()>,
{
    let row = table.get_mut(id).ok_or_else(|| AppError::not_found(what))?;
    let mut updated = row.clone();
    apply(&mut updated)?;
    *row = updated.clone();
    Ok(updated)
}

/// Cloneable handle to the in-memory store shared by every handler.
#[derive(Clone, Default)]
pub struct StoreService {
    tables: Arc<RwLock<Tables>>,
}

impl StoreService {
    pub fn new() -> Self {
        Self::default()
    }

    // Users

    pub async fn get_user(&self, id: &str) -> Option<User> {
        self.tables.read().await.users.get(id).cloned()
    }

    pub async fn get_user_by_email(&self, email: &str) -> Option<User> {
        self.tables.read().await.user_by_email(email).cloned()
    }

    pub async fn create_user(&self, new: NewUser) -> User {
        let user = self.tables.write().await.insert_user(new);
        tracing::info!("Created {} user {}", user.role.as_str(), user.id);
        user
    }

    pub async fn update_user<F>(&self, id: &str, apply: F) -> AppResult<User>
    where
        F: FnOnce(&mut User) -> AppResult<()>,
    {
        let mut tables = self.tables.write().await;
        update_row(&mut tables.users, "User", id, apply)
    }

    pub async fn list_users(&self, role: Option<Role>) -> Vec<User> {
        self.tables
            .read()
            .await
            .users
            .iter()
            .filter(|user| role.map_or(true, |r| user.role == r))
            .cloned()
            .collect()
    }

    // Courses

    pub async fn get_course(&self, id: &str) -> Option<Course> {
        self.tables.read().await.courses.get(id).cloned()
    }

    pub async fn get_course_by_code(&self, code: &str) -> Option<Course> {
        self.tables.read().await.course_by_code(code).cloned()
    }

    pub async fn list_courses(&self, active_only: bool, faculty_id: Option<&str>) -> Vec<Course> {
        self.tables
            .read()
            .await
            .courses
            .iter()
            .filter(|course| !active_only || course.is_active)
            .filter(|course| faculty_id.map_or(true, |f| course.faculty_id.as_deref() == Some(f)))
            .cloned()
            .collect()
    }

    pub async fn create_course(&self, new: NewCourse) -> Course {
        let course = self.tables.write().await.insert_course(new);
        tracing::info!("Created course {} ({})", course.code, course.id);
        course
    }

    pub async fn update_course<F>(&self, id: &str, apply: F) -> AppResult<Course>
    where
        F: FnOnce(&mut Course) -> AppResult<()>,
    {
        let mut tables = self.tables.write().await;
        update_row(&mut tables.courses, "Course", id, apply)
    }

    // Students

    pub async fn get_student(&self, id: &str) -> Option<Student> {
        self.tables.read().await.students.get(id).cloned()
    }

    pub async fn get_student_by_student_id(&self, student_id: &str) -> Option<Student> {
        self.tables.read().await.student_by_student_id(student_id).cloned()
    }

    pub async fn get_student_by_user_id(&self, user_id: &str) -> Option<Student> {
        self.tables.read().await.student_by_user_id(user_id).cloned()
    }

    /// Creates the student's user and the student record under one write
    /// lock, so the email check and the generated student id stay consistent.
    pub async fn admit_student(
        &self,
        user: NewUser,
        course_id: &str,
        admission_date: DateTime<Utc>,
    ) -> AppResult<Student> {
        let mut tables = self.tables.write().await;

        if tables.user_by_email(&user.email).is_some() {
            return Err(AppError::Validation(format!(
                "A user with email {} already exists",
                user.email
            )));
        }
        if tables.courses.get(course_id).is_none() {
            return Err(AppError::not_found("Course"));
        }

        let user = tables.insert_user(user);
        let student_id = tables.next_student_id();
        let student = tables.insert_student(NewStudent {
            student_id,
            user_id: user.id,
            course_id: course_id.to_string(),
            admission_date,
            semester: 1,
            status: StudentStatus::Active,
        });

        tracing::info!("Admitted student {} into course {}", student.student_id, course_id);
        Ok(student)
    }

    pub async fn update_student<F>(&self, id: &str, apply: F) -> AppResult<Student>
    where
        F: FnOnce(&mut Student) -> AppResult<()>,
    {
        let mut tables = self.tables.write().await;
        update_row(&mut tables.students, "Student", id, apply)
    }

    pub async fn students_with_details(&self) -> AppResult<Vec<StudentWithDetails>> {
        self.tables.read().await.student_views()
    }

    pub async fn student_with_details(&self, id: &str) -> AppResult<StudentWithDetails> {
        let tables = self.tables.read().await;
        let student = tables
            .students
            .get(id)
            .ok_or_else(|| AppError::not_found("Student"))?;
        tables.student_view(student)
    }

    // Marks

    pub async fn create_marks(&self, new: NewMarks) -> Marks {
        let marks = self.tables.write().await.insert_marks(new);
        tracing::info!("Recorded {:?} marks {} for student {}", marks.exam_type, marks.id, marks.student_id);
        marks
    }

    pub async fn update_marks<F>(&self, id: &str, apply: F) -> AppResult<Marks>
    where
        F: FnOnce(&mut Marks) -> AppResult<()>,
    {
        let mut tables = self.tables.write().await;
        update_row(&mut tables.marks, "Marks entry", id, apply)
    }

    pub async fn search_marks(
        &self,
        student_id: Option<&str>,
        course_id: Option<&str>,
    ) -> AppResult<Vec<MarksWithDetails>> {
        self.tables.read().await.marks_views(student_id, course_id)
    }

    // Fees

    pub async fn create_fees(&self, new: NewFees) -> Fees {
        let fees = self.tables.write().await.insert_fees(new);
        tracing::info!("Created fee record {} for student {}", fees.id, fees.student_id);
        fees
    }

    pub async fn update_fees<F>(&self, id: &str, apply: F) -> AppResult<Fees>
    where
        F: FnOnce(&mut Fees) -> AppResult<()>,
    {
        let mut tables = self.tables.write().await;
        update_row(&mut tables.fees, "Fee record", id, apply)
    }

    pub async fn fees_with_details(
        &self,
        student_id: Option<&str>,
        status: Option<FeeStatus>,
    ) -> AppResult<Vec<FeesWithStudent>> {
        self.tables.read().await.fees_views(student_id, status)
    }

    // Aggregates

    pub async fn dashboard_stats(&self) -> DashboardStats {
        self.tables.read().await.dashboard_stats()
    }

    pub async fn report_summary(&self) -> AppResult<ReportSummary> {
        self.tables.read().await.report_summary()
    }
}
