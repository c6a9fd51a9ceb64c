use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use crate::errors::{AppError, AppResult};
use crate::models::{AdmissionForm, NewUser, Role, StudentUpdateForm, StudentWithDetails};
use crate::services::credentials::hash_password;
use super::{extract::ValidJson, AppState};

pub async fn list_students(
    State((store, _)): State<AppState>,
) -> AppResult<Json<Vec<StudentWithDetails>>> {
    let students = store.students_with_details().await?;
    tracing::debug!("Listing {} students", students.len());
    Ok(Json(students))
}

/// Looks a student up by record id or by admission number (`STU001`).
pub async fn get_student(
    State((store, _)): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<StudentWithDetails>> {
    let record_id = match store.get_student(&id).await {
        Some(student) => student.id,
        None => store
            .get_student_by_student_id(&id)
            .await
            .map(|student| student.id)
            .ok_or_else(|| AppError::not_found("Student"))?,
    };
    Ok(Json(store.student_with_details(&record_id).await?))
}

/// Admission: creates a student-role login with the default password, then
/// the student record with the next admission number.
pub async fn admit_student(
    State((store, config)): State<AppState>,
    ValidJson(form): ValidJson<AdmissionForm>,
) -> AppResult<(StatusCode, Json<StudentWithDetails>)> {
    tracing::info!("Admitting {} {} into course {}", form.first_name, form.last_name, form.course_id);

    let password_hash = hash_password(
        &config.auth.default_student_password,
        config.auth.bcrypt_cost,
    )?;
    let user = NewUser {
        email: form.email,
        password_hash,
        role: Role::Student,
        first_name: form.first_name,
        last_name: form.last_name,
        phone: form.phone,
        address: form.address,
    };

    let student = store
        .admit_student(user, &form.course_id, form.admission_date)
        .await?;
    let created = store.student_with_details(&student.id).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_student(
    State((store, _)): State<AppState>,
    Path(id): Path<String>,
    ValidJson(form): ValidJson<StudentUpdateForm>,
) -> AppResult<Json<StudentWithDetails>> {
    if let Some(course_id) = &form.course_id {
        if store.get_course(course_id).await.is_none() {
            return Err(AppError::not_found("Course"));
        }
    }

    let student = store
        .update_student(&id, |student| {
            if let Some(course_id) = form.course_id {
                student.course_id = course_id;
            }
            if let Some(semester) = form.semester {
                student.semester = semester;
            }
            if let Some(status) = form.status {
                student.status = status;
            }
            Ok(())
        })
        .await?;

    tracing::info!("Updated student {}: semester {}, {:?}", student.student_id, student.semester, student.status);
    Ok(Json(store.student_with_details(&student.id).await?))
}
