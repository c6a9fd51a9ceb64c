use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use crate::errors::{AppError, AppResult};
use crate::models::{
    Course, CourseForm, CourseUpdateForm, CoursesQuery, NewCourse, Role, DEFAULT_CREDITS,
};
use crate::services::StoreService;
use super::{extract::{QueryParams, ValidJson}, AppState};

pub async fn list_courses(
    State((store, _)): State<AppState>,
    QueryParams(query): QueryParams<CoursesQuery>,
) -> Json<Vec<Course>> {
    let courses = store
        .list_courses(!query.include_inactive, query.faculty_id.as_deref())
        .await;
    tracing::debug!("Listing {} courses", courses.len());
    Json(courses)
}

pub async fn create_course(
    State((store, _)): State<AppState>,
    ValidJson(form): ValidJson<CourseForm>,
) -> AppResult<(StatusCode, Json<Course>)> {
    if store.get_course_by_code(&form.code).await.is_some() {
        return Err(AppError::Validation(format!(
            "A course with code {} already exists",
            form.code
        )));
    }
    if let Some(faculty_id) = &form.faculty_id {
        check_faculty(&store, faculty_id).await?;
    }

    let course = store
        .create_course(NewCourse {
            code: form.code,
            name: form.name,
            description: form.description,
            credits: form.credits.unwrap_or(DEFAULT_CREDITS),
            department: form.department,
            faculty_id: form.faculty_id,
        })
        .await;

    Ok((StatusCode::CREATED, Json(course)))
}

pub async fn update_course(
    State((store, _)): State<AppState>,
    Path(course_id): Path<String>,
    ValidJson(form): ValidJson<CourseUpdateForm>,
) -> AppResult<Json<Course>> {
    let faculty_id = match form.faculty_id.as_deref().map(str::trim) {
        Some("") => Some(None),
        Some(id) => {
            check_faculty(&store, id).await?;
            Some(Some(id.to_string()))
        }
        None => None,
    };

    let course = store
        .update_course(&course_id, |course| {
            if let Some(name) = form.name {
                course.name = name;
            }
            if let Some(description) = form.description {
                course.description = Some(description).filter(|d| !d.trim().is_empty());
            }
            if let Some(credits) = form.credits {
                course.credits = credits;
            }
            if let Some(department) = form.department {
                course.department = department;
            }
            if let Some(faculty_id) = faculty_id {
                course.faculty_id = faculty_id;
            }
            if let Some(is_active) = form.is_active {
                course.is_active = is_active;
            }
            Ok(())
        })
        .await?;

    tracing::info!("Updated course {} (active: {})", course.code, course.is_active);
    Ok(Json(course))
}

// Course owners must be existing faculty (or admin) users.
async fn check_faculty(store: &StoreService, faculty_id: &str) -> AppResult<()> {
    let user = store
        .get_user(faculty_id)
        .await
        .ok_or_else(|| AppError::not_found("Faculty member"))?;
    if user.role == Role::Student {
        return Err(AppError::Validation(format!(
            "{} is a student and cannot own a course",
            user.full_name()
        )));
    }
    Ok(())
}
