use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use crate::errors::{AppError, AppResult};
use crate::models::{
    check_scores, round_amount, Marks, MarksForm, MarksQuery, MarksUpdateForm, MarksWithDetails,
    NewMarks,
};
use super::{extract::{QueryParams, ValidJson}, AppState};

pub async fn list_marks(
    State((store, _)): State<AppState>,
    QueryParams(query): QueryParams<MarksQuery>,
) -> AppResult<Json<Vec<MarksWithDetails>>> {
    tracing::debug!(
        "Searching marks (student: {:?}, course: {:?})",
        query.student_id,
        query.course_id
    );
    let marks = store
        .search_marks(query.student_id.as_deref(), query.course_id.as_deref())
        .await?;
    Ok(Json(marks))
}

pub async fn create_marks(
    State((store, _)): State<AppState>,
    ValidJson(form): ValidJson<MarksForm>,
) -> AppResult<(StatusCode, Json<Value>)> {
    if store.get_student(&form.student_id).await.is_none() {
        return Err(AppError::not_found("Student"));
    }
    if store.get_course(&form.course_id).await.is_none() {
        return Err(AppError::not_found("Course"));
    }

    let marks = store
        .create_marks(NewMarks {
            student_id: form.student_id,
            course_id: form.course_id,
            exam_type: form.exam_type,
            marks_obtained: form.marks_obtained,
            total_marks: form.total_marks,
            exam_date: form.exam_date,
            remarks: form.remarks,
        })
        .await;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Marks entry created successfully",
            "data": marks,
        })),
    ))
}

/// Corrections to an entry; the score rule is re-checked on the merged record.
pub async fn update_marks(
    State((store, _)): State<AppState>,
    Path(marks_id): Path<String>,
    ValidJson(form): ValidJson<MarksUpdateForm>,
) -> AppResult<Json<Marks>> {
    let marks = store
        .update_marks(&marks_id, |marks| {
            if let Some(exam_type) = form.exam_type {
                marks.exam_type = exam_type;
            }
            if let Some(obtained) = form.marks_obtained {
                marks.marks_obtained = round_amount(obtained);
            }
            if let Some(total) = form.total_marks {
                marks.total_marks = round_amount(total);
            }
            if let Some(exam_date) = form.exam_date {
                marks.exam_date = exam_date;
            }
            if let Some(remarks) = form.remarks {
                marks.remarks = Some(remarks).filter(|r| !r.trim().is_empty());
            }
            check_scores(marks.marks_obtained, marks.total_marks)
        })
        .await?;

    tracing::info!("Updated marks entry {}", marks.id);
    Ok(Json(marks))
}
