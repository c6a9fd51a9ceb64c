use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use rust_decimal::Decimal;
use crate::errors::{AppError, AppResult};
use crate::models::{
    FeeStatus, Fees, FeesForm, FeesPatchForm, FeesQuery, FeesWithStudent, NewFees,
};
use super::{extract::{QueryParams, ValidJson}, AppState};

pub async fn list_fees(
    State((store, _)): State<AppState>,
    QueryParams(query): QueryParams<FeesQuery>,
) -> AppResult<Json<Vec<FeesWithStudent>>> {
    let fees = store
        .fees_with_details(query.student_id.as_deref(), query.status)
        .await?;
    tracing::debug!("Listing {} fee records", fees.len());
    Ok(Json(fees))
}

pub async fn create_fees(
    State((store, _)): State<AppState>,
    ValidJson(form): ValidJson<FeesForm>,
) -> AppResult<(StatusCode, Json<Fees>)> {
    if store.get_student(&form.student_id).await.is_none() {
        return Err(AppError::not_found("Student"));
    }

    let paid_amount = form.paid_amount.unwrap_or(Decimal::ZERO);
    let status = match form.status {
        Some(status) => status.check_against(paid_amount, form.total_amount)?,
        None => FeeStatus::from_amounts(paid_amount, form.total_amount),
    };

    let fees = store
        .create_fees(NewFees {
            student_id: form.student_id,
            academic_year: form.academic_year,
            semester: form.semester,
            total_amount: form.total_amount,
            paid_amount,
            due_date: form.due_date,
            payment_date: form.payment_date,
            status,
        })
        .await;

    Ok((StatusCode::CREATED, Json(fees)))
}

/// Records a payment and/or sets `status` / `dueDate`, all under one write.
/// A payment is an increment (`amount`) or the client's running total
/// (`paidAmount`); either way the status is re-derived from the amounts. An
/// explicit status is applied last and must be `overdue` or agree with them.
pub async fn update_fees(
    State((store, _)): State<AppState>,
    Path(fees_id): Path<String>,
    ValidJson(form): ValidJson<FeesPatchForm>,
) -> AppResult<Json<Fees>> {
    let paid_at = form.payment_date.unwrap_or_else(Utc::now);
    let is_payment = form.is_payment();

    let fees = store
        .update_fees(&fees_id, |fees| {
            if let Some(amount) = form.amount {
                fees.record_payment(amount, paid_at)?;
            }
            if let Some(paid) = form.paid_amount {
                fees.set_paid_amount(paid, paid_at)?;
            }
            if let Some(due_date) = form.due_date {
                fees.due_date = due_date;
            }
            if let Some(status) = form.status {
                fees.set_status(status)?;
            }
            Ok(())
        })
        .await?;

    if is_payment {
        tracing::info!(
            "Recorded payment on fee record {}: paid {} of {} ({})",
            fees.id,
            fees.paid_amount,
            fees.total_amount,
            fees.status.as_str()
        );
    } else {
        tracing::info!("Fee record {} set to {}, due {}", fees.id, fees.status.as_str(), fees.due_date);
    }
    Ok(Json(fees))
}
