//! Payment endpoints (ADMIN only). All fee state changes go through the
//! reconciliation engine in `services::fees`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use validator::Validate;

use crate::dtos::payments::{
    CreatePaymentRequest, PaymentReceiptResponse, PaymentResponse, StudentFeeSummaryResponse,
};
use crate::middleware::RequestContext;
use crate::AppState;

/// POST /api/payments
pub async fn process_payment(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<PaymentResponse>), AppError> {
    ctx.require_admin()?;
    payload.validate()?;

    let payment = state
        .fee_service
        .process_payment(payload, ctx.user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(PaymentResponse::from(payment))))
}

/// GET /api/payments/student/{student_id} — history, newest first.
pub async fn student_payments(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(student_id): Path<String>,
) -> Result<Json<Vec<PaymentResponse>>, AppError> {
    ctx.require_admin()?;

    let payments = state.fee_service.payment_history(&student_id).await?;
    Ok(Json(payments.into_iter().map(PaymentResponse::from).collect()))
}

/// GET /api/payments/student/{student_id}/summary
pub async fn student_fee_summary(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(student_id): Path<String>,
) -> Result<Json<StudentFeeSummaryResponse>, AppError> {
    ctx.require_admin()?;

    let summary = state.fee_service.fee_summary(&student_id).await?;
    Ok(Json(StudentFeeSummaryResponse::from(summary)))
}

/// GET /api/payments/{payment_id}
pub async fn get_payment(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(payment_id): Path<String>,
) -> Result<Json<PaymentResponse>, AppError> {
    ctx.require_admin()?;

    let payment = state.fee_service.payment_by_id(&payment_id).await?;
    Ok(Json(PaymentResponse::from(payment)))
}

/// GET /api/payments/{payment_id}/receipt
pub async fn get_payment_receipt(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(payment_id): Path<String>,
) -> Result<Json<PaymentReceiptResponse>, AppError> {
    ctx.require_admin()?;

    let payment = state.fee_service.payment_by_id(&payment_id).await?;
    Ok(Json(PaymentReceiptResponse::from(payment)))
}
