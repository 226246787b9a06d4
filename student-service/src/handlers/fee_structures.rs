//! Per-class fee structures (ADMIN only).

use anyhow::anyhow;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use mongodb::bson::DateTime;
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::dtos::fee_structures::{FeeStructureRequest, FeeStructureResponse};
use crate::middleware::RequestContext;
use crate::models::FeeStructure;
use crate::AppState;

/// POST /api/fee-structures — create or update the structure for a class.
/// Re-posting reactivates and overwrites the existing amounts.
pub async fn upsert_fee_structure(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<FeeStructureRequest>,
) -> Result<Json<FeeStructureResponse>, AppError> {
    ctx.require_admin()?;
    payload.validate()?;

    tracing::info!(class_name = %payload.class_name, "Saving fee structure");

    let now = DateTime::now();
    let existing = state
        .fees
        .find_structure_by_class(&payload.class_name)
        .await?;

    let structure = FeeStructure {
        id: existing.as_ref().map(|s| s.id).unwrap_or_else(Uuid::new_v4),
        class_name: payload.class_name,
        admission_fee: payload.admission_fee,
        monthly_fee: payload.monthly_fee,
        annual_fee: payload.annual_fee,
        transport_fee: payload.transport_fee,
        exam_fee: payload.exam_fee,
        activity_fee: payload.activity_fee,
        is_active: true,
        created_at: existing.map(|s| s.created_at).unwrap_or(now),
        updated_at: now,
        updated_by: ctx.user_id,
    };

    state.fees.upsert_structure(&structure).await?;
    tracing::info!(class_name = %structure.class_name, "Fee structure saved");

    Ok(Json(FeeStructureResponse::from(structure)))
}

/// GET /api/fee-structures
pub async fn list_fee_structures(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<Vec<FeeStructureResponse>>, AppError> {
    ctx.require_admin()?;
    let structures = state.fees.find_all_structures().await?;
    Ok(Json(
        structures.into_iter().map(FeeStructureResponse::from).collect(),
    ))
}

/// GET /api/fee-structures/{class_name}
pub async fn get_fee_structure(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(class_name): Path<String>,
) -> Result<Json<FeeStructureResponse>, AppError> {
    ctx.require_admin()?;

    let structure = state
        .fees
        .find_structure_by_class(&class_name)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(anyhow!("Fee structure not found for class: {}", class_name))
        })?;

    Ok(Json(FeeStructureResponse::from(structure)))
}

/// DELETE /api/fee-structures/{class_name}
pub async fn delete_fee_structure(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(class_name): Path<String>,
) -> Result<StatusCode, AppError> {
    ctx.require_admin()?;

    if state
        .fees
        .find_structure_by_class(&class_name)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound(anyhow!(
            "Fee structure not found for class: {}",
            class_name
        )));
    }

    state.fees.delete_structure_by_class(&class_name).await?;
    tracing::info!(class_name = %class_name, "Fee structure deleted");

    Ok(StatusCode::NO_CONTENT)
}
