// src/handlers/assignments.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{common::error::AppError, config::AppState, models::assignment::Assignment};

// =============================================================================
//  OPERAÇÕES DO LIVRO-RAZÃO (A MÁQUINA DE ESTADOS)
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignTerritoryPayload {
    pub person_id: Uuid,

    // Opcional: sem dueDate o território nunca fica LATE.
    #[schema(example = "2024-06-30")]
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtendAssignmentPayload {
    #[schema(example = "2024-09-30")]
    pub new_due_date: NaiveDate,
}

// POST /api/territories/{territory_id}/assign
#[utoipa::path(
    post,
    path = "/api/territories/{territory_id}/assign",
    tag = "Assignments",
    request_body = AssignTerritoryPayload,
    params(("territory_id" = Uuid, Path, description = "ID do Território")),
    responses(
        (status = 201, description = "Designação criada; território vira ASSIGNED", body = Assignment),
        (status = 409, description = "Status não permite designar, ou já há designação ativa")
    )
)]
pub async fn assign_territory(
    State(app_state): State<AppState>,
    Path(territory_id): Path<Uuid>,
    Json(payload): Json<AssignTerritoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let assignment = app_state
        .assignment_service
        .assign(territory_id, payload.person_id, payload.due_date)
        .await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

// POST /api/territories/{territory_id}/return
#[utoipa::path(
    post,
    path = "/api/territories/{territory_id}/return",
    tag = "Assignments",
    params(("territory_id" = Uuid, Path, description = "ID do Território")),
    responses(
        (status = 200, description = "Devolvido: território vira PENDING com a visita de hoje", body = Assignment),
        (status = 409, description = "Sem designação ativa")
    )
)]
pub async fn return_territory(
    State(app_state): State<AppState>,
    Path(territory_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let assignment = app_state
        .assignment_service
        .return_territory(territory_id)
        .await?;
    Ok((StatusCode::OK, Json(assignment)))
}

// POST /api/territories/{territory_id}/cancel
#[utoipa::path(
    post,
    path = "/api/territories/{territory_id}/cancel",
    tag = "Assignments",
    params(("territory_id" = Uuid, Path, description = "ID do Território")),
    responses(
        (status = 200, description = "Cancelado: território volta a AVAILABLE, sem visita registrada", body = Assignment),
        (status = 409, description = "Sem designação ativa")
    )
)]
pub async fn cancel_assignment(
    State(app_state): State<AppState>,
    Path(territory_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let assignment = app_state.assignment_service.cancel(territory_id).await?;
    Ok((StatusCode::OK, Json(assignment)))
}

// POST /api/territories/{territory_id}/extend
#[utoipa::path(
    post,
    path = "/api/territories/{territory_id}/extend",
    tag = "Assignments",
    request_body = ExtendAssignmentPayload,
    params(("territory_id" = Uuid, Path, description = "ID do Território")),
    responses(
        (status = 200, description = "Prazo prorrogado, mesmo titular", body = Assignment),
        (status = 409, description = "Sem designação ativa")
    )
)]
pub async fn extend_assignment(
    State(app_state): State<AppState>,
    Path(territory_id): Path<Uuid>,
    Json(payload): Json<ExtendAssignmentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let assignment = app_state
        .assignment_service
        .extend(territory_id, payload.new_due_date)
        .await?;
    Ok((StatusCode::OK, Json(assignment)))
}

// GET /api/territories/{territory_id}/history
#[utoipa::path(
    get,
    path = "/api/territories/{territory_id}/history",
    tag = "Assignments",
    params(("territory_id" = Uuid, Path, description = "ID do Território")),
    responses(
        (status = 200, description = "Histórico do livro-razão, mais recente primeiro", body = [Assignment]),
        (status = 404, description = "Território não encontrado")
    )
)]
pub async fn assignment_history(
    State(app_state): State<AppState>,
    Path(territory_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let history = app_state.assignment_service.history(territory_id).await?;
    Ok((StatusCode::OK, Json(history)))
}
