// src/handlers/reminders.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{common::error::AppError, config::AppState, models::reminder::Reminder};

// =============================================================================
//  LEMBRETES DE ATRASO
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReminderPayload {
    pub territory_id: Uuid,
    pub person_id: Uuid,
    pub issued_by_id: Uuid,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReminderQuery {
    pub territory_id: Uuid,
    pub person_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReminderCheck {
    pub has_reminder: bool,
}

// POST /api/reminders
#[utoipa::path(
    post,
    path = "/api/reminders",
    tag = "Reminders",
    request_body = CreateReminderPayload,
    responses(
        (status = 201, description = "Lembrete registrado", body = Reminder),
        (status = 409, description = "A dupla território/pessoa já tem lembrete")
    )
)]
pub async fn create_reminder(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateReminderPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let reminder = app_state
        .reminder_service
        .create(
            payload.territory_id,
            payload.person_id,
            payload.issued_by_id,
            payload.note.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(reminder)))
}

// GET /api/reminders/check?territoryId=...&personId=...
#[utoipa::path(
    get,
    path = "/api/reminders/check",
    tag = "Reminders",
    params(
        ("territoryId" = Uuid, Query, description = "ID do Território"),
        ("personId" = Uuid, Query, description = "ID da Pessoa")
    ),
    responses(
        (status = 200, description = "Se a dupla já tem lembrete em aberto", body = ReminderCheck)
    )
)]
pub async fn check_reminder(
    State(app_state): State<AppState>,
    Query(query): Query<CheckReminderQuery>,
) -> Result<impl IntoResponse, AppError> {
    let has_reminder = app_state
        .reminder_service
        .has_open_reminder(query.territory_id, query.person_id)
        .await?;
    Ok((StatusCode::OK, Json(ReminderCheck { has_reminder })))
}

// GET /api/territories/{territory_id}/reminders
#[utoipa::path(
    get,
    path = "/api/territories/{territory_id}/reminders",
    tag = "Reminders",
    params(("territory_id" = Uuid, Path, description = "ID do Território")),
    responses(
        (status = 200, description = "Lembretes do território, mais recentes primeiro", body = [Reminder]),
        (status = 404, description = "Território não encontrado")
    )
)]
pub async fn list_territory_reminders(
    State(app_state): State<AppState>,
    Path(territory_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let reminders = app_state
        .reminder_service
        .list_for_territory(territory_id)
        .await?;
    Ok((StatusCode::OK, Json(reminders)))
}
