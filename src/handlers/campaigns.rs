// src/handlers/campaigns.rs

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

use crate::{common::error::AppError, config::AppState, models::campaign::CampaignView};

// =============================================================================
//  CAMPANHAS (RESERVA EM LOTE)
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCampaignPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Campanha Especial 2024")]
    pub name: String,

    pub description: Option<String>,

    #[schema(example = "2024-03-01")]
    pub start_date: NaiveDate,

    #[schema(example = "2024-03-31")]
    pub end_date: NaiveDate,

    // Conjunto completo reservado; começa inteiro como "restante".
    pub territory_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFromPreviousPayload {
    pub previous_campaign_id: Uuid,

    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    pub description: Option<String>,

    pub start_date: NaiveDate,

    pub end_date: NaiveDate,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetRemainingPayload {
    pub territory_ids: Vec<Uuid>,
}

// POST /api/campaigns
#[utoipa::path(
    post,
    path = "/api/campaigns",
    tag = "Campaigns",
    request_body = CreateCampaignPayload,
    responses(
        (status = 201, description = "Campanha criada (aberta)", body = CampaignView),
        (status = 400, description = "Intervalo de datas inválido ou território inexistente")
    )
)]
pub async fn create_campaign(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateCampaignPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let campaign = app_state
        .campaign_service
        .create(
            &payload.name,
            payload.description.as_deref(),
            payload.start_date,
            payload.end_date,
            payload.territory_ids,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(campaign)))
}

// POST /api/campaigns/from-previous
#[utoipa::path(
    post,
    path = "/api/campaigns/from-previous",
    tag = "Campaigns",
    request_body = CreateFromPreviousPayload,
    responses(
        (status = 201, description = "Campanha criada herdando o restante da anterior", body = CampaignView),
        (status = 409, description = "Campanha anterior ainda aberta")
    )
)]
pub async fn create_from_previous(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateFromPreviousPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let campaign = app_state
        .campaign_service
        .create_from_previous(
            payload.previous_campaign_id,
            &payload.name,
            payload.description.as_deref(),
            payload.start_date,
            payload.end_date,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(campaign)))
}

// GET /api/campaigns
#[utoipa::path(
    get,
    path = "/api/campaigns",
    tag = "Campaigns",
    responses(
        (status = 200, description = "Campanhas, mais recentes primeiro", body = [CampaignView])
    )
)]
pub async fn list_campaigns(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let campaigns = app_state.campaign_service.list().await?;
    Ok((StatusCode::OK, Json(campaigns)))
}

// GET /api/campaigns/{campaign_id}
#[utoipa::path(
    get,
    path = "/api/campaigns/{campaign_id}",
    tag = "Campaigns",
    params(("campaign_id" = Uuid, Path, description = "ID da Campanha")),
    responses(
        (status = 200, description = "Campanha com os conjuntos de territórios", body = CampaignView),
        (status = 404, description = "Campanha não encontrada")
    )
)]
pub async fn get_campaign(
    State(app_state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let campaign = app_state.campaign_service.get(campaign_id).await?;
    Ok((StatusCode::OK, Json(campaign)))
}

// PUT /api/campaigns/{campaign_id}/remaining
#[utoipa::path(
    put,
    path = "/api/campaigns/{campaign_id}/remaining",
    tag = "Campaigns",
    request_body = SetRemainingPayload,
    params(("campaign_id" = Uuid, Path, description = "ID da Campanha")),
    responses(
        (status = 200, description = "Conjunto restante substituído", body = CampaignView),
        (status = 400, description = "Id fora do conjunto reservado"),
        (status = 409, description = "Campanha já encerrada")
    )
)]
pub async fn set_remaining(
    State(app_state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
    Json(payload): Json<SetRemainingPayload>,
) -> Result<impl IntoResponse, AppError> {
    let campaign = app_state
        .campaign_service
        .set_remaining(campaign_id, payload.territory_ids)
        .await?;
    Ok((StatusCode::OK, Json(campaign)))
}

// POST /api/campaigns/{campaign_id}/close
#[utoipa::path(
    post,
    path = "/api/campaigns/{campaign_id}/close",
    tag = "Campaigns",
    params(("campaign_id" = Uuid, Path, description = "ID da Campanha")),
    responses(
        (status = 200, description = "Campanha encerrada; ocupações materializadas no livro-razão", body = CampaignView),
        (status = 409, description = "Campanha já encerrada")
    )
)]
pub async fn close_campaign(
    State(app_state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let campaign = app_state.campaign_service.close(campaign_id).await?;
    Ok((StatusCode::OK, Json(campaign)))
}

// DELETE /api/campaigns/{campaign_id}
#[utoipa::path(
    delete,
    path = "/api/campaigns/{campaign_id}",
    tag = "Campaigns",
    params(("campaign_id" = Uuid, Path, description = "ID da Campanha")),
    responses(
        (status = 204, description = "Campanha excluída; livro-razão intacto"),
        (status = 404, description = "Campanha não encontrada")
    )
)]
pub async fn delete_campaign(
    State(app_state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.campaign_service.delete(campaign_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
