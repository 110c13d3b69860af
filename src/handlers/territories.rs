// src/handlers/territories.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::territory::{City, TerritoryView},
};

// =============================================================================
//  1. CIDADES
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCityPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Campinas")]
    pub name: String,
}

// POST /api/cities
#[utoipa::path(
    post,
    path = "/api/cities",
    tag = "Territories",
    request_body = CreateCityPayload,
    responses(
        (status = 201, description = "Cidade criada", body = City),
        (status = 409, description = "Nome de cidade já existe")
    )
)]
pub async fn create_city(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateCityPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let city = app_state.territory_service.create_city(&payload.name).await?;
    Ok((StatusCode::CREATED, Json(city)))
}

// GET /api/cities
#[utoipa::path(
    get,
    path = "/api/cities",
    tag = "Territories",
    responses(
        (status = 200, description = "Cidades em ordem alfabética", body = [City])
    )
)]
pub async fn list_cities(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let cities = app_state.territory_service.list_cities().await?;
    Ok((StatusCode::OK, Json(cities)))
}

// DELETE /api/cities/{city_id}
#[utoipa::path(
    delete,
    path = "/api/cities/{city_id}",
    tag = "Territories",
    params(("city_id" = Uuid, Path, description = "ID da Cidade")),
    responses(
        (status = 204, description = "Cidade excluída"),
        (status = 409, description = "Cidade ainda possui territórios")
    )
)]
pub async fn delete_city(
    State(app_state): State<AppState>,
    Path(city_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.territory_service.delete_city(city_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  2. TERRITÓRIOS (CRUD)
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTerritoryPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Quadra 12 (Centro)")]
    pub name: String,

    pub city_id: Uuid,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTerritoryPayload {
    #[validate(length(min = 1, message = "O nome não pode ficar vazio."))]
    pub name: Option<String>,

    pub city_id: Option<Uuid>,

    pub note: Option<String>,

    // Polígono do mapa, opaco para o core (GeoJSON ou similar).
    #[schema(value_type = Option<Object>)]
    pub geometry: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTerritoriesQuery {
    pub city_id: Option<Uuid>,
}

// POST /api/territories
#[utoipa::path(
    post,
    path = "/api/territories",
    tag = "Territories",
    request_body = CreateTerritoryPayload,
    responses(
        (status = 201, description = "Território criado como AVAILABLE", body = TerritoryView),
        (status = 404, description = "Cidade não encontrada")
    )
)]
pub async fn create_territory(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateTerritoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let territory = app_state
        .territory_service
        .create(&payload.name, payload.city_id)
        .await?;
    Ok((StatusCode::CREATED, Json(territory)))
}

// GET /api/territories
#[utoipa::path(
    get,
    path = "/api/territories",
    tag = "Territories",
    params(("cityId" = Option<Uuid>, Query, description = "Filtra por cidade")),
    responses(
        (status = 200, description = "Territórios por cidade e nome, com status derivado", body = [TerritoryView])
    )
)]
pub async fn list_territories(
    State(app_state): State<AppState>,
    Query(query): Query<ListTerritoriesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let territories = app_state.territory_service.list(query.city_id).await?;
    Ok((StatusCode::OK, Json(territories)))
}

// GET /api/territories/{territory_id}
#[utoipa::path(
    get,
    path = "/api/territories/{territory_id}",
    tag = "Territories",
    params(("territory_id" = Uuid, Path, description = "ID do Território")),
    responses(
        (status = 200, description = "Território com status derivado", body = TerritoryView),
        (status = 404, description = "Território não encontrado")
    )
)]
pub async fn get_territory(
    State(app_state): State<AppState>,
    Path(territory_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let territory = app_state.territory_service.get(territory_id).await?;
    Ok((StatusCode::OK, Json(territory)))
}

// PUT /api/territories/{territory_id}
#[utoipa::path(
    put,
    path = "/api/territories/{territory_id}",
    tag = "Territories",
    request_body = UpdateTerritoryPayload,
    params(("territory_id" = Uuid, Path, description = "ID do Território")),
    responses(
        (status = 200, description = "Campos atualizados (status intocado)", body = TerritoryView),
        (status = 404, description = "Território não encontrado")
    )
)]
pub async fn update_territory(
    State(app_state): State<AppState>,
    Path(territory_id): Path<Uuid>,
    Json(payload): Json<UpdateTerritoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let territory = app_state
        .territory_service
        .update(
            territory_id,
            payload.name.as_deref(),
            payload.city_id,
            payload.note.as_deref(),
            payload.geometry,
        )
        .await?;
    Ok((StatusCode::OK, Json(territory)))
}

// DELETE /api/territories/{territory_id}
#[utoipa::path(
    delete,
    path = "/api/territories/{territory_id}",
    tag = "Territories",
    params(("territory_id" = Uuid, Path, description = "ID do Território")),
    responses(
        (status = 204, description = "Território excluído"),
        (status = 409, description = "Território com designação ativa")
    )
)]
pub async fn delete_territory(
    State(app_state): State<AppState>,
    Path(territory_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.territory_service.delete(territory_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  3. CLASSIFICAÇÃO TEMPORAL E VARREDURA
// =============================================================================

// GET /api/territories/late
#[utoipa::path(
    get,
    path = "/api/territories/late",
    tag = "Territories",
    responses(
        (status = 200, description = "Territórios com designação vencida", body = [TerritoryView])
    )
)]
pub async fn list_late(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let territories = app_state.classification_service.list_late().await?;
    Ok((StatusCode::OK, Json(territories)))
}

// GET /api/territories/non-visited
#[utoipa::path(
    get,
    path = "/api/territories/non-visited",
    tag = "Territories",
    responses(
        (status = 200, description = "Territórios sem visita desde a data de referência", body = [TerritoryView])
    )
)]
pub async fn list_non_visited(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let territories = app_state.classification_service.list_non_visited().await?;
    Ok((StatusCode::OK, Json(territories)))
}

// POST /api/territories/{territory_id}/reclassify
// Gancho chamado pela varredura de verificação agendada.
#[utoipa::path(
    post,
    path = "/api/territories/{territory_id}/reclassify",
    tag = "Territories",
    params(("territory_id" = Uuid, Path, description = "ID do Território")),
    responses(
        (status = 200, description = "PENDING resolvido para AVAILABLE", body = TerritoryView),
        (status = 409, description = "Território não está PENDING")
    )
)]
pub async fn reclassify_pending(
    State(app_state): State<AppState>,
    Path(territory_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let territory = app_state
        .territory_service
        .reclassify_pending(territory_id)
        .await?;
    Ok((StatusCode::OK, Json(territory)))
}
