// src/handlers/campaigns.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, pagination::Paginated},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{AdminOrRoot, RequireRole},
    },
    models::campaign::{
        Campaign, CampaignMetrics, CreateCampaignPayload, ListCampaignsQuery, UpdateCampaignPayload,
    },
};

// POST /api/projects/{projectId}/campaigns
#[utoipa::path(
    post,
    path = "/api/projects/{projectId}/campaigns",
    tag = "Campaigns",
    request_body = CreateCampaignPayload,
    responses(
        (status = 201, description = "Campanha criada", body = Campaign),
        (status = 403, description = "Projeto de outro administrador")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_campaign(
    State(app_state): State<AppState>,
    _role: RequireRole<AdminOrRoot>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<CreateCampaignPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let campaign = app_state
        .campaign_service
        .create(project_id, &payload, &actor)
        .await?;
    Ok((StatusCode::CREATED, Json(campaign)))
}

// GET /api/projects/{projectId}/campaigns
#[utoipa::path(
    get,
    path = "/api/projects/{projectId}/campaigns",
    tag = "Campaigns",
    responses(
        (status = 200, description = "Listagem paginada de campanhas", body = Paginated<Campaign>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_campaigns(
    State(app_state): State<AppState>,
    _role: RequireRole<AdminOrRoot>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(project_id): Path<Uuid>,
    Query(query): Query<ListCampaignsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let campaigns = app_state
        .campaign_service
        .list(project_id, &query, &actor)
        .await?;
    Ok(Json(campaigns))
}

// GET /api/projects/{projectId}/campaigns/metrics
#[utoipa::path(
    get,
    path = "/api/projects/{projectId}/campaigns/metrics",
    tag = "Campaigns",
    responses(
        (status = 200, description = "Agregados de performance do projeto", body = CampaignMetrics)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_campaign_metrics(
    State(app_state): State<AppState>,
    _role: RequireRole<AdminOrRoot>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(project_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let metrics = app_state
        .campaign_service
        .get_metrics(project_id, &actor)
        .await?;
    Ok(Json(metrics))
}

// GET /api/projects/{projectId}/campaigns/{campaignId}
#[utoipa::path(
    get,
    path = "/api/projects/{projectId}/campaigns/{campaignId}",
    tag = "Campaigns",
    responses(
        (status = 200, description = "Campanha", body = Campaign),
        (status = 404, description = "Campanha não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_campaign(
    State(app_state): State<AppState>,
    _role: RequireRole<AdminOrRoot>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path((project_id, campaign_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let campaign = app_state
        .campaign_service
        .get_by_id(project_id, campaign_id, &actor)
        .await?;
    Ok(Json(campaign))
}

// PUT /api/projects/{projectId}/campaigns/{campaignId}
#[utoipa::path(
    put,
    path = "/api/projects/{projectId}/campaigns/{campaignId}",
    tag = "Campaigns",
    request_body = UpdateCampaignPayload,
    responses(
        (status = 200, description = "Campanha atualizada", body = Campaign)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_campaign(
    State(app_state): State<AppState>,
    _role: RequireRole<AdminOrRoot>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path((project_id, campaign_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateCampaignPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let campaign = app_state
        .campaign_service
        .update(project_id, campaign_id, &payload, &actor)
        .await?;
    Ok(Json(campaign))
}

// DELETE /api/projects/{projectId}/campaigns/{campaignId}
#[utoipa::path(
    delete,
    path = "/api/projects/{projectId}/campaigns/{campaignId}",
    tag = "Campaigns",
    responses(
        (status = 204, description = "Campanha removida")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_campaign(
    State(app_state): State<AppState>,
    _role: RequireRole<AdminOrRoot>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path((project_id, campaign_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .campaign_service
        .delete(project_id, campaign_id, &actor)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
