// src/handlers/leads.rs

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
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
        rate_limit::check_rate_limit,
        rbac::{AnyRole, RequireRole},
    },
    models::lead::{
        CreateLeadPayload, Lead, LeadDetail, ListLeadsQuery, UpdateLeadPayload,
        UpdateLeadStatusPayload,
    },
};

// POST /api/leads
#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "Leads",
    request_body = CreateLeadPayload,
    responses(
        (status = 201, description = "Lead criado", body = Lead),
        (status = 409, description = "Lead duplicado no projeto"),
        (status = 422, description = "Projeto não está ativo")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_lead(
    State(app_state): State<AppState>,
    _role: RequireRole<AnyRole>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Json(payload): Json<CreateLeadPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let lead = app_state.lead_service.create(&payload, &actor).await?;
    Ok((StatusCode::CREATED, Json(lead)))
}

// GET /api/leads
#[utoipa::path(
    get,
    path = "/api/leads",
    tag = "Leads",
    responses(
        (status = 200, description = "Listagem paginada de leads", body = Paginated<Lead>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_leads(
    State(app_state): State<AppState>,
    _role: RequireRole<AnyRole>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Query(query): Query<ListLeadsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let leads = app_state.lead_service.list(query, &actor).await?;
    Ok(Json(leads))
}

// GET /api/leads/export
#[utoipa::path(
    get,
    path = "/api/leads/export",
    tag = "Leads",
    responses(
        (status = 200, description = "CSV dos leads filtrados", body = String, content_type = "text/csv"),
        (status = 422, description = "Exportação excede o limite de registros"),
        (status = 429, description = "Muitas exportações")
    ),
    security(("api_jwt" = []))
)]
pub async fn export_leads(
    State(app_state): State<AppState>,
    _role: RequireRole<AnyRole>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Query(query): Query<ListLeadsQuery>,
) -> Result<impl IntoResponse, AppError> {
    check_rate_limit(
        app_state.rate_limiter.as_ref(),
        &format!("export:{}", actor.id),
    )?;

    let csv = app_state.lead_service.export(query, &actor).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"leads.csv\"",
            ),
        ],
        csv,
    ))
}

// GET /api/leads/{leadId}
#[utoipa::path(
    get,
    path = "/api/leads/{leadId}",
    tag = "Leads",
    responses(
        (status = 200, description = "Lead com histórico", body = LeadDetail),
        (status = 403, description = "Sem acesso ao lead"),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_lead(
    State(app_state): State<AppState>,
    _role: RequireRole<AnyRole>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(lead_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let lead = app_state.lead_service.get_by_id(lead_id, &actor).await?;
    Ok(Json(lead))
}

// PUT /api/leads/{leadId}
#[utoipa::path(
    put,
    path = "/api/leads/{leadId}",
    tag = "Leads",
    request_body = UpdateLeadPayload,
    responses(
        (status = 200, description = "Lead atualizado", body = Lead),
        (status = 409, description = "Contato duplicado no projeto")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_lead(
    State(app_state): State<AppState>,
    _role: RequireRole<AnyRole>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(lead_id): Path<Uuid>,
    Json(payload): Json<UpdateLeadPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let lead = app_state
        .lead_service
        .update(lead_id, &payload, &actor)
        .await?;
    Ok(Json(lead))
}

// PATCH /api/leads/{leadId}/status
#[utoipa::path(
    patch,
    path = "/api/leads/{leadId}/status",
    tag = "Leads",
    request_body = UpdateLeadStatusPayload,
    responses(
        (status = 200, description = "Transição aplicada e histórico registrado", body = Lead),
        (status = 400, description = "Status repetido ou motivo ausente"),
        (status = 422, description = "Transição fora da tabela")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_lead_status(
    State(app_state): State<AppState>,
    _role: RequireRole<AnyRole>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(lead_id): Path<Uuid>,
    Json(payload): Json<UpdateLeadStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let lead = app_state
        .lead_service
        .update_status(lead_id, &payload, &actor)
        .await?;
    Ok(Json(lead))
}

// DELETE /api/leads/{leadId}
#[utoipa::path(
    delete,
    path = "/api/leads/{leadId}",
    tag = "Leads",
    responses(
        (status = 204, description = "Lead removido (soft delete)")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_lead(
    State(app_state): State<AppState>,
    _role: RequireRole<AnyRole>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(lead_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.lead_service.delete(lead_id, &actor).await?;
    Ok(StatusCode::NO_CONTENT)
}
