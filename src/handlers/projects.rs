// src/handlers/projects.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{AdminOrRoot, RequireRole, RootOnly},
    },
    models::project::{
        AddMemberPayload, CreateProjectPayload, Project, ProjectMember, ProjectUsersResponse,
        UpdateProjectPayload,
    },
};

// POST /api/projects
#[utoipa::path(
    post,
    path = "/api/projects",
    tag = "Projects",
    request_body = CreateProjectPayload,
    responses(
        (status = 201, description = "Projeto criado", body = Project),
        (status = 400, description = "Admin indicado inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_project(
    State(app_state): State<AppState>,
    _role: RequireRole<RootOnly>,
    Json(payload): Json<CreateProjectPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let project = app_state.project_service.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

// GET /api/projects
#[utoipa::path(
    get,
    path = "/api/projects",
    tag = "Projects",
    responses(
        (status = 200, description = "Todos os projetos", body = Vec<Project>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_projects(
    State(app_state): State<AppState>,
    _role: RequireRole<RootOnly>,
) -> Result<impl IntoResponse, AppError> {
    let projects = app_state.project_service.list_as_root().await?;
    Ok(Json(projects))
}

// GET /api/projects/{projectId}
#[utoipa::path(
    get,
    path = "/api/projects/{projectId}",
    tag = "Projects",
    responses(
        (status = 200, description = "Projeto", body = Project),
        (status = 404, description = "Projeto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_project(
    State(app_state): State<AppState>,
    _role: RequireRole<AdminOrRoot>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(project_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let project = app_state.project_service.get_by_id(project_id, &actor).await?;
    Ok(Json(project))
}

// PUT /api/projects/{projectId}
#[utoipa::path(
    put,
    path = "/api/projects/{projectId}",
    tag = "Projects",
    request_body = UpdateProjectPayload,
    responses(
        (status = 200, description = "Projeto atualizado", body = Project)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_project(
    State(app_state): State<AppState>,
    _role: RequireRole<RootOnly>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<UpdateProjectPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let project = app_state.project_service.update(project_id, &payload).await?;
    Ok(Json(project))
}

// DELETE /api/projects/{projectId}
#[utoipa::path(
    delete,
    path = "/api/projects/{projectId}",
    tag = "Projects",
    responses(
        (status = 204, description = "Projeto removido")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_project(
    State(app_state): State<AppState>,
    _role: RequireRole<RootOnly>,
    Path(project_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.project_service.delete(project_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/projects/{projectId}/members
#[utoipa::path(
    post,
    path = "/api/projects/{projectId}/members",
    tag = "Projects",
    request_body = AddMemberPayload,
    responses(
        (status = 201, description = "Membro adicionado", body = ProjectMember),
        (status = 409, description = "Usuário já é membro")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_member(
    State(app_state): State<AppState>,
    _role: RequireRole<AdminOrRoot>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<AddMemberPayload>,
) -> Result<impl IntoResponse, AppError> {
    let member = app_state
        .project_service
        .add_member(project_id, &payload, &actor)
        .await?;
    Ok((StatusCode::CREATED, Json(member)))
}

// GET /api/projects/{projectId}/members
#[utoipa::path(
    get,
    path = "/api/projects/{projectId}/members",
    tag = "Projects",
    responses(
        (status = 200, description = "Admin e membros do projeto", body = ProjectUsersResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_project_members(
    State(app_state): State<AppState>,
    _role: RequireRole<AdminOrRoot>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(project_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let users = app_state
        .project_service
        .list_project_users(project_id, &actor)
        .await?;
    Ok(Json(users))
}

// DELETE /api/projects/{projectId}/members/{memberId}
#[utoipa::path(
    delete,
    path = "/api/projects/{projectId}/members/{memberId}",
    tag = "Projects",
    responses(
        (status = 204, description = "Membro removido"),
        (status = 404, description = "Associação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_member(
    State(app_state): State<AppState>,
    _role: RequireRole<AdminOrRoot>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path((project_id, member_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .project_service
        .remove_member(project_id, member_id, &actor)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
