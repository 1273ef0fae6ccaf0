// src/docs.rs

use axum::Json;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::common;
use crate::handlers;
use crate::middleware;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::change_password,
        handlers::auth::forgot_password,
        handlers::auth::reset_password,
        handlers::auth::activate_account,

        // --- Users ---
        handlers::users::get_me,
        handlers::users::create_user,
        handlers::users::list_users,
        handlers::users::update_user,
        handlers::users::delete_user,

        // --- Projects ---
        handlers::projects::create_project,
        handlers::projects::list_projects,
        handlers::projects::get_project,
        handlers::projects::update_project,
        handlers::projects::delete_project,
        handlers::projects::add_member,
        handlers::projects::list_project_members,
        handlers::projects::remove_member,

        // --- Campaigns ---
        handlers::campaigns::create_campaign,
        handlers::campaigns::list_campaigns,
        handlers::campaigns::get_campaign_metrics,
        handlers::campaigns::get_campaign,
        handlers::campaigns::update_campaign,
        handlers::campaigns::delete_campaign,

        // --- Leads ---
        handlers::leads::create_lead,
        handlers::leads::list_leads,
        handlers::leads::export_leads,
        handlers::leads::get_lead,
        handlers::leads::update_lead,
        handlers::leads::update_lead_status,
        handlers::leads::delete_lead,

        // --- Sistema ---
        middleware::metrics::metrics_snapshot,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::LoginPayload,
            models::auth::AuthResponse,
            models::auth::ChangePasswordPayload,
            models::auth::ForgotPasswordPayload,
            models::auth::ResetPasswordPayload,
            models::auth::ActivateAccountPayload,
            models::auth::MessageResponse,

            // --- Users ---
            models::user::SystemRole,
            models::user::UserStatus,
            models::user::User,
            models::user::UserSummary,
            models::user::CreateUserPayload,
            models::user::UpdateUserPayload,

            // --- Projects ---
            models::project::ProjectStatus,
            models::project::Project,
            models::project::ProjectMember,
            models::project::ProjectMemberDetail,
            models::project::ProjectUsersResponse,
            models::project::CreateProjectPayload,
            models::project::UpdateProjectPayload,
            models::project::AddMemberPayload,

            // --- Campaigns ---
            models::campaign::Campaign,
            models::campaign::CreateCampaignPayload,
            models::campaign::UpdateCampaignPayload,
            models::campaign::CampaignMetrics,
            models::campaign::MonthlyPoint,

            // --- Leads ---
            models::lead::LeadStatus,
            models::lead::Lead,
            models::lead::LeadHistoryEntry,
            models::lead::LeadDetail,
            models::lead::CreateLeadPayload,
            models::lead::UpdateLeadPayload,
            models::lead::UpdateLeadStatusPayload,

            // --- Paginação e sistema ---
            common::pagination::PageMeta,
            common::pagination::Paginated<models::lead::Lead>,
            common::pagination::Paginated<models::user::User>,
            common::pagination::Paginated<models::campaign::Campaign>,
            middleware::metrics::MetricsSnapshot,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação, ativação e recuperação de senha"),
        (name = "Users", description = "Administração de usuários (ROOT) e perfil"),
        (name = "Projects", description = "Projetos e membros"),
        (name = "Campaigns", description = "Campanhas e indicadores de performance"),
        (name = "Leads", description = "Funil de leads, histórico e exportação"),
        (name = "Sistema", description = "Saúde e métricas do processo")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

// GET /api/docs/openapi.json
pub async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
