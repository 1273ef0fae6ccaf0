// src/config.rs

use std::{env, sync::Arc, time::Duration};

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{CampaignRepository, LeadRepository, ProjectRepository, TokenRepository, UserRepository},
    middleware::{
        metrics::AppMetrics,
        rate_limit::{InMemoryRateLimiter, RateLimiter},
    },
    services::{
        auth::AuthService,
        campaign_service::CampaignService,
        email_service::{EmailService, LogMailer},
        lead_service::LeadService,
        project_service::ProjectService,
        token_service::TokenService,
        user_service::UserService,
    },
};

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub project_service: ProjectService,
    pub campaign_service: CampaignService,
    pub lead_service: LeadService,
    pub token_service: TokenService,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub metrics: Arc<AppMetrics>,
}

// Variável numérica opcional com default
fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");
        let jwt_expires_days: i64 = env_parse("JWT_EXPIRES_DAYS", 7);
        let app_url = env::var("APP_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
        let rate_limit_max: u32 = env_parse("RATE_LIMIT_MAX_REQUESTS", 5);
        let rate_limit_window_minutes: i64 = env_parse("RATE_LIMIT_WINDOW_MINUTES", 15);

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let project_repo = ProjectRepository::new(db_pool.clone());
        let campaign_repo = CampaignRepository::new(db_pool.clone());
        let lead_repo = LeadRepository::new(db_pool.clone());
        let token_repo = TokenRepository::new(db_pool.clone());

        let token_service = TokenService::new(token_repo, db_pool.clone());
        let email_service = EmailService::new(Arc::new(LogMailer), app_url);

        let auth_service = AuthService::new(
            user_repo.clone(),
            token_service.clone(),
            email_service.clone(),
            jwt_secret,
            jwt_expires_days,
            db_pool.clone(),
        );
        let user_service = UserService::new(
            user_repo.clone(),
            project_repo.clone(),
            token_service.clone(),
            email_service.clone(),
            db_pool.clone(),
        );
        let project_service =
            ProjectService::new(project_repo.clone(), user_repo.clone(), db_pool.clone());
        let campaign_service =
            CampaignService::new(campaign_repo, project_repo.clone(), db_pool.clone());
        let lead_service = LeadService::new(lead_repo, project_repo, db_pool.clone());

        let rate_limiter: Arc<dyn RateLimiter> = Arc::new(InMemoryRateLimiter::new(
            rate_limit_max,
            chrono::Duration::minutes(rate_limit_window_minutes),
        ));
        let metrics = Arc::new(AppMetrics::default());

        Ok(Self {
            db_pool,
            auth_service,
            user_service,
            project_service,
            campaign_service,
            lead_service,
            token_service,
            rate_limiter,
            metrics,
        })
    }
}
