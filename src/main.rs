// src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use tokio::net::TcpListener;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;
use crate::middleware::metrics::{metrics_snapshot, track_metrics};
use crate::middleware::request_logger::request_logger;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Varredura periódica de tokens expirados (não é crítica em tempo)
    let sweeper_state = app_state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(3600));
        loop {
            interval.tick().await;
            match sweeper_state.token_service.clean_expired_tokens().await {
                Ok(0) => {}
                Ok(removed) => tracing::info!("🧹 {} tokens expirados removidos", removed),
                Err(e) => tracing::error!("Falha na varredura de tokens expirados: {}", e),
            }
        }
    });

    // Log periódico das métricas agregadas, a cada 60s
    let metrics_state = app_state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
        interval.tick().await; // primeiro tick é imediato, pula
        loop {
            interval.tick().await;
            let snapshot = metrics_state.metrics.snapshot();
            tracing::info!(
                total_requests = snapshot.total_requests,
                total_errors = snapshot.total_errors,
                avg_latency_ms = snapshot.avg_latency_ms,
                "metrics:snapshot"
            );
        }
    });

    // Rotas públicas de autenticação
    let auth_public_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/forgot-password", post(handlers::auth::forgot_password))
        .route("/reset-password/{token}", post(handlers::auth::reset_password))
        .route("/activate/{token}", post(handlers::auth::activate_account));

    // Troca de senha exige sessão
    let auth_protected_routes = Router::new()
        .route("/change-password", post(handlers::auth::change_password))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let user_routes = Router::new()
        .route("/me", get(handlers::users::get_me))
        .route(
            "/",
            post(handlers::users::create_user).get(handlers::users::list_users),
        )
        .route(
            "/{id}",
            put(handlers::users::update_user).delete(handlers::users::delete_user),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let project_routes = Router::new()
        .route(
            "/",
            post(handlers::projects::create_project).get(handlers::projects::list_projects),
        )
        .route(
            "/{projectId}",
            get(handlers::projects::get_project)
                .put(handlers::projects::update_project)
                .delete(handlers::projects::delete_project),
        )
        .route(
            "/{projectId}/members",
            post(handlers::projects::add_member).get(handlers::projects::list_project_members),
        )
        .route(
            "/{projectId}/members/{memberId}",
            delete(handlers::projects::remove_member),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let campaign_routes = Router::new()
        .route(
            "/",
            post(handlers::campaigns::create_campaign).get(handlers::campaigns::list_campaigns),
        )
        .route("/metrics", get(handlers::campaigns::get_campaign_metrics))
        .route(
            "/{campaignId}",
            get(handlers::campaigns::get_campaign)
                .put(handlers::campaigns::update_campaign)
                .delete(handlers::campaigns::delete_campaign),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let lead_routes = Router::new()
        .route(
            "/",
            post(handlers::leads::create_lead).get(handlers::leads::list_leads),
        )
        .route("/export", get(handlers::leads::export_leads))
        .route(
            "/{leadId}",
            get(handlers::leads::get_lead)
                .put(handlers::leads::update_lead)
                .delete(handlers::leads::delete_lead),
        )
        .route("/{leadId}/status", patch(handlers::leads::update_lead_status))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/metrics", get(metrics_snapshot))
        .route("/api/docs/openapi.json", get(docs::serve_openapi))
        .nest(
            "/api/auth",
            auth_public_routes.merge(auth_protected_routes),
        )
        .nest("/api/users", user_routes)
        .nest("/api/projects/{projectId}/campaigns", campaign_routes)
        .nest("/api/projects", project_routes)
        .nest("/api/leads", lead_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            track_metrics,
        ))
        .layer(axum_middleware::from_fn(request_logger))
        .with_state(app_state);

    // Inicia o servidor
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
