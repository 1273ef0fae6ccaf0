// src/handlers/auth.rs

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, rate_limit::check_rate_limit},
    models::auth::{
        ActivateAccountPayload, AuthResponse, ChangePasswordPayload, ForgotPasswordPayload,
        LoginPayload, MessageResponse, ResetPasswordPayload,
    },
};

// Mensagem única do forgot-password, exista o e-mail ou não
const FORGOT_PASSWORD_MESSAGE: &str =
    "Se o email existir, você receberá instruções para resetar sua senha";

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Login efetuado", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas"),
        (status = 429, description = "Muitas tentativas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    // O rate limit roda antes da validação, chaveado pelo e-mail tentado
    check_rate_limit(
        app_state.rate_limiter.as_ref(),
        &format!("login:{}", payload.email),
    )?;

    payload.validate().map_err(AppError::ValidationError)?;

    let (token, user) = app_state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(AuthResponse { token, user }))
}

// POST /api/auth/change-password
#[utoipa::path(
    post,
    path = "/api/auth/change-password",
    tag = "Auth",
    request_body = ChangePasswordPayload,
    responses(
        (status = 200, description = "Senha alterada", body = MessageResponse),
        (status = 401, description = "Senha atual incorreta")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_password(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<ChangePasswordPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    app_state
        .auth_service
        .change_password(user.id, &payload.current_password, &payload.new_password)
        .await?;

    Ok(Json(MessageResponse {
        message: "Senha alterada com sucesso".to_string(),
    }))
}

// POST /api/auth/forgot-password
#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    tag = "Auth",
    request_body = ForgotPasswordPayload,
    responses(
        (status = 200, description = "Resposta neutra (sem enumeração de e-mails)", body = MessageResponse)
    )
)]
pub async fn forgot_password(
    State(app_state): State<AppState>,
    Json(payload): Json<ForgotPasswordPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    app_state.auth_service.forgot_password(&payload.email).await?;

    Ok(Json(MessageResponse {
        message: FORGOT_PASSWORD_MESSAGE.to_string(),
    }))
}

// POST /api/auth/reset-password/{token}
#[utoipa::path(
    post,
    path = "/api/auth/reset-password/{token}",
    tag = "Auth",
    request_body = ResetPasswordPayload,
    responses(
        (status = 200, description = "Senha resetada", body = MessageResponse),
        (status = 400, description = "Token inválido ou expirado")
    )
)]
pub async fn reset_password(
    State(app_state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<ResetPasswordPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    app_state
        .auth_service
        .reset_password(&token, &payload.new_password)
        .await?;

    Ok(Json(MessageResponse {
        message: "Senha resetada com sucesso".to_string(),
    }))
}

// POST /api/auth/activate/{token}
#[utoipa::path(
    post,
    path = "/api/auth/activate/{token}",
    tag = "Auth",
    request_body = ActivateAccountPayload,
    responses(
        (status = 200, description = "Conta ativada", body = MessageResponse),
        (status = 400, description = "Token inválido, expirado ou conta já ativa")
    )
)]
pub async fn activate_account(
    State(app_state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<ActivateAccountPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    app_state
        .auth_service
        .activate_account(&token, &payload.password)
        .await?;

    Ok(Json(MessageResponse {
        message: "Conta ativada com sucesso".to_string(),
    }))
}
