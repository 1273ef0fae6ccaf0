// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::{auth::Claims, token::TokenType, user::User},
    services::{email_service::EmailService, token_service::TokenService},
};

// Executa o hashing em thread separada para não bloquear o runtime
async fn hash_blocking(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

async fn verify_blocking(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();
    let valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(valid)
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    token_service: TokenService,
    email_service: EmailService,
    jwt_secret: String,
    jwt_expires_days: i64,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        token_service: TokenService,
        email_service: EmailService,
        jwt_secret: String,
        jwt_expires_days: i64,
        pool: PgPool,
    ) -> Self {
        Self {
            user_repo,
            token_service,
            email_service,
            jwt_secret,
            jwt_expires_days,
            pool,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(String, User), AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        // Conta sem senha (ainda não ativada) responde igual a senha errada
        let password_hash = user
            .password_hash
            .clone()
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_blocking(password, &password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.create_token(user.id)?;
        Ok((token, user))
    }

    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound("Usuário não encontrado."))?;

        let password_hash = user.password_hash.ok_or(AppError::NoPasswordSet)?;

        if !verify_blocking(current_password, &password_hash).await? {
            return Err(AppError::CurrentPasswordMismatch);
        }

        // A nova senha precisa ser de fato nova
        if verify_blocking(new_password, &password_hash).await? {
            return Err(AppError::SamePassword);
        }

        let new_hash = hash_blocking(new_password).await?;
        self.user_repo
            .update_password(&self.pool, user_id, &new_hash)
            .await?;

        Ok(())
    }

    // Sempre responde com a mesma mensagem, exista o e-mail ou não
    // (evita enumeração de e-mails).
    pub async fn forgot_password(&self, email: &str) -> Result<(), AppError> {
        let Some(user) = self.user_repo.find_by_email(email).await? else {
            return Ok(());
        };

        let reset_token = self.token_service.create_password_reset_token(user.id).await?;
        self.email_service
            .send_reset_password_email(&user.email, &reset_token, &user.name);

        Ok(())
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AppError> {
        let user_id = self
            .token_service
            .validate_and_consume_token(token, TokenType::PasswordReset)
            .await?
            .ok_or(AppError::TokenInvalidOrExpired)?;

        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound("Usuário não encontrado."))?;

        let new_hash = hash_blocking(new_password).await?;
        self.user_repo
            .update_password(&self.pool, user.id, &new_hash)
            .await?;

        Ok(())
    }

    pub async fn activate_account(&self, token: &str, password: &str) -> Result<(), AppError> {
        let user_id = self
            .token_service
            .validate_and_consume_token(token, TokenType::AccountActivation)
            .await?
            .ok_or(AppError::TokenInvalidOrExpired)?;

        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound("Usuário não encontrado."))?;

        if user.password_hash.is_some() {
            return Err(AppError::AccountAlreadyActive);
        }

        let password_hash = hash_blocking(password).await?;
        self.user_repo
            .update_password(&self.pool, user.id, &password_hash)
            .await?;

        self.email_service.send_welcome_email(&user.email, &user.name);

        Ok(())
    }

    // Valida o JWT e carrega o usuário atual (role/status sempre frescos do banco)
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.user_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::NotFound("Usuário não encontrado."))
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(self.jwt_expires_days);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
