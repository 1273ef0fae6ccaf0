// src/services/token_service.rs

use chrono::{Duration, Utc};
use rand::RngCore;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, db::TokenRepository, models::token::TokenType};

// Validades: reset de senha expira rápido, ativação dá tempo de abrir o e-mail.
const RESET_TOKEN_TTL_HOURS: i64 = 1;
const ACTIVATION_TOKEN_TTL_DAYS: i64 = 7;

// Gera um token seguro aleatório (32 bytes em hex)
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[derive(Clone)]
pub struct TokenService {
    repo: TokenRepository,
    pool: PgPool,
}

impl TokenService {
    pub fn new(repo: TokenRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    // Cria token de reset de senha (válido por 1 hora).
    // Tokens anteriores do mesmo tipo são invalidados na mesma transação.
    pub async fn create_password_reset_token(&self, user_id: Uuid) -> Result<String, AppError> {
        self.issue(user_id, TokenType::PasswordReset, Duration::hours(RESET_TOKEN_TTL_HOURS))
            .await
    }

    // Cria token de ativação de conta (válido por 7 dias)
    pub async fn create_activation_token(&self, user_id: Uuid) -> Result<String, AppError> {
        self.issue(
            user_id,
            TokenType::AccountActivation,
            Duration::days(ACTIVATION_TOKEN_TTL_DAYS),
        )
        .await
    }

    async fn issue(
        &self,
        user_id: Uuid,
        token_type: TokenType,
        ttl: Duration,
    ) -> Result<String, AppError> {
        let token = generate_token();
        let expires_at = Utc::now() + ttl;

        let mut tx = self.pool.begin().await?;
        self.repo.invalidate_unused(&mut *tx, user_id, token_type).await?;
        self.repo
            .create(&mut *tx, user_id, &token, token_type, expires_at)
            .await?;
        tx.commit().await?;

        Ok(token)
    }

    // Valida e consome um token. Devolve o userId se o token for válido.
    pub async fn validate_and_consume_token(
        &self,
        token: &str,
        token_type: TokenType,
    ) -> Result<Option<Uuid>, AppError> {
        let record = self.repo.consume(token, token_type).await?;
        Ok(record.map(|r| r.user_id))
    }

    // Limpa tokens expirados (executado periodicamente pelo main)
    pub async fn clean_expired_tokens(&self) -> Result<u64, AppError> {
        self.repo.delete_expired().await
    }
}

#[cfg(test)]
mod tests {
    use super::generate_token;

    #[test]
    fn generated_tokens_are_64_hex_chars_and_unique() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
