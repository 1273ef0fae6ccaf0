// src/db/token_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::token::{AuthToken, TokenType},
};

const TOKEN_COLUMNS: &str = "id, user_id, token, token_type, expires_at, used, created_at";

#[derive(Clone)]
pub struct TokenRepository {
    pool: PgPool,
}

impl TokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Invalida os tokens anteriores não usados do mesmo (usuário, tipo).
    // Emitir um token novo sempre substitui o anterior.
    pub async fn invalidate_unused<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        token_type: TokenType,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE tokens SET used = TRUE WHERE user_id = $1 AND token_type = $2 AND used = FALSE",
        )
        .bind(user_id)
        .bind(token_type)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        token: &str,
        token_type: TokenType,
        expires_at: DateTime<Utc>,
    ) -> Result<AuthToken, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, AuthToken>(&format!(
            r#"
            INSERT INTO tokens (user_id, token, token_type, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING {TOKEN_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(token)
        .bind(token_type)
        .bind(expires_at)
        .fetch_one(executor)
        .await?;

        Ok(record)
    }

    // Consumo de uso único: o flip de `used` acontece no mesmo UPDATE que
    // valida o token, então duas requisições concorrentes nunca consomem
    // o mesmo token duas vezes.
    pub async fn consume(
        &self,
        token: &str,
        token_type: TokenType,
    ) -> Result<Option<AuthToken>, AppError> {
        let record = sqlx::query_as::<_, AuthToken>(&format!(
            r#"
            UPDATE tokens SET used = TRUE
            WHERE token = $1 AND token_type = $2 AND used = FALSE AND expires_at > NOW()
            RETURNING {TOKEN_COLUMNS}
            "#
        ))
        .bind(token)
        .bind(token_type)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    // Varredura periódica de tokens expirados (não é crítica em tempo)
    pub async fn delete_expired(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM tokens WHERE expires_at < NOW()")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
