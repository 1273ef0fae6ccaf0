// src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// Mapeia o CREATE TYPE system_role do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "system_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SystemRole {
    Root,
    Admin,
    ProjectUser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum UserStatus {
    Active,
    Inactive,
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,

    // NULL = conta criada mas ainda não ativada
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,

    pub role: SystemRole,
    pub status: UserStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Projeção enxuta para listagens e respostas aninhadas
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: SystemRole,
}

// Política de senha: mínimo 8 caracteres, ao menos 1 maiúscula, 1 minúscula,
// 1 dígito e 1 caractere especial.
pub fn validate_password_policy(password: &str) -> Result<(), ValidationError> {
    let long_enough = password.chars().count() >= 8;
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| !c.is_ascii_alphanumeric());

    if long_enough && has_lower && has_upper && has_digit && has_special {
        Ok(())
    } else {
        let mut err = ValidationError::new("password_policy");
        err.message = Some(
            "Senha deve ter mínimo 8 caracteres e incluir maiúscula, minúscula, número e caractere especial".into(),
        );
        Err(err)
    }
}

// [ROOT] Dados para criação de usuário.
// Senha opcional: sem senha, a conta nasce inativa e recebe token de ativação.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(length(min = 3, message = "O nome precisa ter no mínimo 3 caracteres"))]
    #[schema(example = "Maria da Silva")]
    pub name: String,

    #[validate(email(message = "Email inválido"))]
    #[schema(example = "maria@emanaleads.com")]
    pub email: String,

    pub phone: Option<String>,

    #[validate(custom(function = validate_password_policy))]
    pub password: Option<String>,

    pub role: SystemRole,
    pub status: UserStatus,
}

// [ROOT] Dados para atualização de usuário (ROOT ou ADMIN)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    #[validate(length(min = 3, message = "O nome precisa ter no mínimo 3 caracteres"))]
    pub name: Option<String>,

    #[validate(email(message = "Email inválido"))]
    pub email: Option<String>,

    pub phone: Option<String>,
    pub status: Option<UserStatus>,
    pub role: Option<SystemRole>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListUsersQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub role: Option<SystemRole>,
    pub status: Option<UserStatus>,
}

#[cfg(test)]
mod tests {
    use super::validate_password_policy;

    #[test]
    fn password_policy_requires_all_character_classes() {
        assert!(validate_password_policy("Root@123456").is_ok());
        assert!(validate_password_policy("curta@1A").is_ok());

        assert!(validate_password_policy("somenteminusculas").is_err());
        assert!(validate_password_policy("SemDigitos!").is_err());
        assert!(validate_password_policy("SemEspecial1").is_err());
        assert!(validate_password_policy("Ab@1").is_err());
    }
}
