use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// Cada violação de regra de negócio vira uma variante com status HTTP próprio;
// o core nunca engole esses erros.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Senha atual incorreta")]
    CurrentPasswordMismatch,

    #[error("Nova senha igual à atual")]
    SamePassword,

    #[error("Usuário sem senha definida")]
    NoPasswordSet,

    #[error("Conta já ativada")]
    AccountAlreadyActive,

    #[error("Token de autenticação inválido")]
    InvalidToken,

    #[error("Requisição sem identidade")]
    Unauthenticated,

    #[error("Token de uso único inválido ou expirado")]
    TokenInvalidOrExpired,

    #[error("Acesso negado: {0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    // --- Máquina de estados do lead ---
    #[error("Status já está definido")]
    InvalidState,

    #[error("Transição de status inválida")]
    IllegalTransition,

    #[error("Motivo obrigatório para status final")]
    MissingReason,

    // --- Criação de leads ---
    #[error("Lead duplicado no projeto")]
    DuplicateLead,

    #[error("Projeto não está ativo")]
    ProjectNotActive,

    #[error("projectId é obrigatório para usuários ROOT")]
    MissingProjectId,

    #[error("Administrador sem projeto ativo")]
    NoActiveProject,

    #[error("Usuário não é membro do projeto")]
    NotAMember,

    // --- Administração ---
    #[error("Usuário indicado como admin não é um ADMIN válido")]
    InvalidAdmin,

    #[error("Usuário já é membro do projeto")]
    MembershipExists,

    #[error("Apenas PROJECT_USER pode ser membro de projeto")]
    InvalidMember,

    #[error("Auto-deleção não permitida")]
    SelfDeletion,

    #[error("Exportação excede o limite de registros")]
    ExportLimitExceeded,

    #[error("Limite de requisições excedido")]
    RateLimited { seconds_to_reset: i64 },

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado.
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    // Código estável exposto na resposta, independente da mensagem humana.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::CurrentPasswordMismatch => "CURRENT_PASSWORD_MISMATCH",
            AppError::SamePassword => "SAME_PASSWORD",
            AppError::NoPasswordSet => "NO_PASSWORD_SET",
            AppError::AccountAlreadyActive => "ACCOUNT_ALREADY_ACTIVE",
            AppError::InvalidToken => "INVALID_TOKEN",
            AppError::Unauthenticated => "UNAUTHENTICATED",
            AppError::TokenInvalidOrExpired => "TOKEN_INVALID_OR_EXPIRED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InvalidState => "INVALID_STATE",
            AppError::IllegalTransition => "ILLEGAL_TRANSITION",
            AppError::MissingReason => "MISSING_REASON",
            AppError::DuplicateLead => "DUPLICATE_LEAD",
            AppError::ProjectNotActive => "PROJECT_NOT_ACTIVE",
            AppError::MissingProjectId => "MISSING_PROJECT_ID",
            AppError::NoActiveProject => "NO_ACTIVE_PROJECT",
            AppError::NotAMember => "NOT_A_MEMBER",
            AppError::InvalidAdmin => "INVALID_ADMIN",
            AppError::MembershipExists => "MEMBERSHIP_EXISTS",
            AppError::InvalidMember => "INVALID_MEMBER",
            AppError::SelfDeletion => "SELF_DELETION",
            AppError::ExportLimitExceeded => "EXPORT_LIMIT_EXCEEDED",
            AppError::RateLimited { .. } => "RATE_LIMIT_EXCEEDED",
            _ => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();

        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "code": code,
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "Este e-mail já está em uso.".to_string()),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "E-mail ou senha inválidos.".to_string()),
            AppError::CurrentPasswordMismatch => (StatusCode::UNAUTHORIZED, "Senha atual incorreta.".to_string()),
            AppError::SamePassword => {
                (StatusCode::BAD_REQUEST, "A nova senha deve ser diferente da senha atual.".to_string())
            }
            AppError::NoPasswordSet => (
                StatusCode::BAD_REQUEST,
                "Usuário não possui senha definida. Use o fluxo de ativação de conta.".to_string(),
            ),
            AppError::AccountAlreadyActive => (StatusCode::BAD_REQUEST, "Conta já ativada.".to_string()),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.".to_string(),
            ),
            AppError::Unauthenticated => (StatusCode::UNAUTHORIZED, "Não autorizado.".to_string()),
            AppError::TokenInvalidOrExpired => (StatusCode::BAD_REQUEST, "Token inválido ou expirado.".to_string()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.to_string()),

            AppError::InvalidState => (StatusCode::BAD_REQUEST, "Status já está definido.".to_string()),
            AppError::IllegalTransition => {
                (StatusCode::UNPROCESSABLE_ENTITY, "Transição de status inválida.".to_string())
            }
            AppError::MissingReason => {
                (StatusCode::BAD_REQUEST, "Motivo é obrigatório para status final.".to_string())
            }

            AppError::DuplicateLead => (StatusCode::CONFLICT, "Lead duplicado no projeto.".to_string()),
            AppError::ProjectNotActive => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Projeto não está ativo para criação de leads.".to_string(),
            ),
            AppError::MissingProjectId => (
                StatusCode::BAD_REQUEST,
                "projectId é obrigatório para usuários ROOT.".to_string(),
            ),
            AppError::NoActiveProject => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Nenhum projeto ativo único encontrado para inferência. Informe projectId.".to_string(),
            ),
            AppError::NotAMember => (StatusCode::FORBIDDEN, "Usuário não é membro do projeto.".to_string()),

            AppError::InvalidAdmin => (
                StatusCode::BAD_REQUEST,
                "Usuário indicado como admin não é um ADMIN válido.".to_string(),
            ),
            AppError::MembershipExists => (StatusCode::CONFLICT, "Usuário já é membro do projeto.".to_string()),
            AppError::InvalidMember => (
                StatusCode::BAD_REQUEST,
                "Apenas usuários com o papel PROJECT_USER podem ser adicionados como membros.".to_string(),
            ),
            AppError::SelfDeletion => (
                StatusCode::BAD_REQUEST,
                "Você não pode deletar seu próprio usuário.".to_string(),
            ),
            AppError::ExportLimitExceeded => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Exportação excede o limite de 50.000 registros. Refine os filtros.".to_string(),
            ),
            AppError::RateLimited { seconds_to_reset } => (
                StatusCode::TOO_MANY_REQUESTS,
                format!("Muitas tentativas. Tente novamente em {}s.", seconds_to_reset),
            ),

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` vai logar a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.".to_string())
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message, "code": code }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::AppError;

    #[test]
    fn stable_codes_cover_business_variants() {
        assert_eq!(AppError::DuplicateLead.code(), "DUPLICATE_LEAD");
        assert_eq!(AppError::IllegalTransition.code(), "ILLEGAL_TRANSITION");
        assert_eq!(AppError::InvalidState.code(), "INVALID_STATE");
        assert_eq!(AppError::MissingReason.code(), "MISSING_REASON");
        assert_eq!(AppError::RateLimited { seconds_to_reset: 10 }.code(), "RATE_LIMIT_EXCEEDED");
        assert_eq!(AppError::Forbidden("x").code(), "FORBIDDEN");
    }
}
