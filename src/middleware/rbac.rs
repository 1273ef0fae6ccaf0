// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{common::error::AppError, models::user::{SystemRole, User}};

/// 1. O Trait que define um conjunto de papéis aceitos
pub trait RoleSet: Send + Sync + 'static {
    fn allowed() -> &'static [SystemRole];
}

// A matriz de papéis em um único lugar, testável fora dos handlers
pub fn role_allowed(role: SystemRole, allowed: &[SystemRole]) -> bool {
    allowed.contains(&role)
}

/// 2. O Extractor (Guardião). A checagem de papel acontece aqui, antes de
/// qualquer checagem de ownership que precise ir ao banco.
pub struct RequireRole<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleSet,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // A. Extrai o usuário injetado pelo auth_guard
        let user = parts
            .extensions
            .get::<User>()
            .ok_or(AppError::Unauthenticated)?;

        // B. Verifica a associação ao conjunto de papéis
        if !role_allowed(user.role, T::allowed()) {
            return Err(AppError::Forbidden(
                "Acesso negado. Você não tem permissão para este recurso.",
            ));
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// CONJUNTOS DE PAPÉIS (TIPOS)
// ---

pub struct RootOnly;
impl RoleSet for RootOnly {
    fn allowed() -> &'static [SystemRole] {
        &[SystemRole::Root]
    }
}

pub struct AdminOrRoot;
impl RoleSet for AdminOrRoot {
    fn allowed() -> &'static [SystemRole] {
        &[SystemRole::Root, SystemRole::Admin]
    }
}

pub struct AnyRole;
impl RoleSet for AnyRole {
    fn allowed() -> &'static [SystemRole] {
        &[SystemRole::Root, SystemRole::Admin, SystemRole::ProjectUser]
    }
}

#[cfg(test)]
mod tests {
    use super::{role_allowed, AdminOrRoot, AnyRole, RoleSet, RootOnly};
    use crate::models::user::SystemRole;

    #[test]
    fn role_sets_match_the_three_tiers() {
        assert!(role_allowed(SystemRole::Root, RootOnly::allowed()));
        assert!(!role_allowed(SystemRole::Admin, RootOnly::allowed()));
        assert!(!role_allowed(SystemRole::ProjectUser, RootOnly::allowed()));

        assert!(role_allowed(SystemRole::Root, AdminOrRoot::allowed()));
        assert!(role_allowed(SystemRole::Admin, AdminOrRoot::allowed()));
        assert!(!role_allowed(SystemRole::ProjectUser, AdminOrRoot::allowed()));

        assert!(role_allowed(SystemRole::ProjectUser, AnyRole::allowed()));
    }
}
