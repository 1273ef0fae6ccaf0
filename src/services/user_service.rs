// src/services/user_service.rs

use bcrypt::hash;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{PageMeta, PageParams, Paginated},
    },
    db::{ProjectRepository, UserRepository},
    models::user::{CreateUserPayload, ListUsersQuery, SystemRole, UpdateUserPayload, User},
    services::{email_service::EmailService, token_service::TokenService},
};

#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    project_repo: ProjectRepository,
    token_service: TokenService,
    email_service: EmailService,
    pool: PgPool,
}

impl UserService {
    pub fn new(
        user_repo: UserRepository,
        project_repo: ProjectRepository,
        token_service: TokenService,
        email_service: EmailService,
        pool: PgPool,
    ) -> Self {
        Self {
            user_repo,
            project_repo,
            token_service,
            email_service,
            pool,
        }
    }

    // [ROOT] Cria um usuário. Sem senha no payload, a conta nasce sem hash
    // e recebe um token de ativação por e-mail.
    pub async fn create(&self, data: CreateUserPayload) -> Result<User, AppError> {
        if self.user_repo.find_by_email(&data.email).await?.is_some() {
            return Err(AppError::EmailAlreadyExists);
        }

        let password_hash = match &data.password {
            Some(password) => {
                let password = password.clone();
                let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
                    .await
                    .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
                Some(hashed)
            }
            None => None,
        };

        let user = self
            .user_repo
            .create(
                &self.pool,
                &data.name,
                &data.email,
                data.phone.as_deref(),
                password_hash.as_deref(),
                data.role,
                data.status,
            )
            .await?;

        if password_hash.is_none() {
            let activation_token = self.token_service.create_activation_token(user.id).await?;
            self.email_service
                .send_activation_email(&user.email, &activation_token, &user.name);
        }

        Ok(user)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Usuário não encontrado."))
    }

    // [ROOT] Listagem paginada (por padrão só ROOT e ADMIN)
    pub async fn list(&self, query: &ListUsersQuery) -> Result<Paginated<User>, AppError> {
        let (page, limit, offset) =
            PageParams { page: query.page, limit: query.limit }.normalize();

        let (users, total) = self
            .user_repo
            .list(query.search.as_deref(), query.role, query.status, limit, offset)
            .await?;

        Ok(Paginated {
            data: users,
            meta: PageMeta::new(total, page, limit),
        })
    }

    // [ROOT] Atualiza um usuário (ROOT ou ADMIN).
    // Membros de projeto são geridos apenas pelos endpoints de membership.
    pub async fn update_as_root(
        &self,
        user_id: Uuid,
        data: &UpdateUserPayload,
    ) -> Result<User, AppError> {
        let target = self.get_by_id(user_id).await?;

        if target.role == SystemRole::ProjectUser {
            return Err(AppError::Forbidden(
                "Usuários ROOT não podem gerenciar membros de projeto diretamente.",
            ));
        }

        // Um ADMIN dono de projetos não pode virar ROOT: a promoção
        // deixaria os projetos com dono fora do papel esperado.
        if target.role == SystemRole::Admin && data.role == Some(SystemRole::Root) {
            let owned = self.project_repo.count_by_admin(user_id).await?;
            if owned > 0 {
                return Err(AppError::Forbidden(
                    "Administradores com projetos não podem ser promovidos para ROOT.",
                ));
            }
        }

        self.user_repo.update(&self.pool, user_id, data).await
    }

    // [ROOT] Remove um usuário (ROOT ou ADMIN)
    pub async fn delete_as_root(&self, user_id: Uuid) -> Result<(), AppError> {
        let target = self.get_by_id(user_id).await?;

        if target.role == SystemRole::ProjectUser {
            return Err(AppError::Forbidden(
                "Usuários ROOT não podem gerenciar membros de projeto diretamente.",
            ));
        }

        self.user_repo.delete(&self.pool, user_id).await
    }
}
