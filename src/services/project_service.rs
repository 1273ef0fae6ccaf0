// src/services/project_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ProjectRepository, UserRepository},
    models::{
        project::{
            AddMemberPayload, CreateProjectPayload, Project, ProjectMember, ProjectStatus,
            ProjectUsersResponse, UpdateProjectPayload,
        },
        user::{SystemRole, User},
    },
};

#[derive(Clone)]
pub struct ProjectService {
    repo: ProjectRepository,
    user_repo: UserRepository,
    pool: PgPool,
}

impl ProjectService {
    pub fn new(repo: ProjectRepository, user_repo: UserRepository, pool: PgPool) -> Self {
        Self { repo, user_repo, pool }
    }

    // [ROOT] Cria um projeto. O admin indicado precisa existir e ter role ADMIN.
    pub async fn create(&self, data: &CreateProjectPayload) -> Result<Project, AppError> {
        let admin = self.user_repo.find_by_id(data.admin_id).await?;
        match admin {
            Some(user) if user.role == SystemRole::Admin => {}
            _ => return Err(AppError::InvalidAdmin),
        }

        self.repo
            .create(
                &self.pool,
                &data.name,
                data.description.as_deref(),
                data.status.unwrap_or(ProjectStatus::Planning),
                data.admin_id,
            )
            .await
    }

    // [ROOT] Lista todos os projetos
    pub async fn list_as_root(&self) -> Result<Vec<Project>, AppError> {
        self.repo.list_all().await
    }

    // ROOT enxerga qualquer projeto; ADMIN apenas o que administra.
    pub async fn get_by_id(&self, project_id: Uuid, actor: &User) -> Result<Project, AppError> {
        let project = self
            .repo
            .find_by_id(project_id)
            .await?
            .ok_or(AppError::NotFound("Projeto não encontrado."))?;
        self.assert_ownership(&project, actor)?;
        Ok(project)
    }

    // [ROOT] Atualiza as informações de um projeto
    pub async fn update(
        &self,
        project_id: Uuid,
        data: &UpdateProjectPayload,
    ) -> Result<Project, AppError> {
        if self.repo.find_by_id(project_id).await?.is_none() {
            return Err(AppError::NotFound("Projeto não encontrado."));
        }
        self.repo.update(&self.pool, project_id, data).await
    }

    // [ROOT] Remove um projeto
    pub async fn delete(&self, project_id: Uuid) -> Result<(), AppError> {
        if self.repo.find_by_id(project_id).await?.is_none() {
            return Err(AppError::NotFound("Projeto não encontrado."));
        }
        self.repo.delete(&self.pool, project_id).await
    }

    // --- Membros ---

    // [ADMIN] Adiciona um PROJECT_USER como membro do projeto.
    pub async fn add_member(
        &self,
        project_id: Uuid,
        data: &AddMemberPayload,
        actor: &User,
    ) -> Result<ProjectMember, AppError> {
        let project = self
            .repo
            .find_by_id(project_id)
            .await?
            .ok_or(AppError::NotFound("Projeto não encontrado."))?;
        self.assert_ownership(&project, actor)?;

        let user_to_add = self
            .user_repo
            .find_by_id(data.user_id)
            .await?
            .ok_or(AppError::NotFound("Usuário (membro) não encontrado."))?;

        // Um ADMIN (ou ROOT) nunca entra como PROJECT_USER de um projeto
        if user_to_add.role != SystemRole::ProjectUser {
            return Err(AppError::InvalidMember);
        }

        self.repo.add_member(&self.pool, project_id, data.user_id).await
    }

    // [ADMIN] Lista o admin e os membros de um projeto
    pub async fn list_project_users(
        &self,
        project_id: Uuid,
        actor: &User,
    ) -> Result<ProjectUsersResponse, AppError> {
        let project = self
            .repo
            .find_by_id(project_id)
            .await?
            .ok_or(AppError::NotFound("Projeto não encontrado."))?;
        self.assert_ownership(&project, actor)?;

        let admin = self
            .repo
            .admin_summary(project_id)
            .await?
            .ok_or(AppError::NotFound("Projeto não encontrado."))?;
        let members = self.repo.list_members(project_id).await?;

        Ok(ProjectUsersResponse { admin, members })
    }

    // [ADMIN] Remove um membro. `member_id` é o id da *relação*, não do usuário.
    pub async fn remove_member(
        &self,
        project_id: Uuid,
        member_id: Uuid,
        actor: &User,
    ) -> Result<(), AppError> {
        let project = self
            .repo
            .find_by_id(project_id)
            .await?
            .ok_or(AppError::NotFound("Projeto não encontrado."))?;
        self.assert_ownership(&project, actor)?;

        let member = self
            .repo
            .find_member(project_id, member_id)
            .await?
            .ok_or(AppError::NotFound(
                "Membro não encontrado neste projeto ou ID de membro inválido.",
            ))?;

        self.repo.remove_member(&self.pool, member.id).await
    }

    // ROOT passa sempre; ADMIN só quando é o dono do projeto.
    fn assert_ownership(&self, project: &Project, actor: &User) -> Result<(), AppError> {
        match actor.role {
            SystemRole::Root => Ok(()),
            SystemRole::Admin if project.admin_id == actor.id => Ok(()),
            SystemRole::Admin => Err(AppError::Forbidden(
                "Acesso negado. Você não é administrador deste projeto.",
            )),
            SystemRole::ProjectUser => Err(AppError::Forbidden(
                "Acesso negado. Você não tem permissão para este recurso.",
            )),
        }
    }
}
