// src/db/project_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        project::{Project, ProjectMember, ProjectMemberDetail, ProjectStatus, UpdateProjectPayload},
        user::UserSummary,
    },
};

const PROJECT_COLUMNS: &str = "id, name, description, status, admin_id, created_at, updated_at";

#[derive(Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        name: &str,
        description: Option<&str>,
        status: ProjectStatus,
        admin_id: Uuid,
    ) -> Result<Project, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let project = sqlx::query_as::<_, Project>(&format!(
            r#"
            INSERT INTO projects (name, description, status, admin_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(description)
        .bind(status)
        .bind(admin_id)
        .fetch_one(executor)
        .await?;

        Ok(project)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Project>, AppError> {
        let project = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(project)
    }

    pub async fn list_all(&self) -> Result<Vec<Project>, AppError> {
        let projects = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(projects)
    }

    // Projetos ATIVOS de um ADMIN, para inferência de projeto na criação de leads
    pub async fn list_active_by_admin(&self, admin_id: Uuid) -> Result<Vec<Project>, AppError> {
        let projects = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE admin_id = $1 AND status = $2"
        ))
        .bind(admin_id)
        .bind(ProjectStatus::Active)
        .fetch_all(&self.pool)
        .await?;
        Ok(projects)
    }

    // Projetos ATIVOS em que um PROJECT_USER é membro
    pub async fn list_active_by_member(&self, user_id: Uuid) -> Result<Vec<Project>, AppError> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT p.id, p.name, p.description, p.status, p.admin_id, p.created_at, p.updated_at
            FROM projects p
            INNER JOIN project_members m ON m.project_id = p.id
            WHERE m.user_id = $1 AND p.status = $2
            "#,
        )
        .bind(user_id)
        .bind(ProjectStatus::Active)
        .fetch_all(&self.pool)
        .await?;
        Ok(projects)
    }

    pub async fn count_by_admin(&self, admin_id: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects WHERE admin_id = $1")
            .bind(admin_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        data: &UpdateProjectPayload,
    ) -> Result<Project, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let project = sqlx::query_as::<_, Project>(&format!(
            r#"
            UPDATE projects SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(data.name.as_deref())
        .bind(data.description.as_deref())
        .bind(data.status)
        .fetch_one(executor)
        .await?;

        Ok(project)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    // --- Membros ---

    pub async fn add_member<'e, E>(
        &self,
        executor: E,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<ProjectMember, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let member = sqlx::query_as::<_, ProjectMember>(
            r#"
            INSERT INTO project_members (project_id, user_id)
            VALUES ($1, $2)
            RETURNING id, project_id, user_id, created_at
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::MembershipExists;
                }
            }
            e.into()
        })?;

        Ok(member)
    }

    pub async fn is_member(&self, project_id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM project_members WHERE project_id = $1 AND user_id = $2)",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    // Busca a associação pelo id da *relação* (não do usuário)
    pub async fn find_member(
        &self,
        project_id: Uuid,
        member_id: Uuid,
    ) -> Result<Option<ProjectMember>, AppError> {
        let member = sqlx::query_as::<_, ProjectMember>(
            "SELECT id, project_id, user_id, created_at FROM project_members WHERE id = $1 AND project_id = $2",
        )
        .bind(member_id)
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(member)
    }

    pub async fn list_members(&self, project_id: Uuid) -> Result<Vec<ProjectMemberDetail>, AppError> {
        let members = sqlx::query_as::<_, ProjectMemberDetail>(
            r#"
            SELECT m.id, m.project_id, m.user_id, u.name, u.email, m.created_at
            FROM project_members m
            INNER JOIN users u ON u.id = m.user_id
            WHERE m.project_id = $1
            ORDER BY u.name ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }

    pub async fn remove_member<'e, E>(&self, executor: E, member_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM project_members WHERE id = $1")
            .bind(member_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    // Admin dono do projeto, em projeção enxuta para a listagem de usuários
    pub async fn admin_summary(&self, project_id: Uuid) -> Result<Option<UserSummary>, AppError> {
        let admin = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.name, u.email, u.role
            FROM users u
            INNER JOIN projects p ON p.admin_id = u.id
            WHERE p.id = $1
            "#,
        )
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(admin)
    }
}
