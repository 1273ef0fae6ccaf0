// src/db/lead_repo.rs

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::lead::{
        Lead, LeadExportRow, LeadHistoryEntry, LeadOrderBy, LeadStatus, ListLeadsQuery, SortOrder,
        UpdateLeadPayload,
    },
};

const LEAD_COLUMNS: &str = "id, project_id, assigned_user_id, name, email, phone, position, \
    request_type, status, created_at, updated_at";

// Busca até 50.001 linhas na exportação: uma a mais que o limite para
// detectar estouro sem contar a tabela inteira.
pub const EXPORT_LIMIT: i64 = 50_000;

// Repositório de leads. O filtro de soft delete (deleted_at IS NULL) é aplicado
// aqui, uma única vez por caminho de leitura, nunca nos call sites.
#[derive(Clone)]
pub struct LeadRepository {
    pool: PgPool,
}

impl LeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        project_id: Uuid,
        assigned_user_id: Option<Uuid>,
        name: &str,
        email: Option<&str>,
        phone: Option<&str>,
        position: Option<&str>,
        request_type: Option<&str>,
        status: LeadStatus,
    ) -> Result<Lead, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lead = sqlx::query_as::<_, Lead>(&format!(
            r#"
            INSERT INTO leads (
                project_id, assigned_user_id, name, email, phone, position, request_type, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {LEAD_COLUMNS}
            "#
        ))
        .bind(project_id)
        .bind(assigned_user_id)
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(position)
        .bind(request_type)
        .bind(status)
        .fetch_one(executor)
        .await?;

        Ok(lead)
    }

    // Ignora registros soft deletados
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Lead>, AppError> {
        let lead = sqlx::query_as::<_, Lead>(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(lead)
    }

    // Monta o WHERE compartilhado entre count, listagem e exportação.
    // `prefix` qualifica as colunas quando a query tem JOINs ("l.").
    fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filters: &ListLeadsQuery, prefix: &str) {
        if let Some(project_id) = filters.project_id {
            qb.push(format!(" AND {prefix}project_id = ")).push_bind(project_id);
        }

        let statuses = filters.status_filter();
        if !statuses.is_empty() {
            qb.push(format!(" AND {prefix}status IN ("));
            {
                let mut sep = qb.separated(", ");
                for status in statuses {
                    sep.push_bind(status);
                }
            }
            qb.push(")");
        }

        if filters.unassigned == Some(true) {
            qb.push(format!(" AND {prefix}assigned_user_id IS NULL"));
        } else if let Some(assigned) = filters.assigned_user_id {
            qb.push(format!(" AND {prefix}assigned_user_id = ")).push_bind(assigned);
        }

        if let Some(from) = filters.date_from {
            qb.push(format!(" AND {prefix}created_at >= ")).push_bind(from);
        }
        if let Some(to) = filters.date_to {
            qb.push(format!(" AND {prefix}created_at <= ")).push_bind(to);
        }

        if let Some(search) = filters.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let term = format!("%{}%", search);
            qb.push(format!(" AND ({prefix}name ILIKE "))
                .push_bind(term.clone())
                .push(format!(" OR {prefix}email ILIKE "))
                .push_bind(term.clone())
                .push(format!(" OR {prefix}phone ILIKE "))
                .push_bind(term)
                .push(")");
        }

        if let Some(request_type) = filters.request_type.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            qb.push(format!(" AND {prefix}request_type ILIKE "))
                .push_bind(format!("%{}%", request_type));
        }
        if let Some(position) = filters.position.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            qb.push(format!(" AND {prefix}position ILIKE "))
                .push_bind(format!("%{}%", position));
        }
    }

    fn order_clause(filters: &ListLeadsQuery, prefix: &str) -> String {
        let column = match filters.order_by.unwrap_or_default() {
            LeadOrderBy::CreatedAt => "created_at",
            LeadOrderBy::UpdatedAt => "updated_at",
            LeadOrderBy::Name => "name",
        };
        let direction = match filters.order.unwrap_or_default() {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        format!(" ORDER BY {prefix}{column} {direction}")
    }

    pub async fn list(
        &self,
        filters: &ListLeadsQuery,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Lead>, i64), AppError> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM leads WHERE deleted_at IS NULL");
        Self::push_filters(&mut count_qb, filters, "");
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {LEAD_COLUMNS} FROM leads WHERE deleted_at IS NULL"
        ));
        Self::push_filters(&mut qb, filters, "");
        qb.push(Self::order_clause(filters, ""));
        qb.push(" LIMIT ").push_bind(limit).push(" OFFSET ").push_bind(offset);
        let leads = qb.build_query_as::<Lead>().fetch_all(&self.pool).await?;

        Ok((leads, total))
    }

    // Listagem para exportação CSV, sem paginação, com os nomes do projeto
    // e do usuário atribuído. Busca EXPORT_LIMIT + 1 linhas para o chamador
    // validar o estouro do limite.
    pub async fn list_for_export(
        &self,
        filters: &ListLeadsQuery,
    ) -> Result<Vec<LeadExportRow>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            r#"
            SELECT
                l.name, l.email, l.phone, l.position, l.request_type, l.status,
                l.created_at, l.updated_at,
                p.name AS project_name,
                u.name AS assigned_user_name
            FROM leads l
            INNER JOIN projects p ON p.id = l.project_id
            LEFT JOIN users u ON u.id = l.assigned_user_id
            WHERE l.deleted_at IS NULL
            "#,
        );
        Self::push_filters(&mut qb, filters, "l.");
        qb.push(Self::order_clause(filters, "l."));
        qb.push(" LIMIT ").push_bind(EXPORT_LIMIT + 1);

        let rows = qb.build_query_as::<LeadExportRow>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        data: &UpdateLeadPayload,
    ) -> Result<Lead, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lead = sqlx::query_as::<_, Lead>(&format!(
            r#"
            UPDATE leads SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                position = COALESCE($5, position),
                request_type = COALESCE($6, request_type),
                assigned_user_id = COALESCE($7, assigned_user_id),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {LEAD_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(data.name.as_deref())
        .bind(data.email.as_deref())
        .bind(data.phone.as_deref())
        .bind(data.position.as_deref())
        .bind(data.request_type.as_deref())
        .bind(data.assigned_user_id)
        .fetch_one(executor)
        .await?;

        Ok(lead)
    }

    // Transição guardada pelo status anterior: se outra transição venceu a
    // corrida, nenhuma linha casa e devolvemos None.
    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        from: LeadStatus,
        to: LeadStatus,
    ) -> Result<Option<Lead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lead = sqlx::query_as::<_, Lead>(&format!(
            r#"
            UPDATE leads SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2 AND deleted_at IS NULL
            RETURNING {LEAD_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(executor)
        .await?;

        Ok(lead)
    }

    pub async fn soft_delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE leads SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    // Guarda de duplicidade no projeto: email OU telefone iguais, ignorando
    // soft deletados e, no update, o próprio lead.
    pub async fn find_duplicate_in_project(
        &self,
        project_id: Uuid,
        email: Option<&str>,
        phone: Option<&str>,
        exclude_id: Option<Uuid>,
    ) -> Result<Option<Lead>, AppError> {
        if email.is_none() && phone.is_none() {
            return Ok(None);
        }

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {LEAD_COLUMNS} FROM leads WHERE deleted_at IS NULL AND project_id = "
        ));
        qb.push_bind(project_id);

        if let Some(exclude_id) = exclude_id {
            qb.push(" AND id <> ").push_bind(exclude_id);
        }

        qb.push(" AND (");
        let mut first = true;
        if let Some(email) = email {
            qb.push("email = ").push_bind(email.to_string());
            first = false;
        }
        if let Some(phone) = phone {
            if !first {
                qb.push(" OR ");
            }
            qb.push("phone = ").push_bind(phone.to_string());
        }
        qb.push(") LIMIT 1");

        let duplicate = qb.build_query_as::<Lead>().fetch_optional(&self.pool).await?;
        Ok(duplicate)
    }

    // --- Histórico (trilha append-only) ---

    pub async fn add_history<'e, E>(
        &self,
        executor: E,
        lead_id: Uuid,
        from_status: Option<LeadStatus>,
        to_status: LeadStatus,
        changed_by_user_id: Option<Uuid>,
        reason: Option<&str>,
    ) -> Result<LeadHistoryEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entry = sqlx::query_as::<_, LeadHistoryEntry>(
            r#"
            INSERT INTO lead_history (lead_id, from_status, to_status, changed_by_user_id, reason)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, lead_id, from_status, to_status, changed_by_user_id, reason, created_at
            "#,
        )
        .bind(lead_id)
        .bind(from_status)
        .bind(to_status)
        .bind(changed_by_user_id)
        .bind(reason)
        .fetch_one(executor)
        .await?;

        Ok(entry)
    }

    pub async fn list_history(&self, lead_id: Uuid) -> Result<Vec<LeadHistoryEntry>, AppError> {
        let entries = sqlx::query_as::<_, LeadHistoryEntry>(
            r#"
            SELECT id, lead_id, from_status, to_status, changed_by_user_id, reason, created_at
            FROM lead_history
            WHERE lead_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(lead_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}
