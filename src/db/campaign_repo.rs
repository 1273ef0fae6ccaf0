// src/db/campaign_repo.rs

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::campaign::{Campaign, CreateCampaignPayload, ListCampaignsQuery, UpdateCampaignPayload},
};

const CAMPAIGN_COLUMNS: &str = "id, project_id, name, month_payment, year_payment, \
    month_campaign, year_campaign, clicks, conversions, qualified, sales, \
    investment_google_ads, investment_total, approvals_rate, goal_qualified_conv, \
    created_at, updated_at";

#[derive(Clone)]
pub struct CampaignRepository {
    pool: PgPool,
}

impl CampaignRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        project_id: Uuid,
        data: &CreateCampaignPayload,
    ) -> Result<Campaign, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let campaign = sqlx::query_as::<_, Campaign>(&format!(
            r#"
            INSERT INTO campaigns (
                project_id, name, month_payment, year_payment, month_campaign, year_campaign,
                clicks, conversions, qualified, sales,
                investment_google_ads, investment_total, approvals_rate, goal_qualified_conv
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {CAMPAIGN_COLUMNS}
            "#
        ))
        .bind(project_id)
        .bind(&data.name)
        .bind(data.month_payment)
        .bind(data.year_payment)
        .bind(data.month_campaign)
        .bind(data.year_campaign)
        .bind(data.clicks)
        .bind(data.conversions)
        .bind(data.qualified)
        .bind(data.sales)
        .bind(data.investment_google_ads)
        .bind(data.investment_total)
        .bind(data.approvals_rate)
        .bind(data.goal_qualified_conv)
        .fetch_one(executor)
        .await?;

        Ok(campaign)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Campaign>, AppError> {
        let campaign = sqlx::query_as::<_, Campaign>(&format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(campaign)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        data: &UpdateCampaignPayload,
    ) -> Result<Campaign, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let campaign = sqlx::query_as::<_, Campaign>(&format!(
            r#"
            UPDATE campaigns SET
                name = COALESCE($2, name),
                month_payment = COALESCE($3, month_payment),
                year_payment = COALESCE($4, year_payment),
                month_campaign = COALESCE($5, month_campaign),
                year_campaign = COALESCE($6, year_campaign),
                clicks = COALESCE($7, clicks),
                conversions = COALESCE($8, conversions),
                qualified = COALESCE($9, qualified),
                sales = COALESCE($10, sales),
                investment_google_ads = COALESCE($11, investment_google_ads),
                investment_total = COALESCE($12, investment_total),
                approvals_rate = COALESCE($13, approvals_rate),
                goal_qualified_conv = COALESCE($14, goal_qualified_conv),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {CAMPAIGN_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(data.name.as_deref())
        .bind(data.month_payment)
        .bind(data.year_payment)
        .bind(data.month_campaign)
        .bind(data.year_campaign)
        .bind(data.clicks)
        .bind(data.conversions)
        .bind(data.qualified)
        .bind(data.sales)
        .bind(data.investment_google_ads)
        .bind(data.investment_total)
        .bind(data.approvals_rate)
        .bind(data.goal_qualified_conv)
        .fetch_one(executor)
        .await?;

        Ok(campaign)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM campaigns WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn list(
        &self,
        project_id: Uuid,
        filters: &ListCampaignsQuery,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Campaign>, i64), AppError> {
        fn push_filters(
            qb: &mut QueryBuilder<'_, Postgres>,
            project_id: Uuid,
            filters: &ListCampaignsQuery,
        ) {
            qb.push(" WHERE project_id = ").push_bind(project_id);
            if let Some(search) = filters.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
                qb.push(" AND name ILIKE ").push_bind(format!("%{}%", search));
            }
            if let Some(year) = filters.year {
                qb.push(" AND year_campaign = ").push_bind(year);
            }
            if let Some(month) = filters.month {
                qb.push(" AND month_campaign = ").push_bind(month);
            }
        }

        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM campaigns");
        push_filters(&mut count_qb, project_id, filters);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM campaigns"
        ));
        push_filters(&mut qb, project_id, filters);
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        let campaigns = qb.build_query_as::<Campaign>().fetch_all(&self.pool).await?;

        Ok((campaigns, total))
    }

    // Todas as campanhas do projeto em ordem cronológica, para os agregados
    pub async fn list_for_metrics(&self, project_id: Uuid) -> Result<Vec<Campaign>, AppError> {
        let campaigns = sqlx::query_as::<_, Campaign>(&format!(
            r#"
            SELECT {CAMPAIGN_COLUMNS} FROM campaigns
            WHERE project_id = $1
            ORDER BY year_campaign ASC, month_campaign ASC
            "#
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(campaigns)
    }
}
