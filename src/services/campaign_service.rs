// src/services/campaign_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{PageMeta, PageParams, Paginated},
    },
    db::{CampaignRepository, ProjectRepository},
    models::{
        campaign::{
            Campaign, CampaignMetrics, CreateCampaignPayload, ListCampaignsQuery, MonthlyPoint,
            UpdateCampaignPayload,
        },
        user::{SystemRole, User},
    },
};

#[derive(Clone)]
pub struct CampaignService {
    repo: CampaignRepository,
    project_repo: ProjectRepository,
    pool: PgPool,
}

impl CampaignService {
    pub fn new(repo: CampaignRepository, project_repo: ProjectRepository, pool: PgPool) -> Self {
        Self { repo, project_repo, pool }
    }

    // ROOT pode tudo; ADMIN apenas no projeto que administra.
    async fn assert_project_ownership(
        &self,
        project_id: Uuid,
        actor: &User,
    ) -> Result<(), AppError> {
        if actor.role == SystemRole::Root {
            return Ok(());
        }
        if actor.role != SystemRole::Admin {
            return Err(AppError::Forbidden("Acesso negado."));
        }

        let project = self
            .project_repo
            .find_by_id(project_id)
            .await?
            .ok_or(AppError::NotFound("Projeto não encontrado."))?;

        if project.admin_id != actor.id {
            return Err(AppError::Forbidden(
                "Acesso negado. Você não é o administrador deste projeto.",
            ));
        }
        Ok(())
    }

    pub async fn create(
        &self,
        project_id: Uuid,
        data: &CreateCampaignPayload,
        actor: &User,
    ) -> Result<Campaign, AppError> {
        self.assert_project_ownership(project_id, actor).await?;
        self.repo.create(&self.pool, project_id, data).await
    }

    pub async fn get_by_id(
        &self,
        project_id: Uuid,
        campaign_id: Uuid,
        actor: &User,
    ) -> Result<Campaign, AppError> {
        self.assert_project_ownership(project_id, actor).await?;
        let campaign = self.repo.find_by_id(campaign_id).await?;
        // Campanha de outro projeto responde como inexistente
        match campaign {
            Some(c) if c.project_id == project_id => Ok(c),
            _ => Err(AppError::NotFound("Campanha não encontrada.")),
        }
    }

    pub async fn update(
        &self,
        project_id: Uuid,
        campaign_id: Uuid,
        data: &UpdateCampaignPayload,
        actor: &User,
    ) -> Result<Campaign, AppError> {
        self.get_by_id(project_id, campaign_id, actor).await?;
        self.repo.update(&self.pool, campaign_id, data).await
    }

    pub async fn delete(
        &self,
        project_id: Uuid,
        campaign_id: Uuid,
        actor: &User,
    ) -> Result<(), AppError> {
        self.get_by_id(project_id, campaign_id, actor).await?;
        self.repo.delete(&self.pool, campaign_id).await
    }

    pub async fn list(
        &self,
        project_id: Uuid,
        query: &ListCampaignsQuery,
        actor: &User,
    ) -> Result<Paginated<Campaign>, AppError> {
        self.assert_project_ownership(project_id, actor).await?;

        let (page, limit, offset) =
            PageParams { page: query.page, limit: query.limit }.normalize();
        let (campaigns, total) = self.repo.list(project_id, query, limit, offset).await?;

        Ok(Paginated {
            data: campaigns,
            meta: PageMeta::new(total, page, limit),
        })
    }

    pub async fn get_metrics(
        &self,
        project_id: Uuid,
        actor: &User,
    ) -> Result<CampaignMetrics, AppError> {
        self.assert_project_ownership(project_id, actor).await?;
        let campaigns = self.repo.list_for_metrics(project_id).await?;
        Ok(aggregate_metrics(&campaigns))
    }
}

// Agregação pura sobre as campanhas do projeto (já em ordem cronológica)
fn aggregate_metrics(campaigns: &[Campaign]) -> CampaignMetrics {
    let total_campaigns = campaigns.len();
    let total_clicks: i64 = campaigns.iter().map(|c| c.clicks as i64).sum();
    let total_conversions: i64 = campaigns.iter().map(|c| c.conversions as i64).sum();
    let total_qualified: i64 = campaigns.iter().map(|c| c.qualified as i64).sum();
    let total_sales: i64 = campaigns.iter().map(|c| c.sales as i64).sum();
    let total_investment: Decimal = campaigns.iter().map(|c| c.investment_total).sum();

    let average_conversion_rate = if total_clicks > 0 {
        (total_conversions as f64 / total_clicks as f64) * 100.0
    } else {
        0.0
    };

    let approval_rates: Vec<f64> = campaigns.iter().filter_map(|c| c.approvals_rate).collect();
    let average_approval_rate = if approval_rates.is_empty() {
        0.0
    } else {
        approval_rates.iter().sum::<f64>() / approval_rates.len() as f64
    };

    // Séries temporais: últimos 12 meses (ou todos, se menos)
    let monthly_series: Vec<MonthlyPoint> = campaigns
        .iter()
        .rev()
        .take(12)
        .rev()
        .map(|c| MonthlyPoint {
            month: format!("{:02}/{}", c.month_campaign, c.year_campaign),
            clicks: c.clicks,
            conversions: c.conversions,
            sales: c.sales,
            investment: c.investment_total,
        })
        .collect();

    CampaignMetrics {
        total_campaigns,
        total_clicks,
        total_conversions,
        total_qualified,
        total_sales,
        total_investment,
        average_conversion_rate,
        average_approval_rate,
        monthly_series,
    }
}

#[cfg(test)]
mod tests {
    use super::aggregate_metrics;
    use crate::models::campaign::Campaign;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn campaign(month: i32, year: i32, clicks: i32, conversions: i32, rate: Option<f64>) -> Campaign {
        Campaign {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            name: format!("Campanha {:02}/{}", month, year),
            month_payment: month,
            year_payment: year,
            month_campaign: month,
            year_campaign: year,
            clicks,
            conversions,
            qualified: 0,
            sales: 1,
            investment_google_ads: Decimal::new(5000, 2),
            investment_total: Decimal::new(10000, 2),
            approvals_rate: rate,
            goal_qualified_conv: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn empty_project_yields_zeroed_metrics() {
        let metrics = aggregate_metrics(&[]);
        assert_eq!(metrics.total_campaigns, 0);
        assert_eq!(metrics.average_conversion_rate, 0.0);
        assert_eq!(metrics.average_approval_rate, 0.0);
        assert!(metrics.monthly_series.is_empty());
    }

    #[test]
    fn rates_ignore_missing_approvals_and_divide_by_clicks() {
        let campaigns = vec![
            campaign(1, 2025, 100, 10, Some(80.0)),
            campaign(2, 2025, 100, 30, None),
        ];
        let metrics = aggregate_metrics(&campaigns);
        assert_eq!(metrics.total_clicks, 200);
        assert_eq!(metrics.total_conversions, 40);
        assert!((metrics.average_conversion_rate - 20.0).abs() < f64::EPSILON);
        assert!((metrics.average_approval_rate - 80.0).abs() < f64::EPSILON);
        assert_eq!(metrics.total_investment, Decimal::new(20000, 2));
    }

    #[test]
    fn monthly_series_keeps_only_last_twelve_points_in_order() {
        let campaigns: Vec<_> = (1..=14)
            .map(|i| campaign(((i - 1) % 12) + 1, 2024 + (i - 1) / 12, 10, 1, None))
            .collect();
        let metrics = aggregate_metrics(&campaigns);
        assert_eq!(metrics.monthly_series.len(), 12);
        assert_eq!(metrics.monthly_series.first().unwrap().month, "03/2024");
        assert_eq!(metrics.monthly_series.last().unwrap().month, "02/2025");
    }
}
