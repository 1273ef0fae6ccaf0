// src/models/campaign.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// Campanha de mídia de um projeto: contadores de performance + valores investidos.
// Sem máquina de estados; CRUD simples com a mesma regra de ownership do projeto.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,

    pub month_payment: i32,
    pub year_payment: i32,
    pub month_campaign: i32,
    pub year_campaign: i32,

    pub clicks: i32,
    pub conversions: i32,
    pub qualified: i32,
    pub sales: i32,

    pub investment_google_ads: Decimal,
    pub investment_total: Decimal,

    pub approvals_rate: Option<f64>,
    pub goal_qualified_conv: Option<f64>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        let mut err = ValidationError::new("negative");
        err.message = Some("O valor não pode ser negativo".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCampaignPayload {
    #[validate(length(min = 1, message = "Nome é obrigatório"))]
    pub name: String,

    #[validate(range(min = 1, max = 12, message = "Mês deve estar entre 1 e 12"))]
    pub month_payment: i32,
    #[validate(range(min = 2000, message = "Ano inválido"))]
    pub year_payment: i32,
    #[validate(range(min = 1, max = 12, message = "Mês deve estar entre 1 e 12"))]
    pub month_campaign: i32,
    #[validate(range(min = 2000, message = "Ano inválido"))]
    pub year_campaign: i32,

    #[serde(default)]
    #[validate(range(min = 0))]
    pub clicks: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub conversions: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub qualified: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub sales: i32,

    #[serde(default)]
    #[validate(custom(function = validate_non_negative))]
    pub investment_google_ads: Decimal,
    #[serde(default)]
    #[validate(custom(function = validate_non_negative))]
    pub investment_total: Decimal,

    #[validate(range(min = 0.0, max = 100.0))]
    pub approvals_rate: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub goal_qualified_conv: Option<f64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCampaignPayload {
    #[validate(length(min = 1, message = "Nome é obrigatório"))]
    pub name: Option<String>,

    #[validate(range(min = 1, max = 12, message = "Mês deve estar entre 1 e 12"))]
    pub month_payment: Option<i32>,
    #[validate(range(min = 2000, message = "Ano inválido"))]
    pub year_payment: Option<i32>,
    #[validate(range(min = 1, max = 12, message = "Mês deve estar entre 1 e 12"))]
    pub month_campaign: Option<i32>,
    #[validate(range(min = 2000, message = "Ano inválido"))]
    pub year_campaign: Option<i32>,

    #[validate(range(min = 0))]
    pub clicks: Option<i32>,
    #[validate(range(min = 0))]
    pub conversions: Option<i32>,
    #[validate(range(min = 0))]
    pub qualified: Option<i32>,
    #[validate(range(min = 0))]
    pub sales: Option<i32>,

    #[validate(custom(function = validate_non_negative))]
    pub investment_google_ads: Option<Decimal>,
    #[validate(custom(function = validate_non_negative))]
    pub investment_total: Option<Decimal>,

    #[validate(range(min = 0.0, max = 100.0))]
    pub approvals_rate: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub goal_qualified_conv: Option<f64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListCampaignsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub year: Option<i32>,
    pub month: Option<i32>,
}

// Agregados de GET /projects/{id}/campaigns/metrics
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampaignMetrics {
    pub total_campaigns: usize,
    pub total_clicks: i64,
    pub total_conversions: i64,
    pub total_qualified: i64,
    pub total_sales: i64,
    pub total_investment: Decimal,
    pub average_conversion_rate: f64,
    pub average_approval_rate: f64,
    pub monthly_series: Vec<MonthlyPoint>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPoint {
    // "MM/YYYY"
    pub month: String,
    pub clicks: i32,
    pub conversions: i32,
    pub sales: i32,
    pub investment: Decimal,
}
