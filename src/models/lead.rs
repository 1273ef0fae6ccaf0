// src/models/lead.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// Mapeia o CREATE TYPE lead_status do banco.
// FECHADO_GANHO e FECHADO_PERDIDO são terminais (sem transições de saída).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lead_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadStatus {
    PrimeiroContato,
    Reuniao,
    PropostaEnviada,
    AnaliseProposta,
    FechadoGanho,
    FechadoPerdido,
}

impl LeadStatus {
    // A tabela de transições permitidas, em um único lugar.
    pub fn allowed_transitions(self) -> &'static [LeadStatus] {
        use LeadStatus::*;
        match self {
            PrimeiroContato => &[Reuniao, PropostaEnviada],
            Reuniao => &[PropostaEnviada],
            PropostaEnviada => &[AnaliseProposta, FechadoPerdido],
            AnaliseProposta => &[FechadoGanho, FechadoPerdido],
            FechadoGanho => &[],
            FechadoPerdido => &[],
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, LeadStatus::FechadoGanho | LeadStatus::FechadoPerdido)
    }

    // Rótulo em português usado na exportação CSV
    pub fn label(self) -> &'static str {
        match self {
            LeadStatus::PrimeiroContato => "Primeiro Contato",
            LeadStatus::Reuniao => "Reunião",
            LeadStatus::PropostaEnviada => "Proposta Enviada",
            LeadStatus::AnaliseProposta => "Análise Proposta",
            LeadStatus::FechadoGanho => "Fechado Ganho",
            LeadStatus::FechadoPerdido => "Fechado Perdido",
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,
    pub project_id: Uuid,
    pub assigned_user_id: Option<Uuid>,

    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub request_type: Option<String>,

    pub status: LeadStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Entrada imutável da trilha de auditoria (uma por mudança de status)
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadHistoryEntry {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub from_status: Option<LeadStatus>,
    pub to_status: LeadStatus,
    pub changed_by_user_id: Option<Uuid>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Resposta de GET /leads/{id}: o lead com o histórico (mais recente primeiro)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadDetail {
    #[serde(flatten)]
    pub lead: Lead,
    pub history: Vec<LeadHistoryEntry>,
}

// Linha da exportação CSV: lead + nomes do projeto e do usuário atribuído
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LeadExportRow {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub request_type: Option<String>,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub project_name: String,
    pub assigned_user_name: Option<String>,
}

// Requer pelo menos um contato (email ou telefone)
fn has_contact(email: &Option<String>, phone: &Option<String>) -> bool {
    let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
    filled(email) || filled(phone)
}

fn contact_error() -> ValidationError {
    let mut err = ValidationError::new("contact_required");
    err.message = Some("Informe pelo menos um contato: email ou telefone".into());
    err
}

pub fn validate_create_contact(payload: &CreateLeadPayload) -> Result<(), ValidationError> {
    if has_contact(&payload.email, &payload.phone) {
        Ok(())
    } else {
        Err(contact_error())
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = validate_create_contact))]
pub struct CreateLeadPayload {
    #[validate(length(min = 1, message = "Nome é obrigatório"))]
    #[schema(example = "João Souza")]
    pub name: String,

    #[validate(email(message = "Email inválido"))]
    pub email: Option<String>,
    pub phone: Option<String>,

    // cargo
    pub position: Option<String>,
    // tipo de serviço solicitado
    pub request_type: Option<String>,

    // Inferido do ator quando omitido (ROOT precisa informar)
    pub project_id: Option<Uuid>,
    // Default: o próprio ator
    pub assigned_user_id: Option<Uuid>,
    // Default: PRIMEIRO_CONTATO
    pub status: Option<LeadStatus>,
}

// Atualização de dados gerais. Mudança de status acontece apenas
// via PATCH /{id}/status, nunca por aqui.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeadPayload {
    #[validate(length(min = 1, message = "Nome é obrigatório"))]
    pub name: Option<String>,

    #[validate(email(message = "Email inválido"))]
    pub email: Option<String>,
    pub phone: Option<String>,

    pub position: Option<String>,
    pub request_type: Option<String>,

    pub assigned_user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeadStatusPayload {
    pub to_status: LeadStatus,

    #[validate(length(min = 2, message = "Motivo deve ter ao menos 2 caracteres"))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum LeadOrderBy {
    CreatedAt,
    UpdatedAt,
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

// Filtros da listagem (e da exportação, que ignora page/limit)
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListLeadsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,

    pub project_id: Option<Uuid>,
    pub status: Option<LeadStatus>,
    // Múltiplos status separados por vírgula: statuses=REUNIAO,PROPOSTA_ENVIADA
    pub statuses: Option<String>,

    // nome / email / telefone
    pub search: Option<String>,
    pub request_type: Option<String>,
    pub position: Option<String>,

    pub assigned_user_id: Option<Uuid>,
    // Filtrar por leads sem usuário atribuído
    pub unassigned: Option<bool>,

    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,

    pub order_by: Option<LeadOrderBy>,
    pub order: Option<SortOrder>,
}

impl ListLeadsQuery {
    // Resolve o filtro de status: `statuses` (CSV) tem precedência sobre `status`.
    pub fn status_filter(&self) -> Vec<LeadStatus> {
        if let Some(csv) = &self.statuses {
            let parsed: Vec<LeadStatus> = csv
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .filter_map(|s| serde_json::from_value(serde_json::Value::String(s.to_string())).ok())
                .collect();
            if !parsed.is_empty() {
                return parsed;
            }
        }
        self.status.into_iter().collect()
    }
}

impl Default for LeadOrderBy {
    fn default() -> Self {
        LeadOrderBy::CreatedAt
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Desc
    }
}

#[cfg(test)]
mod tests {
    use super::{LeadStatus, ListLeadsQuery};
    use LeadStatus::*;

    #[test]
    fn terminal_statuses_have_no_outgoing_transitions() {
        assert!(FechadoGanho.allowed_transitions().is_empty());
        assert!(FechadoPerdido.allowed_transitions().is_empty());
        assert!(FechadoGanho.is_terminal());
        assert!(FechadoPerdido.is_terminal());
        assert!(!PrimeiroContato.is_terminal());
    }

    #[test]
    fn transition_table_matches_the_funnel() {
        assert_eq!(PrimeiroContato.allowed_transitions(), &[Reuniao, PropostaEnviada]);
        assert_eq!(Reuniao.allowed_transitions(), &[PropostaEnviada]);
        assert_eq!(PropostaEnviada.allowed_transitions(), &[AnaliseProposta, FechadoPerdido]);
        assert_eq!(AnaliseProposta.allowed_transitions(), &[FechadoGanho, FechadoPerdido]);
    }

    #[test]
    fn statuses_csv_takes_precedence_and_ignores_garbage() {
        let query = ListLeadsQuery {
            status: Some(PrimeiroContato),
            statuses: Some("REUNIAO, PROPOSTA_ENVIADA,, NAO_EXISTE".to_string()),
            ..Default::default()
        };
        assert_eq!(query.status_filter(), vec![Reuniao, PropostaEnviada]);

        let fallback = ListLeadsQuery { status: Some(FechadoGanho), ..Default::default() };
        assert_eq!(fallback.status_filter(), vec![FechadoGanho]);
    }
}
