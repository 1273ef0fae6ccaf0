// src/common/csv.rs

use chrono::{DateTime, Utc};

use crate::{common::error::AppError, models::lead::LeadExportRow};

const HEADERS: [&str; 10] = [
    "Nome",
    "Email",
    "Telefone",
    "Cargo",
    "Tipo de Solicitação",
    "Status",
    "Projeto",
    "Usuário Atribuído",
    "Data de Criação",
    "Data de Atualização",
];

// Formata data no padrão brasileiro DD/MM/YYYY HH:mm
fn format_date_br(date: &DateTime<Utc>) -> String {
    date.format("%d/%m/%Y %H:%M").to_string()
}

// Substitui valores ausentes por "N/A"
fn format_value(value: Option<&str>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "N/A".to_string(),
    }
}

// Gera o CSV de leads com BOM UTF-8, cabeçalhos em português, datas brasileiras
// e status traduzidos. \r\n para compatibilidade com Excel no Windows.
pub fn generate_lead_csv(leads: &[LeadExportRow]) -> Result<String, AppError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());

    writer
        .write_record(HEADERS)
        .map_err(|e| anyhow::anyhow!("Falha ao escrever cabeçalho CSV: {}", e))?;

    for lead in leads {
        writer
            .write_record([
                lead.name.clone(),
                format_value(lead.email.as_deref()),
                format_value(lead.phone.as_deref()),
                format_value(lead.position.as_deref()),
                format_value(lead.request_type.as_deref()),
                lead.status.label().to_string(),
                lead.project_name.clone(),
                format_value(lead.assigned_user_name.as_deref()),
                format_date_br(&lead.created_at),
                format_date_br(&lead.updated_at),
            ])
            .map_err(|e| anyhow::anyhow!("Falha ao escrever linha CSV: {}", e))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Falha ao finalizar CSV: {}", e))?;
    let body = String::from_utf8(bytes).map_err(|e| anyhow::anyhow!("CSV não é UTF-8 válido: {}", e))?;

    // BOM UTF-8 para o Excel abrir corretamente caracteres acentuados
    Ok(format!("\u{FEFF}{}", body))
}

#[cfg(test)]
mod tests {
    use super::generate_lead_csv;
    use crate::models::lead::{LeadExportRow, LeadStatus};
    use chrono::{TimeZone, Utc};

    fn sample_row() -> LeadExportRow {
        LeadExportRow {
            name: "João Souza".to_string(),
            email: Some("joao@exemplo.com".to_string()),
            phone: None,
            position: Some("Diretor".to_string()),
            request_type: None,
            status: LeadStatus::Reuniao,
            created_at: Utc.with_ymd_and_hms(2025, 3, 7, 14, 5, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2025, 3, 9, 9, 30, 0).unwrap(),
            project_name: "Projeto Demo".to_string(),
            assigned_user_name: None,
        }
    }

    #[test]
    fn csv_starts_with_utf8_bom_and_portuguese_headers() {
        let csv = generate_lead_csv(&[sample_row()]).unwrap();
        assert!(csv.starts_with('\u{FEFF}'));
        assert!(csv.contains("\"Nome\",\"Email\",\"Telefone\""));
        assert!(csv.contains("\r\n"));
    }

    #[test]
    fn missing_values_become_na_and_dates_use_br_format() {
        let csv = generate_lead_csv(&[sample_row()]).unwrap();
        assert!(csv.contains("\"N/A\""));
        assert!(csv.contains("\"07/03/2025 14:05\""));
        assert!(csv.contains("\"09/03/2025 09:30\""));
    }

    #[test]
    fn status_is_translated_to_label() {
        let csv = generate_lead_csv(&[sample_row()]).unwrap();
        assert!(csv.contains("\"Reunião\""));
        assert!(!csv.contains("REUNIAO"));
    }
}
