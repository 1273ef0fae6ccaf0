// src/services/lead_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        csv::generate_lead_csv,
        error::AppError,
        pagination::{PageMeta, PageParams, Paginated},
    },
    db::{lead_repo::EXPORT_LIMIT, LeadRepository, ProjectRepository},
    models::{
        lead::{
            CreateLeadPayload, Lead, LeadDetail, LeadStatus, ListLeadsQuery, UpdateLeadPayload,
            UpdateLeadStatusPayload,
        },
        project::{Project, ProjectStatus},
        user::{SystemRole, User},
    },
};

// Contrato da transição de status. Puro, para a tabela ficar testável
// sem banco: rejeita no-op, transições fora da tabela e fechamento sem motivo.
pub fn validate_transition(
    from: LeadStatus,
    to: LeadStatus,
    reason: Option<&str>,
) -> Result<(), AppError> {
    if from == to {
        return Err(AppError::InvalidState);
    }
    if !from.allowed_transitions().contains(&to) {
        return Err(AppError::IllegalTransition);
    }
    if to.is_terminal() {
        let valid = reason.is_some_and(|r| r.trim().chars().count() >= 2);
        if !valid {
            return Err(AppError::MissingReason);
        }
    }
    Ok(())
}

// Predicado de acesso a um lead, com os fatos já resolvidos:
// ROOT enxerga tudo, ADMIN o que administra, PROJECT_USER o que lhe foi atribuído.
fn can_access_lead(
    role: SystemRole,
    actor_id: Uuid,
    project_admin_id: Option<Uuid>,
    assigned_user_id: Option<Uuid>,
) -> bool {
    match role {
        SystemRole::Root => true,
        SystemRole::Admin => project_admin_id == Some(actor_id),
        SystemRole::ProjectUser => assigned_user_id == Some(actor_id),
    }
}

// Normaliza um campo de contato: vazio/espaços contam como ausente
fn clean(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Clone)]
pub struct LeadService {
    repo: LeadRepository,
    project_repo: ProjectRepository,
    pool: PgPool,
}

impl LeadService {
    pub fn new(repo: LeadRepository, project_repo: ProjectRepository, pool: PgPool) -> Self {
        Self { repo, project_repo, pool }
    }

    pub async fn create(&self, data: &CreateLeadPayload, actor: &User) -> Result<Lead, AppError> {
        // 1. Resolve o projeto alvo (explícito ou inferido do ator)
        let project = self.resolve_target_project(data.project_id, actor).await?;

        // 2. Leads só nascem em projeto ATIVO
        if project.status != ProjectStatus::Active {
            return Err(AppError::ProjectNotActive);
        }

        // 3. Ownership/afiliação do ator no projeto
        self.assert_can_create_in_project(&project, actor).await?;

        // 4. Guarda de duplicidade (email OU telefone, ignorando soft deletados)
        let email = clean(&data.email);
        let phone = clean(&data.phone);
        if self
            .repo
            .find_duplicate_in_project(project.id, email, phone, None)
            .await?
            .is_some()
        {
            return Err(AppError::DuplicateLead);
        }

        // 5 + 6. Lead e primeira entrada do histórico na mesma transação
        let status = data.status.unwrap_or(LeadStatus::PrimeiroContato);
        let assigned_user_id = data.assigned_user_id.or(Some(actor.id));

        let mut tx = self.pool.begin().await?;
        let lead = self
            .repo
            .create(
                &mut *tx,
                project.id,
                assigned_user_id,
                &data.name,
                email,
                phone,
                data.position.as_deref(),
                data.request_type.as_deref(),
                status,
            )
            .await?;
        self.repo
            .add_history(&mut *tx, lead.id, None, status, Some(actor.id), None)
            .await?;
        tx.commit().await?;

        Ok(lead)
    }

    pub async fn get_by_id(&self, id: Uuid, actor: &User) -> Result<LeadDetail, AppError> {
        let lead = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Lead não encontrado."))?;
        self.assert_can_access_lead(&lead, actor).await?;

        let history = self.repo.list_history(lead.id).await?;
        Ok(LeadDetail { lead, history })
    }

    pub async fn list(
        &self,
        mut filters: ListLeadsQuery,
        actor: &User,
    ) -> Result<Paginated<Lead>, AppError> {
        // PROJECT_USER só enxerga os próprios leads; o estreitamento acontece
        // aqui no servidor e não é contornável por filtro do cliente.
        if actor.role == SystemRole::ProjectUser {
            filters.assigned_user_id = Some(actor.id);
            filters.unassigned = None;
        }

        let (page, limit, offset) =
            PageParams { page: filters.page, limit: filters.limit }.normalize();
        let (leads, total) = self.repo.list(&filters, limit, offset).await?;

        Ok(Paginated {
            data: leads,
            meta: PageMeta::new(total, page, limit),
        })
    }

    pub async fn update(
        &self,
        id: Uuid,
        data: &UpdateLeadPayload,
        actor: &User,
    ) -> Result<Lead, AppError> {
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Lead não encontrado."))?;
        self.assert_can_access_lead(&existing, actor).await?;

        // A guarda de duplicidade só roda quando email/telefone realmente
        // mudam, excluindo o próprio lead do conjunto comparado.
        let new_email = clean(&data.email);
        let new_phone = clean(&data.phone);
        let email_changed = new_email.is_some_and(|e| existing.email.as_deref() != Some(e));
        let phone_changed = new_phone.is_some_and(|p| existing.phone.as_deref() != Some(p));

        if email_changed || phone_changed {
            if self
                .repo
                .find_duplicate_in_project(existing.project_id, new_email, new_phone, Some(existing.id))
                .await?
                .is_some()
            {
                return Err(AppError::DuplicateLead);
            }
        }

        self.repo.update(&self.pool, id, data).await
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        data: &UpdateLeadStatusPayload,
        actor: &User,
    ) -> Result<Lead, AppError> {
        let lead = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Lead não encontrado."))?;
        self.assert_can_access_lead(&lead, actor).await?;

        let reason = clean(&data.reason);
        validate_transition(lead.status, data.to_status, reason)?;

        // O UPDATE é guardado pelo status anterior e o histórico entra na
        // mesma transação: ou os dois efeitos acontecem, ou nenhum.
        let mut tx = self.pool.begin().await?;
        let updated = self
            .repo
            .update_status(&mut *tx, id, lead.status, data.to_status)
            .await?
            // Outra transição concorrente venceu a corrida sobre o mesmo estado
            .ok_or(AppError::IllegalTransition)?;
        self.repo
            .add_history(
                &mut *tx,
                id,
                Some(lead.status),
                data.to_status,
                Some(actor.id),
                reason,
            )
            .await?;
        tx.commit().await?;

        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid, actor: &User) -> Result<(), AppError> {
        let lead = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Lead não encontrado."))?;
        self.assert_can_access_lead(&lead, actor).await?;
        self.repo.soft_delete(&self.pool, lead.id).await
    }

    // Exportação CSV sem paginação, com limite duro de linhas
    pub async fn export(
        &self,
        mut filters: ListLeadsQuery,
        actor: &User,
    ) -> Result<String, AppError> {
        if actor.role == SystemRole::ProjectUser {
            filters.assigned_user_id = Some(actor.id);
            filters.unassigned = None;
        }

        let rows = self.repo.list_for_export(&filters).await?;
        if rows.len() as i64 > EXPORT_LIMIT {
            return Err(AppError::ExportLimitExceeded);
        }

        generate_lead_csv(&rows)
    }

    // --- Resolução de projeto e predicados de acesso ---

    // projectId omitido: ROOT precisa informar; ADMIN e PROJECT_USER inferem
    // apenas quando existe exatamente um projeto ativo candidato.
    async fn resolve_target_project(
        &self,
        explicit: Option<Uuid>,
        actor: &User,
    ) -> Result<Project, AppError> {
        if let Some(project_id) = explicit {
            return self
                .project_repo
                .find_by_id(project_id)
                .await?
                .ok_or(AppError::NotFound("Projeto não encontrado."));
        }

        match actor.role {
            SystemRole::Root => Err(AppError::MissingProjectId),
            SystemRole::Admin => {
                let mut projects = self.project_repo.list_active_by_admin(actor.id).await?;
                if projects.len() == 1 {
                    Ok(projects.remove(0))
                } else {
                    Err(AppError::NoActiveProject)
                }
            }
            SystemRole::ProjectUser => {
                let mut projects = self.project_repo.list_active_by_member(actor.id).await?;
                if projects.len() == 1 {
                    Ok(projects.remove(0))
                } else {
                    Err(AppError::NotAMember)
                }
            }
        }
    }

    async fn assert_can_create_in_project(
        &self,
        project: &Project,
        actor: &User,
    ) -> Result<(), AppError> {
        match actor.role {
            SystemRole::Root => Ok(()),
            SystemRole::Admin => {
                if project.admin_id == actor.id {
                    Ok(())
                } else {
                    Err(AppError::Forbidden("Sem acesso a este projeto."))
                }
            }
            SystemRole::ProjectUser => {
                if self.project_repo.is_member(project.id, actor.id).await? {
                    Ok(())
                } else {
                    Err(AppError::NotAMember)
                }
            }
        }
    }

    async fn assert_can_access_lead(&self, lead: &Lead, actor: &User) -> Result<(), AppError> {
        let project_admin_id = match actor.role {
            // Só o ADMIN precisa do dono do projeto; evita a ida ao banco
            // para os outros papéis.
            SystemRole::Admin => self
                .project_repo
                .find_by_id(lead.project_id)
                .await?
                .map(|p| p.admin_id),
            _ => None,
        };

        if can_access_lead(actor.role, actor.id, project_admin_id, lead.assigned_user_id) {
            Ok(())
        } else {
            Err(AppError::Forbidden("Sem acesso ao lead."))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{can_access_lead, validate_transition};
    use crate::{common::error::AppError, models::lead::LeadStatus};
    use uuid::Uuid;
    use LeadStatus::*;

    const ALL: [LeadStatus; 6] = [
        PrimeiroContato,
        Reuniao,
        PropostaEnviada,
        AnaliseProposta,
        FechadoGanho,
        FechadoPerdido,
    ];

    #[test]
    fn same_status_transition_is_always_invalid_state() {
        for status in ALL {
            let result = validate_transition(status, status, Some("motivo válido"));
            assert!(matches!(result, Err(AppError::InvalidState)), "{:?}", status);
        }
    }

    #[test]
    fn pairs_outside_the_table_fail_and_pairs_inside_succeed() {
        for from in ALL {
            for to in ALL {
                if from == to {
                    continue;
                }
                let result = validate_transition(from, to, Some("Venda concluída"));
                if from.allowed_transitions().contains(&to) {
                    assert!(result.is_ok(), "{:?} -> {:?}", from, to);
                } else {
                    assert!(
                        matches!(result, Err(AppError::IllegalTransition)),
                        "{:?} -> {:?}",
                        from,
                        to
                    );
                }
            }
        }
    }

    #[test]
    fn terminal_statuses_require_a_meaningful_reason() {
        for (from, to) in [
            (AnaliseProposta, FechadoGanho),
            (AnaliseProposta, FechadoPerdido),
            (PropostaEnviada, FechadoPerdido),
        ] {
            assert!(matches!(
                validate_transition(from, to, None),
                Err(AppError::MissingReason)
            ));
            assert!(matches!(
                validate_transition(from, to, Some("  x ")),
                Err(AppError::MissingReason)
            ));
            assert!(validate_transition(from, to, Some("  ok ")).is_ok());
        }
    }

    #[test]
    fn non_terminal_transitions_do_not_require_reason() {
        assert!(validate_transition(PrimeiroContato, Reuniao, None).is_ok());
        assert!(validate_transition(PropostaEnviada, AnaliseProposta, None).is_ok());
    }

    #[test]
    fn terminal_statuses_never_leave() {
        for from in [FechadoGanho, FechadoPerdido] {
            for to in ALL {
                if from == to {
                    continue;
                }
                assert!(matches!(
                    validate_transition(from, to, Some("motivo válido")),
                    Err(AppError::IllegalTransition)
                ));
            }
        }
    }

    #[test]
    fn lead_access_follows_the_role_matrix() {
        use crate::models::user::SystemRole::*;
        let actor = Uuid::new_v4();
        let other = Uuid::new_v4();

        // ROOT: irrestrito
        assert!(can_access_lead(Root, actor, None, None));

        // ADMIN: apenas quando é o dono do projeto
        assert!(can_access_lead(Admin, actor, Some(actor), Some(other)));
        assert!(!can_access_lead(Admin, actor, Some(other), Some(actor)));
        assert!(!can_access_lead(Admin, actor, None, Some(actor)));

        // PROJECT_USER: apenas o lead atribuído a si, mesmo dentro do projeto
        assert!(can_access_lead(ProjectUser, actor, Some(other), Some(actor)));
        assert!(!can_access_lead(ProjectUser, actor, Some(other), Some(other)));
        assert!(!can_access_lead(ProjectUser, actor, Some(other), None));
    }
}
