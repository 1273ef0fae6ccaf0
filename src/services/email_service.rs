// src/services/email_service.rs

use std::sync::Arc;

use async_trait::async_trait;

// O transporte de e-mail fica atrás deste trait: em produção entra uma
// implementação SMTP com a mesma interface, sem tocar nos call sites.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()>;
}

// Implementação de desenvolvimento: registra o envio no log.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, _html: &str) -> anyhow::Result<()> {
        tracing::info!(to = %to, subject = %subject, "E-mail registrado (transporte SMTP não configurado)");
        Ok(())
    }
}

// Monta os e-mails transacionais e dispara em modo fire-and-forget:
// falha de envio é logada e nunca propaga para a operação de negócio.
#[derive(Clone)]
pub struct EmailService {
    mailer: Arc<dyn Mailer>,
    app_url: String,
}

impl EmailService {
    pub fn new(mailer: Arc<dyn Mailer>, app_url: String) -> Self {
        Self { mailer, app_url }
    }

    fn dispatch(&self, to: String, subject: String, html: String) {
        let mailer = self.mailer.clone();
        tokio::spawn(async move {
            if let Err(e) = mailer.send(&to, &subject, &html).await {
                tracing::error!(to = %to, "Erro ao enviar e-mail: {:#}", e);
            }
        });
    }

    pub fn send_reset_password_email(&self, to: &str, reset_token: &str, user_name: &str) {
        let reset_url = format!("{}/reset-password/{}", self.app_url, reset_token);
        let html = format!(
            r#"<h2>Olá, {user_name}!</h2>
<p>Você solicitou a recuperação de senha da sua conta no Emanaleads.</p>
<p>Clique no link abaixo para definir uma nova senha:</p>
<a href="{reset_url}">Resetar Senha</a>
<p>Este link é válido por 1 hora. Se você não solicitou esta recuperação, ignore este email.</p>"#
        );
        self.dispatch(
            to.to_string(),
            "Recuperação de senha - Emanaleads".to_string(),
            html,
        );
    }

    pub fn send_activation_email(&self, to: &str, activation_token: &str, user_name: &str) {
        let activation_url = format!("{}/activate/{}", self.app_url, activation_token);
        let html = format!(
            r#"<h2>Bem-vindo ao Emanaleads, {user_name}!</h2>
<p>Sua conta foi criada com sucesso. Para começar a usar o sistema, você precisa definir sua senha.</p>
<a href="{activation_url}">Ativar Conta</a>
<p>Este link é válido por 7 dias.</p>"#
        );
        self.dispatch(
            to.to_string(),
            "Bem-vindo ao Emanaleads - Ative sua conta".to_string(),
            html,
        );
    }

    pub fn send_welcome_email(&self, to: &str, user_name: &str) {
        let login_url = format!("{}/login", self.app_url);
        let html = format!(
            r#"<h2>Olá, {user_name}!</h2>
<p>Sua conta foi configurada com sucesso e você já pode começar a usar o sistema.</p>
<a href="{login_url}">Acessar Sistema</a>"#
        );
        self.dispatch(to.to_string(), "Bem-vindo ao Emanaleads".to_string(), html);
    }
}
