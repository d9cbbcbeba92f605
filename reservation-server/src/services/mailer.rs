//! 邮件服务
//!
//! 通过 SMTP 发送验证邮件和预订确认邮件。未配置 SMTP 时降级为
//! 日志输出，便于本地开发。

use std::sync::{Arc, Mutex};

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

/// SMTP 连接配置
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

/// 邮件错误
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid mail address: {0}")]
    Address(String),

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("SMTP transport error: {0}")]
    Transport(String),
}

/// 已投递的邮件记录（捕获模式）
#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// 捕获模式共享的出件箱
pub type MailOutbox = Arc<Mutex<Vec<SentMail>>>;

/// 投递方式
#[derive(Clone)]
enum Delivery {
    /// 真实 SMTP 外发
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    /// 只写日志（本地开发）
    Log,
    /// 写入共享出件箱
    Capture(MailOutbox),
}

/// 邮件服务
///
/// 未配置 SMTP 时所有邮件只写日志，不真正外发。
#[derive(Clone)]
pub struct Mailer {
    delivery: Delivery,
    from: String,
    base_url: String,
}

impl Mailer {
    /// Create a mailer; `smtp: None` yields the dev log-only mailer
    pub fn new(smtp: Option<SmtpSettings>, from: String, base_url: String) -> Result<Self, MailError> {
        let delivery = match smtp {
            Some(settings) => {
                let credentials = Credentials::new(settings.username, settings.password);
                let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.server)
                    .map_err(|e| MailError::Transport(format!("SMTP relay error: {e}")))?
                    .port(settings.port)
                    .credentials(credentials)
                    .build();
                Delivery::Smtp(transport)
            }
            None => {
                tracing::warn!("SMTP not configured, emails will only be logged");
                Delivery::Log
            }
        };

        Ok(Self {
            delivery,
            from,
            base_url,
        })
    }

    /// Create a mailer that records every message in a shared outbox
    /// instead of sending it
    pub fn capturing(base_url: impl Into<String>) -> (Self, MailOutbox) {
        let outbox: MailOutbox = Arc::new(Mutex::new(Vec::new()));
        let mailer = Self {
            delivery: Delivery::Capture(outbox.clone()),
            from: "Reservations <no-reply@localhost>".to_string(),
            base_url: base_url.into(),
        };
        (mailer, outbox)
    }

    /// 发送账号验证邮件
    pub async fn send_verification_email(
        &self,
        to: &str,
        first_name: &str,
        token: &str,
    ) -> Result<(), MailError> {
        let verify_link = format!("{}/api/auth/verify?token={}", self.base_url, token);
        let subject = "Verify your account / Verifica tu cuenta";
        let body = format!(
            "Hi {first_name},\n\n\
             Welcome! Confirm your email address to activate your account:\n\
             {verify_link}\n\n\
             If you did not sign up, you can ignore this message.\n"
        );

        self.send(to, subject, body).await
    }

    /// 发送预订确认邮件
    pub async fn send_reservation_approved(
        &self,
        to: &str,
        first_name: &str,
        table_name: &str,
        date: &str,
        time_slot: &str,
        guests: u32,
    ) -> Result<(), MailError> {
        let subject = "Your reservation is confirmed / Tu reserva está confirmada";
        let body = format!(
            "Hi {first_name},\n\n\
             Your reservation for {table_name} on {date} at {time_slot} \
             ({guests} guests) has been confirmed.\n\
             We look forward to seeing you!\n"
        );

        self.send(to, subject, body).await
    }

    async fn send(&self, to: &str, subject: &str, body: String) -> Result<(), MailError> {
        let transport = match &self.delivery {
            Delivery::Smtp(transport) => transport,
            Delivery::Log => {
                tracing::info!(to = to, subject = subject, "Email (dev mode, not sent)");
                tracing::debug!(body = body, "Email body");
                return Ok(());
            }
            Delivery::Capture(outbox) => {
                if let Ok(mut sent) = outbox.lock() {
                    sent.push(SentMail {
                        to: to.to_string(),
                        subject: subject.to_string(),
                        body,
                    });
                }
                return Ok(());
            }
        };

        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|_| MailError::Address(self.from.clone()))?,
            )
            .to(to.parse().map_err(|_| MailError::Address(to.to_string()))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| MailError::Build(e.to_string()))?;

        transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        tracing::info!(to = to, subject = subject, "Email sent");
        Ok(())
    }
}
