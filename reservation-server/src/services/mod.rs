//! 外部服务集成

pub mod mailer;

pub use mailer::{MailError, MailOutbox, Mailer, SentMail, SmtpSettings};
