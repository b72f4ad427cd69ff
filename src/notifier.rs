use crate::config::MailConfig;
use crate::error::NotifyError;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use log::info;

/// Delivers the consolidated alert over SMTP
///
/// One message per run at most. Delivery failure is returned to the caller,
/// which logs it and completes the run anyway; a broken mail path must not
/// mask the detection work that already happened.
pub struct Notifier {
    config: MailConfig,
}

impl Notifier {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    /// Send a single notification with the given subject and body
    ///
    /// # Errors
    ///
    /// Returns `NotifyError` when an address is invalid, the message cannot
    /// be built, or the SMTP transport fails.
    pub fn send(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        let email = Message::builder()
            .from(self.config.from.parse::<Mailbox>()?)
            .to(self.config.recipient.parse::<Mailbox>()?)
            .subject(subject)
            .body(body.to_string())?;

        let builder = if self.config.tls {
            SmtpTransport::starttls_relay(&self.config.host)?
        } else {
            SmtpTransport::builder_dangerous(&self.config.host)
        };

        let mut builder = builder.port(self.config.port);
        if let (Some(user), Some(password)) = (&self.config.user, &self.config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
        }

        builder.build().send(&email)?;
        info!("Alert email sent to {}", self.config.recipient);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail_config() -> MailConfig {
        MailConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            tls: false,
            user: None,
            password: None,
            from: "monitor@example.com".to_string(),
            recipient: "ops@example.com".to_string(),
        }
    }

    #[test]
    fn test_invalid_from_address_is_rejected() {
        let mut config = mail_config();
        config.from = "not an address".to_string();

        let result = Notifier::new(config).send("subject", "body");
        assert!(matches!(result, Err(NotifyError::Address(_))));
    }

    #[test]
    fn test_invalid_recipient_address_is_rejected() {
        let mut config = mail_config();
        config.recipient = String::new();

        let result = Notifier::new(config).send("subject", "body");
        assert!(matches!(result, Err(NotifyError::Address(_))));
    }

    #[test]
    fn test_unreachable_transport_errors() {
        // Port 1 on loopback refuses the connection immediately
        let result = Notifier::new(mail_config()).send("subject", "body");
        assert!(matches!(result, Err(NotifyError::Transport(_))));
    }
}
