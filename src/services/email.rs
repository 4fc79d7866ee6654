//! Email notifications for reservations

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, Message, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    SmtpTransport, Transport,
};
use std::str::FromStr;

use crate::{
    config::EmailConfig,
    error::{AppError, AppResult},
    models::{Equipment, Reservation, User},
};

/// Outbound notifications. Failures are reported to the caller, which
/// decides whether they matter.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn reservation_created(
        &self,
        client: &User,
        equipment: &Equipment,
        reservation: &Reservation,
    ) -> AppResult<()>;
}

#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Generic email sending function
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        let from_name = self
            .config
            .smtp_from_name
            .as_deref()
            .unwrap_or("Equipment Rental");
        let from_mailbox = Mailbox::from_str(&format!("{} <{}>", from_name, self.config.smtp_from))
            .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?;

        let to_mailbox = Mailbox::from_str(to)
            .map_err(|e| AppError::Internal(format!("Invalid to address: {}", e)))?;

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(format!(
                                "<html><body><p>{}</p></body></html>",
                                body.trim().replace('\n', "<br>")
                            )),
                    ),
            )
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        let mailer = self.mailer()?;

        // lettre's SmtpTransport blocks
        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::Internal(format!("Email task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("Failed to send email: {}", e)))?;

        Ok(())
    }

    fn mailer(&self) -> AppResult<SmtpTransport> {
        let builder = if self.config.smtp_use_tls {
            SmtpTransport::starttls_relay(&self.config.smtp_host)
                .map_err(|e| AppError::Internal(format!("Failed to create SMTP transport: {}", e)))?
        } else {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
        }
        .port(self.config.smtp_port);

        let builder = match (&self.config.smtp_username, &self.config.smtp_password) {
            (Some(username), Some(password)) => {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => builder,
        };

        Ok(builder.build())
    }
}

#[async_trait]
impl Notifier for EmailService {
    async fn reservation_created(
        &self,
        client: &User,
        equipment: &Equipment,
        reservation: &Reservation,
    ) -> AppResult<()> {
        if !self.config.enabled {
            tracing::debug!(
                "Email disabled, skipping confirmation for reservation {}",
                reservation.id
            );
            return Ok(());
        }

        let subject = format!("Reservation received: {}", equipment.name);
        let body = confirmation_body(client, equipment, reservation);
        self.send_email(&client.email, &subject, &body).await?;
        tracing::info!(
            "Confirmation email sent to {} for reservation {}",
            client.email,
            reservation.id
        );
        Ok(())
    }
}

fn confirmation_body(client: &User, equipment: &Equipment, reservation: &Reservation) -> String {
    format!(
        r#"
Hello {first_name},

We received your reservation request for {equipment} ({brand} {model}).

From: {start}
To: {end}
Days: {days}
Total: {total}
Status: {status}

You will receive another message once it has been reviewed.
"#,
        first_name = client.first_name,
        equipment = equipment.name,
        brand = equipment.brand,
        model = equipment.model,
        start = reservation.start_date.format("%Y-%m-%d %H:%M UTC"),
        end = reservation.end_date.format("%Y-%m-%d %H:%M UTC"),
        days = reservation.number_of_days,
        total = reservation.total_cost,
        status = reservation.status,
    )
}
