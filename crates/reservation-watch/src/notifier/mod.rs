//! Subscriber notification: renders the reservation email and hands it to the
//! configured provider.

mod sendgrid;
mod template;

pub use sendgrid::SendGridGateway;
pub use template::ReservationNotice;

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use crate::masking::mask_email;

/// Fully rendered message ready for a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

/// Outbound email transport.
#[async_trait]
pub trait EmailGateway: Send + Sync {
    async fn deliver(&self, email: &OutboundEmail) -> Result<(), EmailError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("email provider rejected the message with status {status}")]
    Rejected { status: u16 },
    #[error("email transport failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("email gateway unavailable: {0}")]
    Unavailable(String),
}

/// Formats and sends reservation notices. Failures are logged, never retried.
#[derive(Debug)]
pub struct ReservationNotifier<G> {
    gateway: Arc<G>,
    source_url: String,
}

impl<G> ReservationNotifier<G>
where
    G: EmailGateway + 'static,
{
    pub fn new(gateway: Arc<G>, source_url: impl Into<String>) -> Self {
        Self {
            gateway,
            source_url: source_url.into(),
        }
    }

    /// Emails `dates` for `month` to `email`, returning whether the provider
    /// accepted the message. Empty `dates` never reach the provider.
    pub async fn notify(&self, email: &str, month: &str, dates: &[String]) -> bool {
        let recipient = mask_email(email);

        if dates.is_empty() {
            info!(%recipient, month, "no specific dates provided, skipping email notification");
            return false;
        }

        let dates = dedupe_dates(dates);
        let notice = ReservationNotice {
            month,
            dates: &dates,
            source_url: &self.source_url,
        };
        let message = OutboundEmail {
            to: email.to_string(),
            subject: notice.subject(),
            html_body: notice.html_body(),
            text_body: notice.text_body(),
        };

        match self.gateway.deliver(&message).await {
            Ok(()) => {
                info!(%recipient, month, "sent reservation notification email");
                true
            }
            Err(err) => {
                error!(%recipient, month, error = %err, "failed to send reservation notification email");
                false
            }
        }
    }
}

/// Drops repeated dates, keeping the first occurrence of each.
pub fn dedupe_dates(dates: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    dates
        .iter()
        .filter(|date| seen.insert(date.as_str()))
        .cloned()
        .collect()
}
