use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;

use super::{EmailError, EmailGateway, OutboundEmail};
use crate::config::{EmailConfig, Secret};

const SEND_PATH: &str = "/v3/mail/send";

#[derive(Debug, Serialize)]
struct MailSend<'a> {
    personalizations: [Personalization<'a>; 1],
    from: Address<'a>,
    subject: &'a str,
    content: [Content<'a>; 2],
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: [Address<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    mime: &'a str,
    value: &'a str,
}

/// SendGrid v3 mail-send client. Only `202 Accepted` counts as delivered.
#[derive(Debug, Clone)]
pub struct SendGridGateway {
    client: Client,
    endpoint: String,
    api_key: Secret,
    sender: String,
}

impl SendGridGateway {
    pub fn new(config: &EmailConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: &EmailConfig) -> Self {
        Self {
            client,
            endpoint: format!("{}{SEND_PATH}", config.api_base.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            sender: config.verified_sender.clone(),
        }
    }
}

#[async_trait]
impl EmailGateway for SendGridGateway {
    async fn deliver(&self, email: &OutboundEmail) -> Result<(), EmailError> {
        // SendGrid requires text/plain ahead of text/html.
        let payload = MailSend {
            personalizations: [Personalization {
                to: [Address { email: &email.to }],
            }],
            from: Address {
                email: &self.sender,
            },
            subject: &email.subject,
            content: [
                Content {
                    mime: "text/plain",
                    value: &email.text_body,
                },
                Content {
                    mime: "text/html",
                    value: &email.html_body,
                },
            ],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose())
            .json(&payload)
            .send()
            .await?;

        match response.status() {
            StatusCode::ACCEPTED => Ok(()),
            status => Err(EmailError::Rejected {
                status: status.as_u16(),
            }),
        }
    }
}
