//! Availability checker: fetches the park's reservation page and looks for
//! date ranges in a subscriber's month.

mod extract;
mod patterns;

pub use extract::extract_main_text;
pub use patterns::{extract_reservation_dates, RESERVATION_KEYWORDS};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, error, info};

use crate::config::SourceConfig;

const USER_AGENT: &str = concat!("reservation-watch/", env!("CARGO_PKG_VERSION"));
const CONTENT_PREVIEW_CHARS: usize = 500;

/// Result of scanning the reservation page for one month.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Availability {
    #[default]
    NotFound,
    /// Non-empty, deduplicated date ranges in first-seen order.
    Found(Vec<String>),
}

impl Availability {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn dates(&self) -> &[String] {
        match self {
            Self::Found(dates) => dates,
            Self::NotFound => &[],
        }
    }
}

/// Seam between the monitor and whatever answers "are there dates for this month?".
#[async_trait]
pub trait AvailabilityChecker: Send + Sync {
    async fn check(&self, month: &str) -> Result<Availability, CheckError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("failed to fetch reservation page: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("reservation page responded with status {0}")]
    Status(StatusCode),
    #[error("no readable content on reservation page")]
    EmptyContent,
    #[error("checker unavailable: {0}")]
    Unavailable(String),
}

/// Checker backed by a live HTTP fetch of the reservation page.
///
/// Fetch and extraction failures are logged and reported as
/// [`Availability::NotFound`], so `check` never returns an error.
#[derive(Debug, Clone)]
pub struct ParkPageChecker {
    client: Client,
    page_url: String,
}

impl ParkPageChecker {
    pub fn new(config: &SourceConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = config.fetch_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(builder.build()?, config.page_url.clone()))
    }

    pub fn with_client(client: Client, page_url: impl Into<String>) -> Self {
        Self {
            client,
            page_url: page_url.into(),
        }
    }

    pub fn page_url(&self) -> &str {
        &self.page_url
    }

    /// Downloads the page and returns its readable text.
    pub async fn fetch_content(&self) -> Result<String, CheckError> {
        let response = self.client.get(&self.page_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CheckError::Status(status));
        }

        let html = response.text().await?;
        extract_main_text(&html).ok_or(CheckError::EmptyContent)
    }
}

#[async_trait]
impl AvailabilityChecker for ParkPageChecker {
    async fn check(&self, month: &str) -> Result<Availability, CheckError> {
        info!(month, "checking entry reservation requirements");

        let content = match self.fetch_content().await {
            Ok(content) => content,
            Err(err) => {
                error!(
                    month,
                    url = %self.page_url,
                    error = %err,
                    "failed to fetch content from reservation page"
                );
                return Ok(Availability::NotFound);
            }
        };

        debug!(
            preview = %content.chars().take(CONTENT_PREVIEW_CHARS).collect::<String>(),
            "retrieved reservation page content"
        );

        Ok(extract_reservation_dates(&content, month))
    }
}
