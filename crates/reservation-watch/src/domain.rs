use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::masking::mask_email;

/// Month names offered by the subscription form.
pub const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Store-assigned identifier of a monitoring request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonitoringRequestId(pub i64);

impl fmt::Display for MonitoringRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored intent to be emailed once reservation dates for `month` are posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoringRequest {
    pub id: MonitoringRequestId,
    pub email: String,
    pub month: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl MonitoringRequest {
    pub fn masked_email(&self) -> String {
        mask_email(&self.email)
    }

    /// Projection used by the admin dashboard; the stored record is untouched.
    pub fn view(&self) -> MonitoringRequestView {
        MonitoringRequestView {
            id: self.id,
            masked_email: self.masked_email(),
            month: self.month.clone(),
            active: self.active,
            created_at: self.created_at,
        }
    }
}

/// Validated input for creating a monitoring request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMonitoringRequest {
    email: String,
    month: String,
}

impl NewMonitoringRequest {
    pub fn new(email: impl AsRef<str>, month: impl AsRef<str>) -> Result<Self, DomainError> {
        let email = email.as_ref().trim();
        let month = month.as_ref().trim();

        if email.is_empty() {
            return Err(DomainError::MissingEmail);
        }
        if month.is_empty() {
            return Err(DomainError::MissingMonth);
        }

        Ok(Self {
            email: email.to_string(),
            month: month.to_string(),
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn month(&self) -> &str {
        &self.month
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("an email address is required")]
    MissingEmail,
    #[error("a month is required")]
    MissingMonth,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonitoringRequestView {
    pub id: MonitoringRequestId,
    pub masked_email: String,
    pub month: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn new_request_trims_and_requires_both_fields() {
        let request = NewMonitoringRequest::new("  jo@example.com ", " February ")
            .expect("valid request");
        assert_eq!(request.email(), "jo@example.com");
        assert_eq!(request.month(), "February");

        assert_eq!(
            NewMonitoringRequest::new("", "February"),
            Err(DomainError::MissingEmail)
        );
        assert_eq!(
            NewMonitoringRequest::new("jo@example.com", "   "),
            Err(DomainError::MissingMonth)
        );
    }

    #[test]
    fn view_masks_email_without_touching_record() {
        let record = MonitoringRequest {
            id: MonitoringRequestId(7),
            email: "abcdef@example.com".to_string(),
            month: "July".to_string(),
            active: true,
            created_at: Utc.with_ymd_and_hms(2025, 1, 5, 8, 30, 0).unwrap(),
        };

        let view = record.view();
        assert_eq!(view.masked_email, "ab****@example.com");
        assert_eq!(view.id, MonitoringRequestId(7));
        assert_eq!(record.email, "abcdef@example.com");
    }
}
