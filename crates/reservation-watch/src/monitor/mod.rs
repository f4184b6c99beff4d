//! Poll loop tying the store, the availability checker, and the notifier
//! together.

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::checker::{Availability, AvailabilityChecker, CheckError};
use crate::domain::{MonitoringRequest, NewMonitoringRequest};
use crate::notifier::{EmailGateway, ReservationNotifier};
use crate::store::{MonitoringStore, StoreError};

const MIN_POLL_PERIOD: Duration = Duration::from_secs(1);

/// Result of evaluating one monitoring request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The record was already inactive.
    Skipped,
    NoMatch,
    /// The subscriber was emailed and the record deactivated.
    Notified { dates: Vec<String> },
    /// Dates were found but the email was not accepted; the record stays active.
    NotificationFailed { dates: Vec<String> },
}

/// Counters for one tick of the poll loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    pub examined: usize,
    pub notified: usize,
    pub notification_failures: usize,
    pub no_match: usize,
    pub failed: usize,
}

/// Result of registering a new monitoring request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Monitoring(MonitoringRequest),
    Notified {
        request: MonitoringRequest,
        dates: Vec<String>,
    },
    NotificationFailed {
        request: MonitoringRequest,
        dates: Vec<String>,
    },
}

impl SubmitOutcome {
    pub fn request(&self) -> &MonitoringRequest {
        match self {
            Self::Monitoring(request)
            | Self::Notified { request, .. }
            | Self::NotificationFailed { request, .. } => request,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Check(#[from] CheckError),
}

pub struct ReservationMonitor<S, C, G> {
    store: Arc<S>,
    checker: Arc<C>,
    notifier: ReservationNotifier<G>,
}

impl<S, C, G> ReservationMonitor<S, C, G>
where
    S: MonitoringStore + 'static,
    C: AvailabilityChecker + 'static,
    G: EmailGateway + 'static,
{
    pub fn new(store: Arc<S>, checker: Arc<C>, notifier: ReservationNotifier<G>) -> Self {
        Self {
            store,
            checker,
            notifier,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Checks one record and, on a match, emails the subscriber. The record is
    /// deactivated only after the provider accepts the email.
    pub async fn check_request(
        &self,
        request: &MonitoringRequest,
    ) -> Result<CheckOutcome, MonitorError> {
        if !request.active {
            return Ok(CheckOutcome::Skipped);
        }

        let dates = match self.checker.check(&request.month).await? {
            Availability::Found(dates) => dates,
            Availability::NotFound => return Ok(CheckOutcome::NoMatch),
        };

        if !self
            .notifier
            .notify(&request.email, &request.month, &dates)
            .await
        {
            warn!(
                request_id = %request.id,
                recipient = %request.masked_email(),
                month = %request.month,
                "reservation dates found but notification failed, will retry next poll"
            );
            return Ok(CheckOutcome::NotificationFailed { dates });
        }

        self.store.deactivate(request.id).await?;
        info!(
            request_id = %request.id,
            recipient = %request.masked_email(),
            month = %request.month,
            "notification sent, monitoring request deactivated"
        );
        Ok(CheckOutcome::Notified { dates })
    }

    /// Runs one tick: every active record is checked in id order. Failures are
    /// logged and counted without interrupting the remaining records.
    pub async fn poll_once(&self) -> PollSummary {
        let mut summary = PollSummary::default();

        let requests = match self.store.list_active().await {
            Ok(requests) => requests,
            Err(err) => {
                error!(error = %err, "failed to load active monitoring requests");
                return summary;
            }
        };
        info!(count = requests.len(), "checking active monitoring requests");

        for request in &requests {
            summary.examined += 1;
            match self.check_request(request).await {
                Ok(CheckOutcome::Skipped) => {}
                Ok(CheckOutcome::NoMatch) => summary.no_match += 1,
                Ok(CheckOutcome::Notified { .. }) => summary.notified += 1,
                Ok(CheckOutcome::NotificationFailed { .. }) => {
                    summary.notification_failures += 1
                }
                Err(err) => {
                    summary.failed += 1;
                    error!(
                        request_id = %request.id,
                        recipient = %request.masked_email(),
                        error = %err,
                        "error processing monitoring request"
                    );
                }
            }
        }

        summary
    }

    /// Polls forever, one tick per `period`. The first tick fires one period
    /// after the call, and a slow tick delays the next one instead of bursting.
    pub async fn run(&self, period: Duration) {
        let period = period.max(MIN_POLL_PERIOD);
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval_secs = period.as_secs(), "reservation poll loop started");

        loop {
            ticker.tick().await;
            let summary = self.poll_once().await;
            info!(
                examined = summary.examined,
                notified = summary.notified,
                notification_failures = summary.notification_failures,
                no_match = summary.no_match,
                failed = summary.failed,
                "reservation poll finished"
            );
        }
    }

    pub fn spawn(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(period).await })
    }

    /// Persists a new request, then checks it immediately so subscribers hear
    /// about already-posted dates without waiting for the next tick.
    ///
    /// Checker failures leave the request to the poll loop; store failures
    /// during the immediate check are returned.
    pub async fn submit(
        &self,
        request: NewMonitoringRequest,
    ) -> Result<SubmitOutcome, MonitorError> {
        let mut record = self.store.create(request).await?;
        info!(
            request_id = %record.id,
            recipient = %record.masked_email(),
            month = %record.month,
            "monitoring request created"
        );

        match self.check_request(&record).await {
            Ok(CheckOutcome::Notified { dates }) => {
                record.active = false;
                Ok(SubmitOutcome::Notified {
                    request: record,
                    dates,
                })
            }
            Ok(CheckOutcome::NotificationFailed { dates }) => {
                Ok(SubmitOutcome::NotificationFailed {
                    request: record,
                    dates,
                })
            }
            Ok(CheckOutcome::NoMatch | CheckOutcome::Skipped) => {
                Ok(SubmitOutcome::Monitoring(record))
            }
            Err(MonitorError::Check(err)) => {
                warn!(
                    request_id = %record.id,
                    error = %err,
                    "initial availability check failed, leaving request for the poll loop"
                );
                Ok(SubmitOutcome::Monitoring(record))
            }
            // The email may already be out; the caller must not report success.
            Err(err @ MonitorError::Store(_)) => {
                error!(
                    request_id = %record.id,
                    recipient = %record.masked_email(),
                    error = %err,
                    "failed to record the outcome of the initial check"
                );
                Err(err)
            }
        }
    }
}
