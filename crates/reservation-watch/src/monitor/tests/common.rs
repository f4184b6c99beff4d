use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::checker::{Availability, AvailabilityChecker, CheckError};
use crate::domain::{MonitoringRequest, MonitoringRequestId, NewMonitoringRequest};
use crate::monitor::ReservationMonitor;
use crate::notifier::{EmailError, EmailGateway, OutboundEmail, ReservationNotifier};
use crate::store::{InMemoryMonitoringStore, MonitoringStore, StoreError};

pub(super) const SOURCE_URL: &str = "https://example.com/reservations.htm";

/// Checker answering from a per-month script.
#[derive(Default)]
pub(super) struct ScriptedChecker {
    dates: Mutex<HashMap<String, Vec<String>>>,
    failing: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedChecker {
    pub(super) fn with_dates(self, month: &str, dates: &[&str]) -> Self {
        self.set_dates(month, dates);
        self
    }

    pub(super) fn failing_for(self, month: &str) -> Self {
        self.failing
            .lock()
            .expect("checker mutex")
            .insert(month.to_string());
        self
    }

    pub(super) fn set_dates(&self, month: &str, dates: &[&str]) {
        self.dates.lock().expect("checker mutex").insert(
            month.to_string(),
            dates.iter().map(|date| date.to_string()).collect(),
        );
    }

    pub(super) fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("checker mutex").clone()
    }
}

#[async_trait]
impl AvailabilityChecker for ScriptedChecker {
    async fn check(&self, month: &str) -> Result<Availability, CheckError> {
        self.calls
            .lock()
            .expect("checker mutex")
            .push(month.to_string());

        if self.failing.lock().expect("checker mutex").contains(month) {
            return Err(CheckError::Unavailable(format!("scripted failure for {month}")));
        }

        Ok(match self.dates.lock().expect("checker mutex").get(month) {
            Some(dates) if !dates.is_empty() => Availability::Found(dates.clone()),
            _ => Availability::NotFound,
        })
    }
}

/// Gateway that records every message and can be switched to reject them.
#[derive(Default)]
pub(super) struct RecordingGateway {
    sent: Mutex<Vec<OutboundEmail>>,
    rejecting: AtomicBool,
}

impl RecordingGateway {
    pub(super) fn rejecting() -> Self {
        let gateway = Self::default();
        gateway.set_rejecting(true);
        gateway
    }

    pub(super) fn set_rejecting(&self, rejecting: bool) {
        self.rejecting.store(rejecting, Ordering::SeqCst);
    }

    pub(super) fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().expect("gateway mutex").clone()
    }
}

#[async_trait]
impl EmailGateway for RecordingGateway {
    async fn deliver(&self, email: &OutboundEmail) -> Result<(), EmailError> {
        if self.rejecting.load(Ordering::SeqCst) {
            return Err(EmailError::Rejected { status: 500 });
        }
        self.sent.lock().expect("gateway mutex").push(email.clone());
        Ok(())
    }
}

/// Store whose reads always fail.
#[derive(Default)]
pub(super) struct UnavailableStore;

#[async_trait]
impl MonitoringStore for UnavailableStore {
    async fn create(
        &self,
        _request: NewMonitoringRequest,
    ) -> Result<MonitoringRequest, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn list_all(&self) -> Result<Vec<MonitoringRequest>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn list_active(&self) -> Result<Vec<MonitoringRequest>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn deactivate(&self, _id: MonitoringRequestId) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

/// Store that reads and creates normally but refuses to deactivate.
#[derive(Default)]
pub(super) struct ReadOnlyStore {
    inner: InMemoryMonitoringStore,
}

impl ReadOnlyStore {
    pub(super) fn inner(&self) -> &InMemoryMonitoringStore {
        &self.inner
    }
}

#[async_trait]
impl MonitoringStore for ReadOnlyStore {
    async fn create(
        &self,
        request: NewMonitoringRequest,
    ) -> Result<MonitoringRequest, StoreError> {
        self.inner.create(request).await
    }

    async fn list_all(&self) -> Result<Vec<MonitoringRequest>, StoreError> {
        self.inner.list_all().await
    }

    async fn list_active(&self) -> Result<Vec<MonitoringRequest>, StoreError> {
        self.inner.list_active().await
    }

    async fn deactivate(&self, _id: MonitoringRequestId) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("read-only replica".to_string()))
    }
}

pub(super) type TestMonitor<S> = ReservationMonitor<S, ScriptedChecker, RecordingGateway>;

pub(super) fn monitor<S>(
    store: &Arc<S>,
    checker: &Arc<ScriptedChecker>,
    gateway: &Arc<RecordingGateway>,
) -> TestMonitor<S>
where
    S: MonitoringStore + 'static,
{
    ReservationMonitor::new(
        store.clone(),
        checker.clone(),
        ReservationNotifier::new(gateway.clone(), SOURCE_URL),
    )
}

pub(super) async fn seed(
    store: &InMemoryMonitoringStore,
    email: &str,
    month: &str,
) -> MonitoringRequest {
    store
        .create(NewMonitoringRequest::new(email, month).expect("valid request"))
        .await
        .expect("create succeeds")
}
