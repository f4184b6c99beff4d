use metrics_exporter_prometheus::PrometheusHandle;
use reservation_watch::checker::{AvailabilityChecker, ParkPageChecker};
use reservation_watch::config::{AppConfig, Secret};
use reservation_watch::error::AppError;
use reservation_watch::monitor::ReservationMonitor;
use reservation_watch::notifier::{EmailGateway, ReservationNotifier, SendGridGateway};
use reservation_watch::store::{MonitoringStore, PgMonitoringStore};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::session::SessionKeys;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type LiveMonitor = ReservationMonitor<PgMonitoringStore, ParkPageChecker, SendGridGateway>;

/// Router state shared by the subscriber and admin pages.
pub(crate) struct WebState<S, C, G> {
    pub(crate) monitor: Arc<ReservationMonitor<S, C, G>>,
    pub(crate) sessions: Arc<SessionKeys>,
    pub(crate) admin_password: Secret,
}

// Manual impl: the collaborators sit behind `Arc` and need not be `Clone`.
impl<S, C, G> Clone for WebState<S, C, G> {
    fn clone(&self) -> Self {
        Self {
            monitor: self.monitor.clone(),
            sessions: self.sessions.clone(),
            admin_password: self.admin_password.clone(),
        }
    }
}

impl<S, C, G> WebState<S, C, G>
where
    S: MonitoringStore + 'static,
    C: AvailabilityChecker + 'static,
    G: EmailGateway + 'static,
{
    pub(crate) fn new(
        monitor: Arc<ReservationMonitor<S, C, G>>,
        sessions: Arc<SessionKeys>,
        admin_password: Secret,
    ) -> Self {
        Self {
            monitor,
            sessions,
            admin_password,
        }
    }
}

/// Connects Postgres, ensures the schema, and wires the live checker and
/// SendGrid gateway into a monitor.
pub(crate) async fn build_monitor(config: &AppConfig) -> Result<LiveMonitor, AppError> {
    let store = PgMonitoringStore::connect(
        config.database.url.expose(),
        config.database.max_connections,
    )
    .await?;
    store.migrate().await?;

    let checker = ParkPageChecker::new(&config.source)?;
    let gateway = SendGridGateway::new(&config.email)?;
    let notifier = ReservationNotifier::new(Arc::new(gateway), checker.page_url());

    Ok(ReservationMonitor::new(
        Arc::new(store),
        Arc::new(checker),
        notifier,
    ))
}
