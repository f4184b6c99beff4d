use crate::cli::ServeArgs;
use crate::infra::{build_monitor, AppState, WebState};
use crate::routes::web_router;
use crate::session::SessionKeys;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use reservation_watch::config::AppConfig;
use reservation_watch::error::AppError;
use reservation_watch::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let monitor = Arc::new(build_monitor(&config).await?);
    let sessions = Arc::new(SessionKeys::new(&config.session, config.environment));

    // Exactly one poll task per process; it lives until exit.
    monitor.clone().spawn(config.monitor.poll_interval);

    let state = WebState::new(monitor, sessions, config.session.admin_password.clone());
    let app = web_router(state)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        poll_interval_secs = config.monitor.poll_interval.as_secs(),
        "reservation watch ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
