use crate::infra::{AppState, WebState};
use crate::session::{password_matches, require_admin, AdminSession};
use crate::views::{self, Notice};
use axum::extract::{Query, Request, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Extension, Form, Json, Router};
use reservation_watch::checker::AvailabilityChecker;
use reservation_watch::domain::NewMonitoringRequest;
use reservation_watch::error::AppError;
use reservation_watch::monitor::SubmitOutcome;
use reservation_watch::notifier::EmailGateway;
use reservation_watch::store::MonitoringStore;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct NoticeQuery {
    #[serde(default)]
    notice: Option<String>,
}

impl NoticeQuery {
    fn notice(&self) -> Option<Notice> {
        self.notice.as_deref().and_then(Notice::from_code)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MonitorForm {
    #[serde(default)]
    email: String,
    #[serde(default)]
    month: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginForm {
    #[serde(default)]
    password: String,
}

/// Subscriber form, admin pages, and operational endpoints.
///
/// Operational handlers expect an [`AppState`] extension layered on by the caller.
pub(crate) fn web_router<S, C, G>(state: WebState<S, C, G>) -> Router
where
    S: MonitoringStore + 'static,
    C: AvailabilityChecker + 'static,
    G: EmailGateway + 'static,
{
    let admin = Router::new()
        .route("/dashboard", get(dashboard::<S, C, G>))
        .route_layer(middleware::from_fn_with_state(
            state.sessions.clone(),
            require_admin,
        ));

    Router::new()
        .route("/", get(index))
        .route("/monitor", post(submit_monitor::<S, C, G>))
        .route("/admin-login", get(login_page).post(login::<S, C, G>))
        .route("/admin-logout", get(logout::<S, C, G>))
        .merge(admin)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .layer(middleware::from_fn(security_headers))
}

pub(crate) async fn index(Query(query): Query<NoticeQuery>) -> Html<String> {
    Html(views::index_page(query.notice()))
}

pub(crate) async fn submit_monitor<S, C, G>(
    State(state): State<WebState<S, C, G>>,
    Form(form): Form<MonitorForm>,
) -> Redirect
where
    S: MonitoringStore + 'static,
    C: AvailabilityChecker + 'static,
    G: EmailGateway + 'static,
{
    let Ok(request) = NewMonitoringRequest::new(&form.email, &form.month) else {
        return Redirect::to(&Notice::MissingFields.location("/"));
    };

    let notice = match state.monitor.submit(request).await {
        Ok(SubmitOutcome::Monitoring(_)) => Notice::MonitoringStarted,
        Ok(SubmitOutcome::Notified { .. }) => Notice::AvailabilityFound,
        Ok(SubmitOutcome::NotificationFailed { .. }) => Notice::NotificationFailed,
        Err(err) => {
            error!(error = %err, "failed to create monitoring request");
            Notice::SubmitFailed
        }
    };

    Redirect::to(&notice.location("/"))
}

pub(crate) async fn login_page(Query(query): Query<NoticeQuery>) -> Html<String> {
    Html(views::login_page(query.notice()))
}

pub(crate) async fn login<S, C, G>(
    State(state): State<WebState<S, C, G>>,
    Form(form): Form<LoginForm>,
) -> Response
where
    S: MonitoringStore + 'static,
    C: AvailabilityChecker + 'static,
    G: EmailGateway + 'static,
{
    if !password_matches(&form.password, &state.admin_password) {
        warn!("rejected admin login attempt");
        return (
            StatusCode::UNAUTHORIZED,
            Html(views::login_page(Some(Notice::InvalidPassword))),
        )
            .into_response();
    }

    match state.sessions.issue() {
        Ok(token) => {
            info!("admin logged in");
            (
                [(header::SET_COOKIE, state.sessions.cookie(&token))],
                Redirect::to(&Notice::LoggedIn.location("/dashboard")),
            )
                .into_response()
        }
        Err(err) => {
            error!(error = %err, "failed to issue admin session");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub(crate) async fn logout<S, C, G>(State(state): State<WebState<S, C, G>>) -> Response
where
    S: MonitoringStore + 'static,
    C: AvailabilityChecker + 'static,
    G: EmailGateway + 'static,
{
    (
        [(header::SET_COOKIE, state.sessions.clear_cookie())],
        Redirect::to(&Notice::LoggedOut.location("/")),
    )
        .into_response()
}

pub(crate) async fn dashboard<S, C, G>(
    State(state): State<WebState<S, C, G>>,
    Extension(_session): Extension<AdminSession>,
    Query(query): Query<NoticeQuery>,
) -> Result<Html<String>, AppError>
where
    S: MonitoringStore + 'static,
    C: AvailabilityChecker + 'static,
    G: EmailGateway + 'static,
{
    let requests = state.monitor.store().list_all().await?;
    let rows: Vec<_> = requests.iter().map(|request| request.view()).collect();
    Ok(Html(views::dashboard_page(&rows, query.notice())))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN"));
    headers.insert(header::X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block"));
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );
    response
}
