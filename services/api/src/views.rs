use std::fmt::Write as _;

use reservation_watch::domain::{MonitoringRequestView, MONTHS};
use reservation_watch::markup::escape_html;

/// Flash message carried across redirects as `?notice=<code>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Notice {
    MissingFields,
    MonitoringStarted,
    AvailabilityFound,
    NotificationFailed,
    SubmitFailed,
    LoginRequired,
    InvalidPassword,
    LoggedIn,
    LoggedOut,
}

impl Notice {
    const ALL: [Notice; 9] = [
        Notice::MissingFields,
        Notice::MonitoringStarted,
        Notice::AvailabilityFound,
        Notice::NotificationFailed,
        Notice::SubmitFailed,
        Notice::LoginRequired,
        Notice::InvalidPassword,
        Notice::LoggedIn,
        Notice::LoggedOut,
    ];

    pub(crate) fn code(self) -> &'static str {
        match self {
            Notice::MissingFields => "missing_fields",
            Notice::MonitoringStarted => "monitoring_started",
            Notice::AvailabilityFound => "availability_found",
            Notice::NotificationFailed => "notification_failed",
            Notice::SubmitFailed => "submit_failed",
            Notice::LoginRequired => "login_required",
            Notice::InvalidPassword => "invalid_password",
            Notice::LoggedIn => "logged_in",
            Notice::LoggedOut => "logged_out",
        }
    }

    /// Unknown codes are ignored rather than echoed back into the page.
    pub(crate) fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|notice| notice.code() == code)
    }

    pub(crate) fn message(self) -> &'static str {
        match self {
            Notice::MissingFields => "Please provide both email and month",
            Notice::MonitoringStarted => {
                "Monitoring request has been set up! You will be notified when availability is detected."
            }
            Notice::AvailabilityFound => "Availability found! Check your email for details.",
            Notice::NotificationFailed => {
                "Availability found but failed to send email notification."
            }
            Notice::SubmitFailed => "An error occurred while setting up the monitoring request",
            Notice::LoginRequired => "Please login to access this page",
            Notice::InvalidPassword => "Invalid password",
            Notice::LoggedIn => "Successfully logged in",
            Notice::LoggedOut => "Successfully logged out",
        }
    }

    pub(crate) fn is_error(self) -> bool {
        matches!(
            self,
            Notice::MissingFields
                | Notice::NotificationFailed
                | Notice::SubmitFailed
                | Notice::LoginRequired
                | Notice::InvalidPassword
        )
    }

    /// Path with this notice attached, for redirects.
    pub(crate) fn location(self, path: &str) -> String {
        format!("{path}?notice={}", self.code())
    }
}

pub(crate) fn index_page(notice: Option<Notice>) -> String {
    let mut body = String::new();
    body.push_str("<h1>Yosemite Entry Reservation Monitor</h1>\n");
    body.push_str(
        "<p>Get an email as soon as the park announces entry reservation dates for the month you plan to visit.</p>\n",
    );
    body.push_str("<form method=\"post\" action=\"/monitor\">\n");
    body.push_str(
        "<label for=\"email\">Email</label>\n<input type=\"email\" id=\"email\" name=\"email\" maxlength=\"120\" required>\n",
    );
    body.push_str("<label for=\"month\">Month</label>\n<select id=\"month\" name=\"month\" required>\n");
    body.push_str("<option value=\"\">Select a month</option>\n");
    for month in MONTHS {
        writeln!(body, "<option value=\"{month}\">{month}</option>").expect("write month option");
    }
    body.push_str("</select>\n<button type=\"submit\">Start monitoring</button>\n</form>\n");
    body.push_str("<p class=\"admin-link\"><a href=\"/admin-login\">Admin</a></p>\n");

    layout("Yosemite Reservation Monitor", notice, &body)
}

pub(crate) fn login_page(notice: Option<Notice>) -> String {
    let body = "<h1>Admin Login</h1>\n\
        <form method=\"post\" action=\"/admin-login\">\n\
        <label for=\"password\">Password</label>\n\
        <input type=\"password\" id=\"password\" name=\"password\" required>\n\
        <button type=\"submit\">Log in</button>\n\
        </form>\n";

    layout("Admin Login", notice, body)
}

pub(crate) fn dashboard_page(requests: &[MonitoringRequestView], notice: Option<Notice>) -> String {
    let mut body = String::new();
    body.push_str("<h1>Monitoring Requests</h1>\n");
    body.push_str("<p><a href=\"/admin-logout\">Log out</a></p>\n");

    if requests.is_empty() {
        body.push_str("<p class=\"empty\">No monitoring requests yet.</p>\n");
        return layout("Dashboard", notice, &body);
    }

    body.push_str(
        "<table>\n<thead><tr><th>ID</th><th>Email</th><th>Month</th><th>Status</th><th>Created</th></tr></thead>\n<tbody>\n",
    );
    for request in requests {
        let status = if request.active { "Active" } else { "Notified" };
        writeln!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{status}</td><td>{}</td></tr>",
            request.id,
            escape_html(&request.masked_email),
            escape_html(&request.month),
            request.created_at.format("%Y-%m-%d %H:%M UTC"),
        )
        .expect("write request row");
    }
    body.push_str("</tbody>\n</table>\n");

    layout("Dashboard", notice, &body)
}

fn layout(title: &str, notice: Option<Notice>, body: &str) -> String {
    let mut html = String::new();
    writeln!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n<title>{}</title>\n</head>\n<body>\n<main>",
        escape_html(title)
    )
    .expect("write head");

    if let Some(notice) = notice {
        let class = if notice.is_error() { "error" } else { "success" };
        writeln!(
            html,
            "<div class=\"notice notice-{class}\" role=\"status\">{}</div>",
            escape_html(notice.message())
        )
        .expect("write notice");
    }

    html.push_str(body);
    html.push_str("</main>\n</body>\n</html>\n");
    html
}
