use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use reservation_watch::config::{AppEnvironment, Secret, SessionConfig, MAX_SESSION_TTL};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::views::Notice;

pub(crate) const SESSION_COOKIE: &str = "rw_session";
const ADMIN_SUBJECT: &str = "admin";

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    admin: bool,
    iat: i64,
    exp: i64,
}

/// Capability inserted into request extensions once the session cookie checks out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AdminSession {
    pub(crate) issued_at: DateTime<Utc>,
    pub(crate) expires_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum SessionError {
    #[error("session token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("session does not grant admin access")]
    NotAdmin,
}

/// Signs and verifies the HS256 admin session cookie.
pub(crate) struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
    secure: bool,
}

impl SessionKeys {
    pub(crate) fn new(config: &SessionConfig, environment: AppEnvironment) -> Self {
        let secret = config.secret.expose().as_bytes();
        let ttl = Duration::seconds(config.ttl.min(MAX_SESSION_TTL).as_secs() as i64);

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.sub = Some(ADMIN_SUBJECT.to_string());
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
            secure: environment.is_production(),
        }
    }

    pub(crate) fn issue(&self) -> Result<String, SessionError> {
        self.issue_at(Utc::now())
    }

    fn issue_at(&self, now: DateTime<Utc>) -> Result<String, SessionError> {
        let claims = Claims {
            sub: ADMIN_SUBJECT.to_string(),
            admin: true,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    pub(crate) fn verify(&self, token: &str) -> Result<AdminSession, SessionError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)?.claims;
        if !claims.admin {
            return Err(SessionError::NotAdmin);
        }

        Ok(AdminSession {
            issued_at: DateTime::from_timestamp(claims.iat, 0).unwrap_or_default(),
            expires_at: DateTime::from_timestamp(claims.exp, 0).unwrap_or_default(),
        })
    }

    pub(crate) fn cookie(&self, token: &str) -> String {
        let mut cookie = format!(
            "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.ttl.num_seconds()
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    pub(crate) fn clear_cookie(&self) -> String {
        let mut cookie = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Compares the submitted password without short-circuiting on the first
/// differing byte.
pub(crate) fn password_matches(candidate: &str, expected: &Secret) -> bool {
    let candidate = candidate.as_bytes();
    let expected = expected.expose().as_bytes();
    if expected.is_empty() {
        return false;
    }

    let mut diff = candidate.len() ^ expected.len();
    for (index, byte) in expected.iter().enumerate() {
        let other = candidate.get(index).copied().unwrap_or(0);
        diff |= usize::from(byte ^ other);
    }
    diff == 0
}

fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
        .find(|token| !token.is_empty())
}

/// Admits requests carrying a valid admin session, otherwise redirects to the
/// login page.
pub(crate) async fn require_admin(
    State(keys): State<Arc<SessionKeys>>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = match session_token(request.headers()).map(|token| keys.verify(token)) {
        Some(Ok(session)) => session,
        Some(Err(err)) => {
            debug!(error = %err, "rejected admin session");
            return Redirect::to(&Notice::LoginRequired.location("/admin-login")).into_response();
        }
        None => {
            return Redirect::to(&Notice::LoginRequired.location("/admin-login")).into_response();
        }
    };

    request.extensions_mut().insert(session);
    next.run(request).await
}
