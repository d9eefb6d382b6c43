//! Server-side sessions keyed by an opaque cookie token.
//!
//! A session carries the signed-in customer id (if any) and a queue of flash
//! notices that the next GET view drains. Reads never create a session: one
//! is stored, and its cookie sent, only when a response signs in, signs out
//! or flashes a notice. Sessions idle for longer than the configured TTL are
//! pruned on those writes.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use chrono::{DateTime, Duration, Utc};
use common::CustomerId;
use domain::DomainError;
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "sid";

/// Opaque session identifier carried in the cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionToken(Uuid);

impl SessionToken {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value.trim()).ok().map(Self)
    }

    /// Extracts the token from a `Cookie` header, if present and well formed.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .and_then(|(_, value)| Self::parse(value))
    }

    fn cookie(&self) -> String {
        format!("{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax", self.0)
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Danger,
}

/// A one-shot message shown on the next rendered view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Danger,
            message: message.into(),
        }
    }
}

/// A change to the caller's sign-in state, applied by [`middleware`] after
/// the handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionChange {
    SignIn(CustomerId),
    SignOut,
}

/// A `303 See Other` redirect that queues a notice in the caller's session.
///
/// The notice, and any [`SessionChange`], travel as response extensions and
/// are written to the session by [`middleware`].
#[derive(Debug)]
pub struct Flash {
    notice: Notice,
    to: String,
    change: Option<SessionChange>,
}

impl Flash {
    pub fn new(notice: Notice, to: impl Into<String>) -> Self {
        Self {
            notice,
            to: to.into(),
            change: None,
        }
    }

    pub fn success(message: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(Notice::success(message), to)
    }

    pub fn info(message: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(Notice::info(message), to)
    }

    pub fn danger(message: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(Notice::danger(message), to)
    }

    /// Signs `customer_id` in under a freshly issued token.
    pub fn sign_in(mut self, customer_id: CustomerId) -> Self {
        self.change = Some(SessionChange::SignIn(customer_id));
        self
    }

    pub fn sign_out(mut self) -> Self {
        self.change = Some(SessionChange::SignOut);
        self
    }
}

impl IntoResponse for Flash {
    fn into_response(self) -> Response {
        let mut response = Redirect::to(&self.to).into_response();
        response.extensions_mut().insert(self.notice);
        if let Some(change) = self.change {
            response.extensions_mut().insert(change);
        }
        response
    }
}

#[derive(Debug)]
struct SessionData {
    customer_id: Option<CustomerId>,
    notices: Vec<Notice>,
    last_seen: DateTime<Utc>,
}

impl SessionData {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            customer_id: None,
            notices: Vec::new(),
            last_seen: now,
        }
    }
}

/// In-process session table.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionToken, SessionData>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Looks up the live session for `token`.
    ///
    /// A request without a cookie is anonymous and touches no shared state.
    /// An unknown or expired token is treated the same way.
    pub async fn resolve(&self, token: Option<SessionToken>) -> SessionContext {
        self.resolve_at(token, Utc::now()).await
    }

    async fn resolve_at(&self, token: Option<SessionToken>, now: DateTime<Utc>) -> SessionContext {
        let Some(token) = token else {
            return SessionContext::anonymous(self.clone());
        };

        let mut sessions = self.sessions.write().await;
        let Some(data) = sessions.get_mut(&token) else {
            return SessionContext::anonymous(self.clone());
        };
        if now - data.last_seen >= self.ttl {
            sessions.remove(&token);
            tracing::debug!(%token, "session expired");
            return SessionContext::anonymous(self.clone());
        }

        data.last_seen = now;
        SessionContext {
            token: Some(token),
            customer_id: data.customer_id,
            store: self.clone(),
        }
    }

    /// Applies a sign-in change and a queued notice to the caller's session.
    ///
    /// Returns the token whose cookie must be sent: a new session, or any
    /// sign-in, issues a fresh token and drops the previous one.
    pub async fn write(
        &self,
        current: Option<SessionToken>,
        change: Option<SessionChange>,
        notice: Option<Notice>,
    ) -> Option<SessionToken> {
        self.write_at(current, change, notice, Utc::now()).await
    }

    async fn write_at(
        &self,
        current: Option<SessionToken>,
        change: Option<SessionChange>,
        notice: Option<Notice>,
        now: DateTime<Utc>,
    ) -> Option<SessionToken> {
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, data| now - data.last_seen < self.ttl);

        let existing = current.and_then(|token| sessions.remove(&token).map(|data| (token, data)));
        let (mut token, mut data, mut issued) = match existing {
            Some((token, data)) => (token, data, false),
            None => (SessionToken::generate(), SessionData::new(now), true),
        };

        match change {
            Some(SessionChange::SignIn(customer_id)) => {
                data.customer_id = Some(customer_id);
                token = SessionToken::generate();
                issued = true;
            }
            Some(SessionChange::SignOut) => data.customer_id = None,
            None => {}
        }
        data.notices.extend(notice);
        data.last_seen = now;
        sessions.insert(token, data);

        if !issued {
            return None;
        }
        tracing::debug!(%token, "session token issued");
        metrics::counter!("sessions_started_total").increment(1);
        Some(token)
    }

    async fn take_notices(&self, token: SessionToken) -> Vec<Notice> {
        self.sessions
            .write()
            .await
            .get_mut(&token)
            .map(|data| std::mem::take(&mut data.notices))
            .unwrap_or_default()
    }

    /// Number of stored sessions.
    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// The caller's session, resolved once per request by [`middleware`].
///
/// Handlers receive it through `Extension<SessionContext>`.
#[derive(Clone)]
pub struct SessionContext {
    token: Option<SessionToken>,
    customer_id: Option<CustomerId>,
    store: SessionStore,
}

impl SessionContext {
    fn anonymous(store: SessionStore) -> Self {
        Self {
            token: None,
            customer_id: None,
            store,
        }
    }

    /// The token of the stored session, if the request carried one.
    pub fn token(&self) -> Option<SessionToken> {
        self.token
    }

    /// The customer signed in when the request arrived.
    pub fn customer_id(&self) -> Option<CustomerId> {
        self.customer_id
    }

    pub fn require_customer(&self) -> Result<CustomerId, DomainError> {
        self.customer_id.ok_or(DomainError::AuthRequired)
    }

    /// Drains the queued notices.
    pub async fn take_notices(&self) -> Vec<Notice> {
        match self.token {
            Some(token) => self.store.take_notices(token).await,
            None => Vec::new(),
        }
    }
}

/// Resolves the session cookie, exposes the session to handlers, and
/// writes any flashed notice or sign-in change back to the session.
pub async fn middleware(
    State(sessions): State<SessionStore>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = SessionToken::from_headers(request.headers());
    let session = sessions.resolve(token).await;
    let current = session.token();
    request.extensions_mut().insert(session);

    let mut response = next.run(request).await;

    let change = response.extensions_mut().remove::<SessionChange>();
    let notice = response.extensions_mut().remove::<Notice>();
    if change.is_none() && notice.is_none() {
        return response;
    }

    if let Some(issued) = sessions.write(current, change, notice).await {
        match HeaderValue::from_str(&issued.cookie()) {
            Ok(cookie) => {
                response.headers_mut().append(header::SET_COOKIE, cookie);
            }
            Err(e) => tracing::error!(error = %e, "failed to encode session cookie"),
        }
    }

    response
}
