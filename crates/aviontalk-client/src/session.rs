use std::sync::{Arc, RwLock};

use reqwest::header::HeaderMap;
use tracing::debug;

use aviontalk_types::models::User;

pub const ACCESS_TOKEN: &str = "access-token";
pub const CLIENT: &str = "client";
pub const EXPIRY: &str = "expiry";
pub const UID: &str = "uid";

/// The four-field capability bundle returned by a successful sign-in or
/// registration. All four values must be replayed together on every
/// authenticated call; a missing field means "not authenticated".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthHeaders {
    pub access_token: String,
    pub client: String,
    pub expiry: String,
    pub uid: String,
}

impl AuthHeaders {
    /// Extract the bundle from an auth response. Returns `None` unless all
    /// four headers are present.
    pub fn from_response(headers: &HeaderMap) -> Option<Self> {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Some(Self {
            access_token: get(ACCESS_TOKEN)?,
            client: get(CLIENT)?,
            expiry: get(EXPIRY)?,
            uid: get(UID)?,
        })
    }

    /// Attach the bundle verbatim to an outgoing request.
    pub fn apply(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header(ACCESS_TOKEN, &self.access_token)
            .header(CLIENT, &self.client)
            .header(EXPIRY, &self.expiry)
            .header(UID, &self.uid)
    }
}

/// The authenticated identity: the user record returned by the auth call
/// plus the capability bundle. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: User,
    pub headers: AuthHeaders,
}

/// Process-wide session holder. Read by every screen; written only by the
/// login and logout flows.
#[derive(Default)]
pub struct SessionStore {
    current: RwLock<Option<Arc<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current session. Only the login/register flow calls this.
    pub fn set_session(&self, user: User, headers: AuthHeaders) {
        debug!(uid = %headers.uid, "session established");
        let session = Arc::new(Session { user, headers });
        *self.current.write().expect("session lock poisoned") = Some(session);
    }

    /// Drop the current session. Only the logout flow (including forced
    /// re-authentication after a 401) calls this.
    pub fn clear(&self) {
        debug!("session cleared");
        *self.current.write().expect("session lock poisoned") = None;
    }

    pub fn current(&self) -> Option<Arc<Session>> {
        self.current.read().expect("session lock poisoned").clone()
    }

    /// The capability bundle for the current session, or `None` when logged
    /// out. Callers must not issue protected calls in the `None` state.
    pub fn auth_headers(&self) -> Option<AuthHeaders> {
        self.current().map(|s| s.headers.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }
}
