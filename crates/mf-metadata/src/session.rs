//! Session store.
//!
//! Holds the login host, API version and the active session. The endpoint
//! and header for a call are derived from this state at call time, so a
//! mutation is visible to the very next call.

use metaforce_client::CallContext;

use crate::endpoint;
use crate::error::{Error, Result};
use crate::types::{ApiVersion, DEFAULT_LOGIN_URL};

/// An authenticated session: access token plus the server URL it is valid for.
///
/// Both values are always set together. The token is redacted in Debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    access_token: String,
    server_url: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"[REDACTED]")
            .field("server_url", &self.server_url)
            .finish()
    }
}

impl Session {
    pub fn new(access_token: impl Into<String>, server_url: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            server_url: server_url.into(),
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }
}

/// What a successful `login` returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResult {
    /// The installed session; its server URL is the metadata server URL.
    pub session: Session,
    /// Partner API server URL.
    pub server_url: String,
    pub user_id: Option<String>,
    pub organization_id: Option<String>,
    pub password_expired: bool,
    pub sandbox: bool,
}

impl LoginResult {
    /// Move both server URLs to another API version.
    pub(crate) fn set_api_version(&mut self, api_version: &ApiVersion) {
        self.session.server_url = endpoint::with_version(&self.session.server_url, api_version);
        self.server_url = endpoint::with_version(&self.server_url, api_version);
    }
}

/// Mutable connection state of a client.
#[derive(Debug, Clone)]
pub(crate) struct SessionStore {
    login_url: String,
    api_version: ApiVersion,
    session: Option<Session>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self {
            login_url: DEFAULT_LOGIN_URL.to_string(),
            api_version: ApiVersion::default(),
            session: None,
        }
    }
}

impl SessionStore {
    pub(crate) fn login_url(&self) -> &str {
        &self.login_url
    }

    pub(crate) fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }

    pub(crate) fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Partner endpoint on the login host.
    pub(crate) fn login_endpoint(&self) -> String {
        endpoint::resolve(&self.login_url, &self.api_version)
    }

    /// Endpoint for the next authenticated call.
    pub(crate) fn endpoint(&self) -> String {
        match &self.session {
            Some(session) => session.server_url.clone(),
            None => self.login_endpoint(),
        }
    }

    /// Endpoint and header for the next call.
    pub(crate) fn context(&self) -> CallContext {
        match &self.session {
            Some(session) => {
                CallContext::new(session.server_url.clone()).with_session(&session.access_token)
            }
            None => CallContext::new(self.login_endpoint()),
        }
    }

    /// Install token and server URL as one unit.
    pub(crate) fn install(&mut self, session: Session) {
        self.session = Some(session);
    }

    /// Replace only the token. Without a session the token is bound to the
    /// current login endpoint.
    pub(crate) fn set_access_token(&mut self, access_token: String) {
        let server_url = self.endpoint();
        self.session = Some(Session::new(access_token, server_url));
    }

    pub(crate) fn set_api_version(&mut self, version: &str) -> Result<()> {
        let api_version = ApiVersion::parse(version)?;
        if let Some(session) = &mut self.session {
            session.server_url = endpoint::with_version(&session.server_url, &api_version);
        }
        self.api_version = api_version;
        Ok(())
    }

    pub(crate) fn set_login_url(&mut self, host: &str) -> Result<()> {
        if host.trim().is_empty() {
            return Err(Error::validation("setLoginUrl", "login host must not be empty"));
        }
        self.login_url = host.trim().to_string();
        Ok(())
    }

    pub(crate) fn clear(&mut self) {
        self.session = None;
    }
}
