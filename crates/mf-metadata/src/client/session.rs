use metaforce_client::{xml, CallContext, SoapCall, Transport};
use tracing::{info, instrument, warn};

use crate::endpoint;
use crate::error::{Error, ErrorKind, Result};
use crate::session::{LoginResult, Session};

use super::{parse, MetadataClient};

impl<T: Transport> MetadataClient<T> {
    /// Log in with username and password (password plus security token where
    /// the org requires one).
    ///
    /// On success the returned session is installed as one unit and every
    /// later call targets its metadata server URL. On failure the previous
    /// session, if any, is left untouched.
    #[instrument(skip(self, password), fields(login_url = %self.session.login_url()))]
    pub async fn login(&mut self, username: &str, password: &str) -> Result<LoginResult> {
        if username.trim().is_empty() {
            return Err(Error::validation("login", "username is required"));
        }

        let context = CallContext::new(self.session.login_endpoint());
        let body = format!(
            "<username>{}</username><password>{}</password>",
            xml::escape(username),
            xml::escape(password)
        );

        let response = match self.send(&context, SoapCall::partner("login", body)).await {
            Ok(response) => response,
            Err(err) => {
                let Some(fault) = err.remote_fault() else {
                    return Err(err);
                };
                let message = format!("{}: {}", fault.status_code, fault.message);
                warn!(%message, "Login rejected");
                return Err(Error {
                    kind: ErrorKind::Auth(message),
                    source: err.source,
                });
            }
        };

        let login = parse::login_result(&response)?;
        if login.password_expired {
            warn!("Password has expired; the session is restricted");
        }

        self.session.install(login.session.clone());
        self.last_login = Some(login.clone());
        info!(server_url = %login.session.server_url(), "Logged in");
        Ok(login)
    }

    /// Invalidate the active session on the service and forget it locally.
    ///
    /// If the service rejects the call the session stays installed.
    pub async fn logout(&mut self) -> Result<()> {
        let context = self.authenticated("logout")?;
        let origin = endpoint::origin(&context.endpoint).ok_or_else(|| {
            Error::validation(
                "logout",
                format!("server URL {} is not absolute", context.endpoint),
            )
        })?;
        let context = CallContext {
            endpoint: endpoint::resolve(&origin, self.session.api_version()),
            ..context
        };

        self.send(&context, SoapCall::partner("logout", "")).await?;
        self.session.clear();
        self.last_login = None;
        info!("Logged out");
        Ok(())
    }

    /// Adopt a session established elsewhere. Nothing is validated and no
    /// call is made.
    pub fn use_existing_session(
        &mut self,
        access_token: impl Into<String>,
        server_url: impl Into<String>,
    ) {
        self.session.install(Session::new(access_token, server_url));
    }

    /// Replace the access token and keep the server URL.
    pub fn set_access_token(&mut self, access_token: impl Into<String>) {
        self.session.set_access_token(access_token.into());
    }

    /// Switch API version. The login endpoint, the server URL of an
    /// active session and the URLs of [`last_login`](Self::last_login) are
    /// rewritten.
    pub fn set_api_version(&mut self, version: &str) -> Result<()> {
        self.session.set_api_version(version)?;
        if let Some(login) = &mut self.last_login {
            login.set_api_version(self.session.api_version());
        }
        Ok(())
    }

    /// Set the login host, e.g. `test.salesforce.com` for sandboxes.
    pub fn set_login_url(&mut self, host: &str) -> Result<()> {
        self.session.set_login_url(host)
    }
}
