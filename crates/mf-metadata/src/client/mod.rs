//! Metadata API client.
//!
//! [`MetadataClient`] composes the session store, the envelope and the job
//! controller over a [`Transport`]. Every operation performs at most one
//! exchange with the service; input errors are raised before anything is
//! sent.
//!
//! Mutating methods take `&mut self`. Share a client between tasks behind a
//! `tokio::sync::Mutex` (or give each task its own client): a login racing
//! an in-flight call has no defined winner.

use metaforce_client::{CallContext, ClientConfig, HttpTransport, SoapCall, Transport, XmlNode};
use tracing::debug;

use crate::error::{Error, Result};
use crate::registry::ComponentRegistry;
use crate::session::{LoginResult, Session, SessionStore};
use crate::types::ApiVersion;

mod crud;
mod deploy;
mod describe;
mod jobs;
mod list;
mod parse;
mod retrieve;
mod session;

/// Salesforce Metadata API client.
#[derive(Debug)]
pub struct MetadataClient<T: Transport = HttpTransport> {
    transport: T,
    session: SessionStore,
    registry: ComponentRegistry,
    last_login: Option<LoginResult>,
}

impl MetadataClient<HttpTransport> {
    /// Create a client over HTTP with the default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a client over HTTP with a custom configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let transport =
            HttpTransport::new(config).map_err(|e| Error::from_transport("configure", e))?;
        Ok(Self::with_transport(transport))
    }
}

impl<T: Transport> MetadataClient<T> {
    /// Create a client over any transport. No call is made.
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            session: SessionStore::default(),
            registry: ComponentRegistry::default(),
            last_login: None,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable access for transport-level toggles such as compression.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Register additional component kinds.
    pub fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    /// The active session, if any.
    pub fn session(&self) -> Option<&Session> {
        self.session.session()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.session().is_some()
    }

    /// Result of the last successful login, cleared by logout.
    pub fn last_login(&self) -> Option<&LoginResult> {
        self.last_login.as_ref()
    }

    pub fn api_version(&self) -> &ApiVersion {
        self.session.api_version()
    }

    pub fn login_url(&self) -> &str {
        self.session.login_url()
    }

    /// Endpoint the next call will be posted to.
    pub fn endpoint(&self) -> String {
        self.session.endpoint()
    }

    /// Context for an authenticated call, built from the store at call time.
    fn authenticated(&self, operation: &str) -> Result<CallContext> {
        if self.session.session().is_none() {
            return Err(Error::validation(
                operation,
                "no active session; call login or use_existing_session first",
            ));
        }
        Ok(self.session.context())
    }

    /// Send one authenticated metadata call.
    pub(crate) async fn dispatch(&self, call: SoapCall) -> Result<XmlNode> {
        let context = self.authenticated(&call.operation)?;
        self.send(&context, call).await
    }

    async fn send(&self, context: &CallContext, call: SoapCall) -> Result<XmlNode> {
        let operation = call.operation.clone();
        debug!(operation = %operation, endpoint = %context.endpoint, "Dispatching call");
        self.transport
            .call(context, call)
            .await
            .map_err(|e| Error::from_transport(&operation, e))
    }
}
