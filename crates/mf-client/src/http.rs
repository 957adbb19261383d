//! HTTP implementation of the transport port.

use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info, instrument, trace};

use crate::config::ClientConfig;
use crate::error::{sanitize_message, Error, ErrorKind, Result};
use crate::soap;
use crate::transport::{CallContext, SoapCall, Transport};
use crate::xml::XmlNode;

/// SOAP over HTTP transport backed by `reqwest`.
///
/// Holds no session state: the endpoint and session header come from the
/// [`CallContext`] of each call.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    inner: reqwest::Client,
    config: ClientConfig,
}

impl HttpTransport {
    /// Create a transport with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let inner = Self::build_client(&config)?;
        Ok(Self { inner, config })
    }

    /// Create a transport with default configuration.
    pub fn default_transport() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Get the transport configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Toggle compressed responses. Rebuilds the connection pool.
    pub fn set_compression(&mut self, enabled: bool) -> Result<()> {
        if self.config.compression != enabled {
            let mut config = self.config.clone();
            config.compression = enabled;
            self.inner = Self::build_client(&config)?;
            self.config = config;
        }
        Ok(())
    }

    /// Toggle envelope dumps at `trace` level.
    pub fn set_debug(&mut self, enabled: bool) {
        self.config.debug = enabled;
    }

    fn build_client(config: &ClientConfig) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .gzip(config.compression)
            .deflate(config.compression)
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))
    }
}

impl Transport for HttpTransport {
    #[instrument(skip(self, context, call), fields(operation = %call.operation, endpoint = %context.endpoint))]
    async fn call(&self, context: &CallContext, call: SoapCall) -> Result<XmlNode> {
        let url = url::Url::parse(&context.endpoint)?;
        let envelope = soap::build_envelope(context, &call);

        if self.config.debug {
            trace!(envelope = %sanitize_message(&envelope), "SOAP request");
        }
        if self.config.enable_tracing {
            debug!(bytes = envelope.len(), "Sending SOAP request");
        }

        let response = self
            .inner
            .post(url)
            .header(CONTENT_TYPE, "text/xml;charset=UTF-8")
            .header("SOAPAction", call.operation.as_str())
            .body(envelope)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if self.config.enable_tracing {
            if status.is_success() {
                debug!(status = status.as_u16(), bytes = text.len(), "Response received");
            } else {
                info!(status = status.as_u16(), bytes = text.len(), "Non-success response");
            }
        }
        if self.config.debug {
            trace!(envelope = %sanitize_message(&text), "SOAP response");
        }

        // Faults arrive with HTTP 500, so the body is inspected before the status.
        match soap::parse_response(&text) {
            Ok(node) if status.is_success() => Ok(node),
            Err(err) if err.fault().is_some() || status.is_success() => Err(err),
            _ => Err(Error::new(ErrorKind::Http {
                status: status.as_u16(),
                message: sanitize_message(&text),
            })),
        }
    }
}
