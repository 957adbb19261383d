//! # metaforce-client
//!
//! SOAP transport infrastructure for the Salesforce Metadata API.
//!
//! This crate is the transport port the metadata client talks through:
//! - The [`Transport`] trait: one call = operation name + call context + body
//! - SOAP 1.1 envelope framing with the `SessionHeader`
//! - Fault detection, surfaced as [`ErrorKind::Fault`]
//! - An owned XML tree ([`XmlNode`]) for reading responses
//! - [`HttpTransport`], the production implementation over `reqwest`
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  metaforce-metadata                         │
//! │  (session store, envelopes, async jobs, client facade)      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │  CallContext + SoapCall
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    impl Transport                           │
//! │  - HttpTransport: envelope framing, POST, fault parsing     │
//! │  - test doubles: scripted responses                         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The header and target endpoint are never stored on the transport. Every
//! call receives them in a [`CallContext`], so a transport can be shared by
//! any number of sessions.
//!
//! ## Example
//!
//! ```rust,ignore
//! use metaforce_client::{CallContext, HttpTransport, SoapCall, Transport};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), metaforce_client::Error> {
//!     let transport = HttpTransport::default_transport()?;
//!     let context = CallContext::new("https://na1.salesforce.com/services/Soap/m/50.0")
//!         .with_session("00D...!AQ...");
//!
//!     let response = transport
//!         .call(&context, SoapCall::metadata("describeMetadata", "<asOfVersion>50.0</asOfVersion>"))
//!         .await?;
//!
//!     for object in response.child("result").into_iter().flat_map(|r| r.children("metadataObjects")) {
//!         println!("{}", object.text_of("xmlName").unwrap_or_default());
//!     }
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod http;
mod soap;
mod transport;
pub mod xml;

pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{Error, ErrorKind, Result};
pub use http::HttpTransport;
pub use soap::SoapFault;
pub use transport::{CallContext, ServiceNamespace, SoapCall, Transport};
pub use xml::XmlNode;

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("metaforce/", env!("CARGO_PKG_VERSION"));
