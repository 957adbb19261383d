//! # metaforce
//!
//! A stateful Salesforce Metadata API client for Rust.
//!
//! ## Security
//!
//! - Session ids are redacted in Debug output
//! - Tracing never records credentials; envelope dumps redact the session id
//! - Error messages sanitize any credential data
//!
//! ## Crates
//!
//! - **metaforce-client** - Transport port: SOAP framing, XML parsing, HTTP execution
//! - **metaforce-metadata** - Sessions, metadata CRUD envelopes, deploy and retrieve jobs
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use metaforce::{MetadataClient, MetadataRef};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), metaforce::metadata::Error> {
//!     let mut client = MetadataClient::new()?;
//!     client.set_login_url("test.salesforce.com")?;
//!     client.login("user@example.com.sandbox", "password+token").await?;
//!
//!     let read = client
//!         .read_components(&[MetadataRef::new("CustomObject", "Account")])
//!         .await?;
//!     for record in read.records {
//!         println!("{} {}", record.type_name(), record.full_name());
//!     }
//!
//!     client.logout().await
//! }
//! ```

#[cfg(feature = "client")]
pub use metaforce_client as client;
#[cfg(feature = "metadata")]
pub use metaforce_metadata as metadata;

#[cfg(feature = "client")]
pub use metaforce_client::{ClientConfig, HttpTransport, Transport};
#[cfg(feature = "metadata")]
pub use metaforce_metadata::{
    AsyncJob, Component, DeployOptions, JobState, MetadataClient, MetadataRef, RetrieveRequest,
};
