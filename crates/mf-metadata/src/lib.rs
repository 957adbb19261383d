//! # metaforce-metadata
//!
//! Stateful client for the Salesforce Metadata API.
//!
//! ## Features
//!
//! - **Sessions** - login, adopt an existing session, refresh the token, logout
//! - **CRUD** - create/read/update/upsert/delete/rename with per-element results
//! - **Deploy / Retrieve** - submit, poll and cancel async jobs
//! - **Describe / List** - metadata types, value types and components
//! - **Open kinds** - any component type can be registered at runtime
//!
//! Polling is driven by the caller: [`MetadataClient::poll`] performs exactly
//! one status check, so cadence, backoff and timeouts stay in your hands.
//!
//! ## Example
//!
//! ```rust,ignore
//! use metaforce_metadata::{DeployOptions, JobState, MetadataClient};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), metaforce_metadata::Error> {
//!     let mut client = MetadataClient::new()?;
//!     client.login("user@example.com", "password+token").await?;
//!
//!     let zip_bytes = std::fs::read("package.zip").expect("package");
//!     let mut job = client.deploy(&zip_bytes, &DeployOptions::default()).await?;
//!
//!     while !job.is_terminal() {
//!         tokio::time::sleep(Duration::from_secs(5)).await;
//!         job = client.poll(job, false).await?;
//!     }
//!
//!     let job = client.poll(job, true).await?;
//!     println!("Deploy finished: {}", job.state());
//!
//!     // Delete components; each element reports its own outcome
//!     for result in client.delete_metadata("CustomObject", &["Foo__c", "Bar__c"]).await? {
//!         match result {
//!             Ok(deleted) => println!("deleted {}", deleted.full_name),
//!             Err(fault) => println!("{}", fault),
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

mod client;
mod component;
mod deploy;
mod describe;
pub mod endpoint;
mod envelope;
mod error;
mod job;
mod kinds;
mod list;
pub mod mock;
mod registry;
mod retrieve;
mod session;
mod types;

pub use client::MetadataClient;
pub use component::{Component, MetadataRef, TypedMetadata, TYPE_KEY};
pub use deploy::{CancelDeployResult, ComponentFailure, DeployOptions, DeployResult, DeployStatus};
pub use describe::{
    DescribeMetadataResult, DescribeValueTypeResult, MetadataType, PicklistEntry, ValueTypeField,
};
pub use envelope::{MetadataSelector, MAX_BATCH_SIZE};
pub use error::{Error, ErrorKind, Result};
pub use job::{AsyncJob, JobDetails, JobKind, JobState, JobSummary};
pub use kinds::{CustomField, CustomObject, FieldPermission, Layout, LayoutSection, NameField, Profile};
pub use list::{ListMetadataQuery, MAX_LIST_QUERIES};
pub use registry::{ComponentKind, ComponentRegistry};
pub use retrieve::{
    PackageManifest, PackageTypeMembers, RetrieveMessage, RetrieveRequest, RetrieveResult,
    RetrieveStatus,
};
pub use session::{LoginResult, Session};
pub use types::{
    ApiVersion, ComponentSuccess, DeleteResult, ElementResult, FileProperties, MetadataError,
    ReadResult, RemoteFault, RenameRequest, SaveResult, TestFailure, TestLevel, UpsertResult,
    DEFAULT_API_VERSION, DEFAULT_LOGIN_URL,
};

// Transport types callers need to build or configure a client.
pub use metaforce_client::{ClientConfig, HttpTransport, Transport};
