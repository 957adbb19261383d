//! Common types for Metadata API.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::component::Component;
use crate::error::{Error, Result};

/// Default Metadata API version.
pub const DEFAULT_API_VERSION: &str = "50.0";

/// Default login host.
pub const DEFAULT_LOGIN_URL: &str = "login.salesforce.com";

static VERSION_PATTERN: LazyLock<Option<regex_lite::Regex>> =
    LazyLock::new(|| regex_lite::Regex::new(r"^\d+(\.\d+)?$").ok());

/// A validated API version string such as `"50.0"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiVersion {
    raw: String,
}

impl ApiVersion {
    /// Validate and wrap a version string: digits with an optional decimal part.
    pub fn parse(value: &str) -> Result<Self> {
        Self::parse_for("setApiVersion", value)
    }

    /// Like [`parse`](Self::parse), reporting failures under `operation`.
    pub(crate) fn parse_for(operation: &str, value: &str) -> Result<Self> {
        let matches = VERSION_PATTERN
            .as_ref()
            .is_some_and(|re| re.is_match(value));
        if !matches {
            return Err(Error::validation(
                operation,
                format!("'{}' is not a valid API version (expected e.g. \"50.0\")", value),
            ));
        }
        Ok(Self {
            raw: value.to_string(),
        })
    }

    /// The version as written, e.g. `"50.0"`.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self {
            raw: DEFAULT_API_VERSION.to_string(),
        }
    }
}

impl std::str::FromStr for ApiVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl std::fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Test level for deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TestLevel {
    /// No tests run.
    NoTestRun,
    /// Run local tests only.
    #[default]
    RunLocalTests,
    /// Run all tests in org.
    RunAllTestsInOrg,
    /// Run specified tests.
    RunSpecifiedTests,
}

impl std::fmt::Display for TestLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestLevel::NoTestRun => write!(f, "NoTestRun"),
            TestLevel::RunLocalTests => write!(f, "RunLocalTests"),
            TestLevel::RunAllTestsInOrg => write!(f, "RunAllTestsInOrg"),
            TestLevel::RunSpecifiedTests => write!(f, "RunSpecifiedTests"),
        }
    }
}

/// Error detail attached to a failed element of a CRUD call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataError {
    /// Status code identifying the error type.
    pub status_code: String,
    /// Descriptive error message.
    pub message: String,
    /// Field names associated with the error.
    pub fields: Vec<String>,
}

/// A well-formed error answer from the service.
///
/// Raised for a whole call (SOAP fault) or carried per element in the
/// result vector of create/update/upsert/delete/rename. `full_name` names
/// the failing element when there is one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFault {
    /// Operation that failed, e.g. `deleteMetadata`.
    pub operation: String,
    /// Identity of the failing element.
    pub full_name: Option<String>,
    /// Fault code or first status code.
    pub status_code: String,
    /// Human readable message.
    pub message: String,
    /// Every error the service reported for the element.
    pub errors: Vec<MetadataError>,
}

impl std::fmt::Display for RemoteFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed", self.operation)?;
        if let Some(full_name) = &self.full_name {
            write!(f, " for {}", full_name)?;
        }
        write!(f, ": {} - {}", self.status_code, self.message)
    }
}

impl std::error::Error for RemoteFault {}

/// Outcome of one element of a batch call.
pub type ElementResult<T> = std::result::Result<T, RemoteFault>;

/// A successful create, update or rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResult {
    /// Full name of the metadata component.
    pub full_name: String,
}

/// A successful upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertResult {
    /// Full name of the metadata component.
    pub full_name: String,
    /// Whether the component was created (true) or updated (false).
    pub created: bool,
}

/// A successful delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResult {
    /// Full name of the metadata component.
    pub full_name: String,
}

/// Records returned by `readMetadata`, in the order the service sent them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReadResult {
    pub records: Vec<Component>,
}

/// Arguments of `renameMetadata`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameRequest {
    pub type_name: String,
    pub old_full_name: String,
    pub new_full_name: String,
}

impl RenameRequest {
    pub fn new(
        type_name: impl Into<String>,
        old_full_name: impl Into<String>,
        new_full_name: impl Into<String>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            old_full_name: old_full_name.into(),
            new_full_name: new_full_name.into(),
        }
    }
}

/// A component deployment success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSuccess {
    pub component_type: Option<String>,
    pub file_name: Option<String>,
    pub full_name: Option<String>,
    pub created: bool,
    pub deleted: bool,
}

/// A test failure during deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestFailure {
    pub name: Option<String>,
    pub method_name: Option<String>,
    pub message: Option<String>,
    pub stack_trace: Option<String>,
    pub namespace: Option<String>,
}

/// Properties of a component, as returned by list and retrieve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileProperties {
    pub created_by_id: Option<String>,
    pub created_by_name: Option<String>,
    pub created_date: Option<String>,
    pub file_name: String,
    pub full_name: String,
    pub id: Option<String>,
    pub last_modified_by_id: Option<String>,
    pub last_modified_by_name: Option<String>,
    pub last_modified_date: Option<String>,
    pub manageable_state: Option<String>,
    pub namespace_prefix: Option<String>,
    pub component_type: String,
}
