//! Retrieve payloads and results.

use base64::Engine;
use metaforce_client::xml;
use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind, Result};
use crate::types::{ApiVersion, FileProperties};

/// A retrieve request.
///
/// Either `unpackaged`, `package_names` or `specific_files` says what to
/// fetch. `api_version` defaults to the client's version when unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetrieveRequest {
    pub api_version: Option<String>,
    pub single_package: bool,
    pub package_names: Vec<String>,
    pub specific_files: Vec<String>,
    pub unpackaged: Option<PackageManifest>,
}

impl RetrieveRequest {
    /// Retrieve the components listed in a manifest.
    pub fn unpackaged(manifest: PackageManifest) -> Self {
        Self {
            single_package: true,
            unpackaged: Some(manifest),
            ..Default::default()
        }
    }

    /// Retrieve one or more named packages.
    pub fn packages<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            package_names: names.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Reject a request that names nothing to fetch or carries an
    /// unparsable version.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::validation(
                "retrieve",
                "request names no manifest, package or file",
            ));
        }
        if let Some(version) = &self.api_version {
            ApiVersion::parse_for("retrieve", version)?;
        }
        if let Some(manifest) = &self.unpackaged {
            ApiVersion::parse_for("retrieve", &manifest.version)?;
        }
        Ok(())
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.unpackaged.as_ref().is_none_or(|m| m.types.is_empty())
            && self.package_names.is_empty()
            && self.specific_files.is_empty()
    }

    /// `<retrieveRequest>` children.
    pub(crate) fn to_xml(&self, api_version: &str) -> String {
        let mut out = format!(
            "<apiVersion>{}</apiVersion>",
            xml::escape(self.api_version.as_deref().unwrap_or(api_version))
        );
        for name in &self.package_names {
            out.push_str(&format!("<packageNames>{}</packageNames>", xml::escape(name)));
        }
        out.push_str(&format!(
            "<singlePackage>{}</singlePackage>",
            self.single_package
        ));
        for file in &self.specific_files {
            out.push_str(&format!("<specificFiles>{}</specificFiles>", xml::escape(file)));
        }
        if let Some(manifest) = &self.unpackaged {
            out.push_str(&format!("<unpackaged>{}</unpackaged>", manifest.to_xml()));
        }
        out
    }
}

/// Package manifest (package.xml).
///
/// All values are escaped when converted to XML.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageManifest {
    pub types: Vec<PackageTypeMembers>,
    pub version: String,
}

impl PackageManifest {
    /// Create a new package manifest with the given API version.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            types: Vec::new(),
            version: version.into(),
        }
    }

    /// Add a metadata type with its members.
    pub fn add_type(mut self, name: impl Into<String>, members: Vec<String>) -> Self {
        self.types.push(PackageTypeMembers {
            name: name.into(),
            members,
        });
        self
    }

    pub(crate) fn to_xml(&self) -> String {
        let mut out = String::new();
        for type_members in &self.types {
            out.push_str("<types>");
            for member in &type_members.members {
                out.push_str(&format!("<members>{}</members>", xml::escape(member)));
            }
            out.push_str(&format!(
                "<name>{}</name></types>",
                xml::escape(&type_members.name)
            ));
        }
        out.push_str(&format!("<version>{}</version>", xml::escape(&self.version)));
        out
    }
}

/// Type members in a package manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageTypeMembers {
    pub name: String,
    pub members: Vec<String>,
}

/// Retrieve status as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetrieveStatus {
    Pending,
    InProgress,
    Succeeded,
    Failed,
    Canceling,
    Canceled,
}

impl std::str::FromStr for RetrieveStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(RetrieveStatus::Pending),
            "InProgress" => Ok(RetrieveStatus::InProgress),
            "Succeeded" => Ok(RetrieveStatus::Succeeded),
            "Failed" => Ok(RetrieveStatus::Failed),
            "Canceling" => Ok(RetrieveStatus::Canceling),
            "Canceled" => Ok(RetrieveStatus::Canceled),
            _ => Err(format!("Unknown retrieve status: {}", s)),
        }
    }
}

/// Result of a retrieval.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrieveResult {
    /// Async process ID.
    pub id: String,
    pub done: bool,
    pub status: RetrieveStatus,
    pub success: bool,
    pub error_message: Option<String>,
    pub error_status_code: Option<String>,
    /// Base64-encoded zip file contents.
    pub zip_file: Option<String>,
    pub file_properties: Vec<FileProperties>,
    /// Warnings and errors per file.
    pub messages: Vec<RetrieveMessage>,
}

impl RetrieveResult {
    /// Decode the retrieved archive, if one was returned.
    pub fn zip_bytes(&self) -> Result<Option<Vec<u8>>> {
        let Some(encoded) = self.zip_file.as_deref() else {
            return Ok(None);
        };
        let cleaned: String = encoded.split_whitespace().collect();
        base64::engine::general_purpose::STANDARD
            .decode(cleaned)
            .map(Some)
            .map_err(|e| {
                Error::with_source(
                    ErrorKind::InvalidResponse {
                        operation: "checkRetrieveStatus".to_string(),
                        message: "zipFile is not valid base64".to_string(),
                    },
                    e,
                )
            })
    }
}

/// A message from retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrieveMessage {
    pub file_name: String,
    pub problem: String,
}
