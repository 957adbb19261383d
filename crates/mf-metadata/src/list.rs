//! List metadata queries.

use metaforce_client::xml;

/// Most queries one `listMetadata` call may carry.
pub const MAX_LIST_QUERIES: usize = 3;

/// One `listMetadata` query: a type and, for folder-based types, a folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListMetadataQuery {
    pub metadata_type: String,
    pub folder: Option<String>,
}

impl ListMetadataQuery {
    pub fn new(metadata_type: impl Into<String>) -> Self {
        Self {
            metadata_type: metadata_type.into(),
            folder: None,
        }
    }

    pub fn in_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    pub(crate) fn to_xml(&self) -> String {
        let folder = self
            .folder
            .as_deref()
            .map(|f| format!("<folder>{}</folder>", xml::escape(f)))
            .unwrap_or_default();
        format!(
            "<queries>{}<type>{}</type></queries>",
            folder,
            xml::escape(&self.metadata_type)
        )
    }
}
