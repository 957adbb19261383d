use metaforce_client::{SoapCall, Transport};

use crate::error::{Error, Result};
use crate::list::{ListMetadataQuery, MAX_LIST_QUERIES};
use crate::types::FileProperties;

use super::{parse, MetadataClient};

impl<T: Transport> MetadataClient<T> {
    /// List components matching up to three queries.
    pub async fn list_metadata(&self, queries: &[ListMetadataQuery]) -> Result<Vec<FileProperties>> {
        if queries.is_empty() {
            return Ok(Vec::new());
        }
        if queries.len() > MAX_LIST_QUERIES {
            return Err(Error::validation(
                "listMetadata",
                format!(
                    "{} queries given, at most {} per call",
                    queries.len(),
                    MAX_LIST_QUERIES
                ),
            ));
        }
        if queries.iter().any(|q| q.metadata_type.trim().is_empty()) {
            return Err(Error::validation("listMetadata", "query type is required"));
        }

        let mut body: String = queries.iter().map(ListMetadataQuery::to_xml).collect();
        body.push_str(&format!(
            "<asOfVersion>{}</asOfVersion>",
            self.session.api_version().as_str()
        ));

        let response = self.dispatch(SoapCall::metadata("listMetadata", body)).await?;
        Ok(response
            .children("result")
            .map(parse::file_properties)
            .collect())
    }
}
