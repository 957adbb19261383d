use metaforce_client::{xml, SoapCall, Transport};
use tracing::info;

use crate::error::{Error, Result};
use crate::job::{AsyncJob, JobKind};
use crate::retrieve::{RetrieveRequest, RetrieveResult};

use super::{parse, MetadataClient};

impl<T: Transport> MetadataClient<T> {
    /// Submit a retrieve request. Returns a `Pending` job.
    ///
    /// Requests naming nothing, or carrying an unparsable API or manifest
    /// version, are rejected before dispatch.
    pub async fn retrieve(&self, request: &RetrieveRequest) -> Result<AsyncJob> {
        request.validate()?;

        let body = format!(
            "<retrieveRequest>{}</retrieveRequest>",
            request.to_xml(self.session.api_version().as_str())
        );
        let response = self.dispatch(SoapCall::metadata("retrieve", body)).await?;
        let id = parse::async_id("retrieve", &response)?;
        info!(id = %id, "Retrieve submitted");
        Ok(AsyncJob::submitted(id, JobKind::Retrieve))
    }

    /// Fetch the status of a retrieval. With `include_zip` the archive is
    /// returned once the job has succeeded.
    pub async fn check_retrieve_status(
        &self,
        async_process_id: &str,
        include_zip: bool,
    ) -> Result<RetrieveResult> {
        if async_process_id.trim().is_empty() {
            return Err(Error::validation(
                "checkRetrieveStatus",
                "async process id is required",
            ));
        }
        let body = format!(
            "<asyncProcessId>{}</asyncProcessId><includeZip>{}</includeZip>",
            xml::escape(async_process_id),
            include_zip
        );

        let response = self
            .dispatch(SoapCall::metadata("checkRetrieveStatus", body))
            .await?;
        parse::retrieve_result(
            "checkRetrieveStatus",
            parse::result("checkRetrieveStatus", &response)?,
        )
    }
}
