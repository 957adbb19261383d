use base64::Engine;
use metaforce_client::{xml, SoapCall, Transport};
use tracing::{info, instrument};

use crate::deploy::{CancelDeployResult, DeployOptions, DeployResult};
use crate::error::{Error, Result};
use crate::job::{AsyncJob, JobKind};

use super::{parse, MetadataClient};

fn require_id(operation: &str, id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(Error::validation(operation, "async process id is required"));
    }
    Ok(())
}

impl<T: Transport> MetadataClient<T> {
    /// Submit a zipped package for deployment.
    ///
    /// The archive is base64-encoded for the wire. Returns a `Pending` job;
    /// drive it with [`poll`](Self::poll).
    #[instrument(skip(self, archive, options), fields(bytes = archive.len()))]
    pub async fn deploy(&self, archive: &[u8], options: &DeployOptions) -> Result<AsyncJob> {
        if archive.is_empty() {
            return Err(Error::validation("deploy", "archive is empty"));
        }

        let encoded = base64::engine::general_purpose::STANDARD.encode(archive);
        let body = format!(
            "<ZipFile>{}</ZipFile><DeployOptions>{}</DeployOptions>",
            encoded,
            options.to_xml()
        );

        let response = self.dispatch(SoapCall::metadata("deploy", body)).await?;
        let id = parse::async_id("deploy", &response)?;
        info!(id = %id, "Deploy submitted");
        Ok(AsyncJob::submitted(id, JobKind::Deploy))
    }

    /// Fetch the status of a deployment.
    ///
    /// With `include_details` the component and test results are included.
    pub async fn check_deploy_status(
        &self,
        async_process_id: &str,
        include_details: bool,
    ) -> Result<DeployResult> {
        require_id("checkDeployStatus", async_process_id)?;
        let body = format!(
            "<asyncProcessId>{}</asyncProcessId><includeDetails>{}</includeDetails>",
            xml::escape(async_process_id),
            include_details
        );

        let response = self
            .dispatch(SoapCall::metadata("checkDeployStatus", body))
            .await?;
        parse::deploy_result(
            "checkDeployStatus",
            parse::result("checkDeployStatus", &response)?,
        )
    }

    /// Ask the service to cancel a deployment.
    pub async fn cancel_deploy(&self, async_process_id: &str) -> Result<CancelDeployResult> {
        require_id("cancelDeploy", async_process_id)?;
        let body = format!("<String>{}</String>", xml::escape(async_process_id));

        let response = self.dispatch(SoapCall::metadata("cancelDeploy", body)).await?;
        let result = parse::result("cancelDeploy", &response)?;
        Ok(CancelDeployResult {
            id: result
                .text_of("id")
                .unwrap_or_else(|| async_process_id.to_string()),
            done: result.bool_of("done"),
        })
    }

    /// Quick-deploy a validation that already passed its tests.
    ///
    /// `validation_id` is the id of a successful check-only deployment.
    pub async fn deploy_recent_validation(&self, validation_id: &str) -> Result<AsyncJob> {
        require_id("deployRecentValidation", validation_id)?;
        let body = format!("<validationID>{}</validationID>", xml::escape(validation_id));

        let response = self
            .dispatch(SoapCall::metadata("deployRecentValidation", body))
            .await?;
        let id = response
            .text_of("result")
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                Error::invalid_response("deployRecentValidation", "response has no job id")
            })?;
        info!(id = %id, validation_id, "Quick deploy submitted");
        Ok(AsyncJob::submitted(id, JobKind::Deploy))
    }
}
