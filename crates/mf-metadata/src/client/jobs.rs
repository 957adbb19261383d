use metaforce_client::Transport;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::job::{AsyncJob, JobDetails, JobKind, JobState, JobSummary};

use super::MetadataClient;

impl<T: Transport> MetadataClient<T> {
    /// Poll a job once.
    ///
    /// A terminal job is returned as-is without contacting the service.
    /// Every poll records the status summary (error message, counters).
    /// With `include_details` the full result (deploy details, retrieve
    /// archive) is fetched and attached as well.
    pub async fn poll(&self, job: AsyncJob, include_details: bool) -> Result<AsyncJob> {
        if job.is_terminal() {
            debug!(id = %job.id(), state = %job.state(), "Job already terminal; not polling");
            return Ok(job);
        }

        let (state, summary, details) = match job.kind() {
            JobKind::Deploy => {
                let result = self.check_deploy_status(job.id(), include_details).await?;
                (
                    JobState::from(result.status),
                    JobSummary::from(&result),
                    JobDetails::Deploy(result),
                )
            }
            JobKind::Retrieve => {
                let result = self.check_retrieve_status(job.id(), include_details).await?;
                (
                    JobState::from(result.status),
                    JobSummary::from(&result),
                    JobDetails::Retrieve(result),
                )
            }
        };

        debug!(id = %job.id(), state = %state, "Job polled");
        Ok(job.observe(state, summary, include_details.then_some(details)))
    }

    /// Cancel a job.
    ///
    /// Canceling a terminal job is a no-op. Only deployments can be
    /// canceled; a retrieve job is rejected before dispatch.
    pub async fn cancel(&self, job: AsyncJob) -> Result<AsyncJob> {
        if job.is_terminal() {
            return Ok(job);
        }
        if job.kind() == JobKind::Retrieve {
            return Err(Error::validation(
                "cancel",
                format!("retrieve job {} cannot be canceled", job.id()),
            ));
        }

        let result = self.cancel_deploy(job.id()).await?;
        info!(id = %result.id, done = result.done, "Deploy cancel requested");
        Ok(job.canceled())
    }
}
