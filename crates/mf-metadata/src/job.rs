//! Async job state machine.
//!
//! ```text
//! Pending ──► InProgress ──► Succeeded
//!    │            │     └──► Failed
//!    └────────────┴────────► Canceled
//! ```
//!
//! Terminal states never change. The controller defines one poll and one
//! cancel; cadence, backoff and timeouts belong to the caller.

use chrono::{DateTime, Utc};

use crate::deploy::{DeployResult, DeployStatus};
use crate::retrieve::{RetrieveResult, RetrieveStatus};

/// Which long-running operation a job tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    Deploy,
    Retrieve,
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobKind::Deploy => write!(f, "deploy"),
            JobKind::Retrieve => write!(f, "retrieve"),
        }
    }
}

/// Client-side job state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobState {
    Pending,
    InProgress,
    Succeeded,
    Failed,
    Canceled,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Succeeded | JobState::Failed | JobState::Canceled
        )
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::Pending => write!(f, "Pending"),
            JobState::InProgress => write!(f, "InProgress"),
            JobState::Succeeded => write!(f, "Succeeded"),
            JobState::Failed => write!(f, "Failed"),
            JobState::Canceled => write!(f, "Canceled"),
        }
    }
}

impl From<DeployStatus> for JobState {
    fn from(status: DeployStatus) -> Self {
        match status {
            DeployStatus::Pending => JobState::Pending,
            // Cancellation is still running on the service.
            DeployStatus::InProgress | DeployStatus::Canceling => JobState::InProgress,
            DeployStatus::Succeeded | DeployStatus::SucceededPartial => JobState::Succeeded,
            DeployStatus::Failed => JobState::Failed,
            DeployStatus::Canceled => JobState::Canceled,
        }
    }
}

impl From<RetrieveStatus> for JobState {
    fn from(status: RetrieveStatus) -> Self {
        match status {
            RetrieveStatus::Pending => JobState::Pending,
            RetrieveStatus::InProgress | RetrieveStatus::Canceling => JobState::InProgress,
            RetrieveStatus::Succeeded => JobState::Succeeded,
            RetrieveStatus::Failed => JobState::Failed,
            RetrieveStatus::Canceled => JobState::Canceled,
        }
    }
}

/// Status summary reported by every poll, with or without details.
///
/// Retrieve jobs carry no counters; theirs stay zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobSummary {
    pub done: bool,
    pub success: bool,
    pub error_message: Option<String>,
    pub error_status_code: Option<String>,
    pub state_detail: Option<String>,
    pub number_components_deployed: u32,
    pub number_components_errors: u32,
    pub number_components_total: u32,
    pub number_tests_completed: u32,
    pub number_tests_errors: u32,
    pub number_tests_total: u32,
}

impl From<&DeployResult> for JobSummary {
    fn from(result: &DeployResult) -> Self {
        Self {
            done: result.done,
            success: result.success,
            error_message: result.error_message.clone(),
            error_status_code: result.error_status_code.clone(),
            state_detail: result.state_detail.clone(),
            number_components_deployed: result.number_components_deployed,
            number_components_errors: result.number_components_errors,
            number_components_total: result.number_components_total,
            number_tests_completed: result.number_tests_completed,
            number_tests_errors: result.number_tests_errors,
            number_tests_total: result.number_tests_total,
        }
    }
}

impl From<&RetrieveResult> for JobSummary {
    fn from(result: &RetrieveResult) -> Self {
        Self {
            done: result.done,
            success: result.success,
            error_message: result.error_message.clone(),
            error_status_code: result.error_status_code.clone(),
            ..Default::default()
        }
    }
}

/// Full result payload of the last poll that asked for it.
#[derive(Debug, Clone, PartialEq)]
pub enum JobDetails {
    Deploy(DeployResult),
    Retrieve(RetrieveResult),
}

/// A server-side long-running operation.
#[derive(Debug, Clone, PartialEq)]
pub struct AsyncJob {
    id: String,
    kind: JobKind,
    state: JobState,
    summary: Option<JobSummary>,
    details: Option<JobDetails>,
    submitted_at: DateTime<Utc>,
    last_polled_at: Option<DateTime<Utc>>,
}

impl AsyncJob {
    /// A freshly submitted job, always `Pending`.
    pub(crate) fn submitted(id: String, kind: JobKind) -> Self {
        Self {
            id,
            kind,
            state: JobState::Pending,
            summary: None,
            details: None,
            submitted_at: Utc::now(),
            last_polled_at: None,
        }
    }

    /// Track a job submitted elsewhere, e.g. by an earlier process.
    ///
    /// Its state is unknown until polled, so it starts as `Pending`.
    pub fn resume(id: impl Into<String>, kind: JobKind) -> Self {
        Self::submitted(id.into(), kind)
    }

    /// Apply the outcome of one poll. A terminal job is returned unchanged.
    pub(crate) fn observe(
        mut self,
        state: JobState,
        summary: JobSummary,
        details: Option<JobDetails>,
    ) -> Self {
        if self.state.is_terminal() {
            return self;
        }
        self.state = state;
        self.summary = Some(summary);
        self.details = details;
        self.last_polled_at = Some(Utc::now());
        self
    }

    /// Move a live job to `Canceled`. A terminal job is returned unchanged.
    pub(crate) fn canceled(mut self) -> Self {
        if !self.state.is_terminal() {
            self.state = JobState::Canceled;
        }
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Summary of the last poll, `None` before the first poll.
    pub fn summary(&self) -> Option<&JobSummary> {
        self.summary.as_ref()
    }

    /// Failure reason reported by the last poll.
    pub fn error_message(&self) -> Option<&str> {
        self.summary.as_ref()?.error_message.as_deref()
    }

    pub fn details(&self) -> Option<&JobDetails> {
        self.details.as_ref()
    }

    pub fn deploy_result(&self) -> Option<&DeployResult> {
        match &self.details {
            Some(JobDetails::Deploy(result)) => Some(result),
            _ => None,
        }
    }

    pub fn retrieve_result(&self) -> Option<&RetrieveResult> {
        match &self.details {
            Some(JobDetails::Retrieve(result)) => Some(result),
            _ => None,
        }
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    /// When the job was last polled, `None` before the first poll.
    pub fn last_polled_at(&self) -> Option<DateTime<Utc>> {
        self.last_polled_at
    }
}
