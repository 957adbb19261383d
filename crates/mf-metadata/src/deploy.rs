//! Deploy payloads and results.

use metaforce_client::xml;
use serde::{Deserialize, Serialize};

use crate::types::{ComponentSuccess, TestFailure, TestLevel};

/// Options for deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOptions {
    /// Allow references to missing files in the zip.
    pub allow_missing_files: bool,
    /// Automatically update the package manifest.
    pub auto_update_package: bool,
    /// Validate only, don't actually deploy.
    pub check_only: bool,
    /// Ignore warnings during deployment.
    pub ignore_warnings: bool,
    /// Retrieve metadata after deploy.
    pub perform_retrieve: bool,
    /// Hard delete components (only in sandbox/DE orgs).
    pub purge_on_delete: bool,
    /// Rollback all changes if any component fails.
    pub rollback_on_error: bool,
    /// Run all Apex tests.
    pub run_all_tests: bool,
    /// Deploy as a single package.
    pub single_package: bool,
    /// Test level for deployment.
    pub test_level: Option<TestLevel>,
    /// Specific tests to run (when test_level is RunSpecifiedTests).
    pub run_tests: Vec<String>,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            allow_missing_files: false,
            auto_update_package: false,
            check_only: false,
            ignore_warnings: true,
            perform_retrieve: false,
            purge_on_delete: false,
            rollback_on_error: true,
            run_all_tests: false,
            single_package: true,
            test_level: None,
            run_tests: vec![],
        }
    }
}

impl DeployOptions {
    /// `<deployOptions>` children, in schema order.
    pub(crate) fn to_xml(&self) -> String {
        let mut out = format!(
            "<allowMissingFiles>{}</allowMissingFiles>\
             <autoUpdatePackage>{}</autoUpdatePackage>\
             <checkOnly>{}</checkOnly>\
             <ignoreWarnings>{}</ignoreWarnings>\
             <performRetrieve>{}</performRetrieve>\
             <purgeOnDelete>{}</purgeOnDelete>\
             <rollbackOnError>{}</rollbackOnError>\
             <runAllTests>{}</runAllTests>",
            self.allow_missing_files,
            self.auto_update_package,
            self.check_only,
            self.ignore_warnings,
            self.perform_retrieve,
            self.purge_on_delete,
            self.rollback_on_error,
            self.run_all_tests,
        );
        for test in &self.run_tests {
            out.push_str(&format!("<runTests>{}</runTests>", xml::escape(test)));
        }
        out.push_str(&format!(
            "<singlePackage>{}</singlePackage>",
            self.single_package
        ));
        if let Some(level) = self.test_level {
            out.push_str(&format!("<testLevel>{}</testLevel>", level));
        }
        out
    }
}

/// Deployment status as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeployStatus {
    Pending,
    InProgress,
    Succeeded,
    SucceededPartial,
    Failed,
    Canceling,
    Canceled,
}

impl std::str::FromStr for DeployStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(DeployStatus::Pending),
            "InProgress" => Ok(DeployStatus::InProgress),
            "Succeeded" => Ok(DeployStatus::Succeeded),
            "SucceededPartial" => Ok(DeployStatus::SucceededPartial),
            "Failed" => Ok(DeployStatus::Failed),
            "Canceling" => Ok(DeployStatus::Canceling),
            "Canceled" => Ok(DeployStatus::Canceled),
            _ => Err(format!("Unknown deploy status: {}", s)),
        }
    }
}

/// Result of a deployment.
///
/// Component and test details are only populated when the status check
/// asked for them.
#[derive(Debug, Clone, PartialEq)]
pub struct DeployResult {
    /// Async process ID.
    pub id: String,
    /// Whether the operation is complete.
    pub done: bool,
    pub status: DeployStatus,
    pub success: bool,
    pub check_only: bool,
    pub error_message: Option<String>,
    pub error_status_code: Option<String>,
    pub number_components_deployed: u32,
    pub number_components_errors: u32,
    pub number_components_total: u32,
    pub number_tests_completed: u32,
    pub number_tests_errors: u32,
    pub number_tests_total: u32,
    pub component_failures: Vec<ComponentFailure>,
    pub component_successes: Vec<ComponentSuccess>,
    pub test_failures: Vec<TestFailure>,
    pub state_detail: Option<String>,
}

/// A component failure in deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentFailure {
    pub component_type: Option<String>,
    pub file_name: Option<String>,
    pub full_name: Option<String>,
    pub line_number: Option<u32>,
    pub column_number: Option<u32>,
    pub problem: String,
    pub problem_type: String,
    pub created: bool,
    pub deleted: bool,
}

/// Answer to `cancelDeploy`.
///
/// Cancellation is asynchronous on the service side; `done` is false while
/// the deployment is still `Canceling`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelDeployResult {
    pub id: String,
    pub done: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deploy_options_default() {
        let opts = DeployOptions::default();
        assert!(!opts.allow_missing_files);
        assert!(!opts.check_only);
        assert!(opts.ignore_warnings);
        assert!(opts.rollback_on_error);
        assert!(opts.single_package);
    }

    #[test]
    fn test_deploy_options_xml() {
        let opts = DeployOptions {
            check_only: true,
            test_level: Some(TestLevel::RunSpecifiedTests),
            run_tests: vec!["FooTest".to_string(), "Bar<Test>".to_string()],
            ..Default::default()
        };
        let xml = opts.to_xml();
        assert!(xml.starts_with("<allowMissingFiles>false</allowMissingFiles>"));
        assert!(xml.contains("<checkOnly>true</checkOnly>"));
        assert!(xml.contains("<runTests>FooTest</runTests><runTests>Bar&lt;Test&gt;</runTests>"));
        assert!(xml.ends_with("<testLevel>RunSpecifiedTests</testLevel>"));

        let rolled = xml.find("<rollbackOnError>").unwrap();
        let single = xml.find("<singlePackage>").unwrap();
        assert!(rolled < single);
    }

    #[test]
    fn test_default_options_omit_test_level() {
        assert!(!DeployOptions::default().to_xml().contains("testLevel"));
    }

    #[test]
    fn test_deploy_status_parse() {
        assert_eq!("Pending".parse::<DeployStatus>().unwrap(), DeployStatus::Pending);
        assert_eq!(
            "SucceededPartial".parse::<DeployStatus>().unwrap(),
            DeployStatus::SucceededPartial
        );
        assert_eq!("Canceling".parse::<DeployStatus>().unwrap(), DeployStatus::Canceling);
        assert!("Queued".parse::<DeployStatus>().is_err());
    }
}
