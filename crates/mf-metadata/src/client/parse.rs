//! Typed views over response elements.

use metaforce_client::XmlNode;

use crate::deploy::{ComponentFailure, DeployResult, DeployStatus};
use crate::describe::{
    DescribeMetadataResult, DescribeValueTypeResult, MetadataType, PicklistEntry, ValueTypeField,
};
use crate::error::{Error, Result};
use crate::retrieve::{RetrieveMessage, RetrieveResult, RetrieveStatus};
use crate::session::{LoginResult, Session};
use crate::types::{ComponentSuccess, FileProperties, TestFailure};

/// The `<result>` child every response carries.
pub(super) fn result<'a>(operation: &str, response: &'a XmlNode) -> Result<&'a XmlNode> {
    response
        .child("result")
        .ok_or_else(|| Error::invalid_response(operation, "response has no result element"))
}

/// A required, non-empty text child.
fn required(operation: &str, node: &XmlNode, name: &str) -> Result<String> {
    node.text_of(name)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| Error::invalid_response(operation, format!("missing {}", name)))
}

/// The async process id of a submit response.
pub(super) fn async_id(operation: &str, response: &XmlNode) -> Result<String> {
    required(operation, result(operation, response)?, "id")
}

pub(super) fn login_result(response: &XmlNode) -> Result<LoginResult> {
    let result = result("login", response)?;
    let session_id = required("login", result, "sessionId")?;
    let metadata_server_url = required("login", result, "metadataServerUrl")?;
    let server_url = result.text_of("serverUrl").unwrap_or_default();
    let organization_id = result
        .child("userInfo")
        .and_then(|info| info.text_of("organizationId"));

    Ok(LoginResult {
        session: Session::new(session_id, metadata_server_url),
        server_url,
        user_id: result.text_of("userId"),
        organization_id,
        password_expired: result.bool_of("passwordExpired"),
        sandbox: result.bool_of("sandbox"),
    })
}

pub(super) fn deploy_result(operation: &str, node: &XmlNode) -> Result<DeployResult> {
    let id = required(operation, node, "id")?;
    let status_text = node.text_of("status").unwrap_or_else(|| "Pending".to_string());
    let status: DeployStatus = status_text
        .parse()
        .map_err(|message: String| Error::invalid_response(operation, message))?;

    let count = |name: &str| node.parse_of::<u32>(name).unwrap_or(0);
    let details = node.child("details");

    let component_failures = details
        .map(|d| d.children("componentFailures").map(component_failure).collect())
        .unwrap_or_default();
    let component_successes = details
        .map(|d| d.children("componentSuccesses").map(component_success).collect())
        .unwrap_or_default();
    let test_failures = details
        .and_then(|d| d.child("runTestResult"))
        .map(|r| r.children("failures").map(test_failure).collect())
        .unwrap_or_default();

    Ok(DeployResult {
        id,
        done: node.bool_of("done"),
        status,
        success: node.bool_of("success"),
        check_only: node.bool_of("checkOnly"),
        error_message: node.text_of("errorMessage"),
        error_status_code: node.text_of("errorStatusCode"),
        number_components_deployed: count("numberComponentsDeployed"),
        number_components_errors: count("numberComponentErrors"),
        number_components_total: count("numberComponentsTotal"),
        number_tests_completed: count("numberTestsCompleted"),
        number_tests_errors: count("numberTestErrors"),
        number_tests_total: count("numberTestsTotal"),
        component_failures,
        component_successes,
        test_failures,
        state_detail: node.text_of("stateDetail"),
    })
}

fn component_failure(node: &XmlNode) -> ComponentFailure {
    ComponentFailure {
        component_type: node.text_of("componentType"),
        file_name: node.text_of("fileName"),
        full_name: node.text_of("fullName"),
        line_number: node.parse_of("lineNumber"),
        column_number: node.parse_of("columnNumber"),
        problem: node.text_of("problem").unwrap_or_default(),
        problem_type: node.text_of("problemType").unwrap_or_default(),
        created: node.bool_of("created"),
        deleted: node.bool_of("deleted"),
    }
}

fn component_success(node: &XmlNode) -> ComponentSuccess {
    ComponentSuccess {
        component_type: node.text_of("componentType"),
        file_name: node.text_of("fileName"),
        full_name: node.text_of("fullName"),
        created: node.bool_of("created"),
        deleted: node.bool_of("deleted"),
    }
}

fn test_failure(node: &XmlNode) -> TestFailure {
    TestFailure {
        name: node.text_of("name"),
        method_name: node.text_of("methodName"),
        message: node.text_of("message"),
        stack_trace: node.text_of("stackTrace"),
        namespace: node.text_of("namespace"),
    }
}

pub(super) fn retrieve_result(operation: &str, node: &XmlNode) -> Result<RetrieveResult> {
    let id = required(operation, node, "id")?;
    let status_text = node.text_of("status").unwrap_or_else(|| "Pending".to_string());
    let status: RetrieveStatus = status_text
        .parse()
        .map_err(|message: String| Error::invalid_response(operation, message))?;

    Ok(RetrieveResult {
        id,
        done: node.bool_of("done"),
        status,
        success: node.bool_of("success"),
        error_message: node.text_of("errorMessage"),
        error_status_code: node.text_of("errorStatusCode"),
        zip_file: node.text_of("zipFile").filter(|zip| !zip.is_empty()),
        file_properties: node.children("fileProperties").map(file_properties).collect(),
        messages: node
            .children("messages")
            .map(|m| RetrieveMessage {
                file_name: m.text_of("fileName").unwrap_or_default(),
                problem: m.text_of("problem").unwrap_or_default(),
            })
            .collect(),
    })
}

pub(super) fn file_properties(node: &XmlNode) -> FileProperties {
    FileProperties {
        created_by_id: node.text_of("createdById"),
        created_by_name: node.text_of("createdByName"),
        created_date: node.text_of("createdDate"),
        file_name: node.text_of("fileName").unwrap_or_default(),
        full_name: node.text_of("fullName").unwrap_or_default(),
        id: node.text_of("id"),
        last_modified_by_id: node.text_of("lastModifiedById"),
        last_modified_by_name: node.text_of("lastModifiedByName"),
        last_modified_date: node.text_of("lastModifiedDate"),
        manageable_state: node.text_of("manageableState"),
        namespace_prefix: node.text_of("namespacePrefix"),
        component_type: node.text_of("type").unwrap_or_default(),
    }
}

pub(super) fn describe_metadata_result(node: &XmlNode) -> DescribeMetadataResult {
    DescribeMetadataResult {
        metadata_objects: node
            .children("metadataObjects")
            .map(|object| MetadataType {
                xml_name: object.text_of("xmlName").unwrap_or_default(),
                directory_name: object.text_of("directoryName"),
                suffix: object.text_of("suffix"),
                meta_file: object.bool_of("metaFile"),
                in_folder: object.bool_of("inFolder"),
                child_xml_names: object.texts_of("childXmlNames"),
            })
            .collect(),
        organization_namespace: node
            .text_of("organizationNamespace")
            .filter(|ns| !ns.is_empty()),
        partial_save_allowed: node.bool_of("partialSaveAllowed"),
        test_required: node.bool_of("testRequired"),
    }
}

pub(super) fn describe_value_type_result(node: &XmlNode) -> DescribeValueTypeResult {
    DescribeValueTypeResult {
        api_creatable: node.bool_of("apiCreatable"),
        api_deletable: node.bool_of("apiDeletable"),
        api_readable: node.bool_of("apiReadable"),
        api_updatable: node.bool_of("apiUpdatable"),
        parent_field: node
            .child("parentField")
            .filter(|field| !field.is_nil())
            .map(value_type_field),
        value_type_fields: node.children("valueTypeFields").map(value_type_field).collect(),
    }
}

fn value_type_field(node: &XmlNode) -> ValueTypeField {
    ValueTypeField {
        name: node.text_of("name").unwrap_or_default(),
        soap_type: node.text_of("soapType").unwrap_or_default(),
        is_foreign_key: node.bool_of("isForeignKey"),
        foreign_key_domain: node.texts_of("foreignKeyDomain"),
        is_name_field: node.bool_of("isNameField"),
        min_occurs: node.parse_of("minOccurs").unwrap_or(0),
        picklist_values: node
            .children("picklistValues")
            .map(|entry| PicklistEntry {
                value: entry.text_of("value").unwrap_or_default(),
                label: entry.text_of("label"),
                active: entry.bool_of("active"),
                default_value: entry.bool_of("defaultValue"),
            })
            .collect(),
        fields: node.children("fields").map(value_type_field).collect(),
    }
}
