//! Describe results.

use serde::{Deserialize, Serialize};

/// Result of `describeMetadata`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeMetadataResult {
    pub metadata_objects: Vec<MetadataType>,
    pub organization_namespace: Option<String>,
    pub partial_save_allowed: bool,
    pub test_required: bool,
}

/// A metadata type definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataType {
    pub xml_name: String,
    pub directory_name: Option<String>,
    pub suffix: Option<String>,
    pub meta_file: bool,
    pub in_folder: bool,
    pub child_xml_names: Vec<String>,
}

/// Result of `describeValueType`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeValueTypeResult {
    pub api_creatable: bool,
    pub api_deletable: bool,
    pub api_readable: bool,
    pub api_updatable: bool,
    pub parent_field: Option<ValueTypeField>,
    pub value_type_fields: Vec<ValueTypeField>,
}

/// One field of a value type. Nested fields describe complex types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueTypeField {
    pub name: String,
    pub soap_type: String,
    pub is_foreign_key: bool,
    pub foreign_key_domain: Vec<String>,
    pub is_name_field: bool,
    pub min_occurs: u32,
    pub picklist_values: Vec<PicklistEntry>,
    pub fields: Vec<ValueTypeField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PicklistEntry {
    pub value: String,
    pub label: Option<String>,
    pub active: bool,
    pub default_value: bool,
}
