//! Typed structs for common metadata kinds.
//!
//! Only the most used attributes are modelled. Anything else can be carried
//! through an untyped [`Component`](crate::Component).

use serde::{Deserialize, Serialize};

use crate::component::TypedMetadata;

/// A custom object definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomObject {
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plural_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sharing_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_field: Option<NameField>,
}

impl TypedMetadata for CustomObject {
    const TYPE_NAME: &'static str = "CustomObject";
}

/// The name field of a custom object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameField {
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
}

/// A custom field. `full_name` is `Object__c.Field__c`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomField {
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TypedMetadata for CustomField {
    const TYPE_NAME: &'static str = "CustomField";
}

/// A page layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layout_sections: Vec<LayoutSection>,
}

impl TypedMetadata for Layout {
    const TYPE_NAME: &'static str = "Layout";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub style: String,
}

/// A profile. Only field permissions are modelled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_permissions: Vec<FieldPermission>,
}

impl TypedMetadata for Profile {
    const TYPE_NAME: &'static str = "Profile";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldPermission {
    pub field: String,
    pub editable: bool,
    pub readable: bool,
}
