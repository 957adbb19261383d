//! The metadata envelope.
//!
//! Serializes heterogeneous component batches for create/update/upsert and
//! single-type selectors for read/delete, and maps per-element results back
//! onto the request order.

use metaforce_client::xml::{self, XmlNode};
use serde_json::Value;

use crate::component::{Component, MetadataRef};
use crate::error::{Error, Result};
use crate::registry::{ComponentKind, ComponentRegistry};
use crate::types::{ElementResult, MetadataError, RemoteFault};

/// Most elements one CRUD call may carry.
pub const MAX_BATCH_SIZE: usize = 10;

/// Reject batches the service would refuse.
pub(crate) fn check_batch(operation: &str, len: usize) -> Result<()> {
    if len > MAX_BATCH_SIZE {
        return Err(Error::validation(
            operation,
            format!(
                "{} elements given, at most {} per call",
                len, MAX_BATCH_SIZE
            ),
        ));
    }
    Ok(())
}

/// Serialize a batch of components into `<metadata>` elements.
///
/// Every component is resolved against the registry before anything is
/// written, so an unknown kind fails the whole batch.
pub(crate) fn encode_components(
    operation: &str,
    registry: &ComponentRegistry,
    components: &[Component],
) -> Result<String> {
    let mut body = String::new();
    for component in components {
        let kind = registry.get(component.type_name()).ok_or_else(|| {
            Error::validation(
                operation,
                format!(
                    "{} has unregistered type {}",
                    component.full_name(),
                    component.type_name()
                ),
            )
        })?;
        body.push_str(&component_element(kind, component));
    }
    Ok(body)
}

/// `<metadata xsi:type="met:{Type}">` with `fullName` first, then the
/// kind's ordered fields, then everything else by name.
pub(crate) fn component_element(kind: &ComponentKind, component: &Component) -> String {
    let fields = component.fields();
    let mut out = format!(r#"<metadata xsi:type="met:{}">"#, xml::escape(&kind.name));
    write_field(&mut out, "fullName", &Value::String(component.full_name().to_string()));

    for name in &kind.field_order {
        if let Some(value) = fields.get(name) {
            write_field(&mut out, name, value);
        }
    }

    let mut rest: Vec<(&String, &Value)> = fields
        .iter()
        .filter(|(name, _)| name.as_str() != "fullName" && !kind.field_order.contains(name))
        .collect();
    rest.sort_by(|a, b| a.0.cmp(b.0));
    for (name, value) in rest {
        write_field(&mut out, name, value);
    }

    out.push_str("</metadata>");
    out
}

fn write_field(out: &mut String, name: &str, value: &Value) {
    let tag = xml::escape(name);
    match value {
        Value::Null => out.push_str(&format!(r#"<{} xsi:nil="true"/>"#, tag)),
        Value::Bool(b) => out.push_str(&format!("<{tag}>{b}</{tag}>")),
        Value::Number(n) => out.push_str(&format!("<{tag}>{n}</{tag}>")),
        Value::String(s) => out.push_str(&format!("<{tag}>{}</{tag}>", xml::escape(s))),
        Value::Array(items) => {
            for item in items {
                write_field(out, name, item);
            }
        }
        Value::Object(map) => {
            out.push_str(&format!("<{tag}>"));
            for (key, inner) in map {
                write_field(out, key, inner);
            }
            out.push_str(&format!("</{tag}>"));
        }
    }
}

/// One type name plus an ordered list of full names, for read and delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataSelector {
    pub type_name: String,
    pub full_names: Vec<String>,
}

impl MetadataSelector {
    pub fn new<I, S>(type_name: impl Into<String>, full_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            type_name: type_name.into(),
            full_names: full_names.into_iter().map(Into::into).collect(),
        }
    }

    /// Group references under their single shared type name.
    ///
    /// References naming more than one type are rejected: the service
    /// addresses exactly one type per read or delete.
    pub fn from_refs(operation: &str, refs: &[MetadataRef]) -> Result<Self> {
        let Some(first) = refs.first() else {
            return Err(Error::validation(operation, "no components given"));
        };
        if let Some(other) = refs.iter().find(|r| r.type_name != first.type_name) {
            return Err(Error::validation(
                operation,
                format!(
                    "mixed types in one call: {} and {}",
                    first.type_name, other.type_name
                ),
            ));
        }
        Ok(Self::new(
            first.type_name.clone(),
            refs.iter().map(|r| r.full_name.clone()),
        ))
    }

    /// Check the selector before dispatch.
    pub(crate) fn validate(&self, operation: &str) -> Result<()> {
        if self.type_name.trim().is_empty() {
            return Err(Error::validation(operation, "type name is required"));
        }
        if let Some(index) = self.full_names.iter().position(|n| n.trim().is_empty()) {
            return Err(Error::validation(
                operation,
                format!("full name at position {} is empty", index),
            ));
        }
        check_batch(operation, self.full_names.len())
    }

    pub(crate) fn to_xml(&self) -> String {
        let mut out = format!("<type>{}</type>", xml::escape(&self.type_name));
        for name in &self.full_names {
            out.push_str(&format!("<fullNames>{}</fullNames>", xml::escape(name)));
        }
        out
    }
}

/// Map `<result>` elements onto the request order.
///
/// The service answers element-for-element in request order; a count
/// mismatch is an invalid response, never silently realigned.
pub(crate) fn element_results<T>(
    operation: &str,
    response: &XmlNode,
    request_names: &[String],
    success: impl Fn(&XmlNode, String) -> T,
) -> Result<Vec<ElementResult<T>>> {
    let results: Vec<&XmlNode> = response.children("result").collect();
    if results.len() != request_names.len() {
        return Err(Error::invalid_response(
            operation,
            format!(
                "expected {} results, got {}",
                request_names.len(),
                results.len()
            ),
        ));
    }

    Ok(results
        .into_iter()
        .zip(request_names)
        .map(|(node, requested)| element_result(operation, node, requested, &success))
        .collect())
}

/// One `<result>` element: success or a fault naming the element.
pub(crate) fn element_result<T>(
    operation: &str,
    node: &XmlNode,
    requested: &str,
    success: impl Fn(&XmlNode, String) -> T,
) -> ElementResult<T> {
    let full_name = node
        .text_of("fullName")
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| requested.to_string());

    if node.bool_of("success") {
        Ok(success(node, full_name))
    } else {
        Err(element_fault(operation, full_name, node))
    }
}

fn element_fault(operation: &str, full_name: String, node: &XmlNode) -> RemoteFault {
    let errors: Vec<MetadataError> = node
        .children("errors")
        .map(|e| MetadataError {
            status_code: e.text_of("statusCode").unwrap_or_default(),
            message: e.text_of("message").unwrap_or_default(),
            fields: e.texts_of("fields"),
        })
        .collect();

    let status_code = errors
        .first()
        .map(|e| e.status_code.clone())
        .unwrap_or_else(|| "UNKNOWN_ERROR".to_string());
    let message = if errors.is_empty() {
        "the service reported failure without details".to_string()
    } else {
        errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    };

    RemoteFault {
        operation: operation.to_string(),
        full_name: Some(full_name),
        status_code,
        message,
        errors,
    }
}

/// Records of a `readMetadata` response.
///
/// Each record is typed by its `xsi:type`, falling back to the requested
/// type. Records without a full name (names the service did not find) are
/// skipped.
pub(crate) fn read_records(
    operation: &str,
    response: &XmlNode,
    requested_type: &str,
) -> Result<Vec<Component>> {
    let Some(result) = response.child("result") else {
        return Ok(Vec::new());
    };

    let mut records = Vec::new();
    for record in result.children("records") {
        if record.is_nil() || record.text_of("fullName").is_none_or(|n| n.is_empty()) {
            continue;
        }
        let type_name = record
            .attribute("type")
            .map(|t| t.rsplit(':').next().unwrap_or(t))
            .unwrap_or(requested_type);

        let component = Component::new(type_name, record.to_json()).map_err(|e| {
            Error::invalid_response(operation, format!("unreadable record: {}", e))
        })?;
        records.push(component);
    }
    Ok(records)
}
