//! Metadata components.
//!
//! A [`Component`] is one typed unit of remote configuration: a declared
//! type name, a full name, and an attribute bag. Kinds are open-ended; the
//! envelope looks up how to serialize a component in the
//! [`ComponentRegistry`](crate::ComponentRegistry) by its type name.

use std::sync::LazyLock;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Key under which an attribute bag may name its own type.
///
/// Present in records read back from the service; when supplied on input it
/// must agree with the declared type.
pub const TYPE_KEY: &str = "@type";

static NAME_PATTERN: LazyLock<Option<regex_lite::Regex>> =
    LazyLock::new(|| regex_lite::Regex::new(r"^[A-Za-z_][A-Za-z0-9_.\-]*$").ok());

/// Whether `name` can be written as an XML element name.
fn is_element_name(name: &str) -> bool {
    NAME_PATTERN.as_ref().is_some_and(|re| re.is_match(name))
}

/// Reject attribute keys that cannot become element names, at any depth.
fn check_names(type_name: &str, fields: &Map<String, Value>) -> Result<()> {
    for (key, value) in fields {
        if !is_element_name(key) {
            return Err(Error::validation(
                "component",
                format!("{} attribute '{}' is not a valid element name", type_name, key),
            ));
        }
        check_value(type_name, value)?;
    }
    Ok(())
}

fn check_value(type_name: &str, value: &Value) -> Result<()> {
    match value {
        Value::Object(map) => check_names(type_name, map),
        Value::Array(items) => items.iter().try_for_each(|item| check_value(type_name, item)),
        _ => Ok(()),
    }
}

/// A metadata type with a fixed type name, serializable to an attribute bag.
pub trait TypedMetadata: Serialize {
    /// Declared type name, e.g. `CustomObject`.
    const TYPE_NAME: &'static str;
}

/// Type name plus full name of a component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetadataRef {
    pub type_name: String,
    pub full_name: String,
}

impl MetadataRef {
    pub fn new(type_name: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            full_name: full_name.into(),
        }
    }
}

/// A metadata component resolvable to exactly one type name.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    type_name: String,
    full_name: String,
    fields: Map<String, Value>,
}

impl Component {
    /// Build a component from a type name and a JSON object.
    ///
    /// The object must contain a non-empty `fullName`. An untyped component
    /// (empty type name) or one whose `@type` disagrees with `type_name` is
    /// rejected, as is any attribute key (at any depth) that is not a valid
    /// XML element name.
    pub fn new(type_name: impl Into<String>, fields: Value) -> Result<Self> {
        let type_name = type_name.into();
        if type_name.trim().is_empty() {
            return Err(Error::validation(
                "component",
                "component has no declared type name",
            ));
        }
        if !is_element_name(&type_name) {
            return Err(Error::validation(
                "component",
                format!("'{}' is not a valid type name", type_name),
            ));
        }

        let Value::Object(mut fields) = fields else {
            return Err(Error::validation(
                "component",
                format!("{} attributes must be a JSON object", type_name),
            ));
        };

        match fields.remove(TYPE_KEY) {
            None => {}
            Some(Value::String(declared)) if declared == type_name => {}
            Some(other) => {
                return Err(Error::validation(
                    "component",
                    format!(
                        "ambiguous type: declared {} but attributes say {}",
                        type_name, other
                    ),
                ))
            }
        }

        check_names(&type_name, &fields)?;

        let full_name = match fields.get("fullName") {
            Some(Value::String(name)) if !name.is_empty() => name.clone(),
            _ => {
                return Err(Error::validation(
                    "component",
                    format!("{} component is missing fullName", type_name),
                ))
            }
        };

        Ok(Self {
            type_name,
            full_name,
            fields,
        })
    }

    /// Build a component from a typed value.
    pub fn from_typed<T: TypedMetadata>(value: &T) -> Result<Self> {
        let fields = serde_json::to_value(value).map_err(|e| {
            Error::with_source(
                crate::error::ErrorKind::Validation {
                    operation: "component".to_string(),
                    message: format!("cannot serialize {}: {}", T::TYPE_NAME, e),
                },
                e,
            )
        })?;
        Self::new(T::TYPE_NAME, fields)
    }

    /// Convert back into a typed value. Fails if the type names differ.
    pub fn into_typed<T: TypedMetadata + DeserializeOwned>(self) -> Result<T> {
        if self.type_name != T::TYPE_NAME {
            return Err(Error::validation(
                "component",
                format!("{} is a {}, not a {}", self.full_name, self.type_name, T::TYPE_NAME),
            ));
        }
        serde_json::from_value(Value::Object(self.fields)).map_err(|e| {
            Error::with_source(
                crate::error::ErrorKind::Validation {
                    operation: "component".to_string(),
                    message: format!("cannot read {}: {}", T::TYPE_NAME, e),
                },
                e,
            )
        })
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// All attributes, `fullName` included.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn to_ref(&self) -> MetadataRef {
        MetadataRef::new(&self.type_name, &self.full_name)
    }
}
