//! Component kind registry.
//!
//! Maps a declared type name to the wire shape of that kind. The envelope
//! only ever consults the registry, so a new kind is supported by calling
//! [`ComponentRegistry::register`].

use std::collections::HashMap;

use crate::component::Component;
use crate::error::{Error, Result};

/// Wire shape of one metadata kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentKind {
    /// Declared type name, sent as `xsi:type="met:{name}"`.
    pub name: String,
    /// Attributes emitted first, in this order, after `fullName`. Remaining
    /// attributes follow in name order.
    pub field_order: Vec<String>,
}

impl ComponentKind {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_order: Vec::new(),
        }
    }

    pub fn with_field_order<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.field_order = fields.into_iter().map(Into::into).collect();
        self
    }
}

const BUILTIN_KINDS: &[(&str, &[&str])] = &[
    (
        "CustomObject",
        &["label", "pluralLabel", "nameField", "deploymentStatus", "sharingModel"],
    ),
    ("CustomField", &["label", "type", "length", "precision", "scale"]),
    ("Layout", &["layoutSections"]),
    ("Profile", &["custom", "description"]),
    ("PermissionSet", &["label", "description"]),
    ("CustomLabels", &["labels"]),
    ("CustomTab", &["label", "motif"]),
    ("ValidationRule", &["active", "errorConditionFormula", "errorMessage"]),
    ("RecordType", &["label", "active"]),
    ("ListView", &["label", "filterScope"]),
    ("WebLink", &["availability", "displayType", "linkType"]),
    ("StaticResource", &["cacheControl", "contentType", "content"]),
    ("Flow", &["label", "processType"]),
    ("CustomMetadata", &["label", "protected", "values"]),
    ("RemoteSiteSetting", &["url", "isActive", "disableProtocolSecurity"]),
    ("ApexPage", &["label", "apiVersion", "content"]),
    ("Workflow", &[]),
    ("Report", &["name", "format", "reportType"]),
    ("Dashboard", &["title", "runningUser"]),
];

/// Registry of known component kinds.
#[derive(Debug, Clone)]
pub struct ComponentRegistry {
    kinds: HashMap<String, ComponentKind>,
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for (name, order) in BUILTIN_KINDS {
            registry.register(ComponentKind::new(*name).with_field_order(order.iter().copied()));
        }
        registry
    }
}

impl ComponentRegistry {
    /// A registry with no kinds.
    pub fn empty() -> Self {
        Self {
            kinds: HashMap::new(),
        }
    }

    /// Add or replace a kind.
    pub fn register(&mut self, kind: ComponentKind) -> &mut Self {
        self.kinds.insert(kind.name.clone(), kind);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ComponentKind> {
        self.kinds.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }

    /// Kind of a component. Unregistered types are rejected.
    pub fn resolve(&self, component: &Component) -> Result<&ComponentKind> {
        self.get(component.type_name()).ok_or_else(|| {
            Error::validation(
                "component",
                format!(
                    "{} has unregistered type {}",
                    component.full_name(),
                    component.type_name()
                ),
            )
        })
    }

    /// Registered type names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.kinds.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
