//! XML utilities for SOAP payloads.
//!
//! Outbound XML is built from templates; every caller-supplied value MUST
//! go through [`escape`]. Inbound XML is parsed into an owned [`XmlNode`]
//! tree with namespace prefixes stripped from element and attribute names.

use std::str::FromStr;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Error, ErrorKind, Result};

/// Escape a string for safe inclusion in XML content.
///
/// This escapes the five predefined XML entities.
///
/// # Example
///
/// ```rust
/// use metaforce_client::xml;
///
/// let safe = xml::escape("Hello <World> & 'Friends'");
/// assert_eq!(safe, "Hello &lt;World&gt; &amp; &apos;Friends&apos;");
/// ```
#[must_use]
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 16);
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// An element of a parsed XML document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    /// Local name, without namespace prefix.
    pub name: String,
    /// Attributes as (local name, unescaped value).
    pub attributes: Vec<(String, String)>,
    /// Concatenated, unescaped text content.
    pub text: String,
    /// Child elements in document order.
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Parse a document and return its root element.
    pub fn parse(xml: &str) -> Result<XmlNode> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlNode> = Vec::new();
        let mut root: Option<XmlNode> = None;

        loop {
            match reader.read_event()? {
                Event::Start(start) => stack.push(Self::open(&start)?),
                Event::Empty(start) => {
                    let node = Self::open(&start)?;
                    Self::attach(&mut stack, &mut root, node);
                }
                Event::End(_) => {
                    let node = stack.pop().ok_or_else(|| {
                        Error::new(ErrorKind::Xml("unbalanced closing tag".to_string()))
                    })?;
                    Self::attach(&mut stack, &mut root, node);
                }
                Event::Text(text) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&text.unescape()?);
                    }
                }
                Event::CData(data) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(Error::new(ErrorKind::Xml(
                "document ended inside an element".to_string(),
            )));
        }

        root.ok_or_else(|| Error::new(ErrorKind::Xml("document has no root element".to_string())))
    }

    fn open(start: &BytesStart<'_>) -> Result<XmlNode> {
        let name = local_str(start.local_name().as_ref())?;
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| Error::with_source(ErrorKind::Xml(e.to_string()), e))?;
            let key = local_str(attr.key.local_name().as_ref())?;
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(XmlNode {
            name,
            attributes,
            ..Default::default()
        })
    }

    fn attach(stack: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) {
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => {
                if root.is_none() {
                    *root = Some(node);
                }
            }
        }
    }

    /// Value of an attribute by local name (`xsi:type` is `type`).
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// True for `xsi:nil="true"` elements.
    pub fn is_nil(&self) -> bool {
        self.attribute("nil") == Some("true")
    }

    /// First child with the given local name.
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All children with the given local name.
    pub fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text of the first child with the given name. Absent and nil children
    /// yield `None`.
    pub fn text_of(&self, name: &str) -> Option<String> {
        self.child(name)
            .filter(|c| !c.is_nil())
            .map(|c| c.text.clone())
    }

    /// Text of every child with the given name.
    pub fn texts_of(&self, name: &str) -> Vec<String> {
        self.children(name).map(|c| c.text.clone()).collect()
    }

    /// `true` only if the child exists and reads `true`.
    pub fn bool_of(&self, name: &str) -> bool {
        self.child(name).map(|c| c.text == "true").unwrap_or(false)
    }

    /// Child text parsed as `T`; unparsable values yield `None`.
    pub fn parse_of<T: FromStr>(&self, name: &str) -> Option<T> {
        self.child(name).and_then(|c| c.text.parse().ok())
    }

    /// Convert the element's content to JSON.
    ///
    /// Leaves become strings, nil elements become `null`, repeated child
    /// names become arrays. Attributes are not carried over.
    pub fn to_json(&self) -> serde_json::Value {
        if self.is_nil() {
            return serde_json::Value::Null;
        }
        if self.children.is_empty() {
            return serde_json::Value::String(self.text.clone());
        }

        let mut map = serde_json::Map::new();
        for child in &self.children {
            let value = child.to_json();
            match map.get_mut(&child.name) {
                Some(serde_json::Value::Array(items)) if self.repeats(&child.name) => {
                    items.push(value)
                }
                Some(_) => {}
                None => {
                    let value = if self.repeats(&child.name) {
                        serde_json::Value::Array(vec![value])
                    } else {
                        value
                    };
                    map.insert(child.name.clone(), value);
                }
            }
        }
        serde_json::Value::Object(map)
    }

    fn repeats(&self, name: &str) -> bool {
        self.children(name).nth(1).is_some()
    }
}

fn local_str(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| Error::with_source(ErrorKind::Xml(e.to_string()), e))
}
