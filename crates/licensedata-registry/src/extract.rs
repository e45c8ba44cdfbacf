//! Scalar field extraction from namespaced nodes.
//!
//! Upstream registry data is inconsistently typed. None of these extractors
//! fail: a missing child yields the default, and a datatype marker that does
//! not match the expected XML Schema type is logged and then ignored.

use std::sync::LazyLock;

use licensedata_core::Shape;
use tracing::warn;

use crate::names::{QualifiedName, XSD_BOOLEAN, XSD_INT};
use crate::namespaces::Namespaces;
use crate::xml::Element;

static RDF_DATATYPE: LazyLock<QualifiedName> = LazyLock::new(|| QualifiedName::rdf("datatype"));

/// Typed field access over one node of a parsed document.
#[derive(Clone, Copy)]
pub struct Fields<'a> {
    node: &'a Element,
    namespaces: &'a Namespaces,
}

impl<'a> Fields<'a> {
    pub fn new(node: &'a Element, namespaces: &'a Namespaces) -> Self {
        Self { node, namespaces }
    }

    pub fn node(&self) -> &'a Element {
        self.node
    }

    pub fn namespaces(&self) -> &'a Namespaces {
        self.namespaces
    }

    /// Boolean child value, or `default` when the child is absent or empty.
    pub fn boolean(&self, key: &QualifiedName, default: bool) -> bool {
        let Some((child, text)) = self.typed_child(key) else {
            return default;
        };
        self.check_datatype(key, child, XSD_BOOLEAN, "boolean");
        match text.trim() {
            "true" | "1" => true,
            "false" | "0" => false,
            other => {
                warn!(
                    field = %self.namespaces.display(key),
                    value = other,
                    "unparseable boolean, using default"
                );
                default
            }
        }
    }

    /// Integer child value, or `default` when the child is absent or empty.
    pub fn integer(&self, key: &QualifiedName, default: i64) -> i64 {
        let Some((child, text)) = self.typed_child(key) else {
            return default;
        };
        self.check_datatype(key, child, XSD_INT, "integer");
        match text.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!(
                    field = %self.namespaces.display(key),
                    value = text.trim(),
                    "unparseable integer, using default"
                );
                default
            }
        }
    }

    /// Trimmed text of a single child that carries nothing but text.
    pub fn string(&self, key: &QualifiedName) -> Option<String> {
        match self.node.shape(key) {
            Shape::Single(child) => plain_text(child),
            _ => None,
        }
    }

    /// Every plain-text child named `key`, as a sequence.
    ///
    /// Absent yields an empty sequence; a lone child that is not plain text
    /// yields an empty sequence too.
    pub fn strings(&self, key: &QualifiedName) -> Vec<String> {
        self.node.shape(key).filter_map(plain_text)
    }

    pub fn attribute(&self, key: &QualifiedName) -> Option<&'a str> {
        self.node.attribute(key)
    }

    fn typed_child(&self, key: &QualifiedName) -> Option<(&'a Element, &'a str)> {
        match self.node.shape(key) {
            Shape::Single(child) => child.text.as_deref().map(|text| (child, text)),
            _ => None,
        }
    }

    fn check_datatype(&self, key: &QualifiedName, child: &Element, expected: &str, kind: &str) {
        let found = child.attribute(&RDF_DATATYPE);
        if found != Some(expected) {
            warn!(
                field = %self.namespaces.display(key),
                datatype = found.unwrap_or("<none>"),
                expected,
                "unexpected datatype for {kind}"
            );
        }
    }
}

fn plain_text(child: &Element) -> Option<String> {
    if !child.is_plain() {
        return None;
    }
    child.text.as_deref().map(|text| text.trim().to_string())
}
