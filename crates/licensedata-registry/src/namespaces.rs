//! Namespace prefix resolution from `xmlns` declarations.

use std::collections::HashMap;

use crate::names::{QualifiedName, XML_NS, normalize_uri};

const DECLARATION_MARKER: &str = "xmlns";

/// Bidirectional prefix ↔ URI mapping built from `xmlns` declarations.
///
/// Lookups never fail: an unknown URI maps to the empty prefix and an
/// unbound prefix resolves to a name no registry key will ever match.
#[derive(Debug, Clone, Default)]
pub struct Namespaces {
    by_prefix: HashMap<String, String>,
    by_uri: HashMap<String, String>,
}

impl Namespaces {
    /// Build from raw attribute name/value pairs, e.g. `("xmlns:spdx", "http://spdx.org/rdf/terms#")`.
    ///
    /// Attributes that are not declarations are ignored.
    pub fn from_declarations<'a, I>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut namespaces = Self::default();
        namespaces.extend(attributes);
        namespaces
    }

    /// Add declarations on top of the current mapping; later prefixes shadow earlier ones.
    pub fn extend<'a, I>(&mut self, attributes: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (name, uri) in attributes {
            if let Some(prefix) = declared_prefix(name) {
                self.declare(prefix, uri);
            }
        }
    }

    pub fn declare(&mut self, prefix: &str, uri: &str) {
        self.by_prefix.insert(prefix.to_string(), uri.to_string());
        self.by_uri.insert(uri.to_string(), prefix.to_string());
        self.by_uri
            .insert(normalize_uri(uri).to_string(), prefix.to_string());
    }

    /// Prefix declared for `uri`, or `""` when none is.
    pub fn by_uri(&self, uri: &str) -> &str {
        self.by_uri
            .get(uri)
            .or_else(|| self.by_uri.get(normalize_uri(uri)))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// URI bound to `prefix` (`""` is the default namespace).
    pub fn uri(&self, prefix: &str) -> Option<&str> {
        match prefix {
            "xml" => Some(XML_NS),
            _ => self.by_prefix.get(prefix).map(String::as_str),
        }
    }

    /// Resolve a raw `prefix:local` name.
    ///
    /// Unprefixed attributes are in no namespace; unprefixed elements take the
    /// default namespace.
    pub fn resolve(&self, raw: &str, is_attribute: bool) -> QualifiedName {
        let (prefix, local) = match raw.split_once(':') {
            Some((prefix, local)) => (prefix, local),
            None if is_attribute => return QualifiedName::unqualified(raw),
            None => ("", raw),
        };
        match self.uri(prefix) {
            Some(uri) => QualifiedName::new(uri, local),
            None if prefix.is_empty() => QualifiedName::unqualified(local),
            None => {
                tracing::debug!(name = raw, "unbound namespace prefix");
                QualifiedName::unqualified(raw)
            }
        }
    }

    /// Render a name the way the source document would spell it.
    pub fn display(&self, name: &QualifiedName) -> String {
        if name.namespace().is_empty() {
            return name.local_name().to_string();
        }
        match self.by_uri(name.namespace()) {
            "" => name.to_string(),
            prefix => format!("{prefix}:{}", name.local_name()),
        }
    }
}

/// The prefix an attribute declares, if it is a namespace declaration.
///
/// `xmlns:spdx` declares `spdx`; a bare `xmlns` declares the default (`""`).
pub fn declared_prefix(attribute: &str) -> Option<&str> {
    let rest = attribute.strip_prefix(DECLARATION_MARKER)?;
    if rest.is_empty() {
        Some("")
    } else {
        rest.strip_prefix(':')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::{RDF_NS, SPDX_NS};

    fn spdx_root() -> Namespaces {
        Namespaces::from_declarations([
            ("xmlns:rdf", RDF_NS),
            ("xmlns:spdx", SPDX_NS),
            ("xmlns:rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
            ("version", "1.0"),
        ])
    }

    #[test]
    fn by_uri_finds_declared_prefix() {
        let ns = spdx_root();
        assert_eq!(ns.by_uri(SPDX_NS), "spdx");
        assert_eq!(ns.by_uri(RDF_NS), "rdf");
    }

    #[test]
    fn by_uri_tolerates_missing_fragment_marker() {
        let ns = spdx_root();
        assert_eq!(ns.by_uri("http://spdx.org/rdf/terms"), "spdx");

        let ns = Namespaces::from_declarations([("xmlns:spdx", "http://spdx.org/rdf/terms")]);
        assert_eq!(ns.by_uri(SPDX_NS), "spdx");
    }

    #[test]
    fn unknown_uri_is_empty_prefix() {
        assert_eq!(spdx_root().by_uri("http://example.org/nope#"), "");
        assert_eq!(Namespaces::default().by_uri(SPDX_NS), "");
    }

    #[test]
    fn non_declarations_are_ignored() {
        let ns = spdx_root();
        assert_eq!(ns.uri("version"), None);
        assert_eq!(declared_prefix("xmlnsfoo"), None);
        assert_eq!(declared_prefix("xmlns"), Some(""));
        assert_eq!(declared_prefix("xmlns:x"), Some("x"));
    }

    #[test]
    fn resolve_prefixed_and_default_names() {
        let mut ns = spdx_root();
        ns.declare("", "http://example.org/default");

        assert_eq!(
            ns.resolve("spdx:licenseId", false),
            QualifiedName::spdx("licenseId")
        );
        assert_eq!(
            ns.resolve("entry", false),
            QualifiedName::new("http://example.org/default", "entry")
        );
        assert_eq!(
            ns.resolve("about", true),
            QualifiedName::unqualified("about")
        );
    }

    #[test]
    fn unbound_prefix_never_matches_registry_keys() {
        let resolved = spdx_root().resolve("other:licenseId", false);
        assert_ne!(resolved, QualifiedName::spdx("licenseId"));
        assert_eq!(resolved.namespace(), "");
    }

    #[test]
    fn display_uses_document_prefix() {
        let ns = spdx_root();
        assert_eq!(ns.display(&QualifiedName::spdx("isOsiApproved")), "spdx:isOsiApproved");
        assert_eq!(
            Namespaces::default().display(&QualifiedName::spdx("name")),
            "{http://spdx.org/rdf/terms}name"
        );
    }
}
