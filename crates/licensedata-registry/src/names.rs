//! Namespace-qualified names and the vocabularies the registry documents use.

use std::fmt;

pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS_NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const SPDX_NS: &str = "http://spdx.org/rdf/terms#";
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

pub const XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
pub const XSD_INT: &str = "http://www.w3.org/2001/XMLSchema#int";

/// An element or attribute name resolved to its namespace URI.
///
/// The namespace is stored without a trailing `#`, so names built from
/// `http://spdx.org/rdf/terms#` and `http://spdx.org/rdf/terms` are equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QualifiedName {
    namespace: String,
    local: String,
}

impl QualifiedName {
    pub fn new(namespace: &str, local: &str) -> Self {
        Self {
            namespace: normalize_uri(namespace).to_string(),
            local: local.to_string(),
        }
    }

    /// A name in no namespace (unprefixed attributes, unbound prefixes).
    pub fn unqualified(local: &str) -> Self {
        Self::new("", local)
    }

    pub fn rdf(local: &str) -> Self {
        Self::new(RDF_NS, local)
    }

    pub fn rdfs(local: &str) -> Self {
        Self::new(RDFS_NS, local)
    }

    pub fn spdx(local: &str) -> Self {
        Self::new(SPDX_NS, local)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn local_name(&self) -> &str {
        &self.local
    }
}

/// Clark notation: `{namespace}local`.
impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            f.write_str(&self.local)
        } else {
            write!(f, "{{{}}}{}", self.namespace, self.local)
        }
    }
}

/// Strip a trailing fragment marker from a namespace URI.
pub fn normalize_uri(uri: &str) -> &str {
    uri.strip_suffix('#').unwrap_or(uri)
}
