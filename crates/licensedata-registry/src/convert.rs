//! License and exception conversion from SPDX RDF/XML nodes.

use std::sync::LazyLock;

use licensedata_core::{CrossRef, ExceptionDetails, LicenseDetails};
use tracing::warn;

use crate::error::{ConvertError, EntryKind};
use crate::extract::Fields;
use crate::names::QualifiedName;
use crate::namespaces::Namespaces;
use crate::xml::{Document, Element};

/// Registry keys, resolved once and shared by every conversion.
pub struct SpdxKeys {
    pub about: QualifiedName,
    pub listed_license: QualifiedName,
    pub listed_license_exception: QualifiedName,

    pub license_id: QualifiedName,
    pub license_exception_id: QualifiedName,
    pub name: QualifiedName,
    pub comment: QualifiedName,
    pub see_also: QualifiedName,
    pub is_deprecated_license_id: QualifiedName,

    pub license_text: QualifiedName,
    pub license_text_html: QualifiedName,
    pub standard_license_template: QualifiedName,
    pub standard_license_header: QualifiedName,
    pub standard_license_header_html: QualifiedName,
    pub standard_license_header_template: QualifiedName,
    pub is_osi_approved: QualifiedName,
    pub is_fsf_libre: QualifiedName,

    pub license_exception_text: QualifiedName,
    pub exception_text_html: QualifiedName,
    pub license_exception_template: QualifiedName,

    pub cross_ref: QualifiedName,
    pub cross_ref_node: QualifiedName,
    pub order: QualifiedName,
    pub matches: QualifiedName,
    pub url: QualifiedName,
    pub is_valid: QualifiedName,
    pub is_live: QualifiedName,
    pub is_way_back_link: QualifiedName,
    pub timestamp: QualifiedName,
}

static KEYS: LazyLock<SpdxKeys> = LazyLock::new(|| SpdxKeys {
    about: QualifiedName::rdf("about"),
    listed_license: QualifiedName::spdx("ListedLicense"),
    listed_license_exception: QualifiedName::spdx("ListedLicenseException"),

    license_id: QualifiedName::spdx("licenseId"),
    license_exception_id: QualifiedName::spdx("licenseExceptionId"),
    name: QualifiedName::spdx("name"),
    comment: QualifiedName::rdfs("comment"),
    see_also: QualifiedName::rdfs("seeAlso"),
    is_deprecated_license_id: QualifiedName::spdx("isDeprecatedLicenseId"),

    license_text: QualifiedName::spdx("licenseText"),
    license_text_html: QualifiedName::spdx("licenseTextHtml"),
    standard_license_template: QualifiedName::spdx("standardLicenseTemplate"),
    standard_license_header: QualifiedName::spdx("standardLicenseHeader"),
    standard_license_header_html: QualifiedName::spdx("standardLicenseHeaderHtml"),
    standard_license_header_template: QualifiedName::spdx("standardLicenseHeaderTemplate"),
    is_osi_approved: QualifiedName::spdx("isOsiApproved"),
    is_fsf_libre: QualifiedName::spdx("isFsfLibre"),

    license_exception_text: QualifiedName::spdx("licenseExceptionText"),
    exception_text_html: QualifiedName::spdx("exceptionTextHtml"),
    license_exception_template: QualifiedName::spdx("licenseExceptionTemplate"),

    cross_ref: QualifiedName::spdx("crossRef"),
    cross_ref_node: QualifiedName::spdx("CrossRef"),
    order: QualifiedName::spdx("order"),
    matches: QualifiedName::spdx("match"),
    url: QualifiedName::spdx("url"),
    is_valid: QualifiedName::spdx("isValid"),
    is_live: QualifiedName::spdx("isLive"),
    is_way_back_link: QualifiedName::spdx("isWayBackLink"),
    timestamp: QualifiedName::spdx("timestamp"),
});

pub fn keys() -> &'static SpdxKeys {
    &KEYS
}

/// A single converted entry of either kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ListedEntry {
    License(LicenseDetails),
    Exception(ExceptionDetails),
}

/// Candidate identifier taken from the final path segment of `rdf:about`.
pub fn candidate_id(node: &Element) -> Option<String> {
    let about = node.attribute(&keys().about)?;
    about
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// Convert one `spdx:ListedLicense` node.
///
/// The node's own `spdx:licenseId` wins over `candidate_id`. Fails only when
/// neither yields a non-empty identifier.
pub fn convert_license(
    candidate_id: Option<&str>,
    node: &Element,
    namespaces: &Namespaces,
) -> Result<LicenseDetails, ConvertError> {
    let k = keys();
    let fields = Fields::new(node, namespaces);
    let license_id = resolve_id(&fields, &k.license_id, candidate_id).ok_or_else(|| {
        ConvertError::MissingIdentifier {
            kind: EntryKind::License,
            about: fields.attribute(&k.about).map(str::to_string),
        }
    })?;

    Ok(LicenseDetails {
        license_id,
        name: fields.string(&k.name),
        license_text: fields.string(&k.license_text),
        license_text_html: fields.string(&k.license_text_html),
        standard_license_template: fields.string(&k.standard_license_template),
        standard_license_header: fields.string(&k.standard_license_header),
        standard_license_header_html: fields.string(&k.standard_license_header_html),
        standard_license_header_template: fields.string(&k.standard_license_header_template),
        license_comments: fields.string(&k.comment),
        is_deprecated_license_id: fields.boolean(&k.is_deprecated_license_id, false),
        is_osi_approved: fields.boolean(&k.is_osi_approved, false),
        is_fsf_libre: fields.boolean(&k.is_fsf_libre, false),
        see_also: fields.strings(&k.see_also),
        cross_ref: cross_refs(&fields),
    })
}

/// Convert one `spdx:ListedLicenseException` node.
pub fn convert_exception(
    candidate_id: Option<&str>,
    node: &Element,
    namespaces: &Namespaces,
) -> Result<ExceptionDetails, ConvertError> {
    let k = keys();
    let fields = Fields::new(node, namespaces);
    let license_exception_id = resolve_id(&fields, &k.license_exception_id, candidate_id)
        .ok_or_else(|| ConvertError::MissingIdentifier {
            kind: EntryKind::Exception,
            about: fields.attribute(&k.about).map(str::to_string),
        })?;

    Ok(ExceptionDetails {
        license_exception_id,
        name: fields.string(&k.name),
        license_exception_text: fields.string(&k.license_exception_text),
        license_exception_text_html: fields.string(&k.exception_text_html),
        license_exception_template: fields.string(&k.license_exception_template),
        license_comments: fields.string(&k.comment),
        is_deprecated_license_id: fields.boolean(&k.is_deprecated_license_id, false),
        see_also: fields.strings(&k.see_also),
        cross_ref: cross_refs(&fields),
    })
}

/// Convert every `spdx:ListedLicense` directly under the root.
///
/// A node without any identifier aborts the whole batch.
pub fn listed_licenses(doc: &Document) -> Result<Vec<LicenseDetails>, ConvertError> {
    doc.root
        .children(&keys().listed_license)
        .iter()
        .map(|node| convert_license(candidate_id(node).as_deref(), node, &doc.namespaces))
        .collect()
}

/// Convert every `spdx:ListedLicenseException` directly under the root.
pub fn listed_exceptions(doc: &Document) -> Result<Vec<ExceptionDetails>, ConvertError> {
    doc.root
        .children(&keys().listed_license_exception)
        .iter()
        .map(|node| convert_exception(candidate_id(node).as_deref(), node, &doc.namespaces))
        .collect()
}

/// Convert a single-entry document holding either a license or an exception.
///
/// Returns `Ok(None)` when the document holds neither.
pub fn convert_document(
    doc: &Document,
    candidate_id: &str,
) -> Result<Option<ListedEntry>, ConvertError> {
    let k = keys();
    let candidate = Some(candidate_id).filter(|id| !id.is_empty());

    let license = std::iter::once(&doc.root)
        .filter(|root| root.name == k.listed_license)
        .chain(doc.root.children(&k.listed_license))
        .next();
    if let Some(node) = license {
        return convert_license(candidate, node, &doc.namespaces)
            .map(|details| Some(ListedEntry::License(details)));
    }

    let exception = std::iter::once(&doc.root)
        .filter(|root| root.name == k.listed_license_exception)
        .chain(doc.root.children(&k.listed_license_exception))
        .next();
    if let Some(node) = exception {
        return convert_exception(candidate, node, &doc.namespaces)
            .map(|details| Some(ListedEntry::Exception(details)));
    }

    Ok(None)
}

fn resolve_id(fields: &Fields<'_>, key: &QualifiedName, candidate: Option<&str>) -> Option<String> {
    fields
        .string(key)
        .filter(|id| !id.is_empty())
        .or_else(|| candidate.map(str::trim).filter(|id| !id.is_empty()).map(str::to_string))
}

fn cross_refs(fields: &Fields<'_>) -> Vec<CrossRef> {
    let k = keys();
    fields.node().shape(&k.cross_ref).filter_map(|wrapper| {
        let Some(node) = wrapper.children(&k.cross_ref_node).first() else {
            warn!("crossRef without a CrossRef node, skipping");
            return None;
        };
        let cross = Fields::new(node, fields.namespaces());
        Some(CrossRef {
            order: cross.integer(&k.order, 0),
            matches: cross.boolean(&k.matches, false).to_string(),
            url: cross.string(&k.url).unwrap_or_default(),
            is_valid: cross.boolean(&k.is_valid, false),
            is_live: cross.boolean(&k.is_live, false),
            is_way_back_link: cross.boolean(&k.is_way_back_link, false),
            timestamp: cross.string(&k.timestamp),
        })
    })
}
