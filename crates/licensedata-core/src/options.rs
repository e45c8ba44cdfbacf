//! Output configuration applied when converter output becomes a persisted record.

/// Which optional text fields to leave out of the persisted documents.
///
/// Identifiers, names, flags and the `seeAlso`/`crossRef` sequences are
/// always written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputOptions {
    /// Drop `licenseText` / `licenseExceptionText` and the plain `standardLicenseHeader`.
    pub exclude_text: bool,
    /// Drop the HTML renderings of texts and headers.
    pub exclude_html: bool,
    /// Drop license, header and exception templates.
    pub exclude_templates: bool,
    /// Drop `licenseComments`.
    pub exclude_comments: bool,
}
