use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use licensedata_core::OutputOptions;
use licensedata_sync::{
    DEFAULT_UPDATE_FREQUENCY_HOURS, FailurePolicy, GenerateOptions, RegistrySource,
    SPDX_EXCEPTIONS_INDEX_URL, SPDX_LICENSES_INDEX_URL, SPDX_LICENSES_RDF_URL,
};

#[derive(Parser, Debug)]
#[command(
    name = "licensedata",
    about = "Create or update SPDX license and exception data files",
    version
)]
pub struct Cli {
    /// Licenses file, or a directory to place licenses.json in [default: ./licenses.json]
    #[arg(short, long, value_name = "PATH")]
    pub licenses: Option<PathBuf>,

    /// Exceptions file, or a directory to place exceptions.json in [default: next to the licenses file]
    #[arg(short, long, value_name = "PATH")]
    pub exceptions: Option<PathBuf>,

    /// Leave license and exception texts out
    #[arg(long)]
    pub exclude_text: bool,

    /// Leave HTML renderings out
    #[arg(long)]
    pub exclude_html: bool,

    /// Leave matching templates out
    #[arg(long)]
    pub exclude_templates: bool,

    /// Leave comments out
    #[arg(long)]
    pub exclude_comments: bool,

    /// Report progress and per-field diagnostics
    #[arg(short, long, env = "LICENSEDATA_VERBOSE")]
    pub verbose: bool,

    /// Regenerate files older than this many hours
    #[arg(
        long,
        value_name = "HOURS",
        env = "LICENSEDATA_UPDATE_FREQUENCY",
        default_value_t = DEFAULT_UPDATE_FREQUENCY_HOURS
    )]
    pub update_frequency: u32,

    /// Registry document layout to download
    #[arg(long, value_enum, env = "LICENSEDATA_SOURCE", default_value_t = SourceKind::Rdf)]
    pub source: SourceKind,

    /// Registry document URL (the licenses index for json-index)
    #[arg(long, value_name = "URL", env = "LICENSEDATA_URL")]
    pub url: Option<String>,

    /// Exceptions index URL for json-index
    #[arg(long, value_name = "URL", env = "LICENSEDATA_EXCEPTIONS_URL")]
    pub exceptions_url: Option<String>,

    /// Retry failed downloads this many times before continuing without them
    #[arg(long, value_name = "N", env = "LICENSEDATA_RETRIES", conflicts_with = "strict")]
    pub on_failure_retries: Option<u32>,

    /// Fail instead of writing empty data when the registry cannot be downloaded
    #[arg(long, env = "LICENSEDATA_STRICT")]
    pub strict: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// One RDF/XML document with every entry inline
    Rdf,
    /// JSON index plus one detail document per entry
    JsonIndex,
}

impl Cli {
    pub fn generate_options(&self) -> GenerateOptions {
        GenerateOptions {
            output: OutputOptions {
                exclude_text: self.exclude_text,
                exclude_html: self.exclude_html,
                exclude_templates: self.exclude_templates,
                exclude_comments: self.exclude_comments,
            },
            verbose: self.verbose,
            update_frequency_hours: self.update_frequency,
            source: self.registry_source(),
            on_failure: self.failure_policy(),
        }
    }

    fn registry_source(&self) -> RegistrySource {
        match self.source {
            SourceKind::Rdf => RegistrySource::Rdf {
                url: self.url.clone().unwrap_or_else(|| SPDX_LICENSES_RDF_URL.into()),
            },
            SourceKind::JsonIndex => RegistrySource::JsonIndex {
                licenses_url: self
                    .url
                    .clone()
                    .unwrap_or_else(|| SPDX_LICENSES_INDEX_URL.into()),
                exceptions_url: self
                    .exceptions_url
                    .clone()
                    .unwrap_or_else(|| SPDX_EXCEPTIONS_INDEX_URL.into()),
            },
        }
    }

    fn failure_policy(&self) -> FailurePolicy {
        match (self.strict, self.on_failure_retries) {
            (true, _) => FailurePolicy::Propagate,
            (false, Some(n)) => FailurePolicy::Retry(n),
            (false, None) => FailurePolicy::UseEmpty,
        }
    }
}
