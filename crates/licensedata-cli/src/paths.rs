//! Output path resolution for the two documents.

use std::path::{Path, PathBuf};

pub const LICENSES_FILENAME: &str = "licenses.json";
pub const EXCEPTIONS_FILENAME: &str = "exceptions.json";

/// Resolve a user-supplied output path.
///
/// No path means `default_dir/filename`; an existing directory gets
/// `filename` appended; anything else (an existing file or a path that does
/// not exist yet) is used as given. Nothing is created here.
pub fn resolve_output_path(path: Option<&Path>, default_dir: &Path, filename: &str) -> PathBuf {
    match path {
        None => default_dir.join(filename),
        Some(path) if path.is_dir() => path.join(filename),
        Some(path) => path.to_path_buf(),
    }
}

/// Both output paths: licenses default to `cwd`, exceptions to the directory
/// holding the licenses file.
pub fn resolve_output_paths(
    licenses: Option<&Path>,
    exceptions: Option<&Path>,
    cwd: &Path,
) -> (PathBuf, PathBuf) {
    let licenses = resolve_output_path(licenses, cwd, LICENSES_FILENAME);
    let alongside = licenses
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let exceptions = resolve_output_path(exceptions, alongside, EXCEPTIONS_FILENAME);
    (licenses, exceptions)
}
