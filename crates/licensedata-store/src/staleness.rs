//! Cache freshness decisions for the persisted documents.
//!
//! File modification time is the only freshness signal; a file that no
//! longer parses as JSON (for example one truncated by an interrupted write)
//! is treated exactly like a missing one.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use serde::de::IgnoredAny;
use tracing::debug;

/// Oldest acceptable modification time for a cache refreshed every `hours`.
pub fn staleness_threshold(now: DateTime<Utc>, hours: u32) -> DateTime<Utc> {
    now - Duration::hours(i64::from(hours))
}

/// True when `path` must be regenerated.
///
/// That is the case when the file does not exist, was last modified strictly
/// before `threshold`, or does not contain well-formed JSON. Read errors count
/// as "needs update"; this never fails and has no side effects.
pub fn needs_update(path: &Path, threshold: DateTime<Utc>) -> bool {
    let modified = match std::fs::metadata(path).and_then(|meta| meta.modified()) {
        Ok(modified) => DateTime::<Utc>::from(modified),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no usable cache file");
            return true;
        }
    };
    if modified < threshold {
        debug!(path = %path.display(), %modified, %threshold, "cache file is stale");
        return true;
    }

    match std::fs::read(path) {
        Ok(raw) => match serde_json::from_slice::<IgnoredAny>(&raw) {
            Ok(_) => false,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "cache file is not valid JSON");
                true
            }
        },
        Err(e) => {
            debug!(path = %path.display(), error = %e, "cache file unreadable");
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration as StdDuration, SystemTime};

    fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn missing_file_needs_update() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(needs_update(&tmp.path().join("licenses.json"), Utc::now()));
    }

    #[test]
    fn fresh_valid_file_does_not() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = write(tmp.path(), "licenses.json", r#"{"licenses": []}"#);
        let threshold = staleness_threshold(Utc::now(), 24);
        assert!(!needs_update(&path, threshold));
        // Safe to ask repeatedly.
        assert!(!needs_update(&path, threshold));
    }

    #[test]
    fn old_file_needs_update() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = write(tmp.path(), "licenses.json", "{}");
        let two_days_ago = SystemTime::now() - StdDuration::from_secs(48 * 3600);
        std::fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(two_days_ago)
            .unwrap();

        assert!(needs_update(&path, staleness_threshold(Utc::now(), 24)));
        assert!(!needs_update(&path, staleness_threshold(Utc::now(), 72)));
    }

    #[test]
    fn threshold_in_the_future_makes_everything_stale() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = write(tmp.path(), "exceptions.json", "{}");
        assert!(needs_update(&path, Utc::now() + Duration::hours(1)));
    }

    #[test]
    fn invalid_json_needs_update() {
        let tmp = tempfile::TempDir::new().unwrap();
        let truncated = write(tmp.path(), "licenses.json", r#"{"licenses": [{"licenseId": "0BS"#);
        let empty = write(tmp.path(), "exceptions.json", "");
        let threshold = staleness_threshold(Utc::now(), 24);
        assert!(needs_update(&truncated, threshold));
        assert!(needs_update(&empty, threshold));
    }

    #[test]
    fn directory_is_not_a_cache_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(needs_update(tmp.path(), staleness_threshold(Utc::now(), 24)));
    }

    #[test]
    fn threshold_is_hours_before_now() {
        let now = Utc::now();
        assert_eq!(now - staleness_threshold(now, 24), Duration::hours(24));
        assert_eq!(staleness_threshold(now, 0), now);
    }
}
