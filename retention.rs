use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate};
use log::{info, warn};

use crate::error::Error;
use crate::store::{FILE_PREFIX, FILE_SUFFIX};

/// Maximum age of a daily log before it is removed.
pub const RETENTION_DAYS: i64 = 7;

/// Delete daily logs strictly older than the retention window.
///
/// Files whose name does not match `enviro_<YYYY-MM-DD>.json` are left
/// untouched. A file that fails to delete is reported and the sweep
/// continues with the rest. Returns the removed paths.
pub fn sweep(dir: &Path, today: NaiveDate) -> Result<Vec<PathBuf>, Error> {
    let cutoff = today - Duration::days(RETENTION_DAYS);
    let entries = fs::read_dir(dir).map_err(|source| Error::DataDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut removed = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("skipping unreadable directory entry: {}", err);
                continue;
            }
        };
        let name = entry.file_name();
        let date = match name.to_str().and_then(parse_log_date) {
            Some(date) => date,
            None => continue,
        };
        if date < cutoff {
            let path = entry.path();
            match fs::remove_file(&path) {
                Ok(()) => {
                    info!("removed old log {}", path.display());
                    removed.push(path);
                }
                Err(err) => warn!("could not remove {}: {}", path.display(), err),
            }
        }
    }
    Ok(removed)
}

/// Parse the date embedded in a daily log file name.
fn parse_log_date(name: &str) -> Option<NaiveDate> {
    let stem = name.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_SUFFIX)?;
    NaiveDate::parse_from_str(stem, "%Y-%m-%d").ok()
}
