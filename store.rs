use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Daily log file name prefix.
pub const FILE_PREFIX: &str = "enviro_";
/// Daily log file name suffix.
pub const FILE_SUFFIX: &str = ".json";

/// One sensor record. A channel is null when its sensor failed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: String,
    pub temperature_c: Option<f64>,
    pub pressure_hpa: Option<f64>,
    pub light_lux: Option<f64>,
}

/// All readings for one calendar day, in arrival order.
#[derive(Debug, Serialize, Deserialize)]
pub struct DailyLog {
    pub date: NaiveDate,
    pub readings: Vec<LogRecord>,
}

/// Day-partitioned log store: one JSON file per calendar day.
///
/// Appending rewrites the whole day: read, push, serialize, then write to a
/// temp sibling and rename into place. Concurrent writers and crashes can
/// only ever leave a complete file.
pub struct ReadingStore {
    dir: PathBuf,
}

impl ReadingStore {
    /// Open the store, creating the data directory if absent.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, Error> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| Error::DataDir {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the log file for `date`.
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("{}{}{}", FILE_PREFIX, date.format("%Y-%m-%d"), FILE_SUFFIX))
    }

    /// Append one record to the daily log for `date`.
    pub fn append(&self, date: NaiveDate, record: &LogRecord) -> Result<(), Error> {
        let path = self.path_for(date);
        let mut log = load_or_create(&path, date);
        log.readings.push(record.clone());

        let json = serde_json::to_vec_pretty(&log).map_err(|e| Error::StorageWrite {
            path: path.clone(),
            source: e.into(),
        })?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &json).map_err(|source| Error::StorageWrite {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| Error::StorageWrite { path, source })?;
        Ok(())
    }
}

/// Parse the existing file, or start a fresh log for `date`. A file that no
/// longer parses is preserved under `<name>.corrupt` and its readings are
/// abandoned.
fn load_or_create(path: &Path, date: NaiveDate) -> DailyLog {
    let contents = match fs::read(path) {
        Ok(contents) => contents,
        Err(_) => return fresh(date),
    };
    match serde_json::from_slice(&contents) {
        Ok(log) => log,
        Err(err) => {
            warn!("corrupt daily log {}: {}; starting fresh", path.display(), err);
            let sidecar = path.with_extension("json.corrupt");
            if let Err(err) = fs::rename(path, &sidecar) {
                warn!(
                    "could not preserve corrupt log as {}: {}",
                    sidecar.display(),
                    err
                );
            }
            fresh(date)
        }
    }
}

fn fresh(date: NaiveDate) -> DailyLog {
    DailyLog {
        date,
        readings: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ts: &str) -> LogRecord {
        LogRecord {
            timestamp: ts.to_string(),
            temperature_c: Some(21.12),
            pressure_hpa: Some(1011.55),
            light_lux: None,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 6).unwrap()
    }

    fn parse(path: &Path) -> DailyLog {
        serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
    }

    #[test]
    fn appends_in_arrival_order_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReadingStore::open(dir.path()).unwrap();
        for n in 0..3 {
            let rec = record(&format!("2026-08-06T12:0{}:00", n));
            store.append(date(), &rec).unwrap();
        }

        let log = parse(&store.path_for(date()));
        assert_eq!(log.date, date());
        assert_eq!(log.readings.len(), 3);
        let stamps: Vec<_> = log.readings.iter().map(|r| r.timestamp.as_str()).collect();
        assert_eq!(
            stamps,
            vec![
                "2026-08-06T12:00:00",
                "2026-08-06T12:01:00",
                "2026-08-06T12:02:00",
            ]
        );
    }

    #[test]
    fn names_files_after_the_date() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReadingStore::open(dir.path()).unwrap();
        assert_eq!(
            store.path_for(date()),
            dir.path().join("enviro_2026-08-06.json")
        );
    }

    #[test]
    fn creates_missing_data_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = ReadingStore::open(&nested).unwrap();
        assert!(nested.is_dir());
        store.append(date(), &record("2026-08-06T00:00:00")).unwrap();
        // Opening again is idempotent.
        ReadingStore::open(&nested).unwrap();
    }

    #[test]
    fn serializes_failed_channels_as_null() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReadingStore::open(dir.path()).unwrap();
        store.append(date(), &record("2026-08-06T00:00:00")).unwrap();

        let text = fs::read_to_string(store.path_for(date())).unwrap();
        assert!(text.contains("\"light_lux\": null"), "{}", text);
        assert!(text.contains("\"date\": \"2026-08-06\""), "{}", text);
    }

    #[test]
    fn preserves_corrupt_log_and_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReadingStore::open(dir.path()).unwrap();
        let path = store.path_for(date());
        fs::write(&path, b"{ not json").unwrap();

        store.append(date(), &record("2026-08-06T09:00:00")).unwrap();

        let log = parse(&path);
        assert_eq!(log.readings.len(), 1);
        let sidecar = path.with_extension("json.corrupt");
        assert_eq!(fs::read(&sidecar).unwrap(), b"{ not json");
    }

    #[test]
    fn leaves_no_temp_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReadingStore::open(dir.path()).unwrap();
        store.append(date(), &record("2026-08-06T00:00:00")).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["enviro_2026-08-06.json"]);
    }
}
