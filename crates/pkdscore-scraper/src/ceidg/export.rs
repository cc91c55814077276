//! Semicolon-separated `firmy_YYYYMMDD_HHMMSS.csv` exports of collected firms.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use super::types::FirmRecord;
use crate::error::ScraperError;

const FILE_PREFIX: &str = "firmy_";
const FILE_SUFFIX: &str = ".csv";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[must_use]
pub fn csv_file_name(collected_at: NaiveDateTime) -> String {
    format!(
        "{FILE_PREFIX}{}{FILE_SUFFIX}",
        collected_at.format(TIMESTAMP_FORMAT)
    )
}

/// Collection timestamp encoded in an export's file name, or `None` if the
/// name does not follow the `firmy_YYYYMMDD_HHMMSS.csv` pattern.
#[must_use]
pub fn parse_csv_timestamp(path: &Path) -> Option<NaiveDateTime> {
    let name = path.file_name()?.to_str()?;
    let stamp = name.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_SUFFIX)?;
    NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()
}

/// Write `records` to `<dir>/firmy_<timestamp>.csv`, creating `dir` if needed.
///
/// # Errors
///
/// Returns [`ScraperError::Io`] if the directory cannot be created, or
/// [`ScraperError::Csv`] if writing fails.
pub fn write_firms_csv(
    dir: &Path,
    collected_at: NaiveDateTime,
    records: &[FirmRecord],
) -> Result<PathBuf, ScraperError> {
    std::fs::create_dir_all(dir).map_err(|e| ScraperError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let path = dir.join(csv_file_name(collected_at));
    let csv_err = |e: csv::Error| ScraperError::Csv {
        path: path.clone(),
        source: e,
    };

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(&path)
        .map_err(csv_err)?;
    for record in records {
        writer.serialize(record).map_err(csv_err)?;
    }
    writer.flush().map_err(|e| ScraperError::Io {
        path: path.clone(),
        source: e,
    })?;

    Ok(path)
}

/// Read every row of a firms export.
///
/// # Errors
///
/// Returns [`ScraperError::Csv`] if the file cannot be opened or a row does
/// not match the export layout.
pub fn read_firms_csv(path: &Path) -> Result<Vec<FirmRecord>, ScraperError> {
    let csv_err = |e: csv::Error| ScraperError::Csv {
        path: path.to_path_buf(),
        source: e,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .from_path(path)
        .map_err(csv_err)?;

    reader
        .deserialize::<FirmRecord>()
        .map(|row| row.map_err(csv_err))
        .collect()
}

/// The export in `dir` with the newest timestamp in its file name.
///
/// Returns `Ok(None)` if `dir` holds no exports or does not exist.
///
/// # Errors
///
/// Returns [`ScraperError::Io`] if `dir` exists but cannot be listed.
pub fn newest_firms_csv(dir: &Path) -> Result<Option<PathBuf>, ScraperError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ScraperError::Io {
                path: dir.to_path_buf(),
                source: e,
            })
        }
    };

    let newest = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter_map(|path| parse_csv_timestamp(&path).map(|ts| (ts, path)))
        .max_by_key(|(ts, _)| *ts)
        .map(|(_, path)| path);

    Ok(newest)
}
