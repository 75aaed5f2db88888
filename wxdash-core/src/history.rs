//! Append-only log of past lookups.
//!
//! One JSON object per line: `{"city": ..., "date": ..., "data": <observation>}`.
//! Lines are never rewritten. Every read re-scans the file from the top; a
//! line that fails to parse is skipped and the scan carries on.

use std::{
    fs::{self, OpenOptions},
    io::{self, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{error::HistoryError, model::WeatherObservation};

/// A record as written by [`HistoryStore::append`].
#[derive(Debug, Serialize)]
struct NewRecord<'a> {
    city: &'a str,
    date: &'a str,
    data: &'a WeatherObservation,
}

/// A record as read back. The payload stays untyped so that readers can
/// decide how to treat observations with missing fields.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryRecord {
    pub city: String,
    pub date: String,
    pub data: serde_json::Value,
}

impl HistoryRecord {
    pub fn observation(&self) -> Result<WeatherObservation, serde_json::Error> {
        WeatherObservation::from_payload(self.data.clone())
    }
}

/// Result of a full pass over the history file.
#[derive(Debug, Default)]
pub struct HistoryScan {
    /// Parseable records, in file order.
    pub records: Vec<HistoryRecord>,
    /// 1-based line numbers that could not be parsed.
    pub malformed_lines: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, creating the file (and its directory) if needed.
    ///
    /// The record goes out as a single newline-terminated write. If the file
    /// currently ends in a torn line, a newline is written first so the new
    /// record starts on a line of its own.
    pub fn append(
        &self,
        city: &str,
        date: &str,
        observation: &WeatherObservation,
    ) -> Result<(), HistoryError> {
        let mut line = serde_json::to_string(&NewRecord { city, date, data: observation })?;
        line.push('\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| HistoryError::io(parent, e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(&self.path)
            .map_err(|e| HistoryError::io(&self.path, e))?;

        if ends_with_torn_line(&mut file).map_err(|e| HistoryError::io(&self.path, e))? {
            warn!(path = %self.path.display(), "history file ends mid-record; starting a new line");
            line.insert(0, '\n');
        }

        file.write_all(line.as_bytes()).map_err(|e| HistoryError::io(&self.path, e))?;

        info!(city, date, "appended history record");
        Ok(())
    }

    /// First observation recorded for exactly this (city, date), if any.
    ///
    /// Matching is case-sensitive. A missing file is an empty history.
    pub fn lookup(
        &self,
        city: &str,
        date: &str,
    ) -> Result<Option<WeatherObservation>, HistoryError> {
        let scan = self.scan()?;

        for record in scan.records.iter().filter(|r| r.city == city && r.date == date) {
            match record.observation() {
                Ok(obs) => return Ok(Some(obs)),
                Err(err) => {
                    warn!(city, date, error = %err, "skipping history record with invalid payload")
                }
            }
        }

        debug!(city, date, "no history record found");
        Ok(None)
    }

    /// Read every parseable record, remembering which lines were not.
    pub fn scan(&self) -> Result<HistoryScan, HistoryError> {
        let contents = match fs::read(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(HistoryScan::default()),
            Err(e) => return Err(HistoryError::io(&self.path, e)),
        };

        // Lines are decoded one at a time so that stray bytes (bad UTF-8
        // included) only cost the line they sit on.
        let mut scan = HistoryScan::default();
        for (idx, line) in contents.split(|b| *b == b'\n').enumerate() {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            match serde_json::from_slice::<HistoryRecord>(line) {
                Ok(record) => scan.records.push(record),
                Err(err) => {
                    warn!(line = idx + 1, error = %err, "skipping malformed history line");
                    scan.malformed_lines.push(idx + 1);
                }
            }
        }

        debug!(
            path = %self.path.display(),
            records = scan.records.len(),
            malformed = scan.malformed_lines.len(),
            "scanned history file"
        );
        Ok(scan)
    }
}

fn ends_with_torn_line(file: &mut fs::File) -> io::Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}
