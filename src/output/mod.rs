//! Persistence of per-resource observation sets.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::types::{Observation, Resource, OBSERVATION_COLUMNS};

/// Writes one artifact per resource.
pub trait ObservationSink: Send + Sync {
    /// Persist `observations` for `resource`, replacing any earlier artifact.
    fn write(&self, resource: &Resource, observations: &[Observation]) -> Result<PathBuf>;

    /// Whether an artifact for `resource_id` already exists.
    fn exists(&self, resource_id: &str) -> bool;
}

/// `observation_<resourceId>.csv` files in one directory.
///
/// An empty set produces an empty file, recording that nothing was found.
#[derive(Debug, Clone)]
pub struct CsvObservationSink {
    dir: PathBuf,
}

impl CsvObservationSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn artifact_path(&self, resource_id: &str) -> PathBuf {
        self.dir.join(format!("observation_{}.csv", file_label(resource_id)))
    }
}

impl ObservationSink for CsvObservationSink {
    fn write(&self, resource: &Resource, observations: &[Observation]) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.artifact_path(&resource.resource_id);
        let staging = path.with_extension("csv.partial");

        if let Err(e) = write_staged(&staging, &path, observations) {
            let _ = fs::remove_file(&staging);
            return Err(e);
        }
        debug!(
            resource_id = %resource.resource_id,
            rows = observations.len(),
            path = %path.display(),
            "observations written"
        );
        Ok(path)
    }

    fn exists(&self, resource_id: &str) -> bool {
        self.artifact_path(resource_id).is_file()
    }
}

fn write_staged(staging: &Path, path: &Path, observations: &[Observation]) -> Result<()> {
    if observations.is_empty() {
        fs::write(staging, b"")?;
    } else {
        let rows: Vec<Vec<(String, String)>> =
            observations.iter().map(Observation::to_columns).collect();
        let header = header(&rows);

        let mut writer = csv::Writer::from_path(staging)?;
        writer.write_record(&header)?;
        for row in &rows {
            writer.write_record(header.iter().map(|column| {
                row.iter()
                    .find(|(name, _)| name == column)
                    .map(|(_, cell)| cell.as_str())
                    .unwrap_or("")
            }))?;
        }
        writer.flush()?;
    }
    fs::rename(staging, path)?;
    Ok(())
}

/// Known columns first, then extra columns in first-seen order.
fn header(rows: &[Vec<(String, String)>]) -> Vec<String> {
    let mut header: Vec<String> = OBSERVATION_COLUMNS.iter().map(|c| c.to_string()).collect();
    for row in rows {
        for (name, _) in row {
            if !header.contains(name) {
                header.push(name.clone());
            }
        }
    }
    header
}

/// Percent-encode everything outside `[A-Za-z0-9._-]`, including `%`, so
/// distinct ids map to distinct file names.
fn file_label(value: &str) -> String {
    let mut label = String::with_capacity(value.len());
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.') {
            label.push(char::from(byte));
        } else {
            label.push_str(&format!("%{byte:02X}"));
        }
    }
    label
}
