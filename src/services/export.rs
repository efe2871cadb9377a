use crate::models::{MatchRecord, RunSummary, UnmatchedRecord};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

pub const MATCHES_FILE: &str = "matches.csv";
pub const UNMATCHED_DOMESTIC_FILE: &str = "unmatched_fr.csv";
pub const UNMATCHED_INCOMING_FILE: &str = "unmatched_ex.csv";
pub const SUMMARY_FILE: &str = "summary.json";
/// Written by the `mails` command, not by [`ResultWriter`].
pub const OUTBOX_FILE: &str = "outbox.json";

/// Errors that can occur while writing or reading run outputs
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ExportError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Everything one run writes out.
#[derive(Debug, Clone, Copy)]
pub struct RunArtifacts<'a> {
    pub matches: &'a [MatchRecord],
    pub unmatched_domestic: &'a [UnmatchedRecord],
    pub unmatched_incoming: &'a [UnmatchedRecord],
    pub summary: &'a RunSummary,
}

/// Writes run outputs into one directory, all or nothing.
///
/// Every file is first written under a temporary name carrying the run id;
/// nothing is renamed into place unless all of them were written. If a rename
/// fails, outputs already swapped in are rolled back to the previous run's.
#[derive(Debug, Clone)]
pub struct ResultWriter {
    directory: PathBuf,
}

impl ResultWriter {
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn write(&self, artifacts: &RunArtifacts<'_>) -> Result<Vec<PathBuf>, ExportError> {
        fs::create_dir_all(&self.directory).map_err(|e| ExportError::io(&self.directory, e))?;

        let run_id = artifacts.summary.run_id.to_string();
        let mut staged: Vec<StagedFile> = Vec::with_capacity(4);

        if let Err(err) = self.stage_all(artifacts, &run_id, &mut staged) {
            discard(&staged);
            return Err(err);
        }

        // Previous outputs are moved aside so a failed swap can put them back.
        let mut replaced = Vec::with_capacity(staged.len());
        for (index, file) in staged.iter().enumerate() {
            match file.swap_in() {
                Ok(had_previous) => replaced.push(had_previous),
                Err(err) => {
                    roll_back(&staged[..index], &replaced);
                    discard(&staged[index..]);
                    return Err(err);
                }
            }
        }

        for (file, had_previous) in staged.iter().zip(&replaced) {
            if *had_previous {
                remove_quietly(&file.backup);
            }
        }

        let written: Vec<PathBuf> = staged.into_iter().map(|file| file.target).collect();
        info!(directory = %self.directory.display(), files = written.len(), "outputs written");
        Ok(written)
    }

    fn stage_all(
        &self,
        artifacts: &RunArtifacts<'_>,
        run_id: &str,
        staged: &mut Vec<StagedFile>,
    ) -> Result<(), ExportError> {
        let temp = self.stage(MATCHES_FILE, run_id, staged);
        write_csv(&temp, artifacts.matches)?;
        let temp = self.stage(UNMATCHED_DOMESTIC_FILE, run_id, staged);
        write_csv(&temp, artifacts.unmatched_domestic)?;
        let temp = self.stage(UNMATCHED_INCOMING_FILE, run_id, staged);
        write_csv(&temp, artifacts.unmatched_incoming)?;

        let temp = self.stage(SUMMARY_FILE, run_id, staged);
        let json = serde_json::to_vec_pretty(artifacts.summary)?;
        fs::write(&temp, json).map_err(|e| ExportError::io(&temp, e))?;

        Ok(())
    }

    fn stage(&self, name: &str, run_id: &str, staged: &mut Vec<StagedFile>) -> PathBuf {
        let file = StagedFile {
            temp: self.directory.join(format!(".{name}.{run_id}.tmp")),
            backup: self.directory.join(format!(".{name}.{run_id}.bak")),
            target: self.directory.join(name),
        };
        let temp = file.temp.clone();
        staged.push(file);
        temp
    }
}

#[derive(Debug)]
struct StagedFile {
    temp: PathBuf,
    target: PathBuf,
    backup: PathBuf,
}

impl StagedFile {
    /// Move the previous target aside, then rename the temporary into place.
    ///
    /// Returns whether a previous output was backed up. On failure the
    /// backup is already restored.
    fn swap_in(&self) -> Result<bool, ExportError> {
        let had_previous = self.target.is_file();
        if had_previous {
            fs::rename(&self.target, &self.backup).map_err(|e| ExportError::io(&self.target, e))?;
        }
        if let Err(source) = fs::rename(&self.temp, &self.target) {
            if had_previous {
                restore(&self.backup, &self.target);
            }
            return Err(ExportError::io(&self.target, source));
        }
        Ok(had_previous)
    }
}

fn roll_back(committed: &[StagedFile], replaced: &[bool]) {
    for (file, had_previous) in committed.iter().zip(replaced).rev() {
        if *had_previous {
            restore(&file.backup, &file.target);
        } else {
            remove_quietly(&file.target);
        }
    }
}

fn restore(backup: &Path, target: &Path) {
    if let Err(err) = fs::rename(backup, target) {
        warn!(path = %target.display(), error = %err, "failed to restore previous output");
    }
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), ExportError> {
    let file = fs::File::create(path).map_err(|e| ExportError::io(path, e))?;
    let mut writer = csv::Writer::from_writer(file);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|e| ExportError::io(path, e))?;
    Ok(())
}

fn discard(staged: &[StagedFile]) {
    for file in staged {
        remove_quietly(&file.temp);
    }
}

fn remove_quietly(path: &Path) {
    if let Err(err) = fs::remove_file(path) {
        if err.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %err, "failed to remove staged output");
        }
    }
}

/// Read match records back from a `matches.csv` written by [`ResultWriter`].
pub fn read_matches<P: AsRef<Path>>(path: P) -> Result<Vec<MatchRecord>, ExportError> {
    let path = path.as_ref();
    let file = fs::File::open(path).map_err(|e| ExportError::io(path, e))?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);
    let records = reader.deserialize().collect::<Result<Vec<MatchRecord>, _>>()?;
    Ok(records)
}
