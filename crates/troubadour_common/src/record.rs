//! Qualification record - the durable log of a completed session
//!
//! One file per session, `{dir}/{prefix}_{serial}_{timestamp}.{ext}`, pretty
//! JSON. The directory is created on demand and the file is created with
//! create-new semantics, so an existing record is never overwritten.

use crate::config::RecordConfig;
use crate::error::RecordError;
use crate::inventory::{InventorySnapshot, SerialEvidence};
use crate::wizard::WizardSession;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const FILENAME_TIMESTAMP: &str = "%Y-%m-%d_%H-%M-%S";
const MAX_COLLISION_SUFFIX: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResults {
    pub display_test_passed: bool,
    pub serial_number_verified: bool,
    pub user_entered_sn: String,
    /// Mismatches reported before the final verification
    pub failed_serial_attempts: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualificationRecord {
    pub tool: String,
    pub tool_version: String,
    pub timestamp: DateTime<Local>,
    pub system_info: InventorySnapshot,
    pub test_results: TestResults,
    pub serial_evidence: SerialEvidence,
    pub dmidecode_info: BTreeMap<String, Vec<String>>,
}

impl QualificationRecord {
    /// Assemble the record from a session that holds an inventory snapshot
    pub fn from_session(
        session: &WizardSession,
        captured_at: DateTime<Local>,
    ) -> Result<Self, RecordError> {
        let snapshot = session.snapshot().ok_or(RecordError::MissingSnapshot)?;
        Ok(Self {
            tool: "troubadour".to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: captured_at,
            system_info: snapshot.clone(),
            test_results: TestResults {
                display_test_passed: session.display_test_passed(),
                serial_number_verified: session.serial_verified(),
                user_entered_sn: session.entered_serial().to_string(),
                failed_serial_attempts: session.failed_serial_attempts(),
            },
            serial_evidence: session.serial_evidence().cloned().unwrap_or_default(),
            dmidecode_info: session.dmi_sections().clone(),
        })
    }
}

/// Durable destination for qualification records
pub trait RecordSink: Send + Sync + 'static {
    /// Persist the record and return where it landed
    fn emit(&self, record: &QualificationRecord) -> Result<PathBuf, RecordError>;

    fn location(&self) -> &Path;
}

/// Writes qualification records into the configured directory
#[derive(Debug, Clone)]
pub struct LogEmitter {
    dir: PathBuf,
    prefix: String,
    extension: String,
}

impl LogEmitter {
    pub fn new(config: &RecordConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            prefix: config.prefix.clone(),
            extension: config.extension.clone(),
        }
    }

    /// File name for a record, before collision handling
    pub fn file_name(&self, record: &QualificationRecord) -> String {
        format!(
            "{}_{}_{}.{}",
            self.prefix,
            sanitize_serial(&record.system_info.serial_number),
            record.timestamp.format(FILENAME_TIMESTAMP),
            self.extension
        )
    }

    /// Write the record durably and return its path
    pub fn emit(&self, record: &QualificationRecord) -> Result<PathBuf, RecordError> {
        fs::create_dir_all(&self.dir).map_err(|source| RecordError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;

        let body = serde_json::to_vec_pretty(record)?;
        let base = self.file_name(record);

        let mut candidate = self.dir.join(&base);
        let mut suffix = 1;
        let mut file = loop {
            match OpenOptions::new().write(true).create_new(true).open(&candidate) {
                Ok(file) => break file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists && suffix < MAX_COLLISION_SUFFIX => {
                    debug!(path = %candidate.display(), "record path taken");
                    suffix += 1;
                    candidate = self.dir.join(with_suffix(&base, suffix));
                }
                Err(source) => {
                    return Err(RecordError::Write {
                        path: candidate,
                        source,
                    })
                }
            }
        };

        file.write_all(&body)
            .and_then(|_| file.write_all(b"\n"))
            .and_then(|_| file.sync_all())
            .map_err(|source| RecordError::Write {
                path: candidate.clone(),
                source,
            })?;

        info!(path = %candidate.display(), bytes = body.len(), "record emitted");
        Ok(candidate)
    }
}

impl RecordSink for LogEmitter {
    fn emit(&self, record: &QualificationRecord) -> Result<PathBuf, RecordError> {
        LogEmitter::emit(self, record)
    }

    fn location(&self) -> &Path {
        &self.dir
    }
}

/// Keep serials filesystem-safe: `[A-Za-z0-9._-]`, everything else `_`
pub fn sanitize_serial(serial: &str) -> String {
    let cleaned: String = serial
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        cleaned
    }
}

fn with_suffix(file_name: &str, suffix: u32) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) => format!("{}_{}.{}", stem, suffix, ext),
        None => format!("{}_{}", file_name, suffix),
    }
}
