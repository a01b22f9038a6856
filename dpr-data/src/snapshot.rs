//! JSON files on either side of a session: autosaved form snapshots and the
//! submitted payload.
//!
//! Both writers are [`FormObserver`]s. Observer callbacks cannot fail, so a
//! write error is logged and kept until the caller collects it with
//! `take_error`.

use std::path::{Path, PathBuf};

use dpr_core::payload::SubmissionPayload;
use dpr_core::wizard::{FormObserver, FormState};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> SnapshotError {
    move |source| SnapshotError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn write_json<T: Serialize>(
    path: &Path,
    value: &T,
    pretty: bool,
) -> Result<(), SnapshotError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    std::fs::write(path, json).map_err(io_error(path))
}

/// Reads a form snapshot written by [`save_snapshot`] or [`SnapshotWriter`].
pub fn load_snapshot(path: &Path) -> Result<FormState, SnapshotError> {
    let contents = std::fs::read_to_string(path).map_err(io_error(path))?;
    Ok(serde_json::from_str(&contents)?)
}

pub fn save_snapshot(
    path: &Path,
    state: &FormState,
) -> Result<(), SnapshotError> {
    write_json(path, state, true)
}

pub fn write_payload(
    path: &Path,
    payload: &SubmissionPayload,
    pretty: bool,
) -> Result<(), SnapshotError> {
    write_json(path, payload, pretty)
}

/// Rewrites a snapshot file after every change to the form.
#[derive(Debug)]
pub struct SnapshotWriter {
    path: PathBuf,
    writes: usize,
    last_error: Option<SnapshotError>,
}

impl SnapshotWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writes: 0,
            last_error: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshots written successfully so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn take_error(&mut self) -> Option<SnapshotError> {
        self.last_error.take()
    }
}

impl FormObserver for SnapshotWriter {
    fn form_data_changed(
        &mut self,
        state: &FormState,
    ) {
        match save_snapshot(&self.path, state) {
            Ok(()) => {
                self.writes += 1;
                debug!(path = %self.path.display(), "snapshot saved");
            }
            Err(err) => {
                warn!(%err, "snapshot not saved");
                self.last_error = Some(err);
            }
        }
    }

    fn submitted(
        &mut self,
        _payload: &SubmissionPayload,
    ) {
    }
}

/// Writes the payload of each submission to a JSON file.
#[derive(Debug)]
pub struct PayloadWriter {
    path: PathBuf,
    pretty: bool,
    written: bool,
    last_error: Option<SnapshotError>,
}

impl PayloadWriter {
    pub fn new(
        path: impl Into<PathBuf>,
        pretty: bool,
    ) -> Self {
        Self {
            path: path.into(),
            pretty,
            written: false,
            last_error: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn written(&self) -> bool {
        self.written
    }

    pub fn take_error(&mut self) -> Option<SnapshotError> {
        self.last_error.take()
    }
}

impl FormObserver for PayloadWriter {
    fn form_data_changed(
        &mut self,
        _state: &FormState,
    ) {
    }

    fn submitted(
        &mut self,
        payload: &SubmissionPayload,
    ) {
        match write_payload(&self.path, payload, self.pretty) {
            Ok(()) => {
                self.written = true;
                debug!(path = %self.path.display(), "payload written");
            }
            Err(err) => {
                warn!(%err, "payload not written");
                self.last_error = Some(err);
            }
        }
    }
}
