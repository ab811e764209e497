/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Pane history storage.
//!
//! Two encodings of `PersistedPaneHistory`: compact rkyv bytes for session
//! snapshots and pretty JSON files that can be inspected and edited by hand.
//! Decoded histories are validated before they are handed out.

pub mod types;

use std::fs;
use std::path::Path;

use crate::services::history::HistoryError;
use types::PersistedPaneHistory;

#[derive(Debug)]
pub enum PaneStoreError {
    Io(String),
    Encode(String),
    Decode(String),
    Json(String),
    History(HistoryError),
}

impl std::fmt::Display for PaneStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaneStoreError::Io(e) => write!(f, "IO error: {e}"),
            PaneStoreError::Encode(e) => write!(f, "Encode error: {e}"),
            PaneStoreError::Decode(e) => write!(f, "Decode error: {e}"),
            PaneStoreError::Json(e) => write!(f, "JSON error: {e}"),
            PaneStoreError::History(e) => write!(f, "History error: {e}"),
        }
    }
}

impl std::error::Error for PaneStoreError {}

pub fn encode_pane_history(history: &PersistedPaneHistory) -> Result<Vec<u8>, PaneStoreError> {
    rkyv::to_bytes::<rkyv::rancor::Error>(history)
        .map(|bytes| bytes.to_vec())
        .map_err(|e| PaneStoreError::Encode(format!("{e}")))
}

pub fn decode_pane_history(bytes: &[u8]) -> Result<PersistedPaneHistory, PaneStoreError> {
    let mut aligned = rkyv::util::AlignedVec::<16>::new();
    aligned.extend_from_slice(bytes);
    let history = rkyv::from_bytes::<PersistedPaneHistory, rkyv::rancor::Error>(&aligned)
        .map_err(|e| PaneStoreError::Decode(format!("{e}")))?;
    validate(history)
}

pub fn save_pane_history_json(
    path: &Path,
    history: &PersistedPaneHistory,
) -> Result<(), PaneStoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|e| PaneStoreError::Io(format!("Failed to create dir: {e}")))?;
    }
    let json =
        serde_json::to_string_pretty(history).map_err(|e| PaneStoreError::Json(format!("{e}")))?;
    fs::write(path, json).map_err(|e| PaneStoreError::Io(format!("{}: {e}", path.display())))?;
    log::debug!(
        "persistence: saved {} history entries to {}",
        history.entries.len(),
        path.display()
    );
    Ok(())
}

pub fn load_pane_history_json(path: &Path) -> Result<PersistedPaneHistory, PaneStoreError> {
    let json = fs::read_to_string(path)
        .map_err(|e| PaneStoreError::Io(format!("{}: {e}", path.display())))?;
    let history: PersistedPaneHistory =
        serde_json::from_str(&json).map_err(|e| PaneStoreError::Json(format!("{e}")))?;
    validate(history)
}

fn validate(history: PersistedPaneHistory) -> Result<PersistedPaneHistory, PaneStoreError> {
    history.to_history_stack().map_err(PaneStoreError::History)?;
    Ok(history)
}
