/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Serializable types for pane history persistence.

use rkyv::{Archive, Deserialize, Serialize};

use crate::services::history::{HistoryEntry, HistoryError, HistoryStack};

/// Persisted history entry.
#[derive(
    Archive,
    Serialize,
    Deserialize,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct PersistedHistoryEntry {
    pub address: String,
    pub displayed_address: String,
    pub title: String,
    pub content_type: String,
    pub implementation_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderer_state: Option<Vec<u8>>,
}

impl From<&HistoryEntry> for PersistedHistoryEntry {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            address: entry.address.clone(),
            displayed_address: entry.displayed_address.clone(),
            title: entry.title.clone(),
            content_type: entry.content_type.clone(),
            implementation_name: entry.implementation_name.clone(),
            renderer_state: entry.renderer_state.clone(),
        }
    }
}

impl From<PersistedHistoryEntry> for HistoryEntry {
    fn from(entry: PersistedHistoryEntry) -> Self {
        Self {
            address: entry.address,
            displayed_address: entry.displayed_address,
            title: entry.title,
            renderer_state: entry.renderer_state,
            content_type: entry.content_type,
            implementation_name: entry.implementation_name,
        }
    }
}

/// Full history of one pane: entries, cursor and the pane's view name.
#[derive(
    Archive,
    Serialize,
    Deserialize,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct PersistedPaneHistory {
    pub entries: Vec<PersistedHistoryEntry>,
    pub cursor: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_name: Option<String>,
}

impl PersistedPaneHistory {
    pub fn from_history(history: &HistoryStack, view_name: Option<String>) -> Self {
        Self {
            entries: history.entries().iter().map(Into::into).collect(),
            cursor: history.cursor().unwrap_or(0) as u64,
            view_name,
        }
    }

    pub fn to_history_stack(&self) -> Result<HistoryStack, HistoryError> {
        let entries = self.entries.iter().cloned().map(Into::into).collect();
        let cursor = usize::try_from(self.cursor).unwrap_or(usize::MAX);
        HistoryStack::from_parts(entries, cursor)
    }

    pub fn current(&self) -> Option<&PersistedHistoryEntry> {
        usize::try_from(self.cursor)
            .ok()
            .and_then(|cursor| self.entries.get(cursor))
    }
}
