/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::collections::HashMap;
use std::sync::OnceLock;

use crossbeam_channel::{Receiver, Sender, unbounded};

pub const CHANNEL_RENDERER_SWITCH_STARTED: &str = "pane.renderer.switch_started";
pub const CHANNEL_RENDERER_SWITCH_SUCCEEDED: &str = "pane.renderer.switch_succeeded";
pub const CHANNEL_RENDERER_CONSTRUCTION_FAILED: &str = "pane.renderer.construction_failed";
pub const CHANNEL_RENDERER_NO_CAPABLE: &str = "pane.renderer.no_capable_renderer";
pub const CHANNEL_LOAD_STARTED: &str = "pane.load.started";
pub const CHANNEL_LOAD_COMPLETED: &str = "pane.load.completed";
pub const CHANNEL_LOAD_FAILED: &str = "pane.load.failed";
pub const CHANNEL_LOAD_CANCELED: &str = "pane.load.canceled";
pub const CHANNEL_EVENT_STALE_DISCARDED: &str = "pane.event.stale_discarded";
pub const CHANNEL_HISTORY_OUT_OF_RANGE: &str = "pane.history.out_of_range";

static GLOBAL_DIAGNOSTICS_TX: OnceLock<Sender<DiagnosticEvent>> = OnceLock::new();

#[cfg(test)]
thread_local! {
    static TEST_DIAGNOSTICS_TX: std::cell::RefCell<Option<Sender<DiagnosticEvent>>> =
        const { std::cell::RefCell::new(None) };
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticEvent {
    MessageSent {
        channel_id: &'static str,
        byte_len: usize,
    },
}

/// Install the process-wide sink. Only the first call takes effect.
pub fn install_global_sender(sender: Sender<DiagnosticEvent>) {
    let _ = GLOBAL_DIAGNOSTICS_TX.set(sender);
}

pub fn emit_event(event: DiagnosticEvent) {
    #[cfg(test)]
    {
        let mut event = Some(event);
        TEST_DIAGNOSTICS_TX.with(|slot| {
            if let Some(tx) = slot.borrow().as_ref()
                && let Some(payload) = event.take()
            {
                let _ = tx.send(payload);
            }
        });
        if let Some(payload) = event
            && let Some(tx) = GLOBAL_DIAGNOSTICS_TX.get()
        {
            let _ = tx.send(payload);
        }
    }

    #[cfg(not(test))]
    {
        if let Some(tx) = GLOBAL_DIAGNOSTICS_TX.get() {
            let _ = tx.send(event);
        }
    }
}

pub(crate) fn emit_message(channel_id: &'static str, payload: &str) {
    emit_event(DiagnosticEvent::MessageSent {
        channel_id,
        byte_len: payload.len(),
    });
}

/// Drains a diagnostics receiver into per-channel message counts.
#[derive(Debug)]
pub struct DiagnosticsState {
    pub event_tx: Sender<DiagnosticEvent>,
    event_rx: Receiver<DiagnosticEvent>,
    message_counts: HashMap<&'static str, u64>,
}

impl DiagnosticsState {
    pub fn new() -> Self {
        let (event_tx, event_rx) = unbounded();
        Self {
            event_tx,
            event_rx,
            message_counts: HashMap::new(),
        }
    }

    pub fn drain(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            match event {
                DiagnosticEvent::MessageSent { channel_id, .. } => {
                    *self.message_counts.entry(channel_id).or_insert(0) += 1;
                }
            }
        }
    }

    pub fn channel_count(&mut self, channel_id: &str) -> u64 {
        self.drain();
        self.message_counts.get(channel_id).copied().unwrap_or(0)
    }
}

impl Default for DiagnosticsState {
    fn default() -> Self {
        Self::new()
    }
}

/// Route this thread's diagnostics into `state` for the duration of a test.
#[cfg(test)]
pub(crate) fn install_test_sender(state: &DiagnosticsState) {
    TEST_DIAGNOSTICS_TX.with(|slot| {
        *slot.borrow_mut() = Some(state.event_tx.clone());
    });
}
