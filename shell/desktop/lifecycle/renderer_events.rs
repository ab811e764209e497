/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Generation-tagged renderer event subscriptions.
//!
//! Each subscription gets a fresh generation. The sink handed to the renderer
//! shares a liveness flag with the subscription kept by the pane; cancelling
//! the subscription makes the sink inert, and events already queued under an
//! older generation are discarded by the pane when drained.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::{Receiver, Sender, unbounded};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RendererGeneration(u64);

impl RendererGeneration {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RendererGeneration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gen:{}", self.0)
    }
}

/// I/O job progress reported while a load is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadProgress {
    Percent(u8),
    Speed { bytes_per_second: u64 },
    InfoMessage(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RendererEvent {
    LoadStarted,
    Progress(LoadProgress),
    LoadCompleted {
        displayed_address: Option<String>,
        title: Option<String>,
    },
    LoadFailed {
        message: String,
    },
    LoadCanceled {
        message: String,
    },
    /// Renderer-driven location change (redirect, in-page navigation).
    AddressChanged {
        address: String,
    },
    SelectionChanged {
        items: Vec<String>,
    },
    /// The renderer asks its owner to navigate, e.g. on link activation.
    OpenRequested {
        address: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedRendererEvent {
    pub generation: RendererGeneration,
    pub event: RendererEvent,
}

/// Renderer-side end of a subscription.
#[derive(Debug, Clone)]
pub struct RendererEventSink {
    generation: RendererGeneration,
    live: Arc<AtomicBool>,
    tx: Sender<TaggedRendererEvent>,
}

impl RendererEventSink {
    pub fn generation(&self) -> RendererGeneration {
        self.generation
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// Queue an event. Returns false once the subscription is gone.
    pub fn emit(&self, event: RendererEvent) -> bool {
        if !self.is_live() {
            return false;
        }
        self.tx
            .send(TaggedRendererEvent {
                generation: self.generation,
                event,
            })
            .is_ok()
    }
}

/// Pane-side end of a subscription. Dropping it unsubscribes.
#[derive(Debug)]
pub struct RendererSubscription {
    generation: RendererGeneration,
    live: Arc<AtomicBool>,
}

impl RendererSubscription {
    pub fn generation(&self) -> RendererGeneration {
        self.generation
    }

    pub fn cancel(&self) {
        self.live.store(false, Ordering::Release);
    }
}

impl Drop for RendererSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Per-pane event queue shared by every subscription the pane hands out.
#[derive(Debug)]
pub struct RendererEventHub {
    tx: Sender<TaggedRendererEvent>,
    rx: Receiver<TaggedRendererEvent>,
    next_generation: u64,
}

impl RendererEventHub {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            tx,
            rx,
            next_generation: 1,
        }
    }

    pub fn subscribe(&mut self) -> (RendererEventSink, RendererSubscription) {
        let generation = RendererGeneration(self.next_generation);
        self.next_generation += 1;
        let live = Arc::new(AtomicBool::new(true));
        (
            RendererEventSink {
                generation,
                live: live.clone(),
                tx: self.tx.clone(),
            },
            RendererSubscription { generation, live },
        )
    }

    /// Everything queued so far, in emission order.
    pub fn drain(&self) -> Vec<TaggedRendererEvent> {
        self.rx.try_iter().collect()
    }
}

impl Default for RendererEventHub {
    fn default() -> Self {
        Self::new()
    }
}
