/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Renderer capability set.
//!
//! A renderer displays content of one or more content types inside a display
//! slot lent to it by the pane's owner. Loads are asynchronous: `open` only
//! issues the request, and progress is reported through the connected
//! `RendererEventSink`.

use crate::registries::atomic::viewer::RendererDescriptor;
use crate::shell::desktop::lifecycle::renderer_events::RendererEventSink;

/// A single load request handed to a renderer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadRequest {
    pub address: String,
    /// Optional listing filter such as `*.rs`.
    pub name_filter: Option<String>,
    /// Bypass renderer-side caches.
    pub reload: bool,
}

impl LoadRequest {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }
}

/// Which edit operations currently apply to the renderer's selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditCapabilities {
    pub cut: bool,
    pub copy: bool,
    pub paste: bool,
    pub move_items: bool,
}

/// Narrow edit interface a renderer may expose to the pane's owner.
pub trait EditOperations {
    fn capabilities(&self) -> EditCapabilities;
    fn cut_selection(&mut self);
    fn copy_selection(&mut self);
    fn paste_selection(&mut self, move_items: bool);
    fn move_selection(&mut self, destination: Option<&str>);
}

/// Named renderer extension call, e.g. toggling hidden files in a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionCall {
    Method(String),
    Bool(String, bool),
    Text(String, String),
}

impl ExtensionCall {
    pub fn name(&self) -> &str {
        match self {
            Self::Method(name) | Self::Bool(name, _) | Self::Text(name, _) => name,
        }
    }
}

pub trait Renderer {
    fn descriptor(&self) -> &RendererDescriptor;

    fn supports_content_type(&self, content_type: &str) -> bool {
        self.descriptor().supports(content_type)
    }

    /// Attach the event sink. A renderer holds at most one sink.
    fn connect(&mut self, sink: RendererEventSink);

    /// Drop the event sink; no events may be emitted afterwards.
    fn disconnect(&mut self);

    /// Start loading `request.address`. Completion is reported asynchronously.
    fn open(&mut self, request: &LoadRequest);

    /// Cancel any in-flight load.
    fn stop(&mut self);

    /// Serialized scroll/selection/offset state, if the renderer keeps any.
    fn save_state(&self) -> Option<Vec<u8>> {
        None
    }

    /// Apply a blob produced by `save_state`. Returns false if unsupported.
    fn restore_state(&mut self, _state: &[u8]) -> bool {
        false
    }

    fn edit_operations(&mut self) -> Option<&mut dyn EditOperations> {
        None
    }

    /// Returns whether the renderer handled the call.
    fn call_extension(&mut self, _call: &ExtensionCall) -> bool {
        false
    }
}
