/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Pane hosting for a file-manager / browser shell.
//!
//! A [`Pane`] shows one location through one live renderer and keeps a
//! back/forward history. Renderers are picked per content type from a
//! [`RendererRegistry`] and built by a [`RendererFactory`]; a
//! [`NavigationController`] owns a set of panes and pumps their events.

pub mod registries;
pub mod services;
pub mod shell;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use registries::atomic::viewer::{
    RendererDescriptor, RendererKind, RendererRegistry, RendererResolution,
};
pub use services::classification::{ContentClassifier, MimeClassifier};
pub use services::history::{HistoryEntry, HistoryStack};
pub use shell::desktop::lifecycle::renderer::{LoadRequest, Renderer};
pub use shell::desktop::lifecycle::renderer_events::{RendererEvent, RendererEventSink};
pub use shell::desktop::lifecycle::renderer_factory::{DisplaySlot, RendererFactory};
pub use shell::desktop::lifecycle::view_host::{
    DisplayRequest, Pane, PaneError, RendererEnvironment,
};
pub use shell::desktop::workbench::navigation_controller::NavigationController;
pub use shell::desktop::workbench::pane_model::{PaneEvent, PaneId, PanePolicy, PaneSignal};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
