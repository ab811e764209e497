/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Pane identity, policy flags, load states and outward signals.
//!
//! A pane is the host for one live renderer. The types here are what the
//! navigation controller sees of a pane; the state machine itself lives in
//! `lifecycle::view_host`.

use crate::shell::desktop::lifecycle::renderer_events::LoadProgress;

/// Opaque stable identifier for a pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PaneId(uuid::Uuid);

impl PaneId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for PaneId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PaneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pane:{}", self.0)
    }
}

/// Independent per-pane policy flags.
///
/// Combinations are queried, never dispatched on; the derived predicates
/// below are the only place flags are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PanePolicy {
    /// Navigation to other addresses is refused.
    pub locked_location: bool,
    /// Renderer switches are refused.
    pub locked_view_mode: bool,
    /// Cannot become the active pane (e.g. a directory tree beside the main view).
    pub passive: bool,
    /// Follows address changes of other linked panes.
    pub linked: bool,
    /// Auxiliary toggle pane.
    pub toggle: bool,
    /// Whether the displayed address may differ from the requested one.
    pub allow_redirect_display: bool,
}

impl PanePolicy {
    /// Toggle and passive panes are always view-mode locked.
    pub fn is_locked_view_mode(&self) -> bool {
        self.locked_view_mode || self.toggle || self.passive
    }

    pub fn can_become_active(&self) -> bool {
        !self.passive
    }
}

impl Default for PanePolicy {
    fn default() -> Self {
        Self {
            locked_location: false,
            locked_view_mode: false,
            passive: false,
            linked: false,
            toggle: false,
            allow_redirect_display: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaneLoadState {
    /// No renderer installed yet.
    #[default]
    Empty,
    Loading,
    Displayed,
    /// The last load was stopped, canceled or failed.
    Stopped,
}

/// What a `display`-family call did synchronously.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayOutcome {
    /// The live renderer was asked to load.
    Delegated,
    /// A new renderer replaced the old one (and was asked to load, if there was something to load).
    RendererSwitched,
    /// Nothing to do.
    Unchanged,
}

/// Normalized pane event forwarded to the navigation controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaneEvent {
    ContentChanged {
        old_renderer: Option<String>,
        new_renderer: String,
    },
    LoadStarted,
    LoadProgress(LoadProgress),
    LoadCompleted,
    LoadFailed {
        message: String,
    },
    LoadCanceled {
        message: Option<String>,
    },
    LocationBarAddress {
        address: String,
    },
    SelectionInfo {
        items: Vec<String>,
    },
    OpenRequested {
        address: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneSignal {
    pub pane: PaneId,
    pub event: PaneEvent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pane_id_is_unique() {
        let a = PaneId::new();
        let b = PaneId::new();
        assert_ne!(a, b, "each PaneId should be unique");
    }

    #[test]
    fn pane_id_round_trips() {
        let id = PaneId::new();
        let json = serde_json::to_string(&id).unwrap();
        let back: PaneId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
        assert!(id.to_string().starts_with("pane:"));
    }

    #[test]
    fn locked_view_mode_is_derived_from_toggle_and_passive() {
        let mut policy = PanePolicy::default();
        assert!(!policy.is_locked_view_mode());

        policy.toggle = true;
        assert!(policy.is_locked_view_mode());

        policy.toggle = false;
        policy.passive = true;
        assert!(policy.is_locked_view_mode());
        assert!(!policy.can_become_active());

        policy.passive = false;
        policy.locked_view_mode = true;
        assert!(policy.is_locked_view_mode());
        assert!(policy.can_become_active());
    }

    #[test]
    fn default_policy_allows_redirect_display() {
        assert!(PanePolicy::default().allow_redirect_display);
        assert_eq!(PaneLoadState::default(), PaneLoadState::Empty);
    }
}
