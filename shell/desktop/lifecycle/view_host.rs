/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Pane view host.
//!
//! Owns one live renderer, the pane's navigation history and its policy
//! flags. Display requests either go to the live renderer or trigger a
//! renderer switch; completion arrives later as a renderer event and is what
//! writes history. All of this runs on the owner's event loop. Renderer
//! events are queued and only applied by `process_events`.
//!
//! Invariants:
//! - at most one renderer is live; a replacement is installed only after it
//!   was constructed, so a failed switch leaves the old renderer in place;
//! - every renderer subscription carries a generation and events from any
//!   other generation are dropped, so a replaced renderer or a stopped load
//!   can no longer touch pane state.

use crate::registries::atomic::viewer::{RendererDescriptor, RendererRegistry, RendererResolution};
use crate::services::classification::ContentClassifier;
use crate::services::history::{HistoryEntry, HistoryError, HistoryStack};
use crate::services::persistence::types::PersistedPaneHistory;
use crate::shell::desktop::lifecycle::renderer::{
    EditOperations, ExtensionCall, LoadRequest, Renderer,
};
use crate::shell::desktop::lifecycle::renderer_events::{
    RendererEvent, RendererEventHub, RendererGeneration, RendererSubscription,
};
use crate::shell::desktop::lifecycle::renderer_factory::{
    DisplaySlot, RendererConstructionError, RendererFactory,
};
use crate::shell::desktop::runtime::diagnostics::{
    CHANNEL_EVENT_STALE_DISCARDED, CHANNEL_HISTORY_OUT_OF_RANGE, CHANNEL_LOAD_CANCELED,
    CHANNEL_LOAD_COMPLETED, CHANNEL_LOAD_FAILED, CHANNEL_LOAD_STARTED,
    CHANNEL_RENDERER_CONSTRUCTION_FAILED, CHANNEL_RENDERER_NO_CAPABLE,
    CHANNEL_RENDERER_SWITCH_STARTED, CHANNEL_RENDERER_SWITCH_SUCCEEDED, emit_message,
};
use crate::shell::desktop::workbench::pane_model::{
    DisplayOutcome, PaneEvent, PaneId, PaneLoadState, PanePolicy, PaneSignal,
};

/// Collaborators a pane needs to pick and build renderers.
#[derive(Clone, Copy)]
pub struct RendererEnvironment<'a> {
    pub registry: &'a RendererRegistry,
    pub factory: &'a dyn RendererFactory,
    pub classifier: &'a dyn ContentClassifier,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisplayRequest {
    pub address: String,
    /// What the location bar should show, e.g. the text the user typed.
    pub displayed_address_hint: Option<String>,
    pub name_filter: Option<String>,
    /// Update the current history entry instead of appending one.
    pub suppress_history: bool,
    pub reload: bool,
}

impl DisplayRequest {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    pub fn with_displayed_address(mut self, displayed: impl Into<String>) -> Self {
        self.displayed_address_hint = Some(displayed.into());
        self
    }

    pub fn with_name_filter(mut self, filter: impl Into<String>) -> Self {
        self.name_filter = Some(filter.into());
        self
    }

    pub fn suppressing_history(mut self) -> Self {
        self.suppress_history = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaneError {
    /// No registered renderer declares the content type.
    NoCapableRenderer { content_type: String },
    /// Candidates exist but none could be constructed.
    RendererConstructionFailed {
        content_type: String,
        failures: Vec<RendererConstructionError>,
    },
    LocationLocked { address: String },
    ViewModeLocked { content_type: String },
    /// `go` past either end of history. Not user visible.
    HistoryOutOfRange(HistoryError),
    InvalidHistory(HistoryError),
    NoCurrentLocation,
}

impl PaneError {
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, PaneError::HistoryOutOfRange(_))
    }
}

impl std::fmt::Display for PaneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaneError::NoCapableRenderer { content_type } => {
                write!(f, "cannot display content of type {content_type}")
            }
            PaneError::RendererConstructionFailed {
                content_type,
                failures,
            } => {
                write!(f, "no renderer for {content_type} could be created")?;
                for failure in failures {
                    write!(f, "; {failure}")?;
                }
                Ok(())
            }
            PaneError::LocationLocked { address } => {
                write!(f, "pane is locked to its location, refusing {address}")
            }
            PaneError::ViewModeLocked { content_type } => {
                write!(f, "pane is locked to its view mode, refusing {content_type}")
            }
            PaneError::HistoryOutOfRange(e) => write!(f, "{e}"),
            PaneError::InvalidHistory(e) => write!(f, "invalid history: {e}"),
            PaneError::NoCurrentLocation => write!(f, "pane has no current location"),
        }
    }
}

impl std::error::Error for PaneError {}

struct LiveRenderer {
    instance: Box<dyn Renderer>,
    descriptor: RendererDescriptor,
    subscription: RendererSubscription,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HistoryWrite {
    Append,
    UpdateCurrent,
}

#[derive(Debug)]
enum LoadOrigin {
    Navigation,
    /// Re-display of the current history entry with its saved renderer state.
    Replay(Option<Vec<u8>>),
}

#[derive(Debug)]
struct PendingLoad {
    address: String,
    displayed_hint: Option<String>,
    redirected_to: Option<String>,
    history_write: HistoryWrite,
    restore_state: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
struct CachedOffers {
    hint: Option<String>,
    resolution: RendererResolution,
}

pub struct Pane {
    id: PaneId,
    slot: DisplaySlot,
    renderer: Option<LiveRenderer>,
    events: RendererEventHub,
    history: HistoryStack,
    content_type: Option<String>,
    offers: Option<CachedOffers>,
    policy: PanePolicy,
    state: PaneLoadState,
    history_locked: bool,
    pending: Option<PendingLoad>,
    location_bar_address: Option<String>,
    typed_address: Option<String>,
    view_name: Option<String>,
    aborted: bool,
    outbox: Vec<PaneSignal>,
}

impl Pane {
    pub fn new(slot: DisplaySlot) -> Self {
        Self::with_policy(slot, PanePolicy::default())
    }

    pub fn with_policy(slot: DisplaySlot, policy: PanePolicy) -> Self {
        Self {
            id: PaneId::new(),
            slot,
            renderer: None,
            events: RendererEventHub::new(),
            history: HistoryStack::new(),
            content_type: None,
            offers: None,
            policy,
            state: PaneLoadState::Empty,
            history_locked: false,
            pending: None,
            location_bar_address: None,
            typed_address: None,
            view_name: None,
            aborted: false,
            outbox: Vec::new(),
        }
    }

    pub fn id(&self) -> PaneId {
        self.id
    }

    pub fn slot(&self) -> &DisplaySlot {
        &self.slot
    }

    pub fn state(&self) -> PaneLoadState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// True after a stop or cancel, until the next load starts.
    pub fn was_aborted(&self) -> bool {
        self.aborted
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn renderer_name(&self) -> Option<&str> {
        self.renderer.as_ref().map(|live| live.descriptor.name.as_str())
    }

    pub fn renderer_generation(&self) -> Option<RendererGeneration> {
        self.renderer
            .as_ref()
            .map(|live| live.subscription.generation())
    }

    /// Candidates resolved at the last renderer switch.
    pub fn offers(&self) -> Option<&RendererResolution> {
        self.offers.as_ref().map(|cached| &cached.resolution)
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn can_go_back(&self) -> bool {
        self.history.can_go_back()
    }

    pub fn can_go_forward(&self) -> bool {
        self.history.can_go_forward()
    }

    /// Requested address of the current history entry.
    pub fn address(&self) -> Option<&str> {
        self.history.current().map(|entry| entry.address.as_str())
    }

    /// Displayed address of the current history entry.
    pub fn displayed_address(&self) -> Option<&str> {
        self.history
            .current()
            .map(|entry| entry.displayed_address.as_str())
    }

    pub fn location_bar_address(&self) -> Option<&str> {
        self.location_bar_address.as_deref()
    }

    /// Store the location-bar text and tell the controller if it changed.
    pub fn set_location_bar_address(&mut self, address: impl Into<String>) {
        let address = address.into();
        if self.location_bar_address.as_deref() == Some(address.as_str()) {
            return;
        }
        self.location_bar_address = Some(address.clone());
        self.signal(PaneEvent::LocationBarAddress { address });
    }

    pub fn typed_address(&self) -> Option<&str> {
        self.typed_address.as_deref()
    }

    pub fn set_typed_address(&mut self, typed: impl Into<String>) {
        self.typed_address = Some(typed.into());
    }

    pub fn view_name(&self) -> Option<&str> {
        self.view_name.as_deref()
    }

    pub fn set_view_name(&mut self, name: impl Into<String>) {
        self.view_name = Some(name.into());
    }

    pub fn policy(&self) -> PanePolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: PanePolicy) {
        self.policy = policy;
    }

    pub fn set_locked_location(&mut self, locked: bool) {
        self.policy.locked_location = locked;
    }

    pub fn set_locked_view_mode(&mut self, locked: bool) {
        self.policy.locked_view_mode = locked;
    }

    pub fn set_passive(&mut self, passive: bool) {
        self.policy.passive = passive;
    }

    pub fn set_linked(&mut self, linked: bool) {
        self.policy.linked = linked;
    }

    pub fn set_toggle(&mut self, toggle: bool) {
        self.policy.toggle = toggle;
    }

    pub fn set_allow_redirect_display(&mut self, allow: bool) {
        self.policy.allow_redirect_display = allow;
    }

    pub fn is_history_locked(&self) -> bool {
        self.history_locked
    }

    /// Make the next navigation update the current entry instead of appending.
    pub fn lock_history(&mut self) {
        self.history_locked = true;
    }

    /// Classify `request.address` and display it.
    pub fn display(
        &mut self,
        env: &RendererEnvironment<'_>,
        request: DisplayRequest,
    ) -> Result<DisplayOutcome, PaneError> {
        let content_type = env.classifier.classify(&request.address);
        self.display_as(env, request, &content_type, None)
    }

    /// Display with an already known content type, e.g. after an asynchronous probe.
    pub fn display_as(
        &mut self,
        env: &RendererEnvironment<'_>,
        request: DisplayRequest,
        content_type: &str,
        implementation_hint: Option<&str>,
    ) -> Result<DisplayOutcome, PaneError> {
        self.begin_display(
            env,
            request,
            content_type,
            implementation_hint,
            LoadOrigin::Navigation,
        )
    }

    /// Force a renderer switch for the current location.
    ///
    /// Callers stop any in-flight load first.
    pub fn change_view_mode(
        &mut self,
        env: &RendererEnvironment<'_>,
        content_type: &str,
        implementation_hint: Option<&str>,
    ) -> Result<DisplayOutcome, PaneError> {
        if self.renderer_accepts(content_type, implementation_hint) {
            return Ok(DisplayOutcome::Unchanged);
        }
        if self.renderer.is_some() && self.policy.is_locked_view_mode() {
            return Err(PaneError::ViewModeLocked {
                content_type: content_type.to_string(),
            });
        }
        self.snapshot_renderer_state();
        self.switch_renderer(env, content_type, implementation_hint)?;
        if let Some(entry) = self.history.current().cloned() {
            let request = DisplayRequest {
                address: entry.address,
                displayed_address_hint: Some(entry.displayed_address),
                ..DisplayRequest::default()
            };
            self.issue_load(request, HistoryWrite::UpdateCurrent, None);
        }
        Ok(DisplayOutcome::RendererSwitched)
    }

    /// Move `steps` through history and re-display the entry landed on.
    pub fn go(
        &mut self,
        env: &RendererEnvironment<'_>,
        steps: isize,
    ) -> Result<DisplayOutcome, PaneError> {
        let target = match self.history.peek(steps) {
            Ok(entry) => entry.address.clone(),
            Err(e) => {
                log::debug!("pane: {} history boundary: {e}", self.id);
                emit_message(CHANNEL_HISTORY_OUT_OF_RANGE, &e.to_string());
                return Err(PaneError::HistoryOutOfRange(e));
            }
        };
        if self.policy.locked_location && self.address() != Some(target.as_str()) {
            return Err(PaneError::LocationLocked { address: target });
        }

        self.snapshot_renderer_state();
        self.history
            .move_by(steps)
            .map_err(PaneError::HistoryOutOfRange)?;
        let result = self.replay_current(env, false);
        if result.is_err() {
            // The previous entry is still on screen.
            let _ = self.history.move_by(-steps);
        }
        result
    }

    /// Reload the current entry in place, keeping its renderer state.
    pub fn reload(&mut self, env: &RendererEnvironment<'_>) -> Result<DisplayOutcome, PaneError> {
        self.snapshot_renderer_state();
        self.replay_current(env, true)
    }

    /// Cancel the in-flight load. Returns whether one was in flight.
    pub fn stop(&mut self) -> bool {
        let Some(live) = self.renderer.as_mut() else {
            return false;
        };
        live.instance.stop();
        let Some(pending) = self.pending.take() else {
            return false;
        };
        // Anything the stopped request still emits arrives under a dead generation.
        self.rewire();
        self.state = PaneLoadState::Stopped;
        self.aborted = true;
        emit_message(CHANNEL_LOAD_CANCELED, &pending.address);
        self.signal(PaneEvent::LoadCanceled { message: None });
        true
    }

    /// Apply queued renderer events and hand back the resulting signals.
    pub fn process_events(&mut self) -> Vec<PaneSignal> {
        for tagged in self.events.drain() {
            if self.renderer_generation() != Some(tagged.generation) {
                log::debug!(
                    "pane: {} dropping {:?} from stale {}",
                    self.id,
                    tagged.event,
                    tagged.generation
                );
                emit_message(CHANNEL_EVENT_STALE_DISCARDED, &tagged.generation.to_string());
                continue;
            }
            self.handle_renderer_event(tagged.event);
        }
        self.take_signals()
    }

    /// Signals produced synchronously by calls since the last drain.
    pub fn take_signals(&mut self) -> Vec<PaneSignal> {
        std::mem::take(&mut self.outbox)
    }

    /// Copy the live renderer's state into the current entry.
    pub fn snapshot_renderer_state(&mut self) {
        if self.state != PaneLoadState::Displayed {
            return;
        }
        let Some(state) = self
            .renderer
            .as_ref()
            .and_then(|live| live.instance.save_state())
        else {
            return;
        };
        self.history
            .update_current(|entry| entry.renderer_state = Some(state));
    }

    pub fn persisted_history(&self) -> PersistedPaneHistory {
        PersistedPaneHistory::from_history(&self.history, self.view_name.clone())
    }

    /// Replace history with a persisted one and display its current entry.
    /// On failure the previous history is kept.
    pub fn restore_history(
        &mut self,
        env: &RendererEnvironment<'_>,
        persisted: &PersistedPaneHistory,
    ) -> Result<DisplayOutcome, PaneError> {
        let restored = persisted
            .to_history_stack()
            .map_err(PaneError::InvalidHistory)?;
        if restored.is_empty() {
            return Ok(DisplayOutcome::Unchanged);
        }
        if let Some(target) = restored.current().map(|entry| entry.address.clone())
            && self.policy.locked_location
            && self.address().is_some_and(|current| current != target)
        {
            return Err(PaneError::LocationLocked { address: target });
        }
        let previous = std::mem::replace(&mut self.history, restored);
        match self.replay_current(env, false) {
            Ok(outcome) => {
                if persisted.view_name.is_some() {
                    self.view_name = persisted.view_name.clone();
                }
                Ok(outcome)
            }
            Err(e) => {
                self.history = previous;
                Err(e)
            }
        }
    }

    pub fn edit_operations(&mut self) -> Option<&mut dyn EditOperations> {
        self.renderer.as_mut()?.instance.edit_operations()
    }

    /// Forward an extension call. Returns whether the renderer handled it.
    pub fn call_extension(&mut self, call: &ExtensionCall) -> bool {
        match self.renderer.as_mut() {
            Some(live) => live.instance.call_extension(call),
            None => false,
        }
    }

    fn signal(&mut self, event: PaneEvent) {
        self.outbox.push(PaneSignal {
            pane: self.id,
            event,
        });
    }

    fn ensure_location_unlocked(&self, address: &str) -> Result<(), PaneError> {
        if !self.policy.locked_location {
            return Ok(());
        }
        match self.history.current() {
            Some(entry) if entry.address != address => Err(PaneError::LocationLocked {
                address: address.to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn renderer_accepts(&self, content_type: &str, implementation_hint: Option<&str>) -> bool {
        let Some(live) = self.renderer.as_ref() else {
            return false;
        };
        self.content_type.as_deref() == Some(content_type)
            && live.instance.supports_content_type(content_type)
            && implementation_hint.is_none_or(|name| name == live.descriptor.name)
    }

    fn begin_display(
        &mut self,
        env: &RendererEnvironment<'_>,
        request: DisplayRequest,
        content_type: &str,
        implementation_hint: Option<&str>,
        origin: LoadOrigin,
    ) -> Result<DisplayOutcome, PaneError> {
        let navigating = matches!(origin, LoadOrigin::Navigation);
        let (suppress, restore_state) = match origin {
            LoadOrigin::Navigation => {
                self.ensure_location_unlocked(&request.address)?;
                // Keep the state of the entry being left.
                self.snapshot_renderer_state();
                (request.suppress_history, None)
            }
            LoadOrigin::Replay(state) => (true, state),
        };

        let locked = self.policy.is_locked_view_mode();
        // A view-mode locked pane keeps its renderer when only the hint differs.
        let outcome = if self.renderer_accepts(content_type, implementation_hint)
            || (locked && self.renderer_accepts(content_type, None))
        {
            DisplayOutcome::Delegated
        } else if self.renderer.is_some() && locked {
            return Err(PaneError::ViewModeLocked {
                content_type: content_type.to_string(),
            });
        } else {
            self.switch_renderer(env, content_type, implementation_hint)?;
            DisplayOutcome::RendererSwitched
        };

        // The one-shot lock is only spent once the load is actually issued.
        let suppress = suppress || (navigating && std::mem::take(&mut self.history_locked));
        let history_write = if suppress {
            HistoryWrite::UpdateCurrent
        } else {
            HistoryWrite::Append
        };
        self.issue_load(request, history_write, restore_state);
        Ok(outcome)
    }

    fn replay_current(
        &mut self,
        env: &RendererEnvironment<'_>,
        reload: bool,
    ) -> Result<DisplayOutcome, PaneError> {
        let Some(entry) = self.history.current().cloned() else {
            return Err(PaneError::NoCurrentLocation);
        };
        let content_type = if entry.content_type.is_empty() {
            env.classifier.classify(&entry.address)
        } else {
            entry.content_type
        };
        let hint = Some(entry.implementation_name).filter(|name| !name.is_empty());
        let request = DisplayRequest {
            address: entry.address,
            displayed_address_hint: Some(entry.displayed_address),
            name_filter: None,
            suppress_history: true,
            reload,
        };
        self.begin_display(
            env,
            request,
            &content_type,
            hint.as_deref(),
            LoadOrigin::Replay(entry.renderer_state),
        )
    }

    fn issue_load(
        &mut self,
        request: DisplayRequest,
        history_write: HistoryWrite,
        restore_state: Option<Vec<u8>>,
    ) {
        if self.pending.take().is_some() {
            if let Some(live) = self.renderer.as_mut() {
                live.instance.stop();
            }
            self.rewire();
        }
        if self.renderer.is_none() {
            log::error!("pane: {} has no renderer to load {}", self.id, request.address);
            return;
        }

        let location = if self.policy.allow_redirect_display {
            request
                .displayed_address_hint
                .clone()
                .unwrap_or_else(|| request.address.clone())
        } else {
            request.address.clone()
        };
        self.pending = Some(PendingLoad {
            address: request.address.clone(),
            displayed_hint: request.displayed_address_hint,
            redirected_to: None,
            history_write,
            restore_state,
        });
        self.state = PaneLoadState::Loading;
        self.aborted = false;
        self.set_location_bar_address(location);
        emit_message(CHANNEL_LOAD_STARTED, &request.address);

        let load = LoadRequest {
            address: request.address,
            name_filter: request.name_filter,
            reload: request.reload,
        };
        if let Some(live) = self.renderer.as_mut() {
            live.instance.open(&load);
        }
    }

    /// Give the live renderer a fresh subscription.
    fn rewire(&mut self) {
        let Some(live) = self.renderer.as_mut() else {
            return;
        };
        live.subscription.cancel();
        live.instance.disconnect();
        let (sink, subscription) = self.events.subscribe();
        live.instance.connect(sink);
        live.subscription = subscription;
    }

    fn resolve_offers(
        &self,
        registry: &RendererRegistry,
        content_type: &str,
        implementation_hint: Option<&str>,
    ) -> RendererResolution {
        if let Some(cached) = self.offers.as_ref()
            && cached.resolution.content_type == content_type
            && cached.hint.as_deref() == implementation_hint
        {
            return cached.resolution.clone();
        }
        registry.resolve(content_type, implementation_hint)
    }

    fn switch_renderer(
        &mut self,
        env: &RendererEnvironment<'_>,
        content_type: &str,
        implementation_hint: Option<&str>,
    ) -> Result<(), PaneError> {
        emit_message(CHANNEL_RENDERER_SWITCH_STARTED, content_type);
        let resolution = self.resolve_offers(env.registry, content_type, implementation_hint);
        if resolution.is_empty() {
            log::info!("pane: {} cannot display {content_type}", self.id);
            emit_message(CHANNEL_RENDERER_NO_CAPABLE, content_type);
            return Err(PaneError::NoCapableRenderer {
                content_type: content_type.to_string(),
            });
        }

        let mut failures = Vec::new();
        let mut installed = None;
        for candidate in &resolution.candidates {
            match env.factory.create(candidate, &self.slot) {
                Ok(instance) if instance.supports_content_type(content_type) => {
                    installed = Some((instance, candidate.clone()));
                    break;
                }
                Ok(_) => failures.push(RendererConstructionError::CapabilityMismatch {
                    name: candidate.name.clone(),
                    content_type: content_type.to_string(),
                }),
                Err(e) => failures.push(e),
            }
            if let Some(failure) = failures.last() {
                log::warn!("pane: {} renderer candidate rejected: {failure}", self.id);
                emit_message(CHANNEL_RENDERER_CONSTRUCTION_FAILED, &candidate.name);
            }
        }

        let Some((instance, descriptor)) = installed else {
            return Err(PaneError::RendererConstructionFailed {
                content_type: content_type.to_string(),
                failures,
            });
        };
        self.install_renderer(instance, descriptor, content_type);
        self.offers = Some(CachedOffers {
            hint: implementation_hint.map(str::to_string),
            resolution,
        });
        Ok(())
    }

    fn install_renderer(
        &mut self,
        mut instance: Box<dyn Renderer>,
        descriptor: RendererDescriptor,
        content_type: &str,
    ) {
        let was_loading = self.pending.take().is_some();
        let old_renderer = self
            .renderer
            .take()
            .map(|old| teardown(old, was_loading));

        let (sink, subscription) = self.events.subscribe();
        instance.connect(sink);
        log::debug!(
            "pane: {} renderer {} -> {} for {content_type} ({})",
            self.id,
            old_renderer.as_deref().unwrap_or("none"),
            descriptor.name,
            subscription.generation()
        );
        emit_message(CHANNEL_RENDERER_SWITCH_SUCCEEDED, &descriptor.name);

        let new_renderer = descriptor.name.clone();
        self.renderer = Some(LiveRenderer {
            instance,
            descriptor,
            subscription,
        });
        self.content_type = Some(content_type.to_string());
        if self.state == PaneLoadState::Empty || was_loading {
            self.state = PaneLoadState::Displayed;
        }
        self.signal(PaneEvent::ContentChanged {
            old_renderer,
            new_renderer,
        });
    }

    fn handle_renderer_event(&mut self, event: RendererEvent) {
        match event {
            RendererEvent::LoadStarted => {
                if self.pending.is_some() {
                    self.state = PaneLoadState::Loading;
                    self.signal(PaneEvent::LoadStarted);
                }
            }
            RendererEvent::Progress(progress) => {
                if self.pending.is_some() {
                    self.signal(PaneEvent::LoadProgress(progress));
                }
            }
            RendererEvent::LoadCompleted {
                displayed_address,
                title,
            } => self.complete_load(displayed_address, title),
            RendererEvent::LoadFailed { message } => {
                if self.abandon_load(CHANNEL_LOAD_FAILED) {
                    log::warn!("pane: {} load failed: {message}", self.id);
                    self.signal(PaneEvent::LoadFailed { message });
                }
            }
            RendererEvent::LoadCanceled { message } => {
                if self.abandon_load(CHANNEL_LOAD_CANCELED) {
                    self.signal(PaneEvent::LoadCanceled {
                        message: Some(message).filter(|m| !m.is_empty()),
                    });
                }
            }
            RendererEvent::AddressChanged { address } => self.renderer_address_changed(address),
            RendererEvent::SelectionChanged { items } => {
                self.signal(PaneEvent::SelectionInfo { items });
            }
            RendererEvent::OpenRequested { address } => {
                self.signal(PaneEvent::OpenRequested { address });
            }
        }
    }

    fn complete_load(&mut self, displayed: Option<String>, title: Option<String>) {
        let Some(pending) = self.pending.take() else {
            log::debug!("pane: {} completion without a pending load", self.id);
            return;
        };
        let displayed_address = if self.policy.allow_redirect_display {
            displayed
                .or(pending.redirected_to)
                .or(pending.displayed_hint)
                .unwrap_or_else(|| pending.address.clone())
        } else {
            pending.address.clone()
        };

        if pending.history_write == HistoryWrite::Append || self.history.is_empty() {
            self.history.append(HistoryEntry::new(pending.address.clone()));
        }

        let entry_renderer = self
            .history
            .current()
            .map(|entry| entry.implementation_name.clone())
            .unwrap_or_default();
        let mut renderer_state = None;
        if let Some(live) = self.renderer.as_mut() {
            // State blobs are only meaningful to the renderer that saved them.
            if let Some(state) = pending.restore_state.as_deref()
                && (entry_renderer.is_empty() || entry_renderer == live.descriptor.name)
                && !live.instance.restore_state(state)
            {
                log::debug!("pane: {} renderer {} keeps no state", self.id, live.descriptor.name);
            }
            renderer_state = live.instance.save_state();
        }
        let content_type = self.content_type.clone().unwrap_or_default();
        let implementation_name = self.renderer_name().unwrap_or_default().to_string();
        let address = pending.address;
        let shown = displayed_address.clone();
        self.history.update_current(move |entry| {
            entry.address = address;
            entry.displayed_address = shown;
            if let Some(title) = title {
                entry.title = title;
            }
            entry.content_type = content_type;
            if renderer_state.is_some() || entry.implementation_name != implementation_name {
                entry.renderer_state = renderer_state;
            }
            entry.implementation_name = implementation_name;
        });

        self.state = PaneLoadState::Displayed;
        self.aborted = false;
        emit_message(CHANNEL_LOAD_COMPLETED, &displayed_address);
        self.set_location_bar_address(displayed_address);
        self.signal(PaneEvent::LoadCompleted);
    }

    /// Clear the pending load after a failure or cancel. History is untouched.
    fn abandon_load(&mut self, channel_id: &'static str) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };
        emit_message(channel_id, &pending.address);
        self.state = PaneLoadState::Stopped;
        self.aborted = true;
        true
    }

    fn renderer_address_changed(&mut self, address: String) {
        if !self.policy.allow_redirect_display {
            log::debug!("pane: {} ignoring renderer address {address}", self.id);
            return;
        }
        if let Some(pending) = self.pending.as_mut() {
            pending.redirected_to = Some(address.clone());
        } else if self.state == PaneLoadState::Displayed {
            let shown = address.clone();
            self.history
                .update_current(move |entry| entry.displayed_address = shown);
        }
        self.set_location_bar_address(address);
    }
}

impl Drop for Pane {
    fn drop(&mut self) {
        if let Some(live) = self.renderer.take() {
            teardown(live, self.pending.is_some());
        }
    }
}

/// Unsubscribe and release a renderer; returns its implementation name.
fn teardown(old: LiveRenderer, was_loading: bool) -> String {
    let LiveRenderer {
        mut instance,
        descriptor,
        subscription,
    } = old;
    subscription.cancel();
    if was_loading {
        instance.stop();
    }
    instance.disconnect();
    descriptor.name
}
