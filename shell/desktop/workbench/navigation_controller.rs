/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Owner of a set of panes.
//!
//! Allocates display slots, tracks which pane is active, forwards
//! navigation requests and pumps renderer events. Linked panes follow each
//! other: when one completes a load, the others display the same address.

use crate::registries::atomic::viewer::RendererRegistry;
use crate::services::classification::{ContentClassifier, MimeClassifier};
use crate::services::persistence::types::PersistedPaneHistory;
use crate::shell::desktop::lifecycle::renderer_factory::{
    DisplaySlot, DisplaySlotId, RendererFactory,
};
use crate::shell::desktop::lifecycle::view_host::{
    DisplayRequest, Pane, PaneError, RendererEnvironment,
};
use crate::shell::desktop::workbench::pane_model::{
    DisplayOutcome, PaneEvent, PaneId, PanePolicy, PaneSignal,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    UnknownPane(PaneId),
    /// Passive panes cannot become active.
    PassivePane(PaneId),
    Pane(PaneError),
}

impl std::fmt::Display for NavigationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NavigationError::UnknownPane(id) => write!(f, "unknown {id}"),
            NavigationError::PassivePane(id) => write!(f, "{id} is passive"),
            NavigationError::Pane(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for NavigationError {}

impl From<PaneError> for NavigationError {
    fn from(e: PaneError) -> Self {
        NavigationError::Pane(e)
    }
}

pub struct NavigationController {
    registry: RendererRegistry,
    factory: Box<dyn RendererFactory>,
    classifier: Box<dyn ContentClassifier>,
    panes: Vec<Pane>,
    active: Option<PaneId>,
    next_slot: u64,
}

impl NavigationController {
    pub fn new(
        registry: RendererRegistry,
        factory: Box<dyn RendererFactory>,
        classifier: Box<dyn ContentClassifier>,
    ) -> Self {
        Self {
            registry,
            factory,
            classifier,
            panes: Vec::new(),
            active: None,
            next_slot: 1,
        }
    }

    /// Controller using `MimeClassifier` for addresses.
    pub fn with_factory(registry: RendererRegistry, factory: Box<dyn RendererFactory>) -> Self {
        Self::new(registry, factory, Box::new(MimeClassifier))
    }

    pub fn registry(&self) -> &RendererRegistry {
        &self.registry
    }

    /// Registry edits only affect panes' next renderer switch.
    pub fn registry_mut(&mut self) -> &mut RendererRegistry {
        &mut self.registry
    }

    /// Create a pane in a fresh display slot. The first non-passive pane becomes active.
    pub fn create_pane(&mut self, policy: PanePolicy) -> PaneId {
        let slot = DisplaySlot::new(DisplaySlotId(self.next_slot));
        self.next_slot += 1;
        let pane = Pane::with_policy(slot, policy);
        let id = pane.id();
        log::debug!("pane: created {id} in {}", pane.slot().id);
        self.panes.push(pane);
        if self.active.is_none() && policy.can_become_active() {
            self.active = Some(id);
        }
        id
    }

    pub fn close_pane(&mut self, id: PaneId) -> bool {
        let Some(index) = self.panes.iter().position(|pane| pane.id() == id) else {
            return false;
        };
        let mut pane = self.panes.remove(index);
        pane.stop();
        drop(pane);
        if self.active == Some(id) {
            self.active = self.first_activatable(None);
        }
        true
    }

    pub fn pane(&self, id: PaneId) -> Option<&Pane> {
        self.panes.iter().find(|pane| pane.id() == id)
    }

    pub fn pane_mut(&mut self, id: PaneId) -> Option<&mut Pane> {
        self.panes.iter_mut().find(|pane| pane.id() == id)
    }

    /// Pane ids in creation order.
    pub fn pane_ids(&self) -> Vec<PaneId> {
        self.panes.iter().map(Pane::id).collect()
    }

    pub fn active_pane(&self) -> Option<PaneId> {
        self.active
    }

    pub fn set_active_pane(&mut self, id: PaneId) -> Result<(), NavigationError> {
        let pane = self.pane(id).ok_or(NavigationError::UnknownPane(id))?;
        if !pane.policy().can_become_active() {
            return Err(NavigationError::PassivePane(id));
        }
        self.active = Some(id);
        Ok(())
    }

    /// Making the active pane passive hands the active role to another pane.
    pub fn set_passive(&mut self, id: PaneId, passive: bool) -> Result<(), NavigationError> {
        let pane = self.pane_mut(id).ok_or(NavigationError::UnknownPane(id))?;
        pane.set_passive(passive);
        if passive && self.active == Some(id) {
            self.active = self.first_activatable(Some(id));
            log::debug!(
                "pane: {id} turned passive, active pane is now {}",
                self.active
                    .map(|next| next.to_string())
                    .unwrap_or_else(|| "none".to_string())
            );
        } else if !passive && self.active.is_none() {
            self.active = Some(id);
        }
        Ok(())
    }

    pub fn display(
        &mut self,
        id: PaneId,
        request: DisplayRequest,
    ) -> Result<DisplayOutcome, NavigationError> {
        let (env, pane) = self.parts(id)?;
        Ok(pane.display(&env, request)?)
    }

    pub fn display_as(
        &mut self,
        id: PaneId,
        request: DisplayRequest,
        content_type: &str,
        implementation_hint: Option<&str>,
    ) -> Result<DisplayOutcome, NavigationError> {
        let (env, pane) = self.parts(id)?;
        Ok(pane.display_as(&env, request, content_type, implementation_hint)?)
    }

    /// Stops any in-flight load before switching.
    pub fn change_view_mode(
        &mut self,
        id: PaneId,
        content_type: &str,
        implementation_hint: Option<&str>,
    ) -> Result<DisplayOutcome, NavigationError> {
        let (env, pane) = self.parts(id)?;
        pane.stop();
        Ok(pane.change_view_mode(&env, content_type, implementation_hint)?)
    }

    pub fn go(&mut self, id: PaneId, steps: isize) -> Result<DisplayOutcome, NavigationError> {
        let (env, pane) = self.parts(id)?;
        Ok(pane.go(&env, steps)?)
    }

    pub fn go_back(&mut self, id: PaneId) -> Result<DisplayOutcome, NavigationError> {
        self.go(id, -1)
    }

    pub fn go_forward(&mut self, id: PaneId) -> Result<DisplayOutcome, NavigationError> {
        self.go(id, 1)
    }

    pub fn reload(&mut self, id: PaneId) -> Result<DisplayOutcome, NavigationError> {
        let (env, pane) = self.parts(id)?;
        Ok(pane.reload(&env)?)
    }

    pub fn restore_history(
        &mut self,
        id: PaneId,
        persisted: &PersistedPaneHistory,
    ) -> Result<DisplayOutcome, NavigationError> {
        let (env, pane) = self.parts(id)?;
        Ok(pane.restore_history(&env, persisted)?)
    }

    pub fn stop(&mut self, id: PaneId) -> Result<bool, NavigationError> {
        let pane = self.pane_mut(id).ok_or(NavigationError::UnknownPane(id))?;
        Ok(pane.stop())
    }

    /// Apply every pane's queued renderer events, then sync linked panes.
    pub fn pump_events(&mut self) -> Vec<PaneSignal> {
        let mut signals: Vec<PaneSignal> = self
            .panes
            .iter_mut()
            .flat_map(Pane::process_events)
            .collect();

        let completed_linked: Vec<(PaneId, String)> = signals
            .iter()
            .filter(|signal| signal.event == PaneEvent::LoadCompleted)
            .filter_map(|signal| {
                let pane = self.pane(signal.pane)?;
                if !pane.policy().linked {
                    return None;
                }
                Some((signal.pane, pane.address()?.to_string()))
            })
            .collect();
        for (source, address) in completed_linked {
            signals.extend(self.sync_linked(source, &address));
        }
        signals
    }

    fn sync_linked(&mut self, source: PaneId, address: &str) -> Vec<PaneSignal> {
        let env = RendererEnvironment {
            registry: &self.registry,
            factory: self.factory.as_ref(),
            classifier: self.classifier.as_ref(),
        };
        let mut signals = Vec::new();
        for pane in self.panes.iter_mut().filter(|pane| {
            let policy = pane.policy();
            pane.id() != source
                && policy.linked
                && !policy.locked_location
                && pane.address() != Some(address)
        }) {
            log::debug!("pane: {} follows linked {source} to {address}", pane.id());
            if let Err(e) = pane.display(&env, DisplayRequest::new(address)) {
                log::warn!("pane: {} could not follow {source}: {e}", pane.id());
            }
            signals.extend(pane.take_signals());
        }
        signals
    }

    fn parts(
        &mut self,
        id: PaneId,
    ) -> Result<(RendererEnvironment<'_>, &mut Pane), NavigationError> {
        let env = RendererEnvironment {
            registry: &self.registry,
            factory: self.factory.as_ref(),
            classifier: self.classifier.as_ref(),
        };
        let pane = self
            .panes
            .iter_mut()
            .find(|pane| pane.id() == id)
            .ok_or(NavigationError::UnknownPane(id))?;
        Ok((env, pane))
    }

    fn first_activatable(&self, except: Option<PaneId>) -> Option<PaneId> {
        self.panes
            .iter()
            .find(|pane| Some(pane.id()) != except && pane.policy().can_become_active())
            .map(Pane::id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ScriptedFactory, test_classifier, test_registry};

    fn controller() -> NavigationController {
        NavigationController::new(
            test_registry(),
            Box::new(ScriptedFactory::auto_completing()),
            Box::new(test_classifier),
        )
    }

    fn linked() -> PanePolicy {
        PanePolicy {
            linked: true,
            ..PanePolicy::default()
        }
    }

    #[test]
    fn first_pane_becomes_active_and_slots_are_distinct() {
        let mut nav = controller();
        let a = nav.create_pane(PanePolicy::default());
        let b = nav.create_pane(PanePolicy::default());

        assert_eq!(nav.active_pane(), Some(a));
        assert_eq!(nav.pane_ids(), vec![a, b]);
        assert_ne!(nav.pane(a).unwrap().slot(), nav.pane(b).unwrap().slot());
    }

    #[test]
    fn passive_pane_cannot_be_activated() {
        let mut nav = controller();
        let tree = nav.create_pane(PanePolicy {
            passive: true,
            ..PanePolicy::default()
        });
        assert_eq!(nav.active_pane(), None);
        let main = nav.create_pane(PanePolicy::default());
        assert_eq!(nav.active_pane(), Some(main));

        assert_eq!(
            nav.set_active_pane(tree),
            Err(NavigationError::PassivePane(tree))
        );
        assert_eq!(nav.active_pane(), Some(main));
    }

    #[test]
    fn turning_active_pane_passive_hands_off_activity() {
        let mut nav = controller();
        let a = nav.create_pane(PanePolicy::default());
        let b = nav.create_pane(PanePolicy::default());

        nav.set_passive(a, true).unwrap();
        assert_eq!(nav.active_pane(), Some(b));
        assert!(nav.pane(a).unwrap().policy().passive);

        nav.set_passive(b, true).unwrap();
        assert_eq!(nav.active_pane(), None);
        nav.set_passive(a, false).unwrap();
        assert_eq!(nav.active_pane(), Some(a));
    }

    #[test]
    fn closing_active_pane_activates_next() {
        let mut nav = controller();
        let a = nav.create_pane(PanePolicy::default());
        let b = nav.create_pane(PanePolicy::default());

        assert!(nav.close_pane(a));
        assert!(!nav.close_pane(a));
        assert_eq!(nav.active_pane(), Some(b));
        assert!(matches!(
            nav.display(a, DisplayRequest::new("file:///x")),
            Err(NavigationError::UnknownPane(_))
        ));
    }

    #[test]
    fn navigation_requests_are_forwarded() {
        let mut nav = controller();
        let id = nav.create_pane(PanePolicy::default());

        nav.display(id, DisplayRequest::new("file:///a.txt")).unwrap();
        nav.pump_events();
        nav.display(id, DisplayRequest::new("dir:///home")).unwrap();
        nav.pump_events();
        assert_eq!(nav.pane(id).unwrap().history().len(), 2);

        nav.go_back(id).unwrap();
        nav.pump_events();
        assert_eq!(nav.pane(id).unwrap().address(), Some("file:///a.txt"));
        assert!(matches!(
            nav.go(id, -1),
            Err(NavigationError::Pane(PaneError::HistoryOutOfRange(_)))
        ));

        nav.go_forward(id).unwrap();
        nav.pump_events();
        nav.change_view_mode(id, "directory", Some("viewer:list"))
            .unwrap();
        nav.pump_events();
        let pane = nav.pane(id).unwrap();
        assert_eq!(pane.renderer_name(), Some("viewer:list"));
        assert_eq!(pane.history().len(), 2);

        nav.reload(id).unwrap();
        nav.pump_events();
        assert_eq!(nav.pane(id).unwrap().history().len(), 2);
        assert_eq!(nav.stop(id), Ok(false));
    }

    #[test]
    fn linked_panes_follow_completed_loads() {
        let mut nav = controller();
        let left = nav.create_pane(linked());
        let right = nav.create_pane(linked());
        let unlinked = nav.create_pane(PanePolicy::default());

        nav.display(left, DisplayRequest::new("dir:///home")).unwrap();
        let first = nav.pump_events();
        assert!(first.iter().any(|s| s.pane == right));
        // The follower's own completion settles on the next pump without echoing back.
        nav.pump_events();

        assert_eq!(nav.pane(right).unwrap().address(), Some("dir:///home"));
        assert_eq!(nav.pane(left).unwrap().history().len(), 1);
        assert!(nav.pane(unlinked).unwrap().address().is_none());
    }

    #[test]
    fn location_locked_linked_pane_does_not_follow() {
        let mut nav = controller();
        let left = nav.create_pane(linked());
        let right = nav.create_pane(PanePolicy {
            linked: true,
            locked_location: true,
            ..PanePolicy::default()
        });

        nav.display(left, DisplayRequest::new("file:///a.txt")).unwrap();
        nav.pump_events();
        assert!(nav.pane(right).unwrap().address().is_none());
    }

    #[test]
    fn view_mode_errors_surface_through_controller() {
        let mut nav = controller();
        let id = nav.create_pane(PanePolicy {
            toggle: true,
            ..PanePolicy::default()
        });
        nav.display(id, DisplayRequest::new("dir:///home")).unwrap();
        nav.pump_events();

        let err = nav
            .change_view_mode(id, "directory", Some("viewer:list"))
            .unwrap_err();
        assert!(matches!(
            err,
            NavigationError::Pane(PaneError::ViewModeLocked { .. })
        ));
    }
}
