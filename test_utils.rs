/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Scripted renderers and factories for driving panes in tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::registries::atomic::viewer::{RendererDescriptor, RendererRegistry};
use crate::shell::desktop::lifecycle::renderer::{
    EditCapabilities, EditOperations, ExtensionCall, LoadRequest, Renderer,
};
use crate::shell::desktop::lifecycle::renderer_events::{RendererEvent, RendererEventSink};
use crate::shell::desktop::lifecycle::renderer_factory::{
    DisplaySlot, RendererConstructionError, RendererFactory,
};

#[derive(Debug, Default)]
struct ProbeState {
    sink: Option<RendererEventSink>,
    opened: Vec<LoadRequest>,
    stops: usize,
    disconnects: usize,
    saved_state: Option<Vec<u8>>,
    restored: Vec<Vec<u8>>,
    extension_calls: Vec<ExtensionCall>,
    edit_log: Vec<String>,
    auto_complete: bool,
}

/// Test-side handle onto a scripted renderer.
#[derive(Debug, Clone, Default)]
pub struct RendererProbe {
    inner: Rc<RefCell<ProbeState>>,
}

impl RendererProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit through the renderer's current sink, as the renderer would.
    pub fn emit(&self, event: RendererEvent) -> bool {
        match self.inner.borrow().sink.as_ref() {
            Some(sink) => sink.emit(event),
            None => false,
        }
    }

    pub fn complete(&self, displayed_address: Option<&str>) -> bool {
        self.emit(RendererEvent::LoadCompleted {
            displayed_address: displayed_address.map(str::to_string),
            title: None,
        })
    }

    pub fn complete_with_title(&self, displayed_address: Option<&str>, title: &str) -> bool {
        self.emit(RendererEvent::LoadCompleted {
            displayed_address: displayed_address.map(str::to_string),
            title: Some(title.to_string()),
        })
    }

    /// Clone of the sink the renderer currently holds.
    pub fn sink(&self) -> Option<RendererEventSink> {
        self.inner.borrow().sink.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.inner.borrow().sink.is_some()
    }

    pub fn opened(&self) -> Vec<LoadRequest> {
        self.inner.borrow().opened.clone()
    }

    pub fn stop_count(&self) -> usize {
        self.inner.borrow().stops
    }

    pub fn disconnect_count(&self) -> usize {
        self.inner.borrow().disconnects
    }

    pub fn set_saved_state(&self, state: &[u8]) {
        self.inner.borrow_mut().saved_state = Some(state.to_vec());
    }

    pub fn restored(&self) -> Vec<Vec<u8>> {
        self.inner.borrow().restored.clone()
    }

    pub fn extension_calls(&self) -> Vec<ExtensionCall> {
        self.inner.borrow().extension_calls.clone()
    }

    pub fn edit_log(&self) -> Vec<String> {
        self.inner.borrow().edit_log.clone()
    }

    /// Complete every load synchronously inside `open`.
    pub fn set_auto_complete(&self, auto_complete: bool) {
        self.inner.borrow_mut().auto_complete = auto_complete;
    }
}

pub struct ScriptedRenderer {
    descriptor: RendererDescriptor,
    probe: RendererProbe,
}

impl ScriptedRenderer {
    pub fn new(descriptor: RendererDescriptor) -> Self {
        Self::with_probe(descriptor, RendererProbe::new())
    }

    pub fn with_probe(descriptor: RendererDescriptor, probe: RendererProbe) -> Self {
        Self { descriptor, probe }
    }
}

impl Renderer for ScriptedRenderer {
    fn descriptor(&self) -> &RendererDescriptor {
        &self.descriptor
    }

    fn connect(&mut self, sink: RendererEventSink) {
        self.probe.inner.borrow_mut().sink = Some(sink);
    }

    fn disconnect(&mut self) {
        let mut state = self.probe.inner.borrow_mut();
        state.sink = None;
        state.disconnects += 1;
    }

    fn open(&mut self, request: &LoadRequest) {
        let auto_complete = {
            let mut state = self.probe.inner.borrow_mut();
            state.opened.push(request.clone());
            state.auto_complete
        };
        self.probe.emit(RendererEvent::LoadStarted);
        if auto_complete {
            self.probe.complete(None);
        }
    }

    fn stop(&mut self) {
        self.probe.inner.borrow_mut().stops += 1;
    }

    fn save_state(&self) -> Option<Vec<u8>> {
        self.probe.inner.borrow().saved_state.clone()
    }

    fn restore_state(&mut self, state: &[u8]) -> bool {
        let mut probe = self.probe.inner.borrow_mut();
        probe.restored.push(state.to_vec());
        probe.saved_state = Some(state.to_vec());
        true
    }

    fn edit_operations(&mut self) -> Option<&mut dyn EditOperations> {
        Some(self)
    }

    fn call_extension(&mut self, call: &ExtensionCall) -> bool {
        self.probe
            .inner
            .borrow_mut()
            .extension_calls
            .push(call.clone());
        true
    }
}

impl EditOperations for ScriptedRenderer {
    fn capabilities(&self) -> EditCapabilities {
        EditCapabilities {
            cut: true,
            copy: true,
            paste: false,
            move_items: true,
        }
    }

    fn cut_selection(&mut self) {
        self.probe.inner.borrow_mut().edit_log.push("cut".into());
    }

    fn copy_selection(&mut self) {
        self.probe.inner.borrow_mut().edit_log.push("copy".into());
    }

    fn paste_selection(&mut self, move_items: bool) {
        self.probe
            .inner
            .borrow_mut()
            .edit_log
            .push(format!("paste move={move_items}"));
    }

    fn move_selection(&mut self, destination: Option<&str>) {
        self.probe
            .inner
            .borrow_mut()
            .edit_log
            .push(format!("move {}", destination.unwrap_or("-")));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedConstruction {
    Succeed,
    Fail(String),
    /// Builds a renderer that does not declare the candidate's content types.
    Mismatch,
}

/// Factory whose per-implementation behavior is scripted by the test.
#[derive(Default)]
pub struct ScriptedFactory {
    behaviors: RefCell<HashMap<String, ScriptedConstruction>>,
    created: RefCell<Vec<(String, RendererProbe)>>,
    auto_complete: bool,
}

impl ScriptedFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renderers built by this factory complete every load inside `open`.
    pub fn auto_completing() -> Self {
        Self {
            auto_complete: true,
            ..Self::default()
        }
    }

    pub fn script(&self, name: &str, construction: ScriptedConstruction) {
        self.behaviors
            .borrow_mut()
            .insert(name.to_string(), construction);
    }

    pub fn created_names(&self) -> Vec<String> {
        self.created
            .borrow()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Probe of the most recently built renderer.
    pub fn last_probe(&self) -> Option<RendererProbe> {
        self.created
            .borrow()
            .last()
            .map(|(_, probe)| probe.clone())
    }

    pub fn probe_for(&self, name: &str) -> Option<RendererProbe> {
        self.created
            .borrow()
            .iter()
            .rev()
            .find(|(created, _)| created == name)
            .map(|(_, probe)| probe.clone())
    }
}

impl RendererFactory for ScriptedFactory {
    fn create(
        &self,
        candidate: &RendererDescriptor,
        _slot: &DisplaySlot,
    ) -> Result<Box<dyn Renderer>, RendererConstructionError> {
        let behavior = self
            .behaviors
            .borrow()
            .get(&candidate.name)
            .cloned()
            .unwrap_or(ScriptedConstruction::Succeed);
        let descriptor = match behavior {
            ScriptedConstruction::Succeed => candidate.clone(),
            ScriptedConstruction::Fail(reason) => {
                return Err(RendererConstructionError::Failed {
                    name: candidate.name.clone(),
                    reason,
                });
            }
            ScriptedConstruction::Mismatch => RendererDescriptor {
                content_types: Vec::new(),
                ..candidate.clone()
            },
        };
        let probe = RendererProbe::new();
        probe.set_auto_complete(self.auto_complete);
        self.created
            .borrow_mut()
            .push((candidate.name.clone(), probe.clone()));
        Ok(Box::new(ScriptedRenderer::with_probe(descriptor, probe)))
    }
}

/// Registry with one or two embedded renderers per test content type.
pub fn test_registry() -> RendererRegistry {
    let mut registry = RendererRegistry::new();
    registry.register(RendererDescriptor::embedded(
        "viewer:icons",
        &[("directory", 20)],
    ));
    registry.register(RendererDescriptor::embedded(
        "viewer:list",
        &[("directory", 10)],
    ));
    registry.register(RendererDescriptor::embedded(
        "viewer:text",
        &[("text/plain", 10)],
    ));
    registry.register(RendererDescriptor::embedded(
        "viewer:html",
        &[("text/html", 10)],
    ));
    registry
}

/// Classifies `dir://` addresses as `directory`, `.html` as HTML, everything else as text.
pub fn test_classifier(address: &str) -> String {
    if address.starts_with("dir:") {
        "directory".to_string()
    } else if address.ends_with(".html") {
        "text/html".to_string()
    } else if address.ends_with(".bin") {
        "application/x-unknown".to_string()
    } else {
        "text/plain".to_string()
    }
}
