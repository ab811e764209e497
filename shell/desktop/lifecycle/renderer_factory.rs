/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Renderer instantiation.
//!
//! The factory builds a renderer bound to a display slot. It never issues a
//! load and never touches the slot's current occupant; on failure the caller
//! keeps whatever renderer it already had.

use std::collections::HashMap;

use crate::registries::atomic::viewer::RendererDescriptor;
use crate::shell::desktop::lifecycle::renderer::Renderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DisplaySlotId(pub u64);

impl std::fmt::Display for DisplaySlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "slot:{}", self.0)
    }
}

/// Widget slot a pane's renderer draws into. Owned by the navigation controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplaySlot {
    pub id: DisplaySlotId,
}

impl DisplaySlot {
    pub fn new(id: DisplaySlotId) -> Self {
        Self { id }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RendererConstructionError {
    /// No constructor is known for the implementation name.
    NotRegistered { name: String },
    /// The constructor itself failed.
    Failed { name: String, reason: String },
    /// The constructed object does not provide what the candidate declared.
    CapabilityMismatch { name: String, content_type: String },
}

impl RendererConstructionError {
    pub fn implementation_name(&self) -> &str {
        match self {
            Self::NotRegistered { name }
            | Self::Failed { name, .. }
            | Self::CapabilityMismatch { name, .. } => name,
        }
    }
}

impl std::fmt::Display for RendererConstructionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotRegistered { name } => write!(f, "no constructor registered for {name}"),
            Self::Failed { name, reason } => write!(f, "{name} failed to construct: {reason}"),
            Self::CapabilityMismatch { name, content_type } => {
                write!(f, "{name} does not provide a renderer for {content_type}")
            }
        }
    }
}

impl std::error::Error for RendererConstructionError {}

pub trait RendererFactory {
    fn create(
        &self,
        candidate: &RendererDescriptor,
        slot: &DisplaySlot,
    ) -> Result<Box<dyn Renderer>, RendererConstructionError>;
}

impl<F> RendererFactory for F
where
    F: Fn(&RendererDescriptor, &DisplaySlot) -> Result<Box<dyn Renderer>, RendererConstructionError>,
{
    fn create(
        &self,
        candidate: &RendererDescriptor,
        slot: &DisplaySlot,
    ) -> Result<Box<dyn Renderer>, RendererConstructionError> {
        self(candidate, slot)
    }
}

type RendererConstructor =
    Box<dyn Fn(&RendererDescriptor, &DisplaySlot) -> Result<Box<dyn Renderer>, String>>;

/// Factory backed by a table of per-implementation constructors.
pub struct RendererConstructors {
    constructors: HashMap<String, RendererConstructor>,
}

impl RendererConstructors {
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    pub fn register<F>(&mut self, name: &str, constructor: F)
    where
        F: Fn(&RendererDescriptor, &DisplaySlot) -> Result<Box<dyn Renderer>, String> + 'static,
    {
        self.constructors
            .insert(name.to_string(), Box::new(constructor));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }
}

impl Default for RendererConstructors {
    fn default() -> Self {
        Self::new()
    }
}

impl RendererFactory for RendererConstructors {
    fn create(
        &self,
        candidate: &RendererDescriptor,
        slot: &DisplaySlot,
    ) -> Result<Box<dyn Renderer>, RendererConstructionError> {
        let Some(constructor) = self.constructors.get(&candidate.name) else {
            return Err(RendererConstructionError::NotRegistered {
                name: candidate.name.clone(),
            });
        };
        let renderer = constructor(candidate, slot).map_err(|reason| {
            RendererConstructionError::Failed {
                name: candidate.name.clone(),
                reason,
            }
        })?;
        if renderer.descriptor().name != candidate.name {
            return Err(RendererConstructionError::CapabilityMismatch {
                name: candidate.name.clone(),
                content_type: candidate
                    .content_types
                    .first()
                    .map(|b| b.content_type.clone())
                    .unwrap_or_default(),
            });
        }
        Ok(renderer)
    }
}
