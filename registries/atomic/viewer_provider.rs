/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Renderer provider hooks.
//!
//! Components that ship renderer implementations register a provider here;
//! applying the providers declares their descriptors in the RendererRegistry.

use super::viewer::RendererRegistry;

/// Ordered list of provider functions applied to a fresh registry.
pub struct RendererProviders {
    providers: Vec<Box<dyn Fn(&mut RendererRegistry)>>,
}

impl RendererProviders {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Register a provider function.
    pub fn register_fn<F>(&mut self, f: F)
    where
        F: Fn(&mut RendererRegistry) + 'static,
    {
        self.providers.push(Box::new(f));
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Apply all registered providers, in registration order.
    pub fn apply_all(&self, registry: &mut RendererRegistry) {
        for provider in &self.providers {
            provider(registry);
        }
    }
}

impl Default for RendererProviders {
    fn default() -> Self {
        Self::new()
    }
}
