/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::collections::HashMap;

use viewhost::shell::desktop::lifecycle::renderer_factory::RendererConstructors;
use viewhost::test_utils::{RendererProbe, ScriptedRenderer};
use viewhost::{NavigationController, Renderer, RendererRegistry, VERSION};

mod file_manager;
mod saved_sessions;

/// Constructors for every embedded renderer in `registry`, one shared
/// auto-completing probe per implementation.
fn scripted_constructors(
    registry: &RendererRegistry,
) -> (RendererConstructors, HashMap<String, RendererProbe>) {
    let mut constructors = RendererConstructors::new();
    let mut probes = HashMap::new();
    for descriptor in registry.descriptors() {
        let probe = RendererProbe::new();
        probe.set_auto_complete(true);
        probes.insert(descriptor.name.clone(), probe.clone());
        constructors.register(&descriptor.name, move |descriptor, _slot| {
            Ok(Box::new(ScriptedRenderer::with_probe(descriptor.clone(), probe.clone()))
                as Box<dyn Renderer>)
        });
    }
    (constructors, probes)
}

fn controller_over(registry: RendererRegistry) -> (NavigationController, HashMap<String, RendererProbe>) {
    let (constructors, probes) = scripted_constructors(&registry);
    (
        NavigationController::with_factory(registry, Box::new(constructors)),
        probes,
    )
}

#[test]
fn scenarios_binary_smoke_runs() {
    assert!(!VERSION.is_empty());
}
