/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use viewhost::shell::desktop::lifecycle::renderer::ExtensionCall;
use viewhost::shell::desktop::workbench::navigation_controller::NavigationError;
use viewhost::{
    DisplayRequest, PaneError, PaneEvent, PanePolicy, RendererEvent, RendererRegistry,
};

use super::controller_over;

#[test]
fn browsing_mixed_content_switches_renderers_per_type() {
    let (mut nav, _) = controller_over(RendererRegistry::default());
    let pane = nav.create_pane(PanePolicy::default());

    let visits = [
        ("file:///home/user/", "viewer:iconview"),
        ("file:///home/user/notes.txt", "viewer:plaintext"),
        ("https://example.com/", "viewer:html"),
        ("file:///home/user/photo.png", "viewer:image"),
    ];
    for (address, renderer) in visits {
        nav.display(pane, DisplayRequest::new(address)).unwrap();
        nav.pump_events();
        assert_eq!(nav.pane(pane).unwrap().renderer_name(), Some(renderer));
    }
    assert_eq!(nav.pane(pane).unwrap().history().len(), 4);

    for (address, renderer) in visits.iter().rev().skip(1) {
        nav.go_back(pane).unwrap();
        nav.pump_events();
        let shown = nav.pane(pane).unwrap();
        assert_eq!(shown.address(), Some(*address));
        assert_eq!(shown.renderer_name(), Some(*renderer));
    }
    assert!(!nav.pane(pane).unwrap().can_go_back());
    assert!(nav.pane(pane).unwrap().can_go_forward());
}

#[test]
fn unknown_content_keeps_current_view() {
    let (mut nav, _) = controller_over(RendererRegistry::default());
    let pane = nav.create_pane(PanePolicy::default());
    nav.display(pane, DisplayRequest::new("file:///home/user/notes.txt"))
        .unwrap();
    nav.pump_events();

    let err = nav
        .display(pane, DisplayRequest::new("file:///home/user/archive.bin"))
        .unwrap_err();
    assert_eq!(
        err,
        NavigationError::Pane(PaneError::NoCapableRenderer {
            content_type: "application/octet-stream".to_string()
        })
    );
    let shown = nav.pane(pane).unwrap();
    assert_eq!(shown.renderer_name(), Some("viewer:plaintext"));
    assert_eq!(shown.address(), Some("file:///home/user/notes.txt"));
}

#[test]
fn directory_index_is_shown_but_requested_address_is_kept() {
    let (mut nav, probes) = controller_over(RendererRegistry::default());
    let pane = nav.create_pane(PanePolicy::default());
    probes["viewer:iconview"].set_auto_complete(false);

    nav.display(pane, DisplayRequest::new("dir:///home")).unwrap();
    probes["viewer:iconview"].complete(Some("dir:///home/index"));
    let signals = nav.pump_events();

    let shown = nav.pane(pane).unwrap();
    assert_eq!(shown.address(), Some("dir:///home"));
    assert_eq!(shown.displayed_address(), Some("dir:///home/index"));
    assert_eq!(shown.history().cursor(), Some(0));
    assert!(!shown.is_loading());
    assert!(signals.iter().any(|s| s.event
        == PaneEvent::LocationBarAddress {
            address: "dir:///home/index".to_string()
        }));
}

#[test]
fn switching_view_mode_keeps_location_and_history() {
    let (mut nav, probes) = controller_over(RendererRegistry::default());
    let pane = nav.create_pane(PanePolicy::default());
    nav.display(pane, DisplayRequest::new("dir:///srv")).unwrap();
    nav.pump_events();

    nav.change_view_mode(pane, "inode/directory", Some("viewer:listview"))
        .unwrap();
    nav.pump_events();

    let shown = nav.pane(pane).unwrap();
    assert_eq!(shown.renderer_name(), Some("viewer:listview"));
    assert_eq!(shown.address(), Some("dir:///srv"));
    assert_eq!(shown.history().len(), 1);
    assert_eq!(probes["viewer:listview"].opened().len(), 1);
}

#[test]
fn renderer_requests_surface_as_pane_signals() {
    let (mut nav, probes) = controller_over(RendererRegistry::default());
    let pane = nav.create_pane(PanePolicy::default());
    nav.display(pane, DisplayRequest::new("dir:///srv")).unwrap();
    nav.pump_events();

    let icons = &probes["viewer:iconview"];
    icons.emit(RendererEvent::SelectionChanged {
        items: vec!["README".to_string(), "src".to_string()],
    });
    icons.emit(RendererEvent::OpenRequested {
        address: "dir:///srv/src".to_string(),
    });
    let signals = nav.pump_events();

    let open = signals.iter().find_map(|s| match &s.event {
        PaneEvent::OpenRequested { address } => Some(address.clone()),
        _ => None,
    });
    assert_eq!(open.as_deref(), Some("dir:///srv/src"));
    assert!(nav
        .pane_mut(pane)
        .unwrap()
        .call_extension(&ExtensionCall::Text("sortBy".into(), "size".into())));
    assert_eq!(icons.extension_calls().len(), 1);
}

#[test]
fn split_panes_stay_in_sync_when_linked() {
    let (mut nav, _) = controller_over(RendererRegistry::default());
    let linked = PanePolicy {
        linked: true,
        ..PanePolicy::default()
    };
    let tree = nav.create_pane(PanePolicy {
        passive: true,
        ..linked
    });
    let main = nav.create_pane(linked);
    assert_eq!(nav.active_pane(), Some(main));

    nav.display(main, DisplayRequest::new("dir:///projects")).unwrap();
    nav.pump_events();
    nav.pump_events();

    assert_eq!(nav.pane(tree).unwrap().address(), Some("dir:///projects"));
    assert_eq!(nav.pane(main).unwrap().history().len(), 1);
}
