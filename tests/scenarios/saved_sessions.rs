/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use tempfile::TempDir;
use viewhost::services::persistence::{
    decode_pane_history, encode_pane_history, load_pane_history_json, save_pane_history_json,
};
use viewhost::{DisplayRequest, PanePolicy, RendererRegistry};

use super::controller_over;

#[test]
fn saved_history_reopens_on_the_same_entry_with_state() {
    let (mut nav, probes) = controller_over(RendererRegistry::default());
    let pane = nav.create_pane(PanePolicy::default());
    for address in ["dir:///home", "file:///home/a.txt", "file:///home/b.txt"] {
        nav.display(pane, DisplayRequest::new(address)).unwrap();
        nav.pump_events();
    }
    probes["viewer:plaintext"].set_saved_state(b"line=42");
    nav.go_back(pane).unwrap();
    nav.pump_events();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session").join("pane.json");
    let pane_ref = nav.pane_mut(pane).unwrap();
    pane_ref.set_view_name("main");
    pane_ref.snapshot_renderer_state();
    save_pane_history_json(&path, &pane_ref.persisted_history()).unwrap();

    let (mut reopened, reopened_probes) = controller_over(RendererRegistry::default());
    let restored = reopened.create_pane(PanePolicy::default());
    let saved = load_pane_history_json(&path).unwrap();
    reopened.restore_history(restored, &saved).unwrap();
    reopened.pump_events();

    let shown = reopened.pane(restored).unwrap();
    assert_eq!(shown.address(), Some("file:///home/a.txt"));
    assert_eq!(shown.view_name(), Some("main"));
    assert_eq!(shown.history().len(), 3);
    assert!(shown.can_go_back() && shown.can_go_forward());
    assert_eq!(
        reopened_probes["viewer:plaintext"].restored(),
        vec![b"line=42".to_vec()]
    );
}

#[test]
fn binary_snapshot_matches_json_snapshot() {
    let (mut nav, _) = controller_over(RendererRegistry::default());
    let pane = nav.create_pane(PanePolicy::default());
    nav.display(pane, DisplayRequest::new("https://example.com/docs"))
        .unwrap();
    nav.pump_events();
    let persisted = nav.pane(pane).unwrap().persisted_history();

    let bytes = encode_pane_history(&persisted).unwrap();
    let decoded = decode_pane_history(&bytes).unwrap();
    assert_eq!(decoded, persisted);
    assert_eq!(decoded.entries[0].implementation_name, "viewer:html");
    assert_eq!(decoded.entries[0].content_type, "text/html");
}
