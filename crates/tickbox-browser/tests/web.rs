//! WASM browser tests for tickbox-browser.
//!
//! Run with: `wasm-pack test --headless --firefox` or `--chrome`

use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsCast;

use tickbox_browser::bind::bind_region_controls;
use tickbox_browser::dom::{DomRegion, MARKER_ATTR, scan_regions};
use tickbox_browser::{RegionNode, RegionRole, RegionStore, SmolStr, run_pass};

fn document() -> web_sys::Document {
    web_sys::window().unwrap().document().unwrap()
}

/// Build `<div class="{ancestor}"><div class="wiki text">{content}</div></div>`.
fn wrapped_region(ancestor_class: &str, content: &str) -> (web_sys::Element, DomRegion) {
    let doc = document();
    let outer = doc.create_element("div").unwrap();
    outer.set_class_name(ancestor_class);
    let inner = doc.create_element("div").unwrap();
    inner.set_class_name("wiki text");
    inner.set_inner_html(content);
    outer.append_child(&inner).unwrap();
    (outer, DomRegion::new(inner))
}

// === DomRegion basics ===

#[wasm_bindgen_test]
fn test_marker_roundtrip() {
    let (_outer, region) = wrapped_region("comment", "hello");
    assert_eq!(region.marker(), None);
    region.set_marker("34f91ad6cce2");
    assert_eq!(region.marker().as_deref(), Some("34f91ad6cce2"));
    assert_eq!(
        region.element().get_attribute(MARKER_ATTR).as_deref(),
        Some("34f91ad6cce2")
    );
}

#[wasm_bindgen_test]
fn test_content_roundtrip() {
    let (_outer, region) = wrapped_region("comment", "before");
    assert_eq!(region.content(), "before");
    region.set_content("after <b>bold</b>");
    assert_eq!(region.content(), "after <b>bold</b>");
}

// === Classification ===

#[wasm_bindgen_test]
fn test_classify_by_ancestor() {
    let (_o, comment) = wrapped_region("comment", "");
    assert_eq!(comment.classify(), Some(RegionRole::Comment));

    let (_o, description) = wrapped_region("description", "");
    assert_eq!(description.classify(), Some(RegionRole::Description));

    let (_o, preview) = wrapped_region("edit-comment-form", "");
    assert_eq!(preview.classify(), Some(RegionRole::CommentPreview));

    let (_o, orphan) = wrapped_region("sidebar", "");
    assert_eq!(orphan.classify(), None);
}

#[wasm_bindgen_test]
fn test_remote_key_and_deleted() {
    let (outer, region) = wrapped_region("comment", "");
    assert_eq!(region.remote_key(), None);
    outer.set_attribute("data-comment-id", "c-42").unwrap();
    assert_eq!(region.remote_key().as_deref(), Some("c-42"));

    assert!(!region.is_deleted());
    outer.set_class_name("comment deleted");
    assert!(region.is_deleted());
}

// === Page scan ===

#[wasm_bindgen_test]
fn test_scan_finds_tracked_nodes() {
    let doc = document();
    let body = doc.body().unwrap();
    let before = scan_regions(&doc).len();

    let (outer, _region) = wrapped_region("comment", "scan me");
    body.append_child(&outer).unwrap();
    assert_eq!(scan_regions(&doc).len(), before + 1);

    outer.remove();
    assert_eq!(scan_regions(&doc).len(), before);
}

// === End-to-end over the live DOM ===

/// Build a comment-preview structure: a form with a textarea and a preview
/// node, attached to the page so rendered controls resolve by element id.
fn attach_preview(source: &str) -> (web_sys::Element, DomRegion) {
    let doc = document();
    let form = doc.create_element("form").unwrap();
    form.set_class_name("edit-comment-form");

    let textarea = doc.create_element("textarea").unwrap();
    let textarea: web_sys::HtmlTextAreaElement = textarea.unchecked_into();
    textarea.set_value(source);
    form.append_child(&textarea).unwrap();

    let preview = doc.create_element("div").unwrap();
    preview.set_class_name("wiki text");
    preview.set_inner_html(source);
    form.append_child(&preview).unwrap();

    doc.body().unwrap().append_child(&form).unwrap();
    (form, DomRegion::new(preview))
}

#[wasm_bindgen_test]
fn test_preview_renders_and_toggles() {
    let (form, node) = attach_preview("_[ ] task one\n_[x] task two");
    let doc = document();

    let mut store = RegionStore::new();
    let nodes = vec![node];
    run_pass(&mut store, &nodes);

    let marker = nodes[0].marker().unwrap();
    let region = store.get(&marker).unwrap();
    assert_eq!(region.checkbox_count(), 2);
    assert!(nodes[0].content().contains("type=\"checkbox\""));

    // Wire the first control and fire a change event at it.
    let fired: Rc<Cell<Option<(SmolStr, SmolStr)>>> = Rc::new(Cell::new(None));
    let sink = fired.clone();
    let _listeners = bind_region_controls(&doc, region, move |region_id, checkbox_id| {
        sink.set(Some((region_id, checkbox_id)));
    });

    let first = region.checkboxes_in_order()[0];
    let element_id = first.bound_element.clone().unwrap();
    let control = doc.get_element_by_id(&element_id).unwrap();
    let event = web_sys::Event::new("change").unwrap();
    control.dispatch_event(&event).unwrap();

    let (region_id, checkbox_id) = fired.take().unwrap();
    assert_eq!(region_id, marker);
    assert_eq!(checkbox_id, first.id);

    form.remove();
}

#[wasm_bindgen_test]
fn test_steady_state_keeps_dom_untouched() {
    let (form, node) = attach_preview("_[ ] stable");

    let mut store = RegionStore::new();
    let nodes = vec![node];
    run_pass(&mut store, &nodes);
    let rendered = nodes[0].content();

    // Further passes with no changes must not rewrite the node.
    let effects = run_pass(&mut store, &nodes);
    assert!(effects.is_empty());
    assert_eq!(nodes[0].content(), rendered);

    form.remove();
}
