//! Listener half of the widget binder.
//!
//! After a region's markup is written into the live node, every rendered
//! control is a freshly created element; this module locates each one by its
//! bound element id and attaches a single change listener. The returned
//! `EventListener`s own the closures: replacing a region's set drops the
//! previous generation, whose elements are detached garbage by then.

use gloo_events::EventListener;

use tickbox_core::{Region, SmolStr};

/// Attach one change listener per rendered control of a region.
///
/// `on_toggle` receives the owning region's marker and the checkbox id.
pub fn bind_region_controls<F>(
    document: &web_sys::Document,
    region: &Region,
    on_toggle: F,
) -> Vec<EventListener>
where
    F: Fn(SmolStr, SmolStr) + Clone + 'static,
{
    let mut listeners = Vec::with_capacity(region.checkbox_count());

    for checkbox in region.checkboxes_in_order() {
        let Some(element_id) = &checkbox.bound_element else {
            continue;
        };
        let Some(element) = document.get_element_by_id(element_id) else {
            tracing::warn!(
                region = %region.id,
                checkbox = %checkbox.id,
                element = %element_id,
                "rendered control not found in document"
            );
            continue;
        };

        let region_id = region.id.clone();
        let checkbox_id = checkbox.id.clone();
        let handler = on_toggle.clone();
        listeners.push(EventListener::new(&element, "change", move |_event| {
            handler(region_id.clone(), checkbox_id.clone());
        }));
    }

    tracing::trace!(region = %region.id, bound = listeners.len(), "controls bound");
    listeners
}
