//! DOM implementation of the host-page seam.
//!
//! A `DomRegion` wraps one element matching the tracked-region selector and
//! implements `RegionNode` over it. The marker lives in a `data-` attribute,
//! so it survives in-place `innerHTML` rewrites and is lost when the host
//! recreates the element, exactly the identity semantics the store expects.
//! The selectors below are host-specific glue and the only place the crate
//! knows anything about the page structure.

use wasm_bindgen::JsCast;

use tickbox_core::{RegionNode, RegionRole, SmolStr};

/// Selector matching every trackable rendered-text node.
pub const REGION_SELECTOR: &str = ".wiki.text";

/// Attribute carrying the region marker.
pub const MARKER_ATTR: &str = "data-tickbox-region";

// Ancestor selectors used for role classification.
const DESCRIPTION_SELECTOR: &str = ".description";
const COMMENT_SELECTOR: &str = ".comment";
const DESCRIPTION_PREVIEW_SELECTOR: &str = ".edit-description-form";
const COMMENT_PREVIEW_SELECTOR: &str = ".edit-comment-form";
const DELETED_SELECTOR: &str = ".deleted";
const COMMENT_KEY_ATTR: &str = "data-comment-id";

/// One tracked element on the page.
#[derive(Debug, Clone)]
pub struct DomRegion {
    element: web_sys::Element,
}

impl DomRegion {
    pub fn new(element: web_sys::Element) -> Self {
        Self { element }
    }

    pub fn element(&self) -> &web_sys::Element {
        &self.element
    }

    fn ancestor(&self, selector: &str) -> Option<web_sys::Element> {
        self.element.closest(selector).ok().flatten()
    }

    /// The textarea paired with a preview node, if any.
    fn paired_textarea(&self) -> Option<web_sys::HtmlTextAreaElement> {
        let form = self.ancestor("form")?;
        let textarea = form.query_selector("textarea").ok().flatten()?;
        textarea.dyn_into::<web_sys::HtmlTextAreaElement>().ok()
    }
}

impl RegionNode for DomRegion {
    fn marker(&self) -> Option<SmolStr> {
        self.element.get_attribute(MARKER_ATTR).map(SmolStr::new)
    }

    fn set_marker(&self, id: &str) {
        if let Err(err) = self.element.set_attribute(MARKER_ATTR, id) {
            tracing::warn!(?err, "failed to attach region marker");
        }
    }

    fn content(&self) -> String {
        self.element.inner_html()
    }

    fn set_content(&self, markup: &str) {
        self.element.set_inner_html(markup);
    }

    fn classify(&self) -> Option<RegionRole> {
        // Preview contexts nest inside description/comment containers, so
        // they are checked first.
        if self.ancestor(COMMENT_PREVIEW_SELECTOR).is_some() {
            Some(RegionRole::CommentPreview)
        } else if self.ancestor(DESCRIPTION_PREVIEW_SELECTOR).is_some() {
            Some(RegionRole::DescriptionPreview)
        } else if self.ancestor(COMMENT_SELECTOR).is_some() {
            Some(RegionRole::Comment)
        } else if self.ancestor(DESCRIPTION_SELECTOR).is_some() {
            Some(RegionRole::Description)
        } else {
            None
        }
    }

    fn remote_key(&self) -> Option<SmolStr> {
        self.ancestor(COMMENT_SELECTOR)?
            .get_attribute(COMMENT_KEY_ATTR)
            .map(SmolStr::new)
    }

    fn is_deleted(&self) -> bool {
        self.ancestor(DELETED_SELECTOR).is_some()
    }

    fn edit_buffer(&self) -> Option<String> {
        self.paired_textarea().map(|t| t.value())
    }

    fn set_edit_buffer(&self, text: &str) {
        match self.paired_textarea() {
            Some(textarea) => textarea.set_value(text),
            None => tracing::warn!("preview region lost its edit buffer"),
        }
    }
}

/// Collect every trackable node currently on the page.
pub fn scan_regions(document: &web_sys::Document) -> Vec<DomRegion> {
    let mut out = Vec::new();
    let list = match document.query_selector_all(REGION_SELECTOR) {
        Ok(list) => list,
        Err(err) => {
            tracing::warn!(?err, "page scan failed");
            return out;
        }
    };
    for i in 0..list.length() {
        if let Some(node) = list.get(i) {
            if let Ok(element) = node.dyn_into::<web_sys::Element>() {
                out.push(DomRegion::new(element));
            }
        }
    }
    out
}

/// Resolve a tracked node by its marker.
pub fn find_by_marker(document: &web_sys::Document, marker: &str) -> Option<DomRegion> {
    document
        .query_selector(&format!("[{MARKER_ATTR}=\"{marker}\"]"))
        .ok()
        .flatten()
        .map(DomRegion::new)
}
