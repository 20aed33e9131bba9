//! Host-page abstraction.
//!
//! The engine never touches a concrete document. It sees tracked regions
//! through `RegionNode`; the browser layer implements it over a DOM element,
//! tests implement it over plain structs. Selector choices and URL parsing
//! live entirely on the implementing side.

use smol_str::SmolStr;

use crate::region::RegionRole;

/// One trackable node on the host page.
///
/// The marker is an out-of-band identifier attached to the backing node so
/// repeated page scans recognize the same logical region. If the host
/// recreates the node from scratch the marker is lost, the old region is
/// evicted and an equivalent one is discovered fresh.
pub trait RegionNode {
    /// Read the marker previously attached to this node, if any.
    fn marker(&self) -> Option<SmolStr>;

    /// Attach a marker to this node.
    fn set_marker(&self, id: &str);

    /// Current textual content of the node (markup as rendered by the host).
    fn content(&self) -> String;

    /// Replace the node's content with freshly rendered markup.
    fn set_content(&self, markup: &str);

    /// Classify the node's role from its surroundings. `None` is a
    /// classification failure; the node is excluded from tracking.
    fn classify(&self) -> Option<RegionRole>;

    /// The remote item key, for nodes classified as comments.
    fn remote_key(&self) -> Option<SmolStr>;

    /// Whether the surrounding item is marked deleted on the page. Used to
    /// downgrade an unmatched comment from error to benign.
    fn is_deleted(&self) -> bool;

    /// Read the editable plain-text buffer paired with a preview node.
    fn edit_buffer(&self) -> Option<String>;

    /// Write the editable plain-text buffer paired with a preview node.
    fn set_edit_buffer(&self, text: &str);
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory `RegionNode` used across the engine's tests.

    use std::cell::RefCell;

    use smol_str::SmolStr;

    use super::RegionNode;
    use crate::region::RegionRole;

    #[derive(Debug)]
    pub(crate) struct MockNode {
        marker: RefCell<Option<SmolStr>>,
        content: RefCell<String>,
        role: Option<RegionRole>,
        key: Option<SmolStr>,
        pub(crate) deleted: bool,
        buffer: RefCell<Option<String>>,
    }

    impl MockNode {
        pub(crate) fn description(content: &str) -> Self {
            Self::with_role(Some(RegionRole::Description), content)
        }

        pub(crate) fn comment(content: &str, key: &str) -> Self {
            let mut node = Self::with_role(Some(RegionRole::Comment), content);
            node.key = Some(SmolStr::new(key));
            node
        }

        pub(crate) fn preview(role: RegionRole, content: &str, buffer: &str) -> Self {
            let node = Self::with_role(Some(role), content);
            *node.buffer.borrow_mut() = Some(buffer.to_string());
            node
        }

        pub(crate) fn unclassifiable(content: &str) -> Self {
            Self::with_role(None, content)
        }

        fn with_role(role: Option<RegionRole>, content: &str) -> Self {
            Self {
                marker: RefCell::new(None),
                content: RefCell::new(content.to_string()),
                role,
                key: None,
                deleted: false,
                buffer: RefCell::new(None),
            }
        }
    }

    impl RegionNode for MockNode {
        fn marker(&self) -> Option<SmolStr> {
            self.marker.borrow().clone()
        }

        fn set_marker(&self, id: &str) {
            *self.marker.borrow_mut() = Some(SmolStr::new(id));
        }

        fn content(&self) -> String {
            self.content.borrow().clone()
        }

        fn set_content(&self, markup: &str) {
            *self.content.borrow_mut() = markup.to_string();
        }

        fn classify(&self) -> Option<RegionRole> {
            self.role
        }

        fn remote_key(&self) -> Option<SmolStr> {
            self.key.clone()
        }

        fn is_deleted(&self) -> bool {
            self.deleted
        }

        fn edit_buffer(&self) -> Option<String> {
            self.buffer.borrow().clone()
        }

        fn set_edit_buffer(&self, text: &str) {
            *self.buffer.borrow_mut() = Some(text.to_string());
        }
    }
}
