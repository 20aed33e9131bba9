//! One reconciliation pass over the current page scan.
//!
//! The driver (a fixed-interval timer in the browser crate) calls `run_pass`
//! with every node matching the tracked-region selector. The pass discovers
//! untracked nodes, initializes preview regions from their edit buffers,
//! updates every `Ready` region and evicts regions whose marker vanished.
//! Anything the pass cannot do synchronously comes back as a `PassEffect`
//! for the driver to execute.

use smol_str::SmolStr;

use crate::node::RegionNode;
use crate::region::RegionRole;
use crate::store::RegionStore;

/// Deferred work produced by a reconciliation pass.
///
/// Fetches are asynchronous and fire-and-forget failure-wise; rebinding
/// needs the platform's listener machinery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassEffect {
    /// A description region was discovered; fetch the issue to source its
    /// plain text.
    FetchIssue { region: SmolStr },
    /// A comment region was discovered; fetch the comment list to source
    /// its plain text.
    FetchComments { region: SmolStr },
    /// The region's markup was written into the live node; reattach change
    /// listeners to its freshly created controls.
    RebindControls { region: SmolStr },
}

/// Run one pass: discover, initialize previews, update, evict.
pub fn run_pass<N: RegionNode>(store: &mut RegionStore, nodes: &[N]) -> Vec<PassEffect> {
    let mut effects = Vec::new();
    let mut live = Vec::with_capacity(nodes.len());

    for node in nodes {
        let tracked = node
            .marker()
            .is_some_and(|m| store.contains(&m) || store.is_excluded(&m));

        if !tracked {
            if let Some(marker) = store.discover(node) {
                let role = store.get(&marker).map(|r| r.role);
                match role {
                    Some(RegionRole::Description) => {
                        effects.push(PassEffect::FetchIssue {
                            region: marker.clone(),
                        });
                    }
                    Some(RegionRole::Comment) => {
                        effects.push(PassEffect::FetchComments {
                            region: marker.clone(),
                        });
                    }
                    Some(RegionRole::DescriptionPreview | RegionRole::CommentPreview) => {
                        // Previews source their plain text from the page
                        // itself, so they become Ready in the same pass.
                        match node.edit_buffer() {
                            Some(buffer) => {
                                if let Some(region) = store.get_mut(&marker) {
                                    let content = node.content();
                                    region.init(&buffer, &content);
                                }
                            }
                            None => {
                                tracing::warn!(region = %marker, "preview region has no edit buffer");
                            }
                        }
                    }
                    None => {}
                }
            }
        }

        if let Some(marker) = node.marker() {
            live.push(marker.clone());
            if let Some(region) = store.get_mut(&marker) {
                if region.update(node) {
                    effects.push(PassEffect::RebindControls { region: marker });
                }
            }
        }
    }

    store.evict(&live);
    effects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::count_raw_marks;
    use crate::node::testing::MockNode;
    use crate::region::{RegionRole, ToggleEffect};

    #[test]
    fn test_pass_discovers_and_requests_fetches() {
        let mut store = RegionStore::new();
        let nodes = vec![
            MockNode::description("_[ ] d"),
            MockNode::comment("_[ ] c", "c-1"),
        ];

        let effects = run_pass(&mut store, &nodes);
        assert_eq!(store.len(), 2);
        assert!(matches!(effects[0], PassEffect::FetchIssue { .. }));
        assert!(matches!(effects[1], PassEffect::FetchComments { .. }));

        // Neither region is Ready, so nothing was written yet.
        assert_eq!(nodes[0].content(), "_[ ] d");
        assert_eq!(nodes[1].content(), "_[ ] c");
    }

    #[test]
    fn test_preview_ready_and_rendered_in_one_pass() {
        let mut store = RegionStore::new();
        let nodes = vec![MockNode::preview(
            RegionRole::CommentPreview,
            "_[ ] draft",
            "_[ ] draft",
        )];

        let effects = run_pass(&mut store, &nodes);
        assert!(matches!(effects[..], [PassEffect::RebindControls { .. }]));
        assert!(nodes[0].content().contains("type=\"checkbox\""));
        assert_eq!(count_raw_marks(&nodes[0].content()), 0);
    }

    #[test]
    fn test_steady_state_pass_is_quiet() {
        let mut store = RegionStore::new();
        let nodes = vec![MockNode::preview(
            RegionRole::CommentPreview,
            "_[ ] draft",
            "_[ ] draft",
        )];

        run_pass(&mut store, &nodes);
        let effects = run_pass(&mut store, &nodes);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_comment_becomes_ready_after_fetch_applies() {
        let mut store = RegionStore::new();
        let nodes = vec![MockNode::comment("_[ ] c", "c-1")];
        run_pass(&mut store, &nodes);

        // Driver applied the fetched comment text.
        let content = nodes[0].content();
        store
            .comment_by_key_mut("c-1")
            .unwrap()
            .init("_[ ] c", &content);

        let effects = run_pass(&mut store, &nodes);
        assert!(matches!(effects[..], [PassEffect::RebindControls { .. }]));
        assert!(nodes[0].content().contains("type=\"checkbox\""));
    }

    #[test]
    fn test_eviction_after_node_disappears() {
        let mut store = RegionStore::new();
        let nodes = vec![MockNode::comment("_[ ] c", "c-1")];
        run_pass(&mut store, &nodes);
        assert_eq!(store.len(), 1);

        let effects = run_pass(&mut store, &[] as &[MockNode]);
        assert!(effects.is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_excluded_node_not_rediscovered() {
        let mut store = RegionStore::new();
        let nodes = vec![MockNode::unclassifiable("x")];

        run_pass(&mut store, &nodes);
        let marker = nodes[0].marker().unwrap();
        run_pass(&mut store, &nodes);

        assert_eq!(nodes[0].marker().unwrap(), marker);
        assert!(store.is_empty());
    }

    #[test]
    fn test_full_flow_toggle_and_persist() {
        let source = "Buy milk\n_[ ] task one\n_[x] task two";
        let mut store = RegionStore::new();
        let nodes = vec![MockNode::comment(source, "c-1")];

        run_pass(&mut store, &nodes);
        let content = nodes[0].content();
        store
            .comment_by_key_mut("c-1")
            .unwrap()
            .init(source, &content);
        run_pass(&mut store, &nodes);

        let marker = nodes[0].marker().unwrap();
        let region = store.get_mut(&marker).unwrap();
        let first = region.checkboxes_in_order()[0].id.clone();

        // The driver writes the toggled markup back before yielding.
        let outcome = region.toggle(&first).unwrap();
        nodes[0].set_content(&outcome.markup);
        assert_eq!(
            outcome.sync,
            Some(ToggleEffect::UpdateComment {
                key: "c-1".into(),
                text: "Buy milk\n_[x] task one\n_[x] task two".into(),
            })
        );

        // The next tick sees content identical to the rendered markup:
        // no write, no rebind.
        let effects = run_pass(&mut store, &nodes);
        assert!(effects.is_empty());
    }
}
