//! The reconciliation loop driver.
//!
//! A fixed-interval timer re-scans the page and feeds the scan through the
//! core's `run_pass`, then executes the returned effects: fetches are spawned
//! onto the microtask queue, rebinds go through the listener machinery.
//! Everything runs on the single browser thread; state lives behind one
//! `RefCell` and is never borrowed across an await point.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use gloo_events::EventListener;
use gloo_timers::callback::Interval;
use wasm_bindgen_futures::spawn_local;

use tickbox_core::{
    CommentItem, IssueSnapshot, PassEffect, RegionNode, RegionStore, SmolStr, SyncError,
    ToggleEffect, run_pass,
};

use crate::bind::bind_region_controls;
use crate::dom;
use crate::remote::TrackerClient;

/// Reconciliation period. The original augmenter polled at this rate and
/// anything slower makes checkbox appearance visibly lag host re-renders.
pub const POLL_INTERVAL_MS: u32 = 100;

struct EngineState {
    store: RegionStore,
    /// Live change listeners per region marker. Replacing a region's entry
    /// drops the previous generation; evicted regions are pruned each tick.
    listeners: HashMap<SmolStr, Vec<EventListener>>,
}

struct EngineInner {
    state: RefCell<EngineState>,
    client: TrackerClient,
    interval: RefCell<Option<Interval>>,
}

/// The running synchronizer for one page.
#[derive(Clone)]
pub struct Engine {
    inner: Rc<EngineInner>,
}

impl Engine {
    pub fn new(client: TrackerClient) -> Self {
        Self {
            inner: Rc::new(EngineInner {
                state: RefCell::new(EngineState {
                    store: RegionStore::new(),
                    listeners: HashMap::new(),
                }),
                client,
                interval: RefCell::new(None),
            }),
        }
    }

    /// Start the polling loop. Runs until `stop` or the page context ends.
    pub fn start(&self) {
        let engine = self.clone();
        let interval = Interval::new(POLL_INTERVAL_MS, move || engine.tick());
        *self.inner.interval.borrow_mut() = Some(interval);
        tracing::debug!(issue = %self.inner.client.issue_id(), "engine started");
    }

    pub fn stop(&self) {
        self.inner.interval.borrow_mut().take();
    }

    /// One reconciliation pass.
    pub fn tick(&self) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let nodes = dom::scan_regions(&document);

        let effects = {
            let mut state = self.inner.state.borrow_mut();
            let effects = run_pass(&mut state.store, &nodes);
            let EngineState { store, listeners } = &mut *state;
            listeners.retain(|marker, _| store.contains(marker));
            effects
        };

        // One comment fetch serves every comment region discovered this tick.
        let mut comments_requested = false;
        for effect in effects {
            match effect {
                PassEffect::FetchIssue { region } => self.spawn_issue_fetch(region),
                PassEffect::FetchComments { .. } => {
                    if !comments_requested {
                        comments_requested = true;
                        self.spawn_comment_fetch();
                    }
                }
                PassEffect::RebindControls { region } => self.rebind(&document, &region),
            }
        }
    }

    /// Attach fresh change listeners to a region's rendered controls.
    fn rebind(&self, document: &web_sys::Document, marker: &str) {
        let mut state = self.inner.state.borrow_mut();
        let EngineState { store, listeners } = &mut *state;
        let Some(region) = store.get(marker) else {
            return;
        };

        let engine = self.clone();
        let bound = bind_region_controls(document, region, move |region_id, checkbox_id| {
            engine.on_toggle(region_id, checkbox_id);
        });
        listeners.insert(SmolStr::new(marker), bound);
    }

    /// Handle a user toggle of one rendered control.
    ///
    /// The local mutation (both text representations and the node's markup)
    /// completes synchronously before this returns, so the next tick never
    /// observes a half-updated region. Listener rebinding and remote
    /// persistence are deferred past the event dispatch: this closure is
    /// owned by the listener set it would otherwise be replacing.
    fn on_toggle(&self, region_id: SmolStr, checkbox_id: SmolStr) {
        let document = match web_sys::window().and_then(|w| w.document()) {
            Some(d) => d,
            None => return,
        };

        let remote = {
            let mut state = self.inner.state.borrow_mut();
            let Some(region) = state.store.get_mut(&region_id) else {
                tracing::warn!(err = %SyncError::UnknownRegion { id: region_id.clone() }, "toggle dropped");
                return;
            };
            let outcome = match region.toggle(&checkbox_id) {
                Ok(outcome) => outcome,
                Err(err) => {
                    tracing::warn!(%err, "toggle rejected");
                    return;
                }
            };

            let node = dom::find_by_marker(&document, &region_id);
            if let Some(node) = &node {
                node.set_content(&outcome.markup);
            }

            match outcome.sync {
                Some(ToggleEffect::WriteEditBuffer { text }) => {
                    // Preview sync is a local page write, done inline.
                    if let Some(node) = &node {
                        node.set_edit_buffer(&text);
                    }
                    None
                }
                other => other,
            }
        };

        let engine = self.clone();
        spawn_local(async move {
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                engine.rebind(&document, &region_id);
            }
            if let Some(effect) = remote {
                engine.persist(effect).await;
            }
        });
    }

    /// Push one toggle to the remote store. Errors are logged, not retried.
    async fn persist(&self, effect: ToggleEffect) {
        let result = match &effect {
            ToggleEffect::UpdateDescription { text } => {
                self.inner.client.update_description(text).await
            }
            ToggleEffect::UpdateComment { key, text } => {
                self.inner.client.update_comment(key, text).await
            }
            ToggleEffect::WriteEditBuffer { .. } => return,
        };
        if let Err(err) = result {
            tracing::error!(%err, "remote write failed");
        }
    }

    fn spawn_issue_fetch(&self, marker: SmolStr) {
        let engine = self.clone();
        spawn_local(async move {
            match engine.inner.client.fetch_issue().await {
                Ok(issue) => engine.apply_issue(&marker, &issue),
                Err(err) => tracing::error!(%err, "issue fetch failed"),
            }
        });
    }

    fn spawn_comment_fetch(&self) {
        let engine = self.clone();
        spawn_local(async move {
            match engine.inner.client.fetch_comments().await {
                Ok(items) => engine.apply_comments(&items),
                Err(err) => tracing::error!(%err, "comment fetch failed"),
            }
        });
    }

    /// Supply a fetched issue to the description region (and seed any
    /// comment regions the snapshot happens to carry). The next tick renders.
    fn apply_issue(&self, marker: &str, issue: &IssueSnapshot) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        {
            let mut state = self.inner.state.borrow_mut();
            if let Some(region) = state.store.get_mut(marker) {
                if !region.is_ready() {
                    if let Some(node) = dom::find_by_marker(&document, marker) {
                        region.init(&issue.description, &node.content());
                    }
                }
            }
        }
        self.apply_comments(&issue.comments);
    }

    /// Supply fetched comment texts to the regions awaiting them, then
    /// classify whatever is left as benign (deleted on the page) or a
    /// matching failure.
    fn apply_comments(&self, items: &[CommentItem]) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let mut state = self.inner.state.borrow_mut();

        for item in items {
            if let Some(region) = state.store.comment_by_key_mut(&item.id) {
                if !region.is_ready() {
                    let marker = region.id.clone();
                    if let Some(node) = dom::find_by_marker(&document, &marker) {
                        region.init(&item.text, &node.content());
                    }
                }
            }
        }

        for (marker, key) in state.store.uninitialized_comments() {
            let deleted = dom::find_by_marker(&document, &marker)
                .map(|node| node.is_deleted())
                .unwrap_or(true);
            if deleted {
                tracing::debug!(region = %marker, %key, "comment deleted on page, skipping");
            } else {
                tracing::error!(err = %SyncError::UnmatchedComment { key }, region = %marker, "comment matching failed");
            }
        }
    }
}
