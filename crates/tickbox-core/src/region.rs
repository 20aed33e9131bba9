//! Per-region tracking: the three text representations and their lifecycle.
//!
//! A `Region` is one trackable text area on the page. It owns the tagged
//! text (placeholder-bearing), an optional plain-text mirror (what the remote
//! store holds), the last markup written into the live node, and the checkbox
//! records created by tokenization. Regions start `Uninitialized` and become
//! `Ready` once `init` supplies the canonical plain text; reconciliation
//! passes no-op until then.

use smol_str::SmolStr;
use std::collections::HashMap;

use crate::error::SyncError;
use crate::ident::unique_id;
use crate::markup::{self, Placeholder, set_placeholder_state};
use crate::node::RegionNode;
use crate::widget::render_controls;

/// What kind of text area a region is. Determined once at discovery from the
/// backing node's surroundings, immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionRole {
    /// The issue description body.
    Description,
    /// One comment body; carries a remote item key.
    Comment,
    /// Live preview of the description editor.
    DescriptionPreview,
    /// Live preview of a comment editor.
    CommentPreview,
}

impl RegionRole {
    /// Preview roles source their plain text from an editable buffer on the
    /// page instead of the remote store.
    pub fn is_preview(&self) -> bool {
        matches!(self, Self::DescriptionPreview | Self::CommentPreview)
    }
}

/// Lifecycle state of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionState {
    /// Discovered, role known, plain text not yet sourced.
    Uninitialized,
    /// Plain text supplied; reconciliation passes act on it.
    Ready,
}

/// One markup occurrence, tracked across renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkbox {
    pub id: SmolStr,
    pub checked: bool,
    /// Element id of the rendered control. Rebound with a fresh id every
    /// time the region's markup is written into the live node.
    pub bound_element: Option<SmolStr>,
}

/// Role-dependent side channel to run after a toggle's local mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleEffect {
    /// Push the new plain text as the issue description.
    UpdateDescription { text: String },
    /// Push the new plain text as the comment with this remote key.
    UpdateComment { key: SmolStr, text: String },
    /// Write the new plain text into the paired editable buffer.
    WriteEditBuffer { text: String },
}

/// Result of a toggle: the markup to write into the live node, plus the
/// persistence side channel (absent when the plain mirror could not be
/// updated and persisting would push a stale text).
#[derive(Debug, Clone)]
pub struct ToggleOutcome {
    pub markup: String,
    pub sync: Option<ToggleEffect>,
}

/// One tracked text region.
#[derive(Debug, Clone)]
pub struct Region {
    /// Marker identifier attached to the backing node.
    pub id: SmolStr,
    pub role: RegionRole,
    /// Remote item key; present for `Comment` regions only.
    pub remote_key: Option<SmolStr>,
    state: RegionState,
    /// Plain-text mirror with placeholders, kept in lockstep with
    /// `tagged_text` where occurrence counts allow.
    plain_tagged: Option<String>,
    /// Host markup with every raw mark replaced by a placeholder token.
    tagged_text: String,
    /// Node content as of the last write, or the snapshot `init` tokenized.
    /// Live content diverging from this is a host rewrite.
    last_content: Option<String>,
    checkboxes: HashMap<SmolStr, Checkbox>,
}

impl Region {
    pub fn new(role: RegionRole, remote_key: Option<SmolStr>) -> Self {
        Self {
            id: unique_id(),
            role,
            remote_key,
            state: RegionState::Uninitialized,
            plain_tagged: None,
            tagged_text: String::new(),
            last_content: None,
            checkboxes: HashMap::new(),
        }
    }

    pub fn state(&self) -> RegionState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == RegionState::Ready
    }

    pub fn checkbox(&self, id: &str) -> Option<&Checkbox> {
        self.checkboxes.get(id)
    }

    pub fn checkbox_count(&self) -> usize {
        self.checkboxes.len()
    }

    /// Checkboxes in the order their placeholders appear in the tagged text.
    pub fn checkboxes_in_order(&self) -> Vec<&Checkbox> {
        markup::placeholders(&self.tagged_text)
            .iter()
            .filter_map(|ph| self.checkboxes.get(&ph.id))
            .collect()
    }

    /// The canonical plain text with placeholders resolved back to raw marks.
    pub fn plain_text(&self) -> Option<String> {
        self.plain_tagged.as_deref().map(markup::detokenize)
    }

    /// Supply the canonical plain text and tokenize both representations.
    ///
    /// `live_content` is the backing node's current markup; it is tokenized
    /// first and its placeholder sequence is reused for the plain text so
    /// both strings carry the same checkbox ids. On a count mismatch the
    /// plain text is tokenized independently and the skew is logged:
    /// reported, not repaired.
    pub fn init(&mut self, plain: &str, live_content: &str) {
        let outcome = markup::tokenize(live_content);
        self.install_placeholders(&outcome.created);
        self.tagged_text = outcome.tagged;

        match markup::tokenize_lockstep(plain, &outcome.created) {
            Ok(tagged_plain) => self.plain_tagged = Some(tagged_plain),
            Err(err) => {
                tracing::error!(region = %self.id, %err, "plain/markup tokenization skew");
                self.plain_tagged = Some(markup::tokenize(plain).tagged);
            }
        }

        self.last_content = Some(live_content.to_string());
        self.state = RegionState::Ready;
        tracing::debug!(
            region = %self.id,
            role = ?self.role,
            checkboxes = self.checkboxes.len(),
            "region initialized"
        );
    }

    /// One reconciliation step against the live node.
    ///
    /// Absorbs host-replaced content, re-tokenizes any raw marks that
    /// appeared in the tagged text, recomputes the rendered markup and
    /// writes it only when it differs from the node's current content.
    /// Returns true when the node was written and controls need rebinding.
    pub fn update(&mut self, node: &impl RegionNode) -> bool {
        if !self.is_ready() {
            return false;
        }

        let live = node.content();
        let host_replaced = self
            .last_content
            .as_deref()
            .is_some_and(|prev| prev != live);
        if host_replaced {
            // The host rewrote the subtree under our marker.
            self.absorb(&live);
        }

        // Idempotent: a no-change pass finds no raw marks.
        let refreshed = markup::tokenize(&self.tagged_text);
        if !refreshed.created.is_empty() {
            tracing::debug!(
                region = %self.id,
                new_marks = refreshed.created.len(),
                "raw marks appeared in tagged text"
            );
            self.install_placeholders(&refreshed.created);
            self.tagged_text = refreshed.tagged;
        }

        let rendered = render_controls(&self.tagged_text, &self.id, &self.bindings());
        if live == rendered {
            self.last_content = Some(rendered);
            return false;
        }

        // Content changes, so the old control elements become garbage:
        // bind fresh element ids and write.
        self.bind_fresh();
        let rendered = render_controls(&self.tagged_text, &self.id, &self.bindings());
        node.set_content(&rendered);
        self.last_content = Some(rendered);
        true
    }

    /// Flip one checkbox and rewrite both text representations.
    ///
    /// The returned markup must be written into the live node by the caller
    /// (followed by a rebind) before yielding, so a reconciliation tick never
    /// observes a half-updated region.
    pub fn toggle(&mut self, checkbox_id: &str) -> Result<ToggleOutcome, SyncError> {
        let cb = self
            .checkboxes
            .get_mut(checkbox_id)
            .ok_or_else(|| SyncError::UnknownCheckbox {
                id: SmolStr::new(checkbox_id),
            })?;
        cb.checked = !cb.checked;
        let now = cb.checked;

        if !set_placeholder_state(&mut self.tagged_text, checkbox_id, now) {
            tracing::warn!(region = %self.id, checkbox = %checkbox_id, "placeholder missing from tagged text");
        }
        let mirror_ok = match &mut self.plain_tagged {
            Some(plain) => set_placeholder_state(plain, checkbox_id, now),
            None => false,
        };

        self.bind_fresh();
        let markup = render_controls(&self.tagged_text, &self.id, &self.bindings());
        self.last_content = Some(markup.clone());

        let sync = if mirror_ok {
            let text = self.plain_text().unwrap_or_default();
            match self.role {
                RegionRole::Description => Some(ToggleEffect::UpdateDescription { text }),
                RegionRole::Comment => match &self.remote_key {
                    Some(key) => Some(ToggleEffect::UpdateComment {
                        key: key.clone(),
                        text,
                    }),
                    None => {
                        tracing::warn!(region = %self.id, "comment region without remote key");
                        None
                    }
                },
                RegionRole::DescriptionPreview | RegionRole::CommentPreview => {
                    Some(ToggleEffect::WriteEditBuffer { text })
                }
            }
        } else {
            tracing::error!(
                region = %self.id,
                checkbox = %checkbox_id,
                "plain mirror out of lockstep, skipping persistence"
            );
            None
        };

        Ok(ToggleOutcome { markup, sync })
    }

    /// Current checkbox-id to element-id bindings for rendering.
    fn bindings(&self) -> HashMap<SmolStr, SmolStr> {
        self.checkboxes
            .values()
            .filter_map(|cb| {
                cb.bound_element
                    .as_ref()
                    .map(|el| (cb.id.clone(), el.clone()))
            })
            .collect()
    }

    /// Allocate a fresh element id for every checkbox.
    fn bind_fresh(&mut self) {
        for cb in self.checkboxes.values_mut() {
            cb.bound_element = Some(unique_id());
        }
    }

    fn install_placeholders(&mut self, created: &[Placeholder]) {
        for ph in created {
            self.checkboxes.insert(
                ph.id.clone(),
                Checkbox {
                    id: ph.id.clone(),
                    checked: ph.checked,
                    bound_element: None,
                },
            );
        }
    }

    /// Take host-replaced content as the new tagged base.
    ///
    /// When the new content carries as many raw marks as the plain mirror
    /// has placeholders, the mirror's ids are reused so toggles keep
    /// persisting across the rewrite; checked state follows what the host
    /// rendered, and the mirror is aligned with it. On a count mismatch
    /// the marks get fresh placeholders and checkboxes whose placeholder
    /// no longer appears are destroyed (their state is lost, which is the
    /// documented tradeoff of marker-based identity).
    fn absorb(&mut self, live: &str) {
        let marks = markup::raw_marks(live);
        let mirror_seq = self
            .plain_tagged
            .as_deref()
            .map(markup::placeholders)
            .unwrap_or_default();

        let outcome = if !marks.is_empty() && marks.len() == mirror_seq.len() {
            let seq: Vec<Placeholder> = mirror_seq
                .into_iter()
                .zip(&marks)
                .map(|(ph, mark)| Placeholder {
                    id: ph.id,
                    checked: mark.checked,
                })
                .collect();
            match markup::tokenize_lockstep(live, &seq) {
                Ok(tagged) => {
                    if let Some(plain) = &mut self.plain_tagged {
                        for ph in &seq {
                            set_placeholder_state(plain, &ph.id, ph.checked);
                        }
                    }
                    markup::TokenizeOutcome {
                        tagged,
                        created: seq,
                    }
                }
                Err(err) => {
                    tracing::error!(region = %self.id, %err, "mirror id reuse failed");
                    markup::tokenize(live)
                }
            }
        } else {
            markup::tokenize(live)
        };
        let surviving = markup::placeholders(&outcome.tagged);

        let before = self.checkboxes.len();
        self.checkboxes.retain(|id, _| surviving.iter().any(|ph| ph.id == *id));
        // Keep checkbox state in line with what the tagged text now says.
        for ph in &surviving {
            match self.checkboxes.get_mut(&ph.id) {
                Some(cb) => cb.checked = ph.checked,
                None => {
                    self.checkboxes.insert(
                        ph.id.clone(),
                        Checkbox {
                            id: ph.id.clone(),
                            checked: ph.checked,
                            bound_element: None,
                        },
                    );
                }
            }
        }

        tracing::debug!(
            region = %self.id,
            dropped = before.saturating_sub(self.checkboxes.len()),
            created = outcome.created.len(),
            "absorbed host-replaced content"
        );
        self.tagged_text = outcome.tagged;
    }
}
