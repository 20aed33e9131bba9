//! Error taxonomy for the synchronization engine.
//!
//! Every error is terminal for the single operation that raised it; the
//! reconciliation loop logs and keeps running.

use smol_str::SmolStr;

/// Engine errors.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The tracked node's role could not be determined from its ancestry.
    /// The node is excluded from further processing.
    #[error("could not classify tracked region")]
    Classification,

    /// A node classified as a comment carries no remote item key, so its
    /// text can never be matched. The node is excluded like a
    /// classification failure, but logs as what it actually is.
    #[error("comment region carries no remote key")]
    MissingCommentKey,

    /// A remote fetch or write came back non-2xx. No retry; local state
    /// stays unsynchronized until the next successful call.
    #[error("remote request failed with status {status}")]
    Remote { status: u16 },

    /// A comment region has no corresponding remote item and is not marked
    /// deleted on the page.
    #[error("no remote comment matches key {key}")]
    UnmatchedComment { key: SmolStr },

    /// Unequal raw-mark counts between two representations of one region.
    #[error("raw mark count mismatch: expected {expected}, found {found}")]
    TokenizeSkew { expected: usize, found: usize },

    /// A toggle arrived for a checkbox the region no longer tracks.
    #[error("unknown checkbox {id}")]
    UnknownCheckbox { id: SmolStr },

    /// A toggle or update arrived for a region the store no longer tracks.
    #[error("unknown region {id}")]
    UnknownRegion { id: SmolStr },
}
