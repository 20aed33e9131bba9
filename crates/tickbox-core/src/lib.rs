//! tickbox-core: checkbox synchronization engine without platform dependencies.
//!
//! This crate keeps three representations of a tracked text region consistent:
//! the plain text as stored remotely, a tagged form where every `_[ ]` / `_[x]`
//! mark is replaced by a placeholder token, and the rendered markup where each
//! placeholder becomes an interactive control. It provides:
//! - `markup` - raw-mark tokenizer and placeholder codec
//! - `widget` - placeholder to control-markup substitution
//! - `Region` - per-region tracker with the `Uninitialized -> Ready` lifecycle
//! - `RegionStore` - marker-keyed map with discovery and eviction
//! - `run_pass` - one reconciliation pass, generic over a `RegionNode` host seam
//!
//! All host interaction (DOM, remote store) happens behind the `RegionNode`
//! trait and the effect enums returned by `run_pass` and `Region::toggle`; the
//! browser layer lives in `tickbox-browser`.

pub mod error;
pub mod ident;
pub mod markup;
pub mod node;
pub mod reconcile;
pub mod region;
pub mod remote;
pub mod store;
pub mod widget;

pub use error::SyncError;
pub use ident::unique_id;
pub use markup::{Placeholder, TokenizeOutcome, detokenize, tokenize, tokenize_lockstep};
pub use node::RegionNode;
pub use reconcile::{PassEffect, run_pass};
pub use region::{Checkbox, Region, RegionRole, RegionState, ToggleEffect, ToggleOutcome};
pub use remote::{CommentItem, IssueSnapshot};
pub use smol_str::SmolStr;
pub use store::RegionStore;
pub use widget::render_controls;
