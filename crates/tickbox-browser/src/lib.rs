//! Browser DOM layer for the tickbox synchronization engine.
//!
//! This crate wires `tickbox-core` to a live page. It assumes a
//! `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `dom`: `RegionNode` over `web_sys::Element`, page scanning, role
//!   classification by ancestor class
//! - `bind`: change-listener attachment for rendered controls
//! - `remote`: REST adapter for the tracker's issue/comment endpoints
//! - `engine`: the fixed-interval reconciliation loop and effect execution
//!
//! # Re-exports
//!
//! This crate re-exports `tickbox-core` for convenience, so consumers only
//! need to depend on `tickbox-browser`.

pub use tickbox_core;
pub use tickbox_core::*;

pub mod bind;
pub mod dom;
pub mod engine;
pub mod remote;

pub use dom::DomRegion;
pub use engine::{Engine, POLL_INTERVAL_MS};
pub use remote::{RemoteError, TrackerClient};

/// Set up the engine for the current page and start the polling loop.
///
/// Returns `None` when the page URL does not look like an issue page.
pub fn install() -> Option<Engine> {
    let window = web_sys::window()?;
    let client = TrackerClient::from_location(&window.location())?;
    let engine = Engine::new(client);
    engine.start();
    Some(engine)
}
