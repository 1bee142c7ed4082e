//! Result synchronization engine.
//!
//! Derives the visible subset of place records from viewport + facet
//! filters + search text, ranks it by award score, and projects it onto a
//! marker layer and a ranked list that always agree. The dispatch loop in
//! [`engine`] runs every trigger (facet toggle, text input, viewport
//! settle, language switch, geolocation, focus request) through one
//! projection pass to completion before the next is processed.
//!
//! Widgets sit behind the traits in [`traits`]; the web layer and the test
//! suite supply their own implementations.

pub mod bridge;
pub mod engine;
pub mod filter;
pub mod projector;
pub mod score;
pub mod store;
pub mod traits;
pub mod viewport;

pub use bridge::SelectionBridge;
pub use engine::{AppState, Engine, FocusTarget, MapEvent};
pub use projector::{
    project, relay_context, IdentityLink, MarkerHandle, Projection, RowHandle, LIST_CAP,
    RELAY_CONTEXT_CAP,
};
pub use store::RecordStore;
pub use traits::{ListPanel, MapControl, MarkerLayer, Notifier};
