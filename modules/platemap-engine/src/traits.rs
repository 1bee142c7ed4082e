//! Collaborator seams for the dispatch loop.
//!
//! The map widget, list panel, and notification surface are external;
//! the engine drives them through these traits. The web layer renders
//! them for a browser, the test suite records calls in memory.

use uuid::Uuid;

use platemap_common::GeoPoint;

use crate::projector::{MarkerHandle, RowHandle};

/// The spatial marker/cluster layer. Rebuilt wholesale every projection
/// pass; never patched in place.
pub trait MarkerLayer {
    /// Replace the entire layer with these markers.
    fn rebuild(&mut self, markers: &[MarkerHandle]);

    /// Apply or revert the hover highlight. Unknown ids are a no-op — the
    /// record may have been filtered out since the hover began.
    fn set_highlight(&mut self, id: Uuid, on: bool);

    /// Present the detail popup for a marker currently on the layer.
    /// Unknown ids are a no-op.
    fn open_popup(&mut self, id: Uuid);
}

/// The ranked list panel. Rebuilt wholesale every projection pass.
pub trait ListPanel {
    fn rebuild(&mut self, rows: &[RowHandle]);

    /// Dismiss the panel (narrow viewports collapse the list on row click).
    fn collapse(&mut self);
}

/// The map widget's movement control. `recenter` is a request: the widget
/// answers later with a viewport-settled event carrying its new bounds —
/// the engine never assumes the move happened synchronously.
pub trait MapControl {
    fn recenter(&mut self, center: GeoPoint);
}

/// One-shot user-facing messages (load failure, geolocation failure,
/// unresolvable focus target).
pub trait Notifier {
    fn notify(&mut self, message: &str);
}
