//! The selection bridge.
//!
//! Routes hover and click events between list rows and markers through
//! the identity links of the current projection, and carries the one
//! piece of cross-pass state: a pending focus target waiting for the
//! next projection to finish before its popup may open.

use tracing::{debug, warn};
use uuid::Uuid;

use platemap_common::PlatemapError;

use crate::engine::FocusTarget;
use crate::projector::Projection;
use crate::store::RecordStore;
use crate::traits::{MapControl, MarkerLayer, Notifier};

#[derive(Debug, Default)]
pub struct SelectionBridge {
    pending_focus: Option<Uuid>,
}

impl SelectionBridge {
    /// Hover from a list row onto its marker. A record filtered out since
    /// the hover began resolves to no link and the call is a no-op.
    pub fn hover_enter<M: MarkerLayer>(
        &self,
        projection: &Projection,
        markers: &mut M,
        id: Uuid,
    ) {
        if projection.contains(id) {
            markers.set_highlight(id, true);
        }
    }

    pub fn hover_leave<M: MarkerLayer>(
        &self,
        projection: &Projection,
        markers: &mut M,
        id: Uuid,
    ) {
        if projection.contains(id) {
            markers.set_highlight(id, false);
        }
    }

    /// Resolve a focus target against the FULL store — it must work for
    /// records currently filtered out or off-screen — then request a
    /// recenter. The popup waits for the settle/projection cycle; see
    /// [`Self::on_projection_completed`]. Returns whether a recenter was
    /// requested.
    pub fn focus_record<C: MapControl, N: Notifier>(
        &mut self,
        store: &RecordStore,
        map: &mut C,
        notifier: &mut N,
        target: &FocusTarget,
    ) -> bool {
        let record = match target {
            FocusTarget::Id(id) => store
                .get(*id)
                .ok_or_else(|| PlatemapError::StaleFocus(id.to_string())),
            FocusTarget::Name(name) => store.find_by_name(name),
        };
        match record {
            Ok(record) => {
                // A newer focus replaces any still-pending one.
                self.pending_focus = Some(record.id);
                map.recenter(record.position);
                true
            }
            Err(e) => {
                warn!(error = %e, "focus target did not resolve");
                notifier.notify(&e.to_string());
                false
            }
        }
    }

    /// Called once per completed projection pass. A pending focus whose
    /// identity survived the pass gets its popup; one that did not is
    /// dropped — acting on stale state is never allowed, and any
    /// intervening pass (say a filter change before the recenter settled)
    /// consumes the pending focus rather than letting it resurrect later.
    pub fn on_projection_completed<M: MarkerLayer>(
        &mut self,
        projection: &Projection,
        markers: &mut M,
    ) {
        let Some(id) = self.pending_focus.take() else {
            return;
        };
        if projection.contains(id) {
            markers.open_popup(id);
        } else {
            debug!(record_id = %id, "pending focus no longer visible, dropping");
        }
    }

}
