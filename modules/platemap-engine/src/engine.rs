//! The dispatch loop.
//!
//! Every external trigger enters as a [`MapEvent`] and runs to completion
//! before the next is processed: update the single-owner [`AppState`],
//! run one projection pass, rebuild both views, then let the selection
//! bridge act on the completed projection. Child events go through a
//! queue, never recursion, so no two passes interleave.

use std::collections::VecDeque;

use tracing::{info, warn};
use uuid::Uuid;

use platemap_common::{BoundingBox, FacetKey, FilterState, GeoPoint, Language};

use crate::bridge::SelectionBridge;
use crate::projector::{project, Projection};
use crate::store::RecordStore;
use crate::traits::{ListPanel, MapControl, MarkerLayer, Notifier};

/// What a focus request points at. Ids come from markers and rows; names
/// come from chat `[[Name]]` tokens.
#[derive(Debug, Clone)]
pub enum FocusTarget {
    Id(Uuid),
    Name(String),
}

#[derive(Debug, Clone)]
pub enum MapEvent {
    FacetToggled { key: FacetKey, on: bool },
    QueryChanged { text: String },
    ViewportSettled { bounds: BoundingBox },
    LanguageChanged { lang: Language },
    LocateSucceeded { point: GeoPoint },
    LocateFailed { reason: String },
    FocusRequested { target: FocusTarget },
    RowClicked { id: Uuid, narrow_viewport: bool },
    HoverEntered { id: Uuid },
    HoverLeft { id: Uuid },
    /// Emitted by the engine itself after a projection pass; external
    /// callers never send this.
    ProjectionCompleted,
}

/// The single-owner application state. The dispatch loop is the only
/// writer; pipeline stages read it.
#[derive(Debug, Clone)]
pub struct AppState {
    pub filter: FilterState,
    pub viewport: BoundingBox,
    pub language: Language,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            filter: FilterState::all_on(),
            viewport: BoundingBox::world(),
            language: Language::default(),
        }
    }
}

pub struct Engine<M, L, C, N>
where
    M: MarkerLayer,
    L: ListPanel,
    C: MapControl,
    N: Notifier,
{
    store: RecordStore,
    state: AppState,
    projection: Projection,
    bridge: SelectionBridge,
    markers: M,
    list: L,
    map: C,
    notifier: N,
}

impl<M, L, C, N> Engine<M, L, C, N>
where
    M: MarkerLayer,
    L: ListPanel,
    C: MapControl,
    N: Notifier,
{
    /// The views stay empty until the first event (normally the widget's
    /// initial viewport settle) runs a projection pass.
    pub fn new(store: RecordStore, state: AppState, markers: M, list: L, map: C, notifier: N) -> Self {
        Self {
            store,
            state,
            projection: Projection::default(),
            bridge: SelectionBridge::default(),
            markers,
            list,
            map,
            notifier,
        }
    }

    /// Dispatch an event and drain every child it produces. Synchronous to
    /// completion: the next external event sees a settled engine.
    pub fn dispatch(&mut self, event: MapEvent) {
        let mut queue: VecDeque<MapEvent> = VecDeque::new();
        queue.push_back(event);
        while let Some(evt) = queue.pop_front() {
            for child in self.handle(evt) {
                queue.push_back(child);
            }
        }
    }

    fn handle(&mut self, event: MapEvent) -> Vec<MapEvent> {
        match event {
            MapEvent::FacetToggled { key, on } => {
                self.state.filter.set_facet(key, on);
                self.reproject()
            }
            MapEvent::QueryChanged { text } => {
                self.state.filter.set_query(&text);
                self.reproject()
            }
            MapEvent::ViewportSettled { bounds } => {
                self.state.viewport = bounds;
                self.reproject()
            }
            MapEvent::LanguageChanged { lang } => {
                self.state.language = lang;
                self.reproject()
            }
            MapEvent::LocateSucceeded { point } => {
                // Exactly one re-projection; the widget follows the same
                // recenter and its eventual settle is a separate event.
                self.state.viewport = self.state.viewport.recentered(point);
                self.map.recenter(point);
                self.reproject()
            }
            MapEvent::LocateFailed { reason } => {
                warn!(reason = %reason, "geolocation failed");
                self.notifier.notify("Could not determine your location");
                vec![]
            }
            MapEvent::FocusRequested { target } => {
                self.bridge
                    .focus_record(&self.store, &mut self.map, &mut self.notifier, &target);
                vec![]
            }
            MapEvent::RowClicked {
                id,
                narrow_viewport,
            } => {
                if narrow_viewport {
                    self.list.collapse();
                }
                vec![MapEvent::FocusRequested {
                    target: FocusTarget::Id(id),
                }]
            }
            MapEvent::HoverEntered { id } => {
                self.bridge
                    .hover_enter(&self.projection, &mut self.markers, id);
                vec![]
            }
            MapEvent::HoverLeft { id } => {
                self.bridge
                    .hover_leave(&self.projection, &mut self.markers, id);
                vec![]
            }
            MapEvent::ProjectionCompleted => {
                self.bridge
                    .on_projection_completed(&self.projection, &mut self.markers);
                vec![]
            }
        }
    }

    /// One projection pass: rebuild both views from scratch and announce
    /// completion so deferred work (the pending focus popup) can run
    /// against the fresh identity links.
    fn reproject(&mut self) -> Vec<MapEvent> {
        self.projection = project(
            &self.store,
            &self.state.filter,
            &self.state.viewport,
            self.state.language,
        );
        info!(
            visible = self.projection.visible.len(),
            rows = self.projection.rows.len(),
            "projection pass complete"
        );
        self.markers.rebuild(&self.projection.markers);
        self.list.rebuild(&self.projection.rows);
        vec![MapEvent::ProjectionCompleted]
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }
}
