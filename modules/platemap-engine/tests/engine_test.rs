//! Integration tests for the dispatch loop: one projection pass per
//! trigger, both views rebuilt in lockstep, and focus/hover routing
//! validated against recording fakes.

use std::cell::RefCell;
use std::rc::Rc;

use uuid::Uuid;

use platemap_common::{BoundingBox, FacetKey, FilterState, GeoPoint, Language, PlaceRecord};
use platemap_engine::{
    AppState, Engine, FocusTarget, ListPanel, MapControl, MapEvent, MarkerHandle, MarkerLayer,
    Notifier, RecordStore, RowHandle,
};

// ---------------------------------------------------------------------------
// Recording fakes — shared handles so assertions can look inside after the
// engine takes ownership
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MarkerLog {
    rebuilds: Vec<Vec<MarkerHandle>>,
    highlights: Vec<(Uuid, bool)>,
    popups: Vec<Uuid>,
}

#[derive(Clone, Default)]
struct RecordingMarkers(Rc<RefCell<MarkerLog>>);

impl MarkerLayer for RecordingMarkers {
    fn rebuild(&mut self, markers: &[MarkerHandle]) {
        self.0.borrow_mut().rebuilds.push(markers.to_vec());
    }

    fn set_highlight(&mut self, id: Uuid, on: bool) {
        self.0.borrow_mut().highlights.push((id, on));
    }

    fn open_popup(&mut self, id: Uuid) {
        self.0.borrow_mut().popups.push(id);
    }
}

#[derive(Default)]
struct ListLog {
    rebuilds: Vec<Vec<RowHandle>>,
    collapses: usize,
}

#[derive(Clone, Default)]
struct RecordingList(Rc<RefCell<ListLog>>);

impl ListPanel for RecordingList {
    fn rebuild(&mut self, rows: &[RowHandle]) {
        self.0.borrow_mut().rebuilds.push(rows.to_vec());
    }

    fn collapse(&mut self) {
        self.0.borrow_mut().collapses += 1;
    }
}

#[derive(Clone, Default)]
struct RecordingMap(Rc<RefCell<Vec<GeoPoint>>>);

impl MapControl for RecordingMap {
    fn recenter(&mut self, center: GeoPoint) {
        self.0.borrow_mut().push(center);
    }
}

#[derive(Clone, Default)]
struct RecordingNotifier(Rc<RefCell<Vec<String>>>);

impl Notifier for RecordingNotifier {
    fn notify(&mut self, message: &str) {
        self.0.borrow_mut().push(message.to_string());
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn record(name: &str, source: &str, category: &str, lat: f64, lng: f64) -> PlaceRecord {
    PlaceRecord {
        id: Uuid::new_v4(),
        name: name.to_string(),
        localized_name: None,
        position: GeoPoint { lat, lng },
        source: source.to_string(),
        category: category.to_string(),
        cuisine: None,
        address: None,
        description: None,
        price: None,
        phone: None,
        city: None,
        country: None,
        year: None,
        url: None,
        provider_id: None,
        provider_url: None,
    }
}

/// A(michelin 3 Stars) and B(michelin Bib) sit in the north box,
/// C(blue RIBBON_TWO) in the south box.
fn abc_store() -> RecordStore {
    RecordStore::from_records(vec![
        record("A", "michelin", "3 Stars", 37.5, 127.0),
        record("B", "michelin", "Bib Gourmand", 37.6, 127.1),
        record("C", "blue ribbon", "RIBBON_TWO", 37.45, 126.9),
    ])
}

fn seoul_bounds() -> BoundingBox {
    BoundingBox::new(37.0, 126.0, 38.0, 128.0)
}

struct Harness {
    engine: Engine<RecordingMarkers, RecordingList, RecordingMap, RecordingNotifier>,
    markers: RecordingMarkers,
    list: RecordingList,
    map: RecordingMap,
    notifier: RecordingNotifier,
}

fn harness(store: RecordStore) -> Harness {
    let markers = RecordingMarkers::default();
    let list = RecordingList::default();
    let map = RecordingMap::default();
    let notifier = RecordingNotifier::default();
    let engine = Engine::new(
        store,
        AppState::default(),
        markers.clone(),
        list.clone(),
        map.clone(),
        notifier.clone(),
    );
    Harness {
        engine,
        markers,
        list,
        map,
        notifier,
    }
}

fn id_of(h: &Harness, name: &str) -> Uuid {
    h.engine.store().find_by_name(name).unwrap().id
}

fn last_row_labels(h: &Harness) -> Vec<String> {
    h.list
        .0
        .borrow()
        .rebuilds
        .last()
        .unwrap()
        .iter()
        .map(|r| r.label.clone())
        .collect()
}

// ---------------------------------------------------------------------------
// Projection triggers
// ---------------------------------------------------------------------------

#[test]
fn initial_settle_builds_both_views_in_rank_order() {
    let mut h = harness(abc_store());
    h.engine.dispatch(MapEvent::ViewportSettled {
        bounds: seoul_bounds(),
    });

    assert_eq!(last_row_labels(&h), vec!["A", "C", "B"]);
    let markers = h.markers.0.borrow();
    assert_eq!(markers.rebuilds.len(), 1);
    assert_eq!(
        markers.rebuilds[0]
            .iter()
            .map(|m| m.label.as_str())
            .collect::<Vec<_>>(),
        vec!["A", "C", "B"]
    );
}

#[test]
fn facet_toggle_reprojects_both_views() {
    let mut h = harness(abc_store());
    h.engine.dispatch(MapEvent::ViewportSettled {
        bounds: seoul_bounds(),
    });
    h.engine.dispatch(MapEvent::FacetToggled {
        key: FacetKey::Michelin,
        on: false,
    });

    assert_eq!(last_row_labels(&h), vec!["C"]);
    let markers = h.markers.0.borrow();
    assert_eq!(markers.rebuilds.len(), 2);
    assert_eq!(markers.rebuilds[1].len(), 1);
}

#[test]
fn query_change_narrows_and_is_monotonic() {
    let mut h = harness(abc_store());
    h.engine.dispatch(MapEvent::ViewportSettled {
        bounds: seoul_bounds(),
    });
    let before: Vec<String> = last_row_labels(&h);
    h.engine.dispatch(MapEvent::QueryChanged {
        text: "  A ".to_string(),
    });
    let after = last_row_labels(&h);
    assert_eq!(after, vec!["A"]);
    assert!(after.iter().all(|l| before.contains(l)));
}

#[test]
fn language_switch_relabels_rows() {
    let mut r = record("Woo Lae Oak", "blueribbon", "RIBBON_THREE", 37.5, 127.0);
    r.localized_name = Some("우래옥".to_string());
    let mut h = harness(RecordStore::from_records(vec![r]));
    h.engine.dispatch(MapEvent::ViewportSettled {
        bounds: seoul_bounds(),
    });
    assert_eq!(last_row_labels(&h), vec!["Woo Lae Oak"]);
    h.engine.dispatch(MapEvent::LanguageChanged { lang: Language::Ko });
    assert_eq!(last_row_labels(&h), vec!["우래옥"]);
}

#[test]
fn state_defaults_start_all_on_and_worldwide() {
    let h = harness(abc_store());
    assert_eq!(h.engine.state().filter, FilterState::all_on());
    assert_eq!(h.engine.state().viewport, BoundingBox::world());
    assert!(h.engine.projection().visible.is_empty());
}

// ---------------------------------------------------------------------------
// Hover routing
// ---------------------------------------------------------------------------

#[test]
fn hover_highlights_visible_marker_and_reverts() {
    let mut h = harness(abc_store());
    h.engine.dispatch(MapEvent::ViewportSettled {
        bounds: seoul_bounds(),
    });
    let a = id_of(&h, "A");
    h.engine.dispatch(MapEvent::HoverEntered { id: a });
    h.engine.dispatch(MapEvent::HoverLeft { id: a });
    assert_eq!(
        h.markers.0.borrow().highlights,
        vec![(a, true), (a, false)]
    );
}

#[test]
fn hover_on_filtered_out_record_is_a_noop() {
    let mut h = harness(abc_store());
    h.engine.dispatch(MapEvent::ViewportSettled {
        bounds: seoul_bounds(),
    });
    let a = id_of(&h, "A");
    h.engine.dispatch(MapEvent::FacetToggled {
        key: FacetKey::Michelin,
        on: false,
    });
    // A left the projection between hover begin and end.
    h.engine.dispatch(MapEvent::HoverEntered { id: a });
    h.engine.dispatch(MapEvent::HoverLeft { id: a });
    assert!(h.markers.0.borrow().highlights.is_empty());
}

// ---------------------------------------------------------------------------
// Focus flow
// ---------------------------------------------------------------------------

#[test]
fn focus_on_offscreen_record_recenters_then_pops_after_settle() {
    let mut h = harness(abc_store());
    // Start on a viewport that contains only C in the south.
    h.engine.dispatch(MapEvent::ViewportSettled {
        bounds: BoundingBox::new(37.4, 126.8, 37.48, 127.0),
    });
    assert_eq!(last_row_labels(&h), vec!["C"]);

    // Chat token click: focus B by name while it is off-screen.
    h.engine.dispatch(MapEvent::FocusRequested {
        target: FocusTarget::Name("B".to_string()),
    });
    let b = id_of(&h, "B");
    assert_eq!(h.map.0.borrow().len(), 1);
    let center = h.map.0.borrow()[0];
    assert!((center.lat - 37.6).abs() < 1e-9);
    // The popup must wait for the settle/projection cycle.
    assert!(h.markers.0.borrow().popups.is_empty());

    // The widget settles on the new center; B is now in bounds.
    h.engine.dispatch(MapEvent::ViewportSettled {
        bounds: BoundingBox::new(37.55, 127.0, 37.65, 127.2),
    });
    assert_eq!(h.markers.0.borrow().popups, vec![b]);
    assert!(last_row_labels(&h).contains(&"B".to_string()));
}

#[test]
fn popup_opens_only_after_the_rebuild_that_contains_the_target() {
    let mut h = harness(abc_store());
    h.engine.dispatch(MapEvent::FocusRequested {
        target: FocusTarget::Name("A".to_string()),
    });
    h.engine.dispatch(MapEvent::ViewportSettled {
        bounds: seoul_bounds(),
    });
    let a = id_of(&h, "A");
    let markers = h.markers.0.borrow();
    assert_eq!(markers.popups, vec![a]);
    // The rebuild carrying A happened before the popup was requested.
    assert!(markers.rebuilds.last().unwrap().iter().any(|m| m.record_id == a));
}

#[test]
fn intervening_filter_change_drops_the_pending_focus() {
    let mut h = harness(abc_store());
    h.engine.dispatch(MapEvent::ViewportSettled {
        bounds: seoul_bounds(),
    });
    h.engine.dispatch(MapEvent::FocusRequested {
        target: FocusTarget::Name("B".to_string()),
    });
    // A filter change lands before the recenter settles, and its
    // projection no longer contains B.
    h.engine.dispatch(MapEvent::FacetToggled {
        key: FacetKey::MichelinBib,
        on: false,
    });
    assert!(h.markers.0.borrow().popups.is_empty());

    // The settle arrives late; the stale focus must not resurrect.
    h.engine.dispatch(MapEvent::ViewportSettled {
        bounds: seoul_bounds(),
    });
    assert!(h.markers.0.borrow().popups.is_empty());
}

#[test]
fn unknown_focus_name_notifies_and_moves_nothing() {
    let mut h = harness(abc_store());
    h.engine.dispatch(MapEvent::ViewportSettled {
        bounds: seoul_bounds(),
    });
    h.engine.dispatch(MapEvent::FocusRequested {
        target: FocusTarget::Name("Nowhere".to_string()),
    });
    assert!(h.map.0.borrow().is_empty());
    assert!(h.markers.0.borrow().popups.is_empty());
    assert_eq!(h.notifier.0.borrow().len(), 1);
}

#[test]
fn duplicate_focus_name_fails_loudly_instead_of_first_match() {
    let store = RecordStore::from_records(vec![
        record("Twin", "michelin", "1 Star", 37.5, 127.0),
        record("Twin", "blueribbon", "RIBBON_ONE", 37.6, 127.1),
    ]);
    let mut h = harness(store);
    h.engine.dispatch(MapEvent::ViewportSettled {
        bounds: seoul_bounds(),
    });
    h.engine.dispatch(MapEvent::FocusRequested {
        target: FocusTarget::Name("Twin".to_string()),
    });
    assert!(h.map.0.borrow().is_empty());
    let notes = h.notifier.0.borrow();
    assert_eq!(notes.len(), 1);
    assert!(notes[0].contains("Twin"));
}

#[test]
fn row_click_focuses_and_collapses_on_narrow_viewports() {
    let mut h = harness(abc_store());
    h.engine.dispatch(MapEvent::ViewportSettled {
        bounds: seoul_bounds(),
    });
    let c = id_of(&h, "C");
    h.engine.dispatch(MapEvent::RowClicked {
        id: c,
        narrow_viewport: true,
    });
    assert_eq!(h.list.0.borrow().collapses, 1);
    assert_eq!(h.map.0.borrow().len(), 1);

    h.engine.dispatch(MapEvent::RowClicked {
        id: c,
        narrow_viewport: false,
    });
    assert_eq!(h.list.0.borrow().collapses, 1);
    assert_eq!(h.map.0.borrow().len(), 2);
}

// ---------------------------------------------------------------------------
// Geolocation
// ---------------------------------------------------------------------------

#[test]
fn locate_success_recenters_and_reprojects_exactly_once() {
    let mut h = harness(abc_store());
    h.engine.dispatch(MapEvent::ViewportSettled {
        bounds: BoundingBox::new(37.4, 126.8, 37.48, 127.0),
    });
    assert_eq!(last_row_labels(&h), vec!["C"]);

    h.engine.dispatch(MapEvent::LocateSucceeded {
        point: GeoPoint {
            lat: 37.55,
            lng: 127.05,
        },
    });
    // Viewport translated onto the fix, one fresh projection pass.
    assert_eq!(h.markers.0.borrow().rebuilds.len(), 2);
    assert_eq!(h.map.0.borrow().len(), 1);
    let center = h.engine.state().viewport.center();
    assert!((center.lat - 37.55).abs() < 1e-9);
    assert!((center.lng - 127.05).abs() < 1e-9);
}

#[test]
fn locate_failure_leaves_all_state_unchanged() {
    let mut h = harness(abc_store());
    h.engine.dispatch(MapEvent::ViewportSettled {
        bounds: seoul_bounds(),
    });
    let viewport_before = h.engine.state().viewport;
    let rebuilds_before = h.markers.0.borrow().rebuilds.len();

    h.engine.dispatch(MapEvent::LocateFailed {
        reason: "permission denied".to_string(),
    });
    assert_eq!(h.engine.state().viewport, viewport_before);
    assert_eq!(h.markers.0.borrow().rebuilds.len(), rebuilds_before);
    assert_eq!(h.notifier.0.borrow().len(), 1);
}

// ---------------------------------------------------------------------------
// Degenerate datasets
// ---------------------------------------------------------------------------

#[test]
fn empty_store_renders_empty_views_without_error() {
    let mut h = harness(RecordStore::default());
    h.engine.dispatch(MapEvent::ViewportSettled {
        bounds: seoul_bounds(),
    });
    assert!(last_row_labels(&h).is_empty());
    assert!(h.markers.0.borrow().rebuilds[0].is_empty());
}
