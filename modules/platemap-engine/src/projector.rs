//! The sync projector.
//!
//! One projection pass turns the full record store into the two views the
//! UI renders: the spatial marker set and the ranked list. Both are
//! rebuilt wholesale each pass; identity links tie a record to its marker
//! and (when ranked high enough) its list row until the next pass discards
//! them.

use std::cmp::Reverse;
use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use platemap_common::{BoundingBox, FilterState, Language, PlaceRecord, RelaySummary};

use crate::filter::passes;
use crate::score::score;
use crate::store::RecordStore;
use crate::viewport::in_bounds;

/// The ranked list is capped for render cost; the marker set never is.
/// Intentional asymmetry — every matching record stays mappable.
pub const LIST_CAP: usize = 100;

/// How many visible records the chat relay sees.
pub const RELAY_CONTEXT_CAP: usize = 50;

/// Description length forwarded to the relay.
const RELAY_DESCRIPTION_CAP: usize = 160;

/// One record's presence on the spatial layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerHandle {
    pub record_id: Uuid,
    pub lat: f64,
    pub lng: f64,
    pub label: String,
    pub score: i32,
    pub source: String,
    pub category: String,
}

/// One record's presence on the ranked list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowHandle {
    pub record_id: Uuid,
    /// 1-based position in the ranked list.
    pub rank: usize,
    pub label: String,
    pub score: i32,
    pub category: String,
    pub cuisine: Option<String>,
    pub price: Option<String>,
}

/// Per-record association for one projection pass: marker index always,
/// row index only while the record ranks inside the list cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityLink {
    pub marker: usize,
    pub row: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct Projection {
    /// Record ids in rank order — the VisibleSet.
    pub visible: Vec<Uuid>,
    pub markers: Vec<MarkerHandle>,
    pub rows: Vec<RowHandle>,
    links: HashMap<Uuid, IdentityLink>,
}

impl Projection {
    pub fn link(&self, id: Uuid) -> Option<IdentityLink> {
        self.links.get(&id).copied()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.links.contains_key(&id)
    }
}

/// Run one projection pass: predicate + viewport filter, stable sort by
/// descending score (load order breaks ties), then emit both views. An
/// empty store projects empty views — never an error.
pub fn project(
    store: &RecordStore,
    filter: &FilterState,
    viewport: &BoundingBox,
    language: Language,
) -> Projection {
    let mut survivors: Vec<&PlaceRecord> = store
        .records()
        .iter()
        .filter(|r| passes(r, filter) && in_bounds(r, viewport))
        .collect();
    // Vec::sort_by_key is stable, so equal scores keep load order and
    // re-renders are reproducible.
    survivors.sort_by_key(|r| Reverse(score(r)));

    let mut projection = Projection::default();
    for (i, record) in survivors.iter().enumerate() {
        let record_score = score(record);
        projection.visible.push(record.id);
        projection.markers.push(MarkerHandle {
            record_id: record.id,
            lat: record.position.lat,
            lng: record.position.lng,
            label: record.display_name(language).to_string(),
            score: record_score,
            source: record.source.clone(),
            category: record.category.clone(),
        });
        let row = if i < LIST_CAP {
            projection.rows.push(RowHandle {
                record_id: record.id,
                rank: i + 1,
                label: record.display_name(language).to_string(),
                score: record_score,
                category: record.category.clone(),
                cuisine: record.cuisine.clone(),
                price: record.price.clone(),
            });
            Some(i)
        } else {
            None
        };
        projection.links.insert(
            record.id,
            IdentityLink {
                marker: i,
                row,
            },
        );
    }
    projection
}

/// Flatten visible records for the chat relay, capped at
/// [`RELAY_CONTEXT_CAP`] entries with truncated descriptions. Takes ids
/// rather than a projection so callers holding either work; unknown ids
/// are skipped.
pub fn relay_context<'a>(
    visible: impl IntoIterator<Item = &'a Uuid>,
    store: &RecordStore,
) -> Vec<RelaySummary> {
    visible
        .into_iter()
        .take(RELAY_CONTEXT_CAP)
        .filter_map(|id| store.get(*id))
        .map(|r| RelaySummary {
            name: r.name.clone(),
            category: r.category.clone(),
            cuisine: r.cuisine.clone(),
            price: r.price.clone(),
            description: r.description.as_deref().map(truncate_chars),
        })
        .collect()
}

fn truncate_chars(text: &str) -> String {
    if text.chars().count() <= RELAY_DESCRIPTION_CAP {
        text.to_string()
    } else {
        text.chars().take(RELAY_DESCRIPTION_CAP).collect()
    }
}
