use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use platemap_common::{BoundingBox, FacetKey, FilterState, Language};
use platemap_engine::{project, relay_context, RecordStore};

use crate::links::{self, OutboundLinks};
use crate::AppState;

// --- Query structs ---

#[derive(Deserialize)]
pub struct ProjectionQuery {
    south: f64,
    west: f64,
    north: f64,
    east: f64,
    /// Free-text search.
    q: Option<String>,
    /// Comma-separated facet keys currently unchecked.
    off: Option<String>,
    lang: Option<String>,
}

#[derive(Deserialize)]
pub struct ChatBody {
    question: String,
    lang: Option<String>,
    /// Record ids currently visible on the caller's map.
    #[serde(default)]
    visible: Vec<Uuid>,
}

// --- Helpers ---

fn parse_facets(keys: &str) -> Vec<FacetKey> {
    keys.split(',').filter_map(FacetKey::from_str_loose).collect()
}

pub fn places_to_geojson(store: &RecordStore) -> serde_json::Value {
    let features: Vec<serde_json::Value> = store
        .records()
        .iter()
        .map(|r| {
            serde_json::json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [r.position.lng, r.position.lat]
                },
                "properties": {
                    "id": r.id.to_string(),
                    "name": r.name,
                    "localized_name": r.localized_name,
                    "source": r.source,
                    "category": r.category,
                    "cuisine": r.cuisine,
                    "address": r.address,
                    "description": r.description,
                    "price": r.price,
                    "phone": r.phone,
                    "url": r.url,
                    "kakao_id": r.provider_id,
                    "kakao_url": r.provider_url,
                }
            })
        })
        .collect();

    serde_json::json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

// --- Projection payloads ---

#[derive(Serialize)]
pub struct MarkerPayload {
    id: String,
    lat: f64,
    lng: f64,
    label: String,
    score: i32,
    source: String,
    category: String,
    cuisine: Option<String>,
    address: Option<String>,
    description: Option<String>,
    price: Option<String>,
    phone: Option<String>,
    url: Option<String>,
    links: OutboundLinks,
}

#[derive(Serialize)]
pub struct RowPayload {
    id: String,
    rank: usize,
    label: String,
    score: i32,
    category: String,
    cuisine: Option<String>,
    price: Option<String>,
}

#[derive(Serialize)]
pub struct ProjectionResponse {
    total: usize,
    markers: Vec<MarkerPayload>,
    rows: Vec<RowPayload>,
}

pub fn build_projection_response(
    store: &RecordStore,
    filter: &FilterState,
    bounds: &BoundingBox,
    lang: Language,
) -> ProjectionResponse {
    let projection = project(store, filter, bounds, lang);

    let markers = projection
        .markers
        .iter()
        .filter_map(|m| {
            let record = store.get(m.record_id)?;
            Some(MarkerPayload {
                id: m.record_id.to_string(),
                lat: m.lat,
                lng: m.lng,
                label: m.label.clone(),
                score: m.score,
                source: m.source.clone(),
                category: m.category.clone(),
                cuisine: record.cuisine.clone(),
                address: record.address.clone(),
                description: record.description.clone(),
                price: record.price.clone(),
                phone: record.phone.clone(),
                url: record.url.clone(),
                links: links::build(record),
            })
        })
        .collect();

    let rows = projection
        .rows
        .iter()
        .map(|r| RowPayload {
            id: r.record_id.to_string(),
            rank: r.rank,
            label: r.label.clone(),
            score: r.score,
            category: r.category.clone(),
            cuisine: r.cuisine.clone(),
            price: r.price.clone(),
        })
        .collect();

    ProjectionResponse {
        total: projection.visible.len(),
        markers,
        rows,
    }
}

// --- Handlers ---

pub async fn api_places(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(places_to_geojson(&state.store))
}

pub async fn api_projection(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProjectionQuery>,
) -> impl IntoResponse {
    let bounds = BoundingBox::new(params.south, params.west, params.north, params.east);
    let mut filter = FilterState::all_on();
    if let Some(q) = &params.q {
        filter.set_query(q);
    }
    if let Some(off) = &params.off {
        for key in parse_facets(off) {
            filter.set_facet(key, false);
        }
    }
    let lang = params
        .lang
        .as_deref()
        .map(Language::from_str_loose)
        .unwrap_or_default();

    Json(build_projection_response(
        &state.store,
        &filter,
        &bounds,
        lang,
    ))
}

#[derive(Serialize)]
pub struct ChatReply {
    answer: String,
}

/// Relay failures surface as a friendly in-panel message; they never
/// propagate into map state or crash the request.
pub async fn api_chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatBody>,
) -> impl IntoResponse {
    let Some(relay) = &state.relay else {
        return Json(ChatReply {
            answer: "The dining guide is not configured on this deployment.".to_string(),
        });
    };

    let lang = body
        .lang
        .as_deref()
        .map(Language::from_str_loose)
        .unwrap_or_default();
    let context = relay_context(&body.visible, &state.store);

    match relay.ask(&context, &body.question, lang).await {
        Ok(answer) => Json(ChatReply { answer }),
        Err(e) => {
            warn!(error = %e, "relay request failed");
            Json(ChatReply {
                answer: "Sorry, the dining guide is unavailable right now. Please try again in a moment.".to_string(),
            })
        }
    }
}
