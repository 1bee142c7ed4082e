//! The immutable record store.
//!
//! Loads a GeoJSON FeatureCollection once at startup and assigns each
//! record a synthetic `Uuid`. The id is the primary identity everywhere
//! downstream; display names are only a lookup alias for chat tokens.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use platemap_common::{GeoPoint, PlaceRecord, PlatemapError};

// --- GeoJSON input shape ---
//
// Point coordinates are [lng, lat]. Every property except `name` is
// optional; absence is a valid value, not an error.

#[derive(Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: PropertyBag,
}

#[derive(Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Vec<f64>,
}

#[derive(Deserialize, Default)]
struct PropertyBag {
    name: Option<String>,
    localized_name: Option<String>,
    source: Option<String>,
    category: Option<String>,
    cuisine: Option<String>,
    address: Option<String>,
    description: Option<String>,
    price: Option<String>,
    phone: Option<String>,
    city: Option<String>,
    country: Option<String>,
    year: Option<String>,
    url: Option<String>,
    kakao_id: Option<String>,
    kakao_url: Option<String>,
}

// --- Store ---

#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<PlaceRecord>,
    by_id: HashMap<Uuid, usize>,
}

impl RecordStore {
    /// Parse a GeoJSON FeatureCollection. Features with missing or
    /// degenerate geometry, or without a name, are skipped with a warning;
    /// only a malformed document is an error. Load order is preserved and
    /// is the ranking tie-break downstream.
    pub fn from_geojson(raw: &str) -> Result<Self, PlatemapError> {
        let collection: FeatureCollection =
            serde_json::from_str(raw).map_err(|e| PlatemapError::DataLoad(e.to_string()))?;

        let mut records = Vec::with_capacity(collection.features.len());
        for feature in collection.features {
            let Some(geometry) = feature.geometry else {
                warn!("skipping feature without geometry");
                continue;
            };
            if geometry.kind != "Point" || geometry.coordinates.len() < 2 {
                warn!(kind = %geometry.kind, "skipping feature with non-point geometry");
                continue;
            }
            let props = feature.properties;
            let Some(name) = props.name.filter(|n| !n.trim().is_empty()) else {
                warn!("skipping feature without a name");
                continue;
            };
            records.push(PlaceRecord {
                id: Uuid::new_v4(),
                name,
                localized_name: props.localized_name,
                position: GeoPoint {
                    lat: geometry.coordinates[1],
                    lng: geometry.coordinates[0],
                },
                source: props.source.unwrap_or_default(),
                category: props.category.unwrap_or_default(),
                cuisine: props.cuisine,
                address: props.address,
                description: props.description,
                price: props.price,
                phone: props.phone,
                city: props.city,
                country: props.country,
                year: props.year,
                url: props.url,
                provider_id: props.kakao_id,
                provider_url: props.kakao_url,
            });
        }

        info!(count = records.len(), "dataset loaded");
        Ok(Self::from_records(records))
    }

    pub fn from_records(records: Vec<PlaceRecord>) -> Self {
        let by_id = records.iter().enumerate().map(|(i, r)| (r.id, i)).collect();
        Self { records, by_id }
    }

    pub fn get(&self, id: Uuid) -> Option<&PlaceRecord> {
        self.by_id.get(&id).map(|i| &self.records[*i])
    }

    /// Name-based lookup for chat-token navigation. Matches `name` or
    /// `localized_name`, case-insensitive and trimmed. Two records sharing
    /// a name is an error rather than a silent first-match.
    pub fn find_by_name(&self, name: &str) -> Result<&PlaceRecord, PlatemapError> {
        let needle = name.trim().to_lowercase();
        let matches: Vec<&PlaceRecord> = self
            .records
            .iter()
            .filter(|r| {
                r.name.trim().to_lowercase() == needle
                    || r.localized_name
                        .as_deref()
                        .is_some_and(|n| n.trim().to_lowercase() == needle)
            })
            .collect();
        match matches.as_slice() {
            [] => Err(PlatemapError::StaleFocus(name.to_string())),
            [record] => Ok(record),
            many => Err(PlatemapError::AmbiguousName(name.to_string(), many.len())),
        }
    }

    /// All records in load order.
    pub fn records(&self) -> &[PlaceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
