use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- Geo Types ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// A geographic rectangle as reported by the map widget after a pan/zoom
/// settle. West ≤ east always holds — the widget normalizes bounds, so
/// antimeridian wraparound is out of scope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    /// The whole world — used until the widget reports its first settle.
    pub fn world() -> Self {
        Self::new(-90.0, -180.0, 90.0, 180.0)
    }

    /// Closed-rectangle containment: points on the boundary are inside.
    pub fn contains(&self, p: &GeoPoint) -> bool {
        p.lat >= self.south && p.lat <= self.north && p.lng >= self.west && p.lng <= self.east
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint {
            lat: (self.south + self.north) / 2.0,
            lng: (self.west + self.east) / 2.0,
        }
    }

    /// The same rectangle translated so its center lands on `point`.
    pub fn recentered(&self, point: GeoPoint) -> Self {
        let half_lat = (self.north - self.south) / 2.0;
        let half_lng = (self.east - self.west) / 2.0;
        Self::new(
            point.lat - half_lat,
            point.lng - half_lng,
            point.lat + half_lat,
            point.lng + half_lng,
        )
    }
}

// --- Award Facets ---

/// The award programs this deployment knows about. A record is assigned to
/// at most one family by case-insensitive substring match on its `source`
/// tag, checked in declaration order (first match wins).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AwardSource {
    Michelin,
    BlueRibbon,
}

impl AwardSource {
    pub const ALL: [AwardSource; 2] = [AwardSource::Michelin, AwardSource::BlueRibbon];

    /// The substring that assigns a record's `source` to this family.
    pub fn tag(&self) -> &'static str {
        match self {
            AwardSource::Michelin => "michelin",
            AwardSource::BlueRibbon => "blue",
        }
    }

    pub fn detect(source: &str) -> Option<AwardSource> {
        let s = source.to_lowercase();
        Self::ALL.into_iter().find(|f| s.contains(f.tag()))
    }

    /// The source-level facet toggle for this family.
    pub fn facet(&self) -> FacetKey {
        match self {
            AwardSource::Michelin => FacetKey::Michelin,
            AwardSource::BlueRibbon => FacetKey::BlueRibbon,
        }
    }
}

impl std::fmt::Display for AwardSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AwardSource::Michelin => write!(f, "michelin"),
            AwardSource::BlueRibbon => write!(f, "blue_ribbon"),
        }
    }
}

/// Every checkbox the filter UI can present: one toggle per award source
/// plus one per tier within each source. A deployment may wire up any
/// subset of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetKey {
    Michelin,
    MichelinThreeStars,
    MichelinTwoStars,
    MichelinOneStar,
    MichelinBib,
    BlueRibbon,
    RibbonThree,
    RibbonTwo,
    RibbonOne,
}

impl FacetKey {
    pub const ALL: [FacetKey; 9] = [
        FacetKey::Michelin,
        FacetKey::MichelinThreeStars,
        FacetKey::MichelinTwoStars,
        FacetKey::MichelinOneStar,
        FacetKey::MichelinBib,
        FacetKey::BlueRibbon,
        FacetKey::RibbonThree,
        FacetKey::RibbonTwo,
        FacetKey::RibbonOne,
    ];

    /// The family a toggle belongs to. Source-level toggles are their own
    /// family; tier toggles only apply within it.
    pub fn family(&self) -> AwardSource {
        match self {
            FacetKey::Michelin
            | FacetKey::MichelinThreeStars
            | FacetKey::MichelinTwoStars
            | FacetKey::MichelinOneStar
            | FacetKey::MichelinBib => AwardSource::Michelin,
            FacetKey::BlueRibbon
            | FacetKey::RibbonThree
            | FacetKey::RibbonTwo
            | FacetKey::RibbonOne => AwardSource::BlueRibbon,
        }
    }

    /// The lowercase category substring a tier toggle matches, or None for
    /// source-level toggles.
    pub fn tier_keyword(&self) -> Option<&'static str> {
        match self {
            FacetKey::Michelin | FacetKey::BlueRibbon => None,
            FacetKey::MichelinThreeStars => Some("3 star"),
            FacetKey::MichelinTwoStars => Some("2 star"),
            FacetKey::MichelinOneStar => Some("1 star"),
            FacetKey::MichelinBib => Some("bib"),
            FacetKey::RibbonThree => Some("ribbon_three"),
            FacetKey::RibbonTwo => Some("ribbon_two"),
            FacetKey::RibbonOne => Some("ribbon_one"),
        }
    }

    /// The tier toggles of one family, in rank order.
    pub fn tier_keys(family: AwardSource) -> &'static [FacetKey] {
        match family {
            AwardSource::Michelin => &[
                FacetKey::MichelinThreeStars,
                FacetKey::MichelinTwoStars,
                FacetKey::MichelinOneStar,
                FacetKey::MichelinBib,
            ],
            AwardSource::BlueRibbon => &[
                FacetKey::RibbonThree,
                FacetKey::RibbonTwo,
                FacetKey::RibbonOne,
            ],
        }
    }

    pub fn from_str_loose(s: &str) -> Option<FacetKey> {
        match s.trim().to_lowercase().as_str() {
            "michelin" => Some(FacetKey::Michelin),
            "michelin_three_stars" | "three_stars" => Some(FacetKey::MichelinThreeStars),
            "michelin_two_stars" | "two_stars" => Some(FacetKey::MichelinTwoStars),
            "michelin_one_star" | "one_star" => Some(FacetKey::MichelinOneStar),
            "michelin_bib" | "bib" => Some(FacetKey::MichelinBib),
            "blue_ribbon" | "blueribbon" => Some(FacetKey::BlueRibbon),
            "ribbon_three" => Some(FacetKey::RibbonThree),
            "ribbon_two" => Some(FacetKey::RibbonTwo),
            "ribbon_one" => Some(FacetKey::RibbonOne),
            _ => None,
        }
    }
}

impl std::fmt::Display for FacetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FacetKey::Michelin => "michelin",
            FacetKey::MichelinThreeStars => "michelin_three_stars",
            FacetKey::MichelinTwoStars => "michelin_two_stars",
            FacetKey::MichelinOneStar => "michelin_one_star",
            FacetKey::MichelinBib => "michelin_bib",
            FacetKey::BlueRibbon => "blue_ribbon",
            FacetKey::RibbonThree => "ribbon_three",
            FacetKey::RibbonTwo => "ribbon_two",
            FacetKey::RibbonOne => "ribbon_one",
        };
        write!(f, "{s}")
    }
}

// --- Filter State ---

/// The active facet toggles and search text. A key absent from `facets` is
/// a control this deployment never wired up — "do not filter on this
/// facet", never "reject everything". Single writer: the event layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    facets: HashMap<FacetKey, bool>,
    query: String,
}

impl FilterState {
    /// Every known facet present and checked — the usual startup state.
    pub fn all_on() -> Self {
        Self {
            facets: FacetKey::ALL.iter().map(|k| (*k, true)).collect(),
            query: String::new(),
        }
    }

    pub fn set_facet(&mut self, key: FacetKey, on: bool) {
        self.facets.insert(key, on);
    }

    /// Drop a control entirely, as if the deployment never configured it.
    pub fn remove_facet(&mut self, key: FacetKey) {
        self.facets.remove(&key);
    }

    /// None means the control is structurally absent.
    pub fn facet(&self, key: FacetKey) -> Option<bool> {
        self.facets.get(&key).copied()
    }

    pub fn set_query(&mut self, text: &str) {
        self.query = text.trim().to_lowercase();
    }

    /// Trimmed, lowercased search text. Empty means no text gating.
    pub fn query(&self) -> &str {
        &self.query
    }
}

// --- Language ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    En,
    Ko,
}

impl Language {
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "ko" | "kr" | "korean" => Language::Ko,
            _ => Language::En,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::En => write!(f, "en"),
            Language::Ko => write!(f, "ko"),
        }
    }
}

// --- Place Records ---

/// One award-listed restaurant. Immutable after load; `id` is assigned by
/// the record store and is the join key between markers, list rows, and
/// chat references. The display name is only a convenience alias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub id: Uuid,
    pub name: String,
    pub localized_name: Option<String>,
    pub position: GeoPoint,
    /// Free-text award-program tag ("michelin", "blueribbon").
    pub source: String,
    /// Free-text award tier ("3 Stars", "Bib Gourmand", "RIBBON_TWO").
    pub category: String,
    pub cuisine: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub year: Option<String>,
    /// Award-program detail page.
    pub url: Option<String>,
    /// Local map provider place id, when one was verified upstream.
    pub provider_id: Option<String>,
    /// Local map provider deep link. Absent means the detail panel falls
    /// back to a search-by-name link.
    pub provider_url: Option<String>,
}

impl PlaceRecord {
    pub fn display_name(&self, lang: Language) -> &str {
        match lang {
            Language::Ko => self.localized_name.as_deref().unwrap_or(&self.name),
            Language::En => &self.name,
        }
    }

    /// The query string outbound search links are built from: localized
    /// name first, then name plus a short address prefix, then plain name.
    pub fn link_query(&self) -> String {
        if let Some(local) = &self.localized_name {
            return local.clone();
        }
        if let Some(addr) = &self.address {
            let short: Vec<&str> = addr.split_whitespace().take(3).collect();
            if !short.is_empty() {
                return format!("{} {}", self.name, short.join(" "));
            }
        }
        self.name.clone()
    }
}

// --- Relay Context ---

/// One visible record flattened for the chat relay prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelaySummary {
    pub name: String,
    pub category: String,
    pub cuisine: Option<String>,
    pub price: Option<String>,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounding_box_contains_is_closed() {
        let b = BoundingBox::new(37.0, 126.0, 38.0, 128.0);
        assert!(b.contains(&GeoPoint {
            lat: 37.5,
            lng: 127.0
        }));
        assert!(b.contains(&GeoPoint {
            lat: 37.0,
            lng: 126.0
        }));
        assert!(b.contains(&GeoPoint {
            lat: 38.0,
            lng: 128.0
        }));
        assert!(!b.contains(&GeoPoint {
            lat: 38.0001,
            lng: 127.0
        }));
        assert!(!b.contains(&GeoPoint {
            lat: 37.5,
            lng: 125.9
        }));
    }

    #[test]
    fn recentered_preserves_span() {
        let b = BoundingBox::new(37.0, 126.0, 38.0, 128.0);
        let moved = b.recentered(GeoPoint { lat: 10.0, lng: 20.0 });
        assert!((moved.north - moved.south - 1.0).abs() < 1e-9);
        assert!((moved.east - moved.west - 2.0).abs() < 1e-9);
        let c = moved.center();
        assert!((c.lat - 10.0).abs() < 1e-9);
        assert!((c.lng - 20.0).abs() < 1e-9);
    }

    #[test]
    fn source_detection_first_match_wins() {
        assert_eq!(AwardSource::detect("michelin"), Some(AwardSource::Michelin));
        assert_eq!(
            AwardSource::detect("blueribbon"),
            Some(AwardSource::BlueRibbon)
        );
        assert_eq!(
            AwardSource::detect("Blue Ribbon Survey"),
            Some(AwardSource::BlueRibbon)
        );
        // Both tags present: declaration order decides.
        assert_eq!(
            AwardSource::detect("michelin blue"),
            Some(AwardSource::Michelin)
        );
        assert_eq!(AwardSource::detect("zagat"), None);
    }

    #[test]
    fn absent_facet_reads_as_none() {
        let mut f = FilterState::all_on();
        assert_eq!(f.facet(FacetKey::Michelin), Some(true));
        f.remove_facet(FacetKey::Michelin);
        assert_eq!(f.facet(FacetKey::Michelin), None);
    }

    #[test]
    fn query_is_normalized() {
        let mut f = FilterState::default();
        f.set_query("  Chicken  ");
        assert_eq!(f.query(), "chicken");
    }

    #[test]
    fn display_name_prefers_localized_in_korean() {
        let r = record("Mingles", Some("밍글스"));
        assert_eq!(r.display_name(Language::En), "Mingles");
        assert_eq!(r.display_name(Language::Ko), "밍글스");
        let r = record("Mingles", None);
        assert_eq!(r.display_name(Language::Ko), "Mingles");
    }

    #[test]
    fn link_query_fallback_order() {
        let mut r = record("Mingles", Some("밍글스"));
        assert_eq!(r.link_query(), "밍글스");
        r.localized_name = None;
        r.address = Some("757 Seolleung-ro Gangnam-gu Seoul".to_string());
        assert_eq!(r.link_query(), "Mingles 757 Seolleung-ro Gangnam-gu");
        r.address = None;
        assert_eq!(r.link_query(), "Mingles");
    }

    fn record(name: &str, localized: Option<&str>) -> PlaceRecord {
        PlaceRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            localized_name: localized.map(str::to_string),
            position: GeoPoint {
                lat: 37.5,
                lng: 127.0,
            },
            source: "michelin".to_string(),
            category: "3 Stars".to_string(),
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
}
