//! Outbound link construction for the detail popup.
//!
//! Three links per record: the local map provider (deep link when a
//! verified place id exists upstream, search-by-name fallback otherwise),
//! a second-party map search, and a generic web map search. All search
//! links are built from [`PlaceRecord::link_query`].

use serde::Serialize;
use url::Url;

use platemap_common::PlaceRecord;

const PROVIDER_SEARCH_BASE: &str = "https://map.kakao.com/link/search/";
const MAP_SEARCH_BASE: &str = "https://map.naver.com/v5/search/";
const WEB_SEARCH_BASE: &str = "https://www.google.com/maps/search/";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundLinks {
    pub provider: String,
    pub map_search: String,
    pub web_search: String,
}

pub fn build(record: &PlaceRecord) -> OutboundLinks {
    let query = record.link_query();
    let provider = match &record.provider_url {
        Some(deep_link) => deep_link.clone(),
        None => path_search(PROVIDER_SEARCH_BASE, &query),
    };
    OutboundLinks {
        provider,
        map_search: path_search(MAP_SEARCH_BASE, &query),
        web_search: query_search(WEB_SEARCH_BASE, &query),
    }
}

/// Append the query as a percent-encoded final path segment.
fn path_search(base: &str, query: &str) -> String {
    let mut url = Url::parse(base).expect("static base URL is valid");
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(query);
    }
    url.to_string()
}

/// Google-style `?api=1&query=` search.
fn query_search(base: &str, query: &str) -> String {
    let mut url = Url::parse(base).expect("static base URL is valid");
    url.query_pairs_mut()
        .append_pair("api", "1")
        .append_pair("query", query);
    url.to_string()
}
