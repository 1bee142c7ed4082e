//! The predicate engine: does a record pass the active facet toggles and
//! search text?

use platemap_common::{AwardSource, FacetKey, FilterState, PlaceRecord};

/// Evaluate one record against the filter state. Viewport containment is a
/// separate stage; this is facets + text only.
///
/// Gating order: source toggles, then tier toggles within the record's own
/// family, then text. Absent toggles never reject — filtering degrades to
/// a superset, never to an empty set.
pub fn passes(record: &PlaceRecord, filter: &FilterState) -> bool {
    let source = record.source.to_lowercase();

    // Source gating: an unchecked family toggle rejects its records.
    for family in AwardSource::ALL {
        if source.contains(family.tag()) && filter.facet(family.facet()) == Some(false) {
            return false;
        }
    }

    // Tier gating, only within the family the record belongs to (first
    // match wins). Tier toggles are OR'd; a category whose keywords map to
    // no configured toggle is unclassified and never rejected.
    if let Some(family) = AwardSource::detect(&record.source) {
        let category = record.category.to_lowercase();
        let mut classified = false;
        let mut any_on = false;
        for key in FacetKey::tier_keys(family) {
            let Some(keyword) = key.tier_keyword() else {
                continue;
            };
            if !category.contains(keyword) {
                continue;
            }
            if let Some(on) = filter.facet(*key) {
                classified = true;
                any_on |= on;
            }
        }
        if classified && !any_on {
            return false;
        }
    }

    // Text gating over the concatenated descriptive fields.
    let query = filter.query();
    if !query.is_empty() {
        let haystack = [
            Some(record.name.as_str()),
            record.localized_name.as_deref(),
            record.cuisine.as_deref(),
            record.address.as_deref(),
            record.description.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
        if !haystack.contains(query) {
            return false;
        }
    }

    true
}
