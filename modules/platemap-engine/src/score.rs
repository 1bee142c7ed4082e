//! The award scorer: a deterministic ranking key from the tier text.

use platemap_common::PlaceRecord;

/// Keyword groups and their bonuses. A group contributes once if any of
/// its keywords appears in the lowercased category; groups are additive,
/// though tier texts are mutually exclusive in practice.
const TIER_BONUSES: &[(&[&str], i32)] = &[
    (&["3 star", "ribbon_three"], 30),
    (&["2 star", "ribbon_two"], 20),
    (&["1 star", "ribbon_one"], 10),
    (&["bib"], 5),
];

/// Score a record from its `category` alone. Identical input always yields
/// an identical score; no filter or viewport state is consulted.
pub fn score(record: &PlaceRecord) -> i32 {
    let category = record.category.to_lowercase();
    TIER_BONUSES
        .iter()
        .filter(|(keywords, _)| keywords.iter().any(|k| category.contains(k)))
        .map(|(_, bonus)| bonus)
        .sum()
}
