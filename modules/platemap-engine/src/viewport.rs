//! The viewport filter: closed-rectangle containment against the map's
//! current bounds.

use platemap_common::{BoundingBox, PlaceRecord};

pub fn in_bounds(record: &PlaceRecord, viewport: &BoundingBox) -> bool {
    viewport.contains(&record.position)
}
