//! Per-hit ring selection from hit age

/// Hits younger than this get the small ring
pub const INNER_RING_MS: i64 = 250;

/// Hits younger than this (and not inner) get the large ring
pub const OUTER_RING_MS: i64 = 500;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decoration {
    None,
    InnerRing,
    OuterRing,
}

/// Pick the ring for a hit at `hit_time` as seen at `now` (both epoch millis).
///
/// Future timestamps (clock skew) get no ring.
pub fn decoration_for(hit_time: i64, now: i64) -> Decoration {
    let age = now.saturating_sub(hit_time);
    if age < 0 {
        Decoration::None
    } else if age < INNER_RING_MS {
        Decoration::InnerRing
    } else if age < OUTER_RING_MS {
        Decoration::OuterRing
    } else {
        Decoration::None
    }
}
