//! Geolocated hits and the host-side log that owns them

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::rc::Rc;

/// One geolocated event to show on the map
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    #[serde(alias = "siteId")]
    pub site_id: String,
    pub lat: f64,
    pub lon: f64,
    /// Unix epoch millis
    pub time: i64,
}

impl Hit {
    pub fn new(site_id: impl Into<String>, lat: f64, lon: f64, time: i64) -> Self {
        Self {
            site_id: site_id.into(),
            lat,
            lon,
            time,
        }
    }
}

/// Immutable collection handed to the view; swapped wholesale, never mutated
pub type HitSnapshot = Rc<[Hit]>;

/// Recent hits, bounded by age and count.
///
/// Each call to `snapshot()` freezes the current contents so a draw pass
/// never observes a half-updated collection.
pub struct HitLog {
    hits: VecDeque<Hit>,
    retention_ms: i64,
    max_hits: usize,
    snapshot: Option<HitSnapshot>,
}

impl HitLog {
    pub fn new(retention_ms: i64, max_hits: usize) -> Self {
        Self {
            hits: VecDeque::with_capacity(max_hits.min(1024)),
            retention_ms,
            max_hits: max_hits.max(1),
            snapshot: None,
        }
    }

    pub fn extend(&mut self, hits: impl IntoIterator<Item = Hit>) {
        let mut added = false;
        for hit in hits {
            self.hits.push_back(hit);
            added = true;
        }
        while self.hits.len() > self.max_hits {
            self.hits.pop_front();
        }
        if added {
            self.snapshot = None;
        }
    }

    /// Drop hits older than the retention window.
    pub fn prune(&mut self, now_ms: i64) {
        let cutoff = now_ms - self.retention_ms;
        let before = self.hits.len();
        self.hits.retain(|hit| hit.time >= cutoff);
        if self.hits.len() != before {
            self.snapshot = None;
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Current contents as a shared snapshot. Reused until the log changes.
    pub fn snapshot(&mut self) -> HitSnapshot {
        if let Some(snapshot) = &self.snapshot {
            return Rc::clone(snapshot);
        }
        let snapshot: HitSnapshot = self.hits.iter().cloned().collect();
        self.snapshot = Some(Rc::clone(&snapshot));
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_parses_camel_case_site_id() {
        let hit: Hit =
            serde_json::from_str(r#"{"siteId":"web","lat":1.5,"lon":-2.0,"time":10}"#).unwrap();
        assert_eq!(hit, Hit::new("web", 1.5, -2.0, 10));
    }

    #[test]
    fn log_caps_count_dropping_oldest() {
        let mut log = HitLog::new(60_000, 2);
        log.extend((0..3).map(|i| Hit::new("web", 0.0, 0.0, i)));
        let snap = log.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0].time, 1);
        assert_eq!(snap[1].time, 2);
    }

    #[test]
    fn prune_drops_expired_hits() {
        let mut log = HitLog::new(1_000, 10);
        log.extend([Hit::new("a", 0.0, 0.0, 0), Hit::new("b", 0.0, 0.0, 1_500)]);
        log.prune(2_000);
        assert_eq!(log.len(), 1);
        assert_eq!(log.snapshot()[0].site_id, "b");
    }

    #[test]
    fn snapshot_is_frozen_against_later_writes() {
        let mut log = HitLog::new(60_000, 10);
        log.extend([Hit::new("a", 0.0, 0.0, 0)]);
        let first = log.snapshot();
        log.extend([Hit::new("b", 0.0, 0.0, 1)]);
        assert_eq!(first.len(), 1);
        assert_eq!(log.snapshot().len(), 2);
    }

    #[test]
    fn snapshot_reused_while_unchanged() {
        let mut log = HitLog::new(60_000, 10);
        log.extend([Hit::new("a", 0.0, 0.0, 0)]);
        let a = log.snapshot();
        let b = log.snapshot();
        assert!(Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn full_log_still_refreshes_snapshot() {
        let mut log = HitLog::new(60_000, 1);
        log.extend([Hit::new("a", 0.0, 0.0, 0)]);
        let _ = log.snapshot();
        log.extend([Hit::new("b", 0.0, 0.0, 1)]);
        assert_eq!(log.snapshot()[0].site_id, "b");
    }
}
