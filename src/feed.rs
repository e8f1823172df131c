//! Hit producers polled by the live loop

use crate::geo_data::CITIES;
use crate::hit::Hit;
use rand::prelude::*;
use serde::Deserialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Sites the demo feed reports hits for
pub const DEMO_SITES: [&str; 4] = ["web", "api", "docs", "shop"];

/// Max distance (degrees) demo hits are scattered from their city
const DEMO_JITTER_DEG: f64 = 1.5;

/// Something that produces new hits over time
pub trait HitFeed {
    /// Hits that arrived since the last poll
    fn poll(&mut self, now_ms: i64) -> Vec<Hit>;
}

/// Random hits around well-known cities
pub struct DemoFeed {
    rng: StdRng,
    probability: f64,
}

impl DemoFeed {
    /// `probability` is the chance of a hit on each poll
    pub fn new(rng: StdRng, probability: f64) -> Self {
        Self {
            rng,
            probability: probability.clamp(0.0, 1.0),
        }
    }

    /// Unconditionally produce one hit
    pub fn next_hit(&mut self, now_ms: i64) -> Hit {
        let (_, lat, lon) = CITIES[self.rng.gen_range(0..CITIES.len())];
        let site = DEMO_SITES[self.rng.gen_range(0..DEMO_SITES.len())];
        let lat = lat + self.rng.gen_range(-DEMO_JITTER_DEG..DEMO_JITTER_DEG);
        let lon = lon + self.rng.gen_range(-DEMO_JITTER_DEG..DEMO_JITTER_DEG);
        Hit::new(site, lat, lon, now_ms)
    }
}

impl HitFeed for DemoFeed {
    fn poll(&mut self, now_ms: i64) -> Vec<Hit> {
        if self.rng.gen_bool(self.probability) {
            vec![self.next_hit(now_ms)]
        } else {
            Vec::new()
        }
    }
}

/// One line of a JSON hit feed; `time` defaults to arrival time
#[derive(Deserialize)]
struct FeedRecord {
    #[serde(alias = "siteId")]
    site_id: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    time: Option<i64>,
}

/// Follows a file of JSON hits, one object per line, like `tail -f`
pub struct JsonLinesFeed<R: BufRead> {
    reader: R,
    partial: String,
}

impl JsonLinesFeed<BufReader<File>> {
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        tracing::info!(path = %path.display(), "following hit feed");
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> JsonLinesFeed<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            partial: String::new(),
        }
    }

    fn parse(line: &str, now_ms: i64) -> Option<Hit> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        match serde_json::from_str::<FeedRecord>(line) {
            Ok(rec) => Some(Hit::new(rec.site_id, rec.lat, rec.lon, rec.time.unwrap_or(now_ms))),
            Err(err) => {
                tracing::warn!(error = %err, "skipping malformed feed line");
                None
            }
        }
    }
}

impl<R: BufRead> HitFeed for JsonLinesFeed<R> {
    fn poll(&mut self, now_ms: i64) -> Vec<Hit> {
        let mut hits = Vec::new();
        loop {
            match self.reader.read_line(&mut self.partial) {
                Ok(0) => break,
                Ok(_) => {
                    // Writer may be mid-line; finish it on a later poll
                    if !self.partial.ends_with('\n') {
                        break;
                    }
                    hits.extend(Self::parse(&self.partial, now_ms));
                    self.partial.clear();
                }
                Err(err) => {
                    tracing::warn!(error = %err, "hit feed read failed");
                    self.partial.clear();
                    break;
                }
            }
        }
        hits
    }
}
