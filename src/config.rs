use crate::colors::MapTheme;
use crate::settings::Settings;
use std::path::PathBuf;

/// Where live hits come from
#[derive(Clone, Debug, PartialEq)]
pub enum FeedSource {
    /// Random hits at well-known cities
    Demo,
    /// Geolocated network connections, demo if no GeoIP database
    Connections,
    /// JSON hit objects appended to a file
    JsonLines(PathBuf),
}

/// Configuration for the live map
#[derive(Clone, Debug)]
pub struct AirTrafficConfig {
    pub time_step: f32,
    pub map: Option<PathBuf>,
    pub geoip_db: Option<PathBuf>,
    pub feed: FeedSource,
    pub label_height: f32,
    pub show_fps: bool,
    pub theme: MapTheme,
    pub seed: Option<u64>,
    pub sites: Vec<String>,
    pub retention_ms: i64,
    pub max_hits: usize,
    pub pin_size: u32,
    pub ring_size: u32,
}

impl AirTrafficConfig {
    /// Config from settings alone; CLI flags are applied on top by the caller
    pub fn from_settings(settings: Settings) -> Self {
        Self {
            time_step: 0.03,
            map: settings.map,
            geoip_db: settings.geoip_db,
            feed: FeedSource::Connections,
            label_height: settings.label_height,
            show_fps: settings.show_fps,
            theme: settings.theme,
            seed: None,
            sites: settings.sites,
            retention_ms: settings.retention_secs.saturating_mul(1000).min(i64::MAX as u64) as i64,
            max_hits: settings.max_hits,
            pin_size: settings.pin_size,
            ring_size: settings.ring_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_carry_over() {
        let config = AirTrafficConfig::from_settings(Settings::parse("retention_secs = 5\nmax_hits = 7"));
        assert_eq!(config.retention_ms, 5_000);
        assert_eq!(config.max_hits, 7);
        assert_eq!(config.feed, FeedSource::Connections);
    }
}
