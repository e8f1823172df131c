use crate::colors::MapTheme;
use crate::feed::DEMO_SITES;
use crate::net_geo::{SITE_TCP_IN, SITE_TCP_OUT, SITE_UDP};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub map: Option<PathBuf>,        // Pre-rendered map image; built-in map if unset
    pub geoip_db: Option<PathBuf>,   // Path to GeoLite2-City.mmdb database
    pub label_height: f32,           // Label text height in map pixels (0 = no label)
    pub show_fps: bool,
    pub theme: MapTheme,
    pub sites: Vec<String>,          // Known sites; position = colour key
    pub retention_secs: u64,
    pub max_hits: usize,
    pub pin_size: u32,
    pub ring_size: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            map: None,
            geoip_db: None,
            label_height: 2.0,
            show_fps: false,
            theme: MapTheme::default(),
            sites: default_sites(),
            retention_secs: 30,
            max_hits: 200,
            pin_size: 4,
            ring_size: 18,
        }
    }
}

fn default_sites() -> Vec<String> {
    DEMO_SITES
        .iter()
        .chain([SITE_TCP_OUT, SITE_TCP_IN, SITE_UDP].iter())
        .map(|s| s.to_string())
        .collect()
}

impl Settings {
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "cannot read settings, using defaults");
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Self {
        toml::from_str(content).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "invalid settings, using defaults");
            Self::default()
        })
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("airtraffic")
            .join("config.toml")
    }
}
