use image::Rgba;
use serde::Deserialize;

/// Pin/ring colours, handed out to sites in configuration order
const SITE_PALETTE: [(u8, u8, u8); 10] = [
    (255, 196, 0),   // Amber
    (0, 200, 255),   // Cyan
    (255, 64, 129),  // Pink
    (118, 255, 3),   // Lime
    (255, 110, 64),  // Orange
    (179, 136, 255), // Lavender
    (29, 233, 182),  // Teal
    (255, 235, 59),  // Yellow
    (240, 98, 146),  // Rose
    (100, 181, 246), // Sky
];

/// Colour for the site with the given key; wraps past the palette size
pub fn site_color(key: usize) -> Rgba<u8> {
    let (r, g, b) = SITE_PALETTE[key % SITE_PALETTE.len()];
    Rgba([r, g, b, 255])
}

/// Colour theme for the generated world map
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapTheme {
    #[default]
    Night,
    Ocean,
    Mono,
}

impl MapTheme {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "night" | "dark" => Some(MapTheme::Night),
            "ocean" | "blue" => Some(MapTheme::Ocean),
            "mono" | "grey" | "gray" => Some(MapTheme::Mono),
            _ => None,
        }
    }

    pub fn sea(&self) -> Rgba<u8> {
        match self {
            MapTheme::Night => Rgba([8, 12, 24, 255]),
            MapTheme::Ocean => Rgba([16, 48, 96, 255]),
            MapTheme::Mono => Rgba([0, 0, 0, 255]),
        }
    }

    pub fn land(&self) -> Rgba<u8> {
        match self {
            MapTheme::Night => Rgba([36, 52, 60, 255]),
            MapTheme::Ocean => Rgba([70, 120, 70, 255]),
            MapTheme::Mono => Rgba([90, 90, 90, 255]),
        }
    }

    pub fn grid(&self) -> Rgba<u8> {
        match self {
            MapTheme::Night => Rgba([18, 26, 44, 255]),
            MapTheme::Ocean => Rgba([28, 66, 120, 255]),
            MapTheme::Mono => Rgba([30, 30, 30, 255]),
        }
    }

    /// Text colour for the map label
    pub fn label(&self) -> Rgba<u8> {
        match self {
            MapTheme::Night => Rgba([160, 190, 200, 255]),
            MapTheme::Ocean => Rgba([230, 240, 255, 255]),
            MapTheme::Mono => Rgba([200, 200, 200, 255]),
        }
    }
}
