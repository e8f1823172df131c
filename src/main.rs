mod colors;
mod config;
mod decoration;
mod feed;
mod frame_clock;
mod framebuffer;
mod geo_data;
mod help;
mod hit;
mod live;
mod logging;
mod map;
mod net_geo;
mod projector;
mod renderer;
mod resources;
mod scheduler;
mod settings;
mod terminal;
mod view;

use clap::{Parser, Subcommand};
use colors::MapTheme;
use config::{AirTrafficConfig, FeedSource};
use map::{BUILTIN_MAP_HEIGHT, BUILTIN_MAP_WIDTH};
use projector::ViewportGeometry;
use settings::Settings;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "airtraffic")]
#[command(author = "Terminal Art Generator")]
#[command(version = "0.1.0")]
#[command(about = "Live world map of where your traffic comes from", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the animated live map
    Live {
        /// Frame interval in seconds
        #[arg(short, long, default_value = "0.03")]
        time: f32,

        /// Pre-rendered map image (equirectangular, Web Mercator rows)
        #[arg(short, long)]
        map: Option<PathBuf>,

        /// Path to GeoLite2-City.mmdb database
        #[arg(short, long)]
        geoip_db: Option<PathBuf>,

        /// Follow a file of JSON hits, one object per line
        #[arg(short, long)]
        feed: Option<PathBuf>,

        /// Show random demo traffic instead of local connections
        #[arg(short, long)]
        demo: bool,

        /// Label text height in map pixels (0 hides the label)
        #[arg(short = 'L', long)]
        label_height: Option<f32>,

        /// Show a status line with fps and hit count
        #[arg(long)]
        show_fps: bool,

        /// Map colour theme: night, ocean, mono
        #[arg(long)]
        theme: Option<String>,

        /// Random seed for reproducibility
        #[arg(short, long)]
        seed: Option<u64>,

        /// Write logs to this file
        #[arg(long)]
        log: Option<PathBuf>,
    },

    /// Print a single frame with demo hits to stdout
    Print {
        /// Width in columns
        #[arg(short = 'W', long, default_value = "100")]
        width: u16,

        /// Height in rows
        #[arg(short = 'H', long, default_value = "30")]
        height: u16,

        /// Random seed for reproducibility
        #[arg(short, long)]
        seed: Option<u64>,

        /// Number of demo hits to draw
        #[arg(short = 'n', long, default_value = "12")]
        hits: usize,

        /// Map colour theme: night, ocean, mono
        #[arg(long)]
        theme: Option<String>,
    },

    /// Project a coordinate to map pixels and print "x y"
    Project {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Width of the map image the constants refer to
        #[arg(long, default_value_t = BUILTIN_MAP_WIDTH)]
        map_width: u32,

        #[arg(long, default_value_t = BUILTIN_MAP_HEIGHT)]
        map_height: u32,

        /// Display width; defaults to the map width
        #[arg(long)]
        width: Option<u32>,

        /// Display height; defaults to the map height
        #[arg(long)]
        height: Option<u32>,
    },
}

fn parse_theme(name: Option<&str>, fallback: MapTheme) -> MapTheme {
    match name {
        Some(name) => MapTheme::parse(name).unwrap_or_else(|| {
            eprintln!("Unknown theme: {}. Available: night, ocean, mono", name);
            fallback
        }),
        None => fallback,
    }
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Live {
            time,
            map,
            geoip_db,
            feed,
            demo,
            label_height,
            show_fps,
            theme,
            seed,
            log,
        } => {
            // The live map owns the terminal; only log when given a file
            if let Some(path) = log.as_deref() {
                logging::init(Some(path), "airtraffic=info")?;
            }

            let mut config = AirTrafficConfig::from_settings(Settings::load());
            config.time_step = time;
            config.map = map.or(config.map);
            config.geoip_db = geoip_db.or(config.geoip_db);
            config.feed = match (feed, demo) {
                (Some(path), _) => FeedSource::JsonLines(path),
                (None, true) => FeedSource::Demo,
                (None, false) => FeedSource::Connections,
            };
            config.label_height = label_height.unwrap_or(config.label_height);
            config.show_fps |= show_fps;
            config.theme = parse_theme(theme.as_deref(), config.theme);
            config.seed = seed;
            live::run(&config)?;
        }
        Commands::Print {
            width,
            height,
            seed,
            hits,
            theme,
        } => {
            logging::init(None, "warn")?;
            let mut config = AirTrafficConfig::from_settings(Settings::load());
            config.seed = seed;
            config.theme = parse_theme(theme.as_deref(), config.theme);
            live::print(&config, width.max(1), height.max(1), hits)?;
        }
        Commands::Project {
            lat,
            lon,
            map_width,
            map_height,
            width,
            height,
        } => {
            logging::init(None, "warn")?;
            let geometry = ViewportGeometry::new(
                map_width,
                map_height,
                width.unwrap_or(map_width),
                height.unwrap_or(map_height),
            );
            let point = projector::project(lat, lon, &geometry);
            println!("{:.3} {:.3}", point.x, point.y);
        }
    }

    Ok(())
}
