use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// With a log file, everything goes there (the full-screen view owns the
/// terminal). Without one, only non-interactive commands should log, to
/// stderr. `RUST_LOG` overrides `default_filter`.
pub fn init(log_file: Option<&Path>, default_filter: &str) -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(io::Error::other)
        }
        None => builder
            .with_writer(io::stderr)
            .try_init()
            .map_err(io::Error::other),
    }
}
