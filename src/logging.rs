//! Log setup. The terminal belongs to the TUI, so records go to a file.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;

use env_logger::{Builder, Env, Target};

/// Send `log` records to `path`. `RUST_LOG` wins over `level`.
pub fn init(level: &str, path: &Path) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let mut builder = Builder::from_env(Env::default().default_filter_or(level));
    builder
        .format_timestamp_millis()
        // Chatty at debug level and not ours.
        .filter_module("zbus", log::LevelFilter::Warn)
        .filter_module("symphonia", log::LevelFilter::Warn)
        .filter_module("rustls", log::LevelFilter::Warn)
        .target(Target::Pipe(Box::new(file)));

    // A logger may already be installed (tests); keep it.
    let _ = builder.try_init();
    Ok(())
}
