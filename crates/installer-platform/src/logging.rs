#[cfg(debug_assertions)]
use simplelog::{ColorChoice, TermLogger, TerminalMode};
use simplelog::{CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, WriteLogger};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::AppPaths;

/// Log sink that reopens its file if something removed it underneath us,
/// e.g. a logrotate run on a long-lived controller host.
struct ReopeningLogFile {
    path: PathBuf,
    file: File,
}

impl ReopeningLogFile {
    fn open(path: PathBuf) -> io::Result<Self> {
        let file = Self::append_to(&path)?;
        Ok(Self { path, file })
    }

    fn append_to(path: &Path) -> io::Result<File> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        OpenOptions::new().create(true).append(true).open(path)
    }
}

impl Write for ReopeningLogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.path.exists() {
            self.file = Self::append_to(&self.path)?;
        }
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn truncate_to_recent_half(log_path: &Path, max_log_size: u64) {
    let Ok(metadata) = std::fs::metadata(log_path) else {
        return;
    };
    if metadata.len() <= max_log_size {
        return;
    }
    let Ok(contents) = std::fs::read(log_path) else {
        return;
    };

    let half = contents.len() / 2;
    let keep_from = contents[half..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(half, |pos| half + pos + 1);
    let _ = std::fs::write(log_path, &contents[keep_from..]);
}

/// Install the global logger: a file logger under `paths`, plus a terminal
/// logger in debug builds. Only records from the installer crates pass the
/// filter. Returns the log file in use, if it could be opened.
///
/// Calling this twice is harmless; the second registration is ignored.
pub fn init_logging(paths: &AppPaths, debug_enabled: bool, max_log_size: u64) -> Option<PathBuf> {
    let _ = paths.ensure_dirs();
    let log_path = paths.log_file();
    truncate_to_recent_half(&log_path, max_log_size);

    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .add_filter_allow_str("installer")
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();

    #[cfg(debug_assertions)]
    loggers.push(TermLogger::new(
        LevelFilter::Debug,
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ));

    let opened = match ReopeningLogFile::open(log_path.clone()) {
        Ok(writer) => {
            loggers.push(WriteLogger::new(LevelFilter::Debug, config, writer));
            Some(log_path)
        }
        Err(_) => None,
    };

    if !loggers.is_empty() {
        let _ = CombinedLogger::init(loggers);
    }
    set_logging_enabled(debug_enabled);

    if let Some(path) = &opened {
        log::info!("Logging to {}", path.display());
    }
    opened
}

/// Debug logging is opt-in; when disabled only warnings and errors are kept.
pub fn set_logging_enabled(enabled: bool) {
    if enabled {
        log::set_max_level(log::LevelFilter::Debug);
    } else {
        log::set_max_level(log::LevelFilter::Warn);
    }
}
