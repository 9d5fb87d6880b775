//! Logging setup for spacemap binaries.
//!
//! Everything goes to stderr so stdout stays free for command output. When a
//! log directory is given, the same events are also appended to
//! `<dir>/<app>.log`, rotated by size.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "spacemap=info,spacemap_schema=info,spacemap_store=warn";
const VERBOSE_LOG_FILTER: &str = "spacemap=debug,spacemap_schema=debug,spacemap_store=debug";
const KEEP_LOG_FILES: usize = 3;
const MAX_LOG_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Environment variable overriding the spacemap home directory.
pub const HOME_ENV: &str = "SPACEMAP_HOME";

pub struct LogConfig<'a> {
    pub app_name: &'a str,
    /// Debug-level console output regardless of `RUST_LOG`
    pub verbose: bool,
    /// Also write to a rotating file in this directory
    pub log_dir: Option<PathBuf>,
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let base_filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };
    let console_filter = if config.verbose {
        EnvFilter::new(VERBOSE_LOG_FILTER)
    } else {
        base_filter()
    };

    let file_layer = match &config.log_dir {
        Some(dir) => {
            let writer = SharedLog::open(dir, config.app_name)
                .with_context(|| format!("Failed to open log file in {}", dir.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_filter(base_filter()),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_filter(console_filter),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

/// Home directory: `$SPACEMAP_HOME`, else `~/.spacemap`.
pub fn spacemap_home() -> PathBuf {
    home_from(std::env::var_os(HOME_ENV), dirs::home_dir())
}

fn home_from(override_path: Option<OsString>, user_home: Option<PathBuf>) -> PathBuf {
    match override_path.filter(|p| !p.is_empty()) {
        Some(path) => PathBuf::from(path),
        // no resolvable home: keep state next to the working directory
        None => user_home.unwrap_or_else(|| PathBuf::from(".")).join(".spacemap"),
    }
}

pub fn logs_dir() -> PathBuf {
    spacemap_home().join("logs")
}

/// Size-capped log file keeping `keep` rotated generations
/// (`app.log.1` is the most recent).
struct LogFile {
    dir: PathBuf,
    stem: String,
    keep: usize,
    limit: u64,
    file: Option<File>,
    written: u64,
}

impl LogFile {
    fn open(dir: &Path, app_name: &str, keep: usize, limit: u64) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let mut log = Self {
            dir: dir.to_path_buf(),
            stem: sanitize_name(app_name),
            keep,
            limit,
            file: None,
            written: 0,
        };
        log.reopen()?;
        if log.written > log.limit {
            log.rotate()?;
        }
        Ok(log)
    }

    fn path(&self, generation: usize) -> PathBuf {
        match generation {
            0 => self.dir.join(format!("{}.log", self.stem)),
            n => self.dir.join(format!("{}.log.{}", self.stem, n)),
        }
    }

    fn reopen(&mut self) -> io::Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path(0))?;
        self.written = file.metadata()?.len();
        self.file = Some(file);
        Ok(())
    }

    fn rotate(&mut self) -> io::Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
        }

        if self.keep == 0 {
            fs::remove_file(self.path(0))?;
            return self.reopen();
        }

        let oldest = self.path(self.keep);
        if oldest.exists() {
            fs::remove_file(oldest)?;
        }
        for generation in (0..self.keep).rev() {
            let src = self.path(generation);
            if src.exists() {
                fs::rename(src, self.path(generation + 1))?;
            }
        }
        self.reopen()
    }
}

impl Write for LogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.limit {
            self.rotate()?;
        }
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| io::Error::other("log file unavailable"))?;
        let n = file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

/// `MakeWriter` handing every event the same locked [`LogFile`].
#[derive(Clone)]
struct SharedLog(Arc<Mutex<LogFile>>);

impl SharedLog {
    fn open(dir: &Path, app_name: &str) -> io::Result<Self> {
        let log = LogFile::open(dir, app_name, KEEP_LOG_FILES, MAX_LOG_FILE_SIZE)?;
        Ok(Self(Arc::new(Mutex::new(log))))
    }

    fn with_log<T>(&self, f: impl FnOnce(&mut LogFile) -> io::Result<T>) -> io::Result<T> {
        let mut log = self
            .0
            .lock()
            .map_err(|_| io::Error::other("log writer lock poisoned"))?;
        f(&mut log)
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SharedLog {
    type Writer = SharedLog;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

impl Write for SharedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.with_log(|log| log.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.with_log(|log| log.flush())
    }
}

fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' { ch } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "spacemap".to_string()
    } else {
        cleaned
    }
}
