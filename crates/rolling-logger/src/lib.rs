//! Rolling File Logger
//!
//! Installs a `tracing` subscriber that writes to a size-rotated set of log
//! files and keeps the most recent lines in an in-memory circular buffer.
//!
//! Files are named `{app}.log`, `{app}.1.log` ... `{app}.{max_files}.log`;
//! `{app}.log` is always the live file.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use tracing::Level;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::MakeWriter;

/// Writer installed by [`init_logger`], kept for [`recent_lines`].
static GLOBAL_WRITER: OnceLock<RollingWriter> = OnceLock::new();

/// Logger tuning knobs
#[derive(Debug, Clone)]
pub struct LoggerOptions {
    /// Rotate once the live file would grow past this size
    pub max_bytes: u64,
    /// Number of rotated files kept next to the live one
    pub max_files: usize,
    /// Lines kept in the in-memory circular buffer
    pub recent_capacity: usize,
    /// Most verbose level written
    pub level: Level,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            max_bytes: 1024 * 1024,
            max_files: 3,
            recent_capacity: 200,
            level: Level::INFO,
        }
    }
}

/// Local wall-clock timestamps, e.g. `2024-05-01 13:45:12.034`
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

struct RollingFile {
    dir: PathBuf,
    app_name: String,
    max_bytes: u64,
    max_files: usize,
    file: File,
    written: u64,
    recent: VecDeque<String>,
    recent_capacity: usize,
}

impl RollingFile {
    fn live_path(&self) -> PathBuf {
        self.dir.join(format!("{}.log", self.app_name))
    }

    fn rotated_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}.{}.log", self.app_name, index))
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        if self.max_files == 0 {
            self.file = File::create(self.live_path())?;
            self.written = 0;
            return Ok(());
        }

        let oldest = self.rotated_path(self.max_files);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for index in (1..self.max_files).rev() {
            let from = self.rotated_path(index);
            if from.exists() {
                fs::rename(&from, self.rotated_path(index + 1))?;
            }
        }
        fs::rename(self.live_path(), self.rotated_path(1))?;

        self.file = File::create(self.live_path())?;
        self.written = 0;
        Ok(())
    }

    fn remember(&mut self, buf: &[u8]) {
        if self.recent_capacity == 0 {
            return;
        }
        for line in String::from_utf8_lossy(buf).lines() {
            if line.is_empty() {
                continue;
            }
            if self.recent.len() == self.recent_capacity {
                self.recent.pop_front();
            }
            self.recent.push_back(line.to_string());
        }
    }
}

/// Cloneable handle to a rotating log file; usable as a `MakeWriter`.
#[derive(Clone)]
pub struct RollingWriter {
    inner: Arc<Mutex<RollingFile>>,
}

impl RollingWriter {
    /// Open (or append to) `{dir}/{app_name}.log`, creating `dir` if needed.
    pub fn new(dir: impl AsRef<Path>, app_name: &str, options: &LoggerOptions) -> io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let live = dir.join(format!("{}.log", app_name));
        let file = OpenOptions::new().create(true).append(true).open(&live)?;
        let written = file.metadata()?.len();

        Ok(Self {
            inner: Arc::new(Mutex::new(RollingFile {
                dir,
                app_name: app_name.to_string(),
                max_bytes: options.max_bytes,
                max_files: options.max_files,
                file,
                written,
                recent: VecDeque::with_capacity(options.recent_capacity),
                recent_capacity: options.recent_capacity,
            })),
        })
    }

    /// Most recent lines, oldest first
    pub fn recent_lines(&self) -> Vec<String> {
        self.lock().recent.iter().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, RollingFile> {
        // A panic mid-write leaves the file usable.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Write for RollingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut file = self.lock();
        if file.written > 0 && file.written + buf.len() as u64 > file.max_bytes {
            file.rotate()?;
        }
        let n = file.file.write(buf)?;
        file.written += n as u64;
        file.remember(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock().file.flush()
    }
}

impl<'a> MakeWriter<'a> for RollingWriter {
    type Writer = RollingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Install the global subscriber.
///
/// Fails if the log directory cannot be created or a global subscriber is
/// already set.
pub fn init_logger(
    log_dir: impl AsRef<Path>,
    app_name: &str,
    options: LoggerOptions,
) -> io::Result<()> {
    let writer = RollingWriter::new(log_dir, app_name, &options)?;

    tracing_subscriber::fmt()
        .with_writer(writer.clone())
        .with_ansi(false)
        .with_timer(LocalTimer)
        .with_max_level(options.level)
        .try_init()
        .map_err(|e| io::Error::other(e.to_string()))?;

    let _ = GLOBAL_WRITER.set(writer);
    Ok(())
}

/// Install a stderr-only subscriber, for runs without a log directory.
pub fn init_stderr_logger(level: Level) -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_timer(LocalTimer)
        .with_max_level(level)
        .try_init()
        .map_err(|e| io::Error::other(e.to_string()))
}

/// Lines recently written by the global logger; empty before [`init_logger`].
pub fn recent_lines() -> Vec<String> {
    GLOBAL_WRITER
        .get()
        .map(RollingWriter::recent_lines)
        .unwrap_or_default()
}

// Plain-string shorthands for callers that don't need structured fields

pub fn info(message: &str) {
    tracing::info!("{}", message);
}

pub fn warn(message: &str) {
    tracing::warn!("{}", message);
}

pub fn error(message: &str) {
    tracing::error!("{}", message);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_options() -> LoggerOptions {
        LoggerOptions {
            max_bytes: 64,
            max_files: 2,
            recent_capacity: 3,
            level: Level::DEBUG,
        }
    }

    #[test]
    fn test_rotation_keeps_bounded_file_set() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = RollingWriter::new(dir.path(), "test", &small_options()).unwrap();

        for i in 0..20 {
            writer.write_all(format!("line number {:04}\n", i).as_bytes()).unwrap();
        }
        writer.flush().unwrap();

        assert!(dir.path().join("test.log").exists());
        assert!(dir.path().join("test.1.log").exists());
        assert!(dir.path().join("test.2.log").exists());
        assert!(!dir.path().join("test.3.log").exists());

        let live = fs::read_to_string(dir.path().join("test.log")).unwrap();
        assert!(live.len() as u64 <= 64);
        assert!(live.contains("line number 0019"));
    }

    #[test]
    fn test_recent_lines_is_circular() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = RollingWriter::new(dir.path(), "ring", &small_options()).unwrap();

        for i in 0..5 {
            writer.write_all(format!("entry {}\n", i).as_bytes()).unwrap();
        }

        assert_eq!(writer.recent_lines(), vec!["entry 2", "entry 3", "entry 4"]);
    }

    #[test]
    fn test_string_helpers_reach_writer() {
        let dir = tempfile::tempdir().unwrap();
        let writer = RollingWriter::new(dir.path(), "helpers", &LoggerOptions::default()).unwrap();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(writer.clone())
            .with_ansi(false)
            .with_max_level(Level::INFO)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            info("list loaded");
            warn("stats stale");
            error("backend down");
        });

        let lines = writer.recent_lines();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("INFO") && lines[0].ends_with("list loaded"));
        assert!(lines[1].contains("WARN") && lines[1].ends_with("stats stale"));
        assert!(lines[2].contains("ERROR") && lines[2].ends_with("backend down"));
    }

    #[test]
    fn test_reopen_appends_to_live_file() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut writer = RollingWriter::new(dir.path(), "app", &LoggerOptions::default()).unwrap();
            writer.write_all(b"first\n").unwrap();
        }
        let mut writer = RollingWriter::new(dir.path(), "app", &LoggerOptions::default()).unwrap();
        writer.write_all(b"second\n").unwrap();

        let live = fs::read_to_string(dir.path().join("app.log")).unwrap();
        assert_eq!(live, "first\nsecond\n");
    }
}
