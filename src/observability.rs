//! Observer hooks for pipeline events.
//!
//! An [`crate::pipeline::EncodingPipeline`] reports what it does to an optional
//! [`EncodingObserver`]. Implementors can record metrics, write logs, or raise alerts.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::encoder::EncoderKind;

/// Severity classification attached to events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EncodingSeverity {
    /// Informational event.
    Info,
    /// Non-fatal condition worth surfacing (e.g. fallback codes were used).
    Warning,
    /// The operation failed.
    Error,
}

/// Events emitted by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodingEvent {
    SelectionResolved {
        selected: usize,
        encodable: usize,
    },
    FitStarted {
        encoder: EncoderKind,
        rows: usize,
    },
    /// `categories` never occur in `column` of the fitting data and carry the fallback code.
    FallbackApplied {
        column: usize,
        categories: Vec<usize>,
        fallback: f64,
    },
    FitFinished {
        columns: usize,
        fallback: f64,
        elapsed: Duration,
    },
    TransformFinished {
        rows: usize,
        refit: bool,
        elapsed: Duration,
    },
    Failed {
        message: String,
    },
}

impl EncodingEvent {
    /// Severity of this event.
    pub fn severity(&self) -> EncodingSeverity {
        match self {
            Self::FallbackApplied { .. } => EncodingSeverity::Warning,
            Self::Failed { .. } => EncodingSeverity::Error,
            _ => EncodingSeverity::Info,
        }
    }
}

impl fmt::Display for EncodingEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelectionResolved { selected, encodable } => {
                write!(f, "selection selected={selected} encodable={encodable}")
            }
            Self::FitStarted { encoder, rows } => write!(f, "fit started encoder={encoder} rows={rows}"),
            Self::FallbackApplied {
                column,
                categories,
                fallback,
            } => write!(
                f,
                "fallback column={column} categories={categories:?} code={fallback}"
            ),
            Self::FitFinished {
                columns,
                fallback,
                elapsed,
            } => write!(
                f,
                "fit finished columns={columns} fallback={fallback} elapsed={elapsed:?}"
            ),
            Self::TransformFinished { rows, refit, elapsed } => write!(
                f,
                "transform finished rows={rows} refit={refit} elapsed={elapsed:?}"
            ),
            Self::Failed { message } => write!(f, "failed err={message}"),
        }
    }
}

/// Observer hook for pipeline events.
pub trait EncodingObserver: Send + Sync {
    fn on_event(&self, event: &EncodingEvent);
}

/// An observer that fans out events to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn EncodingObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn EncodingObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl EncodingObserver for CompositeObserver {
    fn on_event(&self, event: &EncodingEvent) {
        for o in &self.observers {
            o.on_event(event);
        }
    }
}

/// Logs events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl EncodingObserver for StdErrObserver {
    fn on_event(&self, event: &EncodingEvent) {
        eprintln!("[encode][{:?}] {event}", event.severity());
    }
}

/// Appends events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl EncodingObserver for FileObserver {
    fn on_event(&self, event: &EncodingEvent) {
        self.append_line(&format!("{} {:?} {event}", unix_ts(), event.severity()));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
