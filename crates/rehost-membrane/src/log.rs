//! Structured JSONL logging.
//!
//! Provides:
//! - [`LogEntry`]: one JSONL record with required + optional fields.
//! - [`LogEmitter`]: writes records to a file, stderr or a shared buffer.
//! - [`emit`]: the runtime's global sink, gated by [`crate::config::log_threshold`].
//!
//! Runtime entry points that touch the environment (files, paths, sockets)
//! report through [`emit`]; the harness uses [`LogEmitter`] directly.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config;

// ---------------------------------------------------------------------------
// Log entry
// ---------------------------------------------------------------------------

/// Severity level. Ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    /// Parse a level name (case-insensitive). `None` for unknown names.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            "fatal" => Some(Self::Fatal),
            _ => None,
        }
    }
}

/// Verification outcome, used by harness records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Pass,
    Fail,
    Skip,
    Error,
}

/// Canonical structured log entry.
///
/// Required fields: `timestamp`, `trace_id`, `level`, `event`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    // Required
    pub timestamp: String,
    pub trace_id: String,
    pub level: LogLevel,
    pub event: String,

    // Optional
    /// Emulated header family (`stdio`, `unistd`, `socket`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errno: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ns: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl LogEntry {
    /// Create a new log entry with required fields only.
    #[must_use]
    pub fn new(trace_id: impl Into<String>, level: LogLevel, event: impl Into<String>) -> Self {
        Self {
            timestamp: now_utc(),
            trace_id: trace_id.into(),
            level,
            event: event.into(),
            api_family: None,
            symbol: None,
            errno: None,
            outcome: None,
            latency_ns: None,
            details: None,
        }
    }

    #[must_use]
    pub fn with_api(mut self, api_family: impl Into<String>, symbol: impl Into<String>) -> Self {
        self.api_family = Some(api_family.into());
        self.symbol = Some(symbol.into());
        self
    }

    #[must_use]
    pub fn with_errno(mut self, errno: i32) -> Self {
        self.errno = Some(errno);
        self
    }

    #[must_use]
    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    #[must_use]
    pub fn with_latency_ns(mut self, ns: u64) -> Self {
        self.latency_ns = Some(ns);
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Serialize to a single JSONL line (no trailing newline).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// A cloneable in-memory sink, readable after the emitter is done with it.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, as text.
    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }

    /// Parsed JSONL records written so far. Unparseable lines are skipped.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.contents()
            .lines()
            .filter_map(|l| serde_json::from_str(l).ok())
            .collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// JSONL writer with sequential trace ids.
pub struct LogEmitter {
    writer: Box<dyn Write + Send>,
    seq: u64,
    run_id: String,
}

impl LogEmitter {
    /// Create an emitter that writes to a file.
    pub fn to_file(path: &Path, run_id: &str) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::to_writer(std::io::BufWriter::new(file), run_id))
    }

    /// Create an emitter that writes to stderr.
    #[must_use]
    pub fn to_stderr(run_id: &str) -> Self {
        Self::to_writer(std::io::stderr(), run_id)
    }

    /// Create an emitter that writes into `buf`.
    #[must_use]
    pub fn to_buffer(buf: SharedBuffer, run_id: &str) -> Self {
        Self::to_writer(buf, run_id)
    }

    fn to_writer(writer: impl Write + Send + 'static, run_id: &str) -> Self {
        Self {
            writer: Box::new(writer),
            seq: 0,
            run_id: run_id.to_string(),
        }
    }

    /// Generate the next trace ID.
    fn next_trace_id(&mut self) -> String {
        self.seq += 1;
        format!("rehost::{}::{:06}", self.run_id, self.seq)
    }

    /// Emit an entry with an auto-generated trace id.
    pub fn emit(&mut self, level: LogLevel, event: &str) -> std::io::Result<LogEntry> {
        let trace_id = self.next_trace_id();
        let entry = LogEntry::new(trace_id, level, event);
        let line = serde_json::to_string(&entry).map_err(std::io::Error::other)?;
        writeln!(self.writer, "{line}")?;
        Ok(entry)
    }

    /// Emit a fully-populated entry. An empty trace id is filled in.
    pub fn emit_entry(&mut self, mut entry: LogEntry) -> std::io::Result<()> {
        if entry.trace_id.is_empty() {
            entry.trace_id = self.next_trace_id();
        }
        let line = serde_json::to_string(&entry).map_err(std::io::Error::other)?;
        writeln!(self.writer, "{line}")
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

// ---------------------------------------------------------------------------
// Runtime sink
// ---------------------------------------------------------------------------

static RUNTIME_EMITTER: Mutex<Option<LogEmitter>> = Mutex::new(None);
static DROPPED: AtomicU64 = AtomicU64::new(0);

/// Whether an entry at `level` would be written.
#[must_use]
pub fn enabled(level: LogLevel) -> bool {
    config::log_threshold().is_some_and(|t| level >= t)
}

/// Replace the runtime sink. The previous emitter, if any, is returned.
pub fn install(emitter: LogEmitter) -> Option<LogEmitter> {
    RUNTIME_EMITTER.lock().replace(emitter)
}

/// Write `entry` to the runtime sink if its level passes the threshold.
///
/// The sink is opened lazily from configuration. Write failures are
/// counted, never propagated into the emulated program.
pub fn emit(entry: LogEntry) {
    if !enabled(entry.level) {
        return;
    }
    let mut guard = RUNTIME_EMITTER.lock();
    let emitter = guard.get_or_insert_with(default_emitter);
    if emitter.emit_entry(entry).is_err() {
        DROPPED.fetch_add(1, Ordering::Relaxed);
    }
}

/// Log an event for one emulated call.
pub fn event(level: LogLevel, api_family: &str, symbol: &str, details: serde_json::Value) {
    if !enabled(level) {
        return;
    }
    emit(LogEntry::new("", level, "call").with_api(api_family, symbol).with_details(details));
}

/// Records lost to sink write failures.
#[must_use]
pub fn dropped_records() -> u64 {
    DROPPED.load(Ordering::Relaxed)
}

fn default_emitter() -> LogEmitter {
    let run_id = std::process::id().to_string();
    config::log_file()
        .and_then(|path| LogEmitter::to_file(path, &run_id).ok())
        .unwrap_or_else(|| LogEmitter::to_stderr(&run_id))
}

fn now_utc() -> String {
    let duration = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    let secs = duration.as_secs();
    let (year, month, day) = civil_from_days((secs / 86_400) as i64);
    format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}.{:03}Z",
        (secs % 86_400) / 3600,
        (secs % 3600) / 60,
        secs % 60,
        duration.subsec_millis(),
    )
}

/// Days since 1970-01-01 to a proleptic Gregorian date.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_entry_serializes_required_fields() {
        let entry = LogEntry::new("rehost::t::000001", LogLevel::Info, "call");
        let json = entry.to_jsonl().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed["timestamp"].is_string());
        assert_eq!(parsed["trace_id"], "rehost::t::000001");
        assert_eq!(parsed["level"], "info");
        assert_eq!(parsed["event"], "call");
        assert!(parsed.get("symbol").is_none());
        assert!(parsed.get("errno").is_none());
    }

    #[test]
    fn builders_fill_optional_fields() {
        let entry = LogEntry::new("t", LogLevel::Warn, "call")
            .with_api("unistd", "chdir")
            .with_errno(2)
            .with_details(serde_json::json!({"path": "/nope"}));
        let parsed: serde_json::Value = serde_json::from_str(&entry.to_jsonl().unwrap()).unwrap();
        assert_eq!(parsed["api_family"], "unistd");
        assert_eq!(parsed["symbol"], "chdir");
        assert_eq!(parsed["errno"], 2);
        assert_eq!(parsed["details"]["path"], "/nope");
    }

    #[test]
    fn emitter_numbers_trace_ids() {
        let buf = SharedBuffer::new();
        let mut em = LogEmitter::to_buffer(buf.clone(), "run");
        em.emit(LogLevel::Info, "a").unwrap();
        em.emit_entry(LogEntry::new("", LogLevel::Debug, "b")).unwrap();
        let entries = buf.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].trace_id, "rehost::run::000001");
        assert_eq!(entries[1].trace_id, "rehost::run::000002");
        assert_eq!(entries[1].level, LogLevel::Debug);
    }

    #[test]
    fn levels_order_by_severity() {
        assert!(LogLevel::Error > LogLevel::Warn);
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert_eq!(LogLevel::from_str_loose("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_str_loose("loud"), None);
    }

    #[test]
    fn timestamps_use_calendar_dates() {
        assert_eq!(civil_from_days(0), (1970, 1, 1));
        assert_eq!(civil_from_days(11_017), (2000, 3, 1));
        assert_eq!(civil_from_days(19_723), (2024, 1, 1));
    }
}
