//! Probe history recording.

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One recorded probe of one member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProbeRecord {
    pub group: String,
    pub proxy: String,
    /// Measured latency in milliseconds; `None` means unreachable.
    pub delay_ms: Option<u64>,
    pub tested_at: DateTime<Utc>,
}

impl ProbeRecord {
    pub fn new(group: &str, proxy: &str, delay_ms: Option<u64>) -> Self {
        Self {
            group: group.to_string(),
            proxy: proxy.to_string(),
            delay_ms,
            tested_at: Utc::now(),
        }
    }
}

/// Consumer of probe results.
///
/// Recording failures must never affect switching; implementations log and
/// swallow their own errors.
pub trait ProbeSink: Send + Sync {
    fn record_probes(&self, records: &[ProbeRecord]);

    /// Drop records older than the retention window.
    fn prune(&self, retention_days: u32);
}

/// Append-only JSONL file sink.
pub struct JsonlProbeSink {
    path: PathBuf,
    // Serializes append and prune against each other.
    file_lock: Mutex<()>,
}

impl JsonlProbeSink {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            file_lock: Mutex::new(()),
        }
    }
}

impl ProbeSink for JsonlProbeSink {
    fn record_probes(&self, records: &[ProbeRecord]) {
        if records.is_empty() {
            return;
        }
        let mut lines = String::new();
        for record in records {
            match serde_json::to_string(record) {
                Ok(line) => {
                    lines.push_str(&line);
                    lines.push('\n');
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to serialize probe record");
                }
            }
        }

        let _guard = self.file_lock.lock().expect("history lock poisoned");
        let result = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| {
                use std::io::Write;
                file.write_all(lines.as_bytes())
            });
        if let Err(e) = result {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to append history");
        }
    }

    fn prune(&self, retention_days: u32) {
        let cutoff = Utc::now() - Duration::days(i64::from(retention_days));

        let _guard = self.file_lock.lock().expect("history lock poisoned");
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read history for pruning");
                return;
            }
        };

        let mut kept = String::new();
        let mut dropped = 0usize;
        for line in raw.lines() {
            match serde_json::from_str::<ProbeRecord>(line) {
                Ok(record) if record.tested_at < cutoff => dropped += 1,
                // Keep records inside the window and lines we cannot parse.
                _ => {
                    kept.push_str(line);
                    kept.push('\n');
                }
            }
        }

        if dropped == 0 {
            return;
        }
        if let Err(e) = std::fs::write(&self.path, kept) {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to rewrite history");
            return;
        }
        tracing::info!(dropped, retention_days, "Pruned delay history");
    }
}

/// Sink that discards everything. Used when the monitor is disabled.
#[derive(Default)]
pub struct NullProbeSink;

impl ProbeSink for NullProbeSink {
    fn record_probes(&self, _records: &[ProbeRecord]) {}
    fn prune(&self, _retention_days: u32) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlProbeSink::new(dir.path().join("history.jsonl"));

        sink.record_probes(&[
            ProbeRecord::new("Proxy", "HK-01", Some(120)),
            ProbeRecord::new("Proxy", "US-02", None),
        ]);

        let raw = std::fs::read_to_string(dir.path().join("history.jsonl")).unwrap();
        let records: Vec<ProbeRecord> = raw
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].delay_ms, Some(120));
        assert_eq!(records[1].delay_ms, None);
    }

    #[test]
    fn test_prune_drops_old_records_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.jsonl");
        let sink = JsonlProbeSink::new(path.clone());

        let mut old = ProbeRecord::new("Proxy", "HK-01", Some(100));
        old.tested_at = Utc::now() - Duration::days(40);
        let fresh = ProbeRecord::new("Proxy", "HK-01", Some(90));
        sink.record_probes(&[old, fresh.clone()]);

        sink.prune(30);

        let raw = std::fs::read_to_string(path).unwrap();
        let records: Vec<ProbeRecord> = raw
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].delay_ms, Some(90));
    }

    #[test]
    fn test_prune_missing_file_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlProbeSink::new(dir.path().join("absent.jsonl"));
        sink.prune(30);
    }
}
