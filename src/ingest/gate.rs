// src/ingest/gate.rs
//! Cooldown gate for the fallback source, persisted as a one-line timestamp
//! file (`YYYY-MM-DD HH:MM:SS`, local time). Problems reading the file open
//! the gate; problems writing it are logged and ignored.

use chrono::{Duration, NaiveDateTime};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct FallbackGate {
    path: PathBuf,
    cooldown: Duration,
}

impl FallbackGate {
    pub fn new(path: impl Into<PathBuf>, cooldown_days: i64) -> Self {
        Self {
            path: path.into(),
            cooldown: Duration::days(cooldown_days.max(0)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last recorded use, if the file exists and parses.
    pub fn last_used(&self) -> Option<NaiveDateTime> {
        match fs::read_to_string(&self.path) {
            Ok(s) => match NaiveDateTime::parse_from_str(s.trim(), STAMP_FORMAT) {
                Ok(t) => Some(t),
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "unparsable fallback stamp, treating gate as open");
                    None
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "unreadable fallback stamp, treating gate as open");
                None
            }
        }
    }

    /// True when the fallback may be called at `now`.
    pub fn is_open(&self, now: NaiveDateTime) -> bool {
        match self.last_used() {
            None => true,
            Some(last) => {
                let open = now - last >= self.cooldown;
                debug!(last = %last, open, "fallback gate checked");
                open
            }
        }
    }

    /// Record a fallback call at `now`.
    pub fn mark_used(&self, now: NaiveDateTime) {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if let Err(e) = fs::create_dir_all(dir) {
                warn!(path = %dir.display(), error = %e, "cannot create stamp directory");
                return;
            }
        }
        let stamp = now.format(STAMP_FORMAT).to_string();
        if let Err(e) = fs::write(&self.path, &stamp) {
            warn!(path = %self.path.display(), error = %e, "cannot write fallback stamp");
        }
    }
}
