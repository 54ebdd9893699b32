//! Structured logging module for Folio Chat
//!
//! Lines go to stdout and, once `init_logging` has set a directory, to a
//! per-day file in it. Categories:
//! - ROUTING: topic classification and backend/fallback decisions
//! - BACKEND: language model gateway calls
//! - FALLBACK: canned reply outcomes
//! - SESSION: session lifecycle, stale turns
//! - ERROR: failures worth an operator's attention

use chrono::{Local, Utc};
use once_cell::sync::Lazy;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const RETENTION_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy)]
pub enum LogCategory {
    Routing,
    Backend,
    Fallback,
    Session,
    Error,
}

impl LogCategory {
    fn as_str(&self) -> &'static str {
        match self {
            LogCategory::Routing => "ROUTING",
            LogCategory::Backend => "BACKEND",
            LogCategory::Fallback => "FALLBACK",
            LogCategory::Session => "SESSION",
            LogCategory::Error => "ERROR",
        }
    }
}

/// Directory log files are written to; `None` means console only.
static LOG_DIR: Lazy<Mutex<Option<PathBuf>>> = Lazy::new(|| Mutex::new(None));

fn log_file_path(dir: &Path) -> PathBuf {
    let today = Local::now().format("%Y-%m-%d").to_string();
    dir.join(format!("folio-chat-{}.log", today))
}

fn current_log_dir() -> Option<PathBuf> {
    LOG_DIR.lock().ok().and_then(|guard| guard.clone())
}

/// Initialize file logging in `log_dir`, creating it if needed.
pub fn init_logging(log_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !log_dir.exists() {
        fs::create_dir_all(log_dir)?;
    }

    if let Ok(mut guard) = LOG_DIR.lock() {
        *guard = Some(log_dir.to_path_buf());
    }

    log(LogCategory::Session, None, "Folio Chat logging initialized");

    Ok(())
}

fn format_line(category: LogCategory, session_id: Option<&str>, message: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let session_context = session_id
        .map(|id| format!("session={} | ", &id[..8.min(id.len())]))
        .unwrap_or_default();

    format!("[{}] [{}] {}{}\n", timestamp, category.as_str(), session_context, message)
}

/// Log a message with category and optional session context
pub fn log(category: LogCategory, session_id: Option<&str>, message: &str) {
    let line = format_line(category, session_id, message);

    print!("{}", line);

    if let Some(dir) = current_log_dir() {
        if let Ok(mut file) = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file_path(&dir))
        {
            let _ = file.write_all(line.as_bytes());
        }
    }
}

pub fn log_routing(session_id: Option<&str>, message: &str) {
    log(LogCategory::Routing, session_id, message);
}

pub fn log_backend(session_id: Option<&str>, message: &str) {
    log(LogCategory::Backend, session_id, message);
}

pub fn log_fallback(session_id: Option<&str>, message: &str) {
    log(LogCategory::Fallback, session_id, message);
}

pub fn log_session(session_id: Option<&str>, message: &str) {
    log(LogCategory::Session, session_id, message);
}

pub fn log_error(session_id: Option<&str>, message: &str) {
    log(LogCategory::Error, session_id, message);
}

/// Remove log files older than a week; returns how many were deleted.
pub fn cleanup_old_logs(log_dir: &Path) -> Result<usize, Box<dyn std::error::Error>> {
    let mut deleted = 0;

    if !log_dir.exists() {
        return Ok(0);
    }

    let cutoff = Utc::now() - chrono::Duration::days(RETENTION_DAYS);

    for entry in fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.extension().and_then(|e| e.to_str()) != Some("log") {
            continue;
        }

        if let Ok(modified) = entry.metadata().and_then(|m| m.modified()) {
            let modified_time: chrono::DateTime<Utc> = modified.into();
            if modified_time < cutoff && fs::remove_file(&path).is_ok() {
                deleted += 1;
            }
        }
    }

    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_format_truncates_session_id() {
        let line = format_line(
            LogCategory::Fallback,
            Some("0123456789abcdef"),
            "canned match",
        );
        assert!(line.contains("[FALLBACK] session=01234567 | canned match\n"));

        let line = format_line(LogCategory::Routing, Some("abc"), "short");
        assert!(line.contains("session=abc | short"));

        let line = format_line(LogCategory::Error, None, "no session");
        assert!(line.ends_with("[ERROR] no session\n"));
    }

    #[test]
    fn test_init_creates_dir_and_writes_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("logs");
        init_logging(&dir).unwrap();
        log_backend(Some("session-1234"), "hello file");

        let contents = fs::read_to_string(log_file_path(&dir)).unwrap();
        assert!(contents.contains("[BACKEND] session=session- | hello file"));
    }

    #[test]
    fn test_cleanup_missing_dir_is_noop() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(cleanup_old_logs(&tmp.path().join("absent")).unwrap(), 0);
    }

    #[test]
    fn test_cleanup_keeps_recent_files() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("folio-chat-today.log"), "x").unwrap();
        fs::write(tmp.path().join("notes.txt"), "x").unwrap();
        assert_eq!(cleanup_old_logs(tmp.path()).unwrap(), 0);
        assert!(tmp.path().join("folio-chat-today.log").exists());
    }
}
