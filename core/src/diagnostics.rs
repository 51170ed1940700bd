use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use chrono::Utc;
use serde::Serialize;

const MAX_LOG_BYTES: u64 = 1_500_000;
const LOG_FILE: &str = "diagnostics.log";

#[derive(Debug, Serialize)]
pub struct LogEvent {
    pub ts: String,
    pub kind: String,
    pub message: String,
}

/// Kinds written by the messaging shell.
pub mod kind {
    pub const QUERY_ERROR: &str = "query_error";
    pub const MUTATION_ERROR: &str = "mutation_error";
}

fn redact_token(token: &str) -> Option<&'static str> {
    let at = token.find('@');
    if let Some(idx) = at {
        if idx > 0 && token[idx + 1..].contains('.') {
            return Some("[email]");
        }
    }
    let digits = token.chars().filter(|c| c.is_ascii_digit()).count();
    if digits >= 10 {
        return Some("[redacted]");
    }
    None
}

/// Drops file paths, e-mail addresses, and long digit runs (phone numbers)
/// from a log message.
pub fn sanitize(input: &str) -> String {
    let mut out = input.to_string();
    for prefix in ["/home/", "/Users/", "/var/", "/tmp/", "C:\\"] {
        if let Some(idx) = out.find(prefix) {
            out.replace_range(idx.., "[path]");
            break;
        }
    }
    out.split_whitespace()
        .map(|token| redact_token(token).map(str::to_string).unwrap_or_else(|| token.to_string()))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn log_event(log_dir: &Path, kind: &str, message: &str) -> io::Result<()> {
    fs::create_dir_all(log_dir)?;
    let path = log_dir.join(LOG_FILE);
    trim_log(&path)?;
    let event = LogEvent {
        ts: Utc::now().to_rfc3339(),
        kind: kind.to_string(),
        message: sanitize(message),
    };
    let line = serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string());
    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    writeln!(file, "{}", line)?;
    Ok(())
}

fn trim_log(path: &Path) -> io::Result<()> {
    if !path.exists() {
        return Ok(());
    }
    if fs::metadata(path)?.len() <= MAX_LOG_BYTES {
        return Ok(());
    }
    let data = fs::read(path)?;
    let mut keep_from = data.len().saturating_sub((MAX_LOG_BYTES / 2) as usize);
    // restart on a line boundary
    if let Some(offset) = data[keep_from..].iter().position(|b| *b == b'\n') {
        keep_from += offset + 1;
    }
    fs::write(path, &data[keep_from..])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn sanitize_redacts_emails_and_digits() {
        let cleaned = sanitize("send from jane.doe@alumni.edu to 5550001111 failed");
        assert_eq!(cleaned, "send from [email] to [redacted] failed");
    }

    #[test]
    fn sanitize_strips_paths() {
        let cleaned = sanitize("unable to open /home/jane/store.sqlite");
        assert_eq!(cleaned, "unable to open [path]");
    }

    #[test]
    fn log_event_appends_json_lines() {
        let dir = tempdir().expect("temp");
        for _ in 0..3 {
            log_event(dir.path(), kind::QUERY_ERROR, "load failed").expect("log");
        }
        let contents = fs::read_to_string(dir.path().join(LOG_FILE)).expect("read");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        let parsed: serde_json::Value = serde_json::from_str(lines[0]).expect("json");
        assert_eq!(parsed["kind"], "query_error");
        assert_eq!(parsed["message"], "load failed");
    }

    #[test]
    fn oversized_log_is_trimmed() {
        let dir = tempdir().expect("temp");
        let path = dir.path().join(LOG_FILE);
        let line = format!("{}\n", "x".repeat(999));
        fs::write(&path, line.repeat(2_000)).expect("seed log");
        log_event(dir.path(), kind::MUTATION_ERROR, "send failed").expect("log");
        let len = fs::metadata(&path).expect("meta").len();
        assert!(len <= MAX_LOG_BYTES / 2 + 200);
    }
}
