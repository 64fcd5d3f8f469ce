//! Fire-and-forget conversation log sink.
//!
//! Each resolution appends one USER line and one BOT line through a
//! [`TurnLogger`]. The sink must never fail the caller: I/O errors are
//! swallowed (traced at debug level, never surfaced).

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;

/// Which side of the conversation produced a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnKind {
    User,
    Bot,
}

impl TurnKind {
    fn label(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Bot => "BOT",
        }
    }
}

/// Append-only sink for conversation turns.
pub trait TurnLogger: Send {
    /// Record one turn. Implementations must swallow their own failures.
    fn log(&mut self, kind: TurnKind, text: &str);
}

/// Sink that discards everything; the default for embedded use and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTurnLogger;

impl TurnLogger for NullTurnLogger {
    fn log(&mut self, _kind: TurnKind, _text: &str) {}
}

/// Sink that appends `[Y-m-d H:M:S] KIND: text` lines to a file.
///
/// The file is opened per write so a rotated or deleted log never wedges
/// the engine.
#[derive(Debug, Clone)]
pub struct FileTurnLogger {
    path: PathBuf,
}

impl FileTurnLogger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TurnLogger for FileTurnLogger {
    fn log(&mut self, kind: TurnKind, text: &str) {
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let line = format!("[{stamp}] {}: {text}\n", kind.label());

        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(line.as_bytes()));

        if let Err(e) = result {
            tracing::debug!(error = %e, path = %self.path.display(), "turn log write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_user_and_bot_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("talep_log.txt");

        let mut logger = FileTurnLogger::new(&path);
        logger.log(TurnKind::User, "merhaba");
        logger.log(TurnKind::Bot, "[RULE->vpn] yanıt");

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("USER: merhaba"));
        assert!(lines[1].contains("BOT: [RULE->vpn] yanıt"));
        assert!(lines[0].starts_with('['));
    }

    #[test]
    fn write_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        // The directory itself is not writable as a file.
        let mut logger = FileTurnLogger::new(dir.path());
        logger.log(TurnKind::User, "bu satır kaybolur");
    }

    #[test]
    fn null_logger_is_a_no_op() {
        NullTurnLogger.log(TurnKind::Bot, "hiçbir yere gitmez");
    }
}
