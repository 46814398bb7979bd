//! Per-game logger
//!
//! Each game owns its own logger; nothing is global. Entries can go to
//! stdout, to an in-memory buffer, or both. The buffer sits behind a mutex
//! because a game is shared between threads.

use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Log a verbose line, compiled out without the `verbose-logging` feature
macro_rules! log_if_verbose {
    ($logger:expr, $($arg:tt)*) => {
        #[cfg(feature = "verbose-logging")]
        {
            $logger.verbose(&format!($($arg)*));
        }
        #[cfg(not(feature = "verbose-logging"))]
        {
            let _ = &$logger;
        }
    };
}
pub(crate) use log_if_verbose;

/// How much a game reports while it runs
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum VerbosityLevel {
    /// No output
    Silent = 0,
    /// Warnings and phase/generation transitions
    Minimal = 1,
    /// Action outcomes (default)
    #[default]
    Normal = 2,
    /// Every ledger step and effect resolution
    Verbose = 3,
}

impl FromStr for VerbosityLevel {
    type Err = String;

    /// Accepts names (`silent`, `minimal`, `normal`, `verbose`) or `0`-`3`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityLevel::Silent),
            "minimal" | "1" => Ok(VerbosityLevel::Minimal),
            "normal" | "2" => Ok(VerbosityLevel::Normal),
            "verbose" | "3" => Ok(VerbosityLevel::Verbose),
            _ => Err(format!(
                "invalid verbosity level: {s} (expected silent/minimal/normal/verbose or 0-3)"
            )),
        }
    }
}

/// Output destination for log messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputMode {
    #[default]
    Stdout,
    /// Capture only (no stdout)
    Memory,
    Both,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: VerbosityLevel,
    pub message: String,
    /// e.g. "warning"
    pub category: Option<String>,
}

/// Read access to captured entries; holds the buffer lock while alive
pub struct LogGuard<'a> {
    guard: MutexGuard<'a, Vec<LogEntry>>,
}

impl<'a> Deref for LogGuard<'a> {
    type Target = [LogEntry];

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

pub struct EngineLogger {
    verbosity: VerbosityLevel,
    output_mode: OutputMode,
    /// Prefix for every line, normally the game id
    context: Option<String>,
    log_buffer: Mutex<Vec<LogEntry>>,
}

impl EngineLogger {
    pub fn new() -> Self {
        Self::with_verbosity(VerbosityLevel::default())
    }

    pub fn with_verbosity(verbosity: VerbosityLevel) -> Self {
        EngineLogger {
            verbosity,
            output_mode: OutputMode::default(),
            context: None,
            log_buffer: Mutex::new(Vec::new()),
        }
    }

    /// Same settings, prefixed with `[game_id]`
    pub fn for_game(mut self, game_id: impl std::fmt::Display) -> Self {
        self.context = Some(game_id.to_string());
        self
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        self.verbosity
    }

    pub fn set_verbosity(&mut self, verbosity: VerbosityLevel) {
        self.verbosity = verbosity;
    }

    pub fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    pub fn set_output_mode(&mut self, mode: OutputMode) {
        self.output_mode = mode;
    }

    /// Capture to memory and stop writing to stdout
    pub fn enable_capture(&mut self) {
        self.output_mode = OutputMode::Memory;
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.output_mode, OutputMode::Memory | OutputMode::Both)
    }

    pub fn logs(&self) -> LogGuard<'_> {
        LogGuard {
            guard: self.buffer(),
        }
    }

    pub fn clear_logs(&self) {
        self.buffer().clear();
    }

    /// Captured messages containing `needle`
    pub fn count_matching(&self, needle: &str) -> usize {
        self.buffer()
            .iter()
            .filter(|entry| entry.message.contains(needle))
            .count()
    }

    fn buffer(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        self.log_buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn log(&self, level: VerbosityLevel, category: Option<&str>, message: &str) {
        let should_capture = self.is_capturing();
        let should_output = matches!(self.output_mode, OutputMode::Stdout | OutputMode::Both);

        if level > self.verbosity && !should_capture {
            return;
        }

        let line = match &self.context {
            Some(context) => format!("[{context}] {message}"),
            None => message.to_string(),
        };

        if should_output && level <= self.verbosity {
            if level == VerbosityLevel::Minimal {
                println!("{line}");
            } else {
                println!("  {line}");
            }
        }

        if should_capture {
            self.buffer().push(LogEntry {
                level,
                message: line,
                category: category.map(str::to_string),
            });
        }
    }

    #[inline]
    pub fn minimal(&self, message: &str) {
        self.log(VerbosityLevel::Minimal, None, message);
    }

    #[inline]
    pub fn normal(&self, message: &str) {
        self.log(VerbosityLevel::Normal, None, message);
    }

    #[inline]
    pub fn verbose(&self, message: &str) {
        self.log(VerbosityLevel::Verbose, None, message);
    }

    /// Non-fatal problems such as unrecognized card text
    #[inline]
    pub fn warn(&self, message: &str) {
        self.log(VerbosityLevel::Minimal, Some("warning"), message);
    }
}

impl Default for EngineLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EngineLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineLogger")
            .field("verbosity", &self.verbosity)
            .field("output_mode", &self.output_mode)
            .field("context", &self.context)
            .field("log_count", &self.buffer().len())
            .finish()
    }
}

/// Clones share settings but start with an empty buffer
impl Clone for EngineLogger {
    fn clone(&self) -> Self {
        EngineLogger {
            verbosity: self.verbosity,
            output_mode: self.output_mode,
            context: self.context.clone(),
            log_buffer: Mutex::new(Vec::new()),
        }
    }
}
