#![deny(missing_docs)]
//! Shared logging utilities for the poster workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase,
//! a per-thread row context that prefixes messages emitted while a queue row is
//! being processed, and a minimal test initializer for the global logger.

use std::cell::Cell;

thread_local! {
    /// Thread-local storage for the 1-based queue row currently being processed.
    static CURRENT_ROW: Cell<Option<usize>> = const { Cell::new(None) };
}

/// Marks `row` (1-based, as an operator would count data lines) as the row
/// being processed on this thread until the returned guard is dropped.
///
/// Guards nest: dropping an inner guard restores the outer row.
#[must_use = "the row context is cleared when the guard is dropped"]
pub fn enter_row(row: usize) -> RowContextGuard {
    let previous = CURRENT_ROW.with(|v| v.replace(Some(row)));
    RowContextGuard { previous }
}

/// Returns the row set by the innermost live [`enter_row`] guard, if any.
pub fn current_row() -> Option<usize> {
    CURRENT_ROW.with(|v| v.get())
}

/// Restores the previous row context on drop.
#[derive(Debug)]
pub struct RowContextGuard {
    previous: Option<usize>,
}

impl Drop for RowContextGuard {
    fn drop(&mut self) {
        CURRENT_ROW.with(|v| v.set(self.previous));
    }
}

/// Prefix prepended to log lines by the `engine_*` macros.
#[doc(hidden)]
pub fn row_prefix() -> String {
    match current_row() {
        Some(row) => format!("[row {row}] "),
        None => String::new(),
    }
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        log::trace!("{}{}", $crate::row_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        log::info!("{}{}", $crate::row_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        log::debug!("{}{}", $crate::row_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        log::warn!("{}{}", $crate::row_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        log::error!("{}{}", $crate::row_prefix(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
