#![deny(missing_docs)]
//! Shared logging utilities for the jobscout workspace.
//!
//! This crate provides the `pipeline_*` logging macros used across the codebase,
//! a per-thread worker label that prefixes every line logged from a worker
//! thread, and a minimal test initializer for the global logger.

use std::cell::RefCell;

#[doc(hidden)]
pub use log;

thread_local! {
    /// Label of the pipeline worker running on the current thread, if any.
    static WORKER_LABEL: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Tags the current thread with a worker label such as `scraper-3`.
/// Worker threads call this once before entering their loop.
pub fn set_worker_label(label: impl Into<String>) {
    let label = label.into();
    WORKER_LABEL.with(|v| *v.borrow_mut() = Some(label));
}

/// Removes the worker label from the current thread.
pub fn clear_worker_label() {
    WORKER_LABEL.with(|v| *v.borrow_mut() = None);
}

/// Retrieves the worker label of the current thread.
/// Returns `None` on threads that never set one (main, reporter, tests).
pub fn worker_label() -> Option<String> {
    WORKER_LABEL.with(|v| v.borrow().clone())
}

#[doc(hidden)]
pub fn worker_prefix() -> String {
    WORKER_LABEL.with(|v| match v.borrow().as_deref() {
        Some(label) => format!("[{label}] "),
        None => String::new(),
    })
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! pipeline_trace {
    ($($arg:tt)*) => {{
        $crate::log::trace!("{}{}", $crate::worker_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! pipeline_info {
    ($($arg:tt)*) => {{
        $crate::log::info!("{}{}", $crate::worker_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! pipeline_debug {
    ($($arg:tt)*) => {{
        $crate::log::debug!("{}{}", $crate::worker_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! pipeline_warn {
    ($($arg:tt)*) => {{
        $crate::log::warn!("{}{}", $crate::worker_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! pipeline_error {
    ($($arg:tt)*) => {{
        $crate::log::error!("{}{}", $crate::worker_prefix(), format_args!($($arg)*));
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
