//! Script log routing.
//!
//! Levels use the conventional integer scale where lower is more severe. Every message is
//! mirrored as a `tracing` event with target `framescript::script` and then handed to the
//! embedder's [`LogSink`], or written to standard error when there is none.

use std::cell::RefCell;

/// Unrecoverable; the process is about to abort.
pub const LEVEL_PANIC: i32 = 0;
/// Unrecoverable for this host.
pub const LEVEL_FATAL: i32 = 8;
/// Operation failed.
pub const LEVEL_ERROR: i32 = 16;
/// Something looks wrong.
pub const LEVEL_WARNING: i32 = 24;
/// Informational.
pub const LEVEL_INFO: i32 = 32;
/// Detailed informational.
pub const LEVEL_VERBOSE: i32 = 40;
/// Debugging; the default for `log(...)` without a level.
pub const LEVEL_DEBUG: i32 = 48;
/// Very verbose debugging.
pub const LEVEL_TRACE: i32 = 56;

/// Receiver for log messages produced by the host and its script.
pub trait LogSink {
    /// Handle one message at `level`.
    fn log(&mut self, level: i32, message: &str);
}

impl<F> LogSink for F
where
    F: FnMut(i32, &str),
{
    fn log(&mut self, level: i32, message: &str) {
        self(level, message)
    }
}

/// Short name of the band `level` falls in.
pub fn level_name(level: i32) -> &'static str {
    match level {
        i32::MIN..LEVEL_FATAL => "panic",
        LEVEL_FATAL..LEVEL_ERROR => "fatal",
        LEVEL_ERROR..LEVEL_WARNING => "error",
        LEVEL_WARNING..LEVEL_INFO => "warning",
        LEVEL_INFO..LEVEL_VERBOSE => "info",
        LEVEL_VERBOSE..LEVEL_DEBUG => "verbose",
        LEVEL_DEBUG..LEVEL_TRACE => "debug",
        _ => "trace",
    }
}

pub(crate) struct Logger {
    sink: RefCell<Option<Box<dyn LogSink>>>,
}

impl Logger {
    pub(crate) fn new(sink: Option<Box<dyn LogSink>>) -> Self {
        Self {
            sink: RefCell::new(sink),
        }
    }

    pub(crate) fn log(&self, level: i32, message: &str) {
        mirror(level, message);
        match self.sink.try_borrow_mut() {
            Ok(mut slot) => match slot.as_mut() {
                Some(sink) => sink.log(level, message),
                None => eprintln!("[framescript:{}] {message}", level_name(level)),
            },
            // A sink that logs through the host re-enters here.
            Err(_) => eprintln!("[framescript:{}] {message}", level_name(level)),
        }
    }
}

fn mirror(level: i32, message: &str) {
    const TARGET: &str = "framescript::script";
    match level {
        i32::MIN..LEVEL_WARNING => tracing::error!(target: TARGET, script_level = level, "{message}"),
        LEVEL_WARNING..LEVEL_INFO => tracing::warn!(target: TARGET, script_level = level, "{message}"),
        LEVEL_INFO..LEVEL_DEBUG => tracing::info!(target: TARGET, script_level = level, "{message}"),
        LEVEL_DEBUG..LEVEL_TRACE => tracing::debug!(target: TARGET, script_level = level, "{message}"),
        _ => tracing::trace!(target: TARGET, script_level = level, "{message}"),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/log.rs"]
mod tests;
