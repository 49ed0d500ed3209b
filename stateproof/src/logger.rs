// Copyright (C) 2023, Ava Labs, Inc. All rights reserved.
// See the file LICENSE.md for licensing terms.

// Makes the logging calls a true runtime no-op when the `logger`
// feature is off. As a library we cannot rely on the global max-level
// shortcut, so the disabled variants compile down to nothing.

#[cfg(feature = "logger")]
pub use log::{debug, trace};

/// Returns true if the trace log level is enabled
#[cfg(feature = "logger")]
#[must_use]
pub fn trace_enabled() -> bool {
    log::log_enabled!(log::Level::Trace)
}

#[cfg(not(feature = "logger"))]
pub use noop_logger::{debug, trace, trace_enabled};

#[cfg(not(feature = "logger"))]
mod noop_logger {
    /// A noop logger, used when the logger feature is disabled
    #[macro_export]
    macro_rules! noop_log {
        ($($arg:tt)+) => {
            if $crate::logger::trace_enabled() {
                // `trace_enabled` is always false here; the branch only
                // exists so the macro arguments still count as used.
                let _ = format!($($arg)+);
            }
        };
    }

    pub use noop_log as debug;
    pub use noop_log as trace;

    /// `trace_enabled` for a noop logger is always false
    #[inline]
    #[must_use]
    pub const fn trace_enabled() -> bool {
        false
    }
}
