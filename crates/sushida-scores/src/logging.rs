//! Library-level log macros.
//!
//! With the `logging` feature these forward to `tracing`; without it they
//! expand to nothing, so the library never forces a subscriber on callers.
//!
//! ```rust,ignore
//! use crate::logging::{debug, info};
//!
//! info!(count = records.len(), "snapshot loaded");
//! debug!(id = %id, "score deleted");
//! ```

#[cfg(feature = "logging")]
macro_rules! log_trace {
    ($($arg:tt)*) => { tracing::trace!($($arg)*) }
}

#[cfg(not(feature = "logging"))]
macro_rules! log_trace {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "logging")]
macro_rules! log_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) }
}

#[cfg(not(feature = "logging"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "logging")]
macro_rules! log_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) }
}

#[cfg(not(feature = "logging"))]
macro_rules! log_info {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "logging")]
macro_rules! log_warn {
    ($($arg:tt)*) => { tracing::warn!($($arg)*) }
}

#[cfg(not(feature = "logging"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "logging")]
macro_rules! log_error {
    ($($arg:tt)*) => { tracing::error!($($arg)*) }
}

#[cfg(not(feature = "logging"))]
macro_rules! log_error {
    ($($arg:tt)*) => {};
}

#[allow(unused_imports)]
pub(crate) use log_debug as debug;
#[allow(unused_imports)]
pub(crate) use log_error as error;
#[allow(unused_imports)]
pub(crate) use log_info as info;
#[allow(unused_imports)]
pub(crate) use log_trace as trace;
#[allow(unused_imports)]
pub(crate) use log_warn as warn;
