//! Shared building blocks for hostmap: run configuration, port lists,
//! validation, error taxonomy and IP classification.

pub mod config;
pub mod error;
pub mod network;
pub mod ports;
pub mod validation;

pub use error::{Error, Result};

/// Logs a positive outcome at info level under the `success` target.
///
/// The terminal formatter renders these with a distinct marker.
#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        ::tracing::info!(target: "success", $($arg)*)
    };
}
