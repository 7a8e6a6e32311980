//! Static registry of pluggable units.
//!
//! Collectors supply candidate hostnames for discovery. Detectors decide
//! whether a host's DNS resource points at an unclaimed third-party service.
//! Both are plain values implementing a capability trait and are listed
//! explicitly at start-up; ordering comes from each unit's priority.

pub mod collector;
pub mod collectors;
pub mod detector;
pub mod registry;

pub use collector::{Collector, CollectorContext};
pub use detector::{DetectionContext, Detector, DetectorInfo, Verdict};
pub use registry::{Plugin, Registry};

/// Why a plugin produced no result.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// A prerequisite (key, file, option) is missing; the unit is skipped.
    #[error("{0}")]
    MissingRequirement(String),
    /// The unit ran and failed.
    #[error("{0}")]
    Malfunction(String),
}

/// Every collector shipped with hostmap, in registry order.
pub fn default_collectors() -> Registry<dyn Collector> {
    let collectors: Vec<Box<dyn Collector>> = vec![
        Box::new(collectors::Dictionary),
        Box::new(collectors::HostList),
    ];
    Registry::new(collectors)
}

/// Takeover detectors shipped with hostmap.
///
/// Signature matching lives outside this crate; embedders register their own
/// detectors with [`Registry::new`].
pub fn default_detectors() -> Registry<dyn Detector> {
    Registry::new(Vec::new())
}
