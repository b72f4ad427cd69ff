/// Error types for the health-check agent
pub mod error;

/// Environment-sourced configuration
pub mod config;

/// Persisted log read offsets
pub mod state;

/// Incremental log scanning with keyword matching
pub mod scanner;

/// Resource and service probes
pub mod probes;

/// Check orchestration and issue aggregation
pub mod orchestrator;

/// Email notification delivery
pub mod notifier;

// Re-export commonly used types
pub use config::Config;
pub use error::{NotifyError, ScanError, StateError};
pub use orchestrator::Orchestrator;
pub use state::OffsetStore;
