//! Tower middleware for lightnet transports.
//!
//! Layers wrap the [`crate::BoxedTransport`] the manager drives; they see
//! each hop of a redirect chain as a separate request. Add them with
//! [`crate::HttpManagerBuilder::layer`], or use the helpers such as
//! [`crate::HttpManagerBuilder::with_logging`].

mod logging;

pub use logging::{LogLevel, Logging, LoggingLayer};

// Re-export tower types for convenience
pub use tower::{Layer, ServiceBuilder};
