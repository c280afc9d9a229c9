//! Service Module
//!
//! Business logic layer for the orchestrator.
//! Services orchestrate between repositories and contain domain logic.

pub mod config;
pub mod decode;
pub mod multipart;
pub mod pipeline;
pub mod validate;
pub mod version;

// Re-export for convenience
pub use config as config_service;
pub use pipeline as pipeline_service;
