//! Core domain types
//!
//! This module contains the core domain structures used across Sluice services.
//! The orchestrator decodes, validates and persists them; the client encodes
//! and reads them back.

pub mod config;
pub mod pipeline;
pub mod validation;
