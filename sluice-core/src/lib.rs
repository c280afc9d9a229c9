//! Sluice Core
//!
//! Core types and abstractions for the Sluice pipeline control plane.
//!
//! This crate contains:
//! - Domain types: the pipeline config document, versions, pause state, warnings
//! - DTOs: request/response shapes shared by the orchestrator and its clients

pub mod domain;
pub mod dto;
