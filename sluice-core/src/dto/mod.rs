//! Data Transfer Objects for the HTTP API
//!
//! This module contains the wire shapes exchanged between the orchestrator
//! and its clients: response bodies, content kinds and header names.

pub mod config;
