//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into user-facing flows.
//! - Keep presentation layers decoupled from store details.

pub mod library_service;
