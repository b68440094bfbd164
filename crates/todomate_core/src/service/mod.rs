//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Publish store-change notifications after successful writes.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod area_service;
pub mod task_service;
