//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository and KV-store calls into use-case level APIs.
//! - Keep UI layers decoupled from storage details.
//!
//! # Invariants
//! - Services are honestly synchronous; nothing here suspends on I/O.

pub mod auth_service;
pub mod gamification_service;
pub mod moderation_service;
pub mod work_service;
