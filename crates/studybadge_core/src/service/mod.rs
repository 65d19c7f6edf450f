//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository, directory and notifier calls into schedule
//!   use-case APIs.
//! - Keep hosts (CLI, HTTP layers) decoupled from storage details.

pub mod request;
pub mod schedule_service;
pub mod series_plan;
