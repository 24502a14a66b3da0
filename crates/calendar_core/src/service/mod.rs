//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into calendar use-cases.
//! - Host the upcoming-event notification engine and its scheduling policy.

pub mod alert;
pub mod event_service;
pub mod month_grid;
pub mod notification_controller;
pub mod notification_engine;
