//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the event query/write contract consumed by services.
//! - Isolate SQLite query details from notification and grid logic.
//!
//! # Invariants
//! - Repository writes validate events before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod event_repo;
