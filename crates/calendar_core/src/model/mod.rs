//! Domain model for calendar events.
//!
//! # Responsibility
//! - Define the event record shared by storage, month grid and notifications.
//! - Own field validation so every layer agrees on what a valid event is.
//!
//! # Invariants
//! - Every stored event is identified by a store-assigned `EventId`.
//! - Event start times carry minute precision only.

pub mod event;
