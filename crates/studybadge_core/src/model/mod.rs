//! Domain model for study-channel meetings.
//!
//! # Responsibility
//! - Define canonical data structures used by the recurrence engine.
//! - Keep single and repeating meetings as two distinct record kinds joined
//!   by a read-side sum type, never by inheritance.
//!
//! # Invariants
//! - Every schedule is identified by a stable `ScheduleId`.
//! - Schedules are owned by exactly one study channel; deletion is explicit.

pub mod channel;
pub mod mutation;
pub mod schedule;
