//! Persistence effects produced by the schedule engine.
//!
//! # Responsibility
//! - Describe every write of one engine operation as data, so the whole set
//!   can be applied in a single transaction and then mirrored to
//!   notification registrations.
//!
//! # Invariants
//! - `Update*` variants carry the record as loaded (`before`) so the writer
//!   can match on its `version`.
//! - No `InsertRepeat`/`UpdateRepeat` ever carries a one-date-wide series.

use crate::model::schedule::{RepeatSchedule, ScheduleId, SingleSchedule};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleMutation {
    InsertSingle(SingleSchedule),
    UpdateSingle {
        before: SingleSchedule,
        after: SingleSchedule,
    },
    DeleteSingle(SingleSchedule),
    InsertRepeat(RepeatSchedule),
    UpdateRepeat {
        before: RepeatSchedule,
        after: RepeatSchedule,
    },
    DeleteRepeat(RepeatSchedule),
}

impl ScheduleMutation {
    /// ID of the record this mutation writes.
    pub fn schedule_id(&self) -> ScheduleId {
        match self {
            Self::InsertSingle(schedule) | Self::DeleteSingle(schedule) => schedule.id,
            Self::UpdateSingle { after, .. } => after.id,
            Self::InsertRepeat(schedule) | Self::DeleteRepeat(schedule) => schedule.id,
            Self::UpdateRepeat { after, .. } => after.id,
        }
    }

    /// Short metadata-only label used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InsertSingle(_) => "insert_single",
            Self::UpdateSingle { .. } => "update_single",
            Self::DeleteSingle(_) => "delete_single",
            Self::InsertRepeat(_) => "insert_repeat",
            Self::UpdateRepeat { .. } => "update_repeat",
            Self::DeleteRepeat(_) => "delete_repeat",
        }
    }
}
