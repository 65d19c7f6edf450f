//! Core domain logic for StudyBadge channel schedules.
//! This crate is the single source of truth for recurrence invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod recurrence;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::channel::{MemberId, MemberRole, StudyChannel, StudyChannelId};
pub use model::mutation::ScheduleMutation;
pub use model::schedule::{
    PlaceId, RepeatCycle, RepeatSchedule, RepeatSituation, Schedule, ScheduleDetails, ScheduleId,
    ScheduleOccurrence, ScheduleType, ScheduleValidationError, SingleSchedule,
};
pub use notify::{
    ChannelNotice, LogNotificationScheduler, NoticeKind, NoticeTopic, NotificationScheduler,
};
pub use repo::schedule_repo::{RepoError, RepoResult, ScheduleRepository, SqliteScheduleRepository};
pub use repo::study_repo::{ChannelDirectory, MembershipAuthority, SqliteStudyDirectory};
pub use service::request::{
    EditScope, RepeatScheduleCreateRequest, RepeatScheduleEdit, ScheduleDeleteRequest,
    ScheduleEditRequest, SingleScheduleCreateRequest, SingleScheduleEdit,
};
pub use service::schedule_service::{
    ScheduleChanges, ScheduleService, ScheduleServiceError, ScheduleServiceResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
