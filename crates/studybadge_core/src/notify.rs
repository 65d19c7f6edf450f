//! Notification scheduler contract and channel notices.
//!
//! # Responsibility
//! - Define the fire-and-forget registration calls the engine issues for
//!   every persisted or deleted schedule.
//! - Build channel-wide notices announcing schedule changes.
//! - Translate an applied mutation set into matching registrations.
//!
//! # Invariants
//! - Registrations are dispatched only for mutations that were committed.
//! - Log lines carry IDs, dates and cycle metadata only, never names or
//!   free-text content.

use crate::model::channel::{StudyChannel, StudyChannelId};
use crate::model::mutation::ScheduleMutation;
use crate::model::schedule::{RepeatSchedule, SingleSchedule};
use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};

const SCHEDULE_RELATED_URL: &str = "/study-channels/{channel_id}/schedules?date={date}";

/// Category of a channel-wide notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    ScheduleCreate,
    ScheduleUpdate,
    ScheduleDelete,
}

/// What happened, used to pick the notice kind and wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeTopic {
    SingleCreated,
    RepeatCreated,
    SingleToSingle,
    SingleToRepeat,
    RepeatToRepeat,
    RepeatToSingle,
    SingleDeleted,
    RepeatDeleted,
}

impl NoticeTopic {
    pub fn kind(self) -> NoticeKind {
        match self {
            Self::SingleCreated | Self::RepeatCreated => NoticeKind::ScheduleCreate,
            Self::SingleToSingle
            | Self::SingleToRepeat
            | Self::RepeatToRepeat
            | Self::RepeatToSingle => NoticeKind::ScheduleUpdate,
            Self::SingleDeleted | Self::RepeatDeleted => NoticeKind::ScheduleDelete,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Self::SingleCreated => "a single schedule was created",
            Self::RepeatCreated => "a repeating schedule was created",
            Self::SingleToSingle => "a single schedule was updated",
            Self::SingleToRepeat => "a single schedule became a repeating schedule",
            Self::RepeatToRepeat => "a repeating schedule was updated",
            Self::RepeatToSingle => "an occurrence of a repeating schedule became a single schedule",
            Self::SingleDeleted => "a single schedule was deleted",
            Self::RepeatDeleted => "an occurrence of a repeating schedule was deleted",
        }
    }
}

/// Channel-wide announcement of one schedule change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelNotice {
    pub channel_id: StudyChannelId,
    pub kind: NoticeKind,
    pub date: NaiveDate,
    pub message: String,
    pub related_url: String,
}

impl ChannelNotice {
    pub fn new(channel: &StudyChannel, topic: NoticeTopic, date: NaiveDate) -> Self {
        let formatted_date = date.format("%Y-%m-%d").to_string();
        Self {
            channel_id: channel.id,
            kind: topic.kind(),
            date,
            message: format!("[{}] {} for {formatted_date}", channel.name, topic.describe()),
            related_url: SCHEDULE_RELATED_URL
                .replace("{channel_id}", &channel.id.to_string())
                .replace("{date}", &formatted_date),
        }
    }
}

/// Registration calls keyed by schedule identity and cycle metadata.
///
/// Calls are fire-and-forget: delivery failures are the implementor's concern
/// and never roll back a committed schedule change.
pub trait NotificationScheduler {
    fn schedule_single(&self, schedule: &SingleSchedule);
    fn unschedule_single(&self, schedule: &SingleSchedule);
    fn reschedule_single(&self, before: &SingleSchedule, after: &SingleSchedule);
    fn schedule_repeat(&self, schedule: &RepeatSchedule);
    fn unschedule_repeat(&self, schedule: &RepeatSchedule);
    fn reschedule_repeat(&self, before: &RepeatSchedule, after: &RepeatSchedule);
    fn announce(&self, notice: &ChannelNotice);
}

/// Issues the registration matching each committed mutation, in order.
pub fn dispatch_mutations<N: NotificationScheduler + ?Sized>(
    scheduler: &N,
    mutations: &[ScheduleMutation],
) {
    for mutation in mutations {
        match mutation {
            ScheduleMutation::InsertSingle(schedule) => scheduler.schedule_single(schedule),
            ScheduleMutation::UpdateSingle { before, after } => {
                scheduler.reschedule_single(before, after)
            }
            ScheduleMutation::DeleteSingle(schedule) => scheduler.unschedule_single(schedule),
            ScheduleMutation::InsertRepeat(schedule) => scheduler.schedule_repeat(schedule),
            ScheduleMutation::UpdateRepeat { before, after } => {
                scheduler.reschedule_repeat(before, after)
            }
            ScheduleMutation::DeleteRepeat(schedule) => scheduler.unschedule_repeat(schedule),
        }
    }
}

/// Scheduler that records registrations in the log only.
///
/// Suitable for hosts where delivery is handled by a separate process that
/// tails the log, and for the CLI.
#[derive(Debug, Clone, Copy)]
pub struct LogNotificationScheduler {
    enabled: bool,
}

impl LogNotificationScheduler {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl Default for LogNotificationScheduler {
    fn default() -> Self {
        Self::new(true)
    }
}

impl NotificationScheduler for LogNotificationScheduler {
    fn schedule_single(&self, schedule: &SingleSchedule) {
        if self.enabled {
            info!(
                "event=notify_schedule module=notify status=ok kind=single id={} date={} start_time={}",
                schedule.id, schedule.date, schedule.details.start_time
            );
        }
    }

    fn unschedule_single(&self, schedule: &SingleSchedule) {
        if self.enabled {
            info!(
                "event=notify_unschedule module=notify status=ok kind=single id={}",
                schedule.id
            );
        }
    }

    fn reschedule_single(&self, before: &SingleSchedule, after: &SingleSchedule) {
        self.unschedule_single(before);
        self.schedule_single(after);
    }

    fn schedule_repeat(&self, schedule: &RepeatSchedule) {
        if self.enabled {
            info!(
                "event=notify_schedule module=notify status=ok kind=repeat id={} cycle={} situation={} start_date={} end_date={} start_time={}",
                schedule.id,
                schedule.cycle,
                schedule.situation,
                schedule.start_date,
                schedule.end_date,
                schedule.details.start_time
            );
        }
    }

    fn unschedule_repeat(&self, schedule: &RepeatSchedule) {
        if self.enabled {
            info!(
                "event=notify_unschedule module=notify status=ok kind=repeat id={}",
                schedule.id
            );
        }
    }

    fn reschedule_repeat(&self, before: &RepeatSchedule, after: &RepeatSchedule) {
        self.unschedule_repeat(before);
        self.schedule_repeat(after);
    }

    fn announce(&self, notice: &ChannelNotice) {
        if self.enabled {
            info!(
                "event=notify_announce module=notify status=ok channel_id={} kind={:?} date={}",
                notice.channel_id, notice.kind, notice.date
            );
        }
    }
}
