#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::Connection;
use std::sync::Mutex;
use studybadge_core::{
    ChannelNotice, MemberId, MemberRole, NoticeKind, NotificationScheduler, RepeatCycle,
    RepeatSchedule, RepeatScheduleCreateRequest, RepeatSituation, ScheduleDetails, ScheduleId,
    ScheduleService, SingleSchedule, SingleScheduleCreateRequest, SqliteScheduleRepository,
    SqliteStudyDirectory, StudyChannelId,
};

pub const LEADER: MemberId = 1;
pub const PARTICIPANT: MemberId = 2;
pub const OUTSIDER: MemberId = 3;

/// One registration or notice observed by the recording scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    ScheduleSingle { id: ScheduleId, date: NaiveDate },
    UnscheduleSingle { id: ScheduleId },
    RescheduleSingle { id: ScheduleId },
    ScheduleRepeat { id: ScheduleId, start: NaiveDate, end: NaiveDate },
    UnscheduleRepeat { id: ScheduleId },
    RescheduleRepeat { id: ScheduleId, start: NaiveDate, end: NaiveDate },
    Announce { kind: NoticeKind, date: NaiveDate },
}

#[derive(Debug, Default)]
pub struct RecordingNotificationScheduler {
    events: Mutex<Vec<Recorded>>,
}

impl RecordingNotificationScheduler {
    pub fn events(&self) -> Vec<Recorded> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    fn push(&self, event: Recorded) {
        self.events.lock().unwrap().push(event);
    }
}

impl NotificationScheduler for RecordingNotificationScheduler {
    fn schedule_single(&self, schedule: &SingleSchedule) {
        self.push(Recorded::ScheduleSingle {
            id: schedule.id,
            date: schedule.date,
        });
    }

    fn unschedule_single(&self, schedule: &SingleSchedule) {
        self.push(Recorded::UnscheduleSingle { id: schedule.id });
    }

    fn reschedule_single(&self, _before: &SingleSchedule, after: &SingleSchedule) {
        self.push(Recorded::RescheduleSingle { id: after.id });
    }

    fn schedule_repeat(&self, schedule: &RepeatSchedule) {
        self.push(Recorded::ScheduleRepeat {
            id: schedule.id,
            start: schedule.start_date,
            end: schedule.end_date,
        });
    }

    fn unschedule_repeat(&self, schedule: &RepeatSchedule) {
        self.push(Recorded::UnscheduleRepeat { id: schedule.id });
    }

    fn reschedule_repeat(&self, _before: &RepeatSchedule, after: &RepeatSchedule) {
        self.push(Recorded::RescheduleRepeat {
            id: after.id,
            start: after.start_date,
            end: after.end_date,
        });
    }

    fn announce(&self, notice: &ChannelNotice) {
        self.push(Recorded::Announce {
            kind: notice.kind,
            date: notice.date,
        });
    }
}

pub type TestService<'conn> = ScheduleService<
    SqliteScheduleRepository<'conn>,
    SqliteStudyDirectory<'conn>,
    RecordingNotificationScheduler,
>;

pub fn service(conn: &Connection) -> TestService<'_> {
    ScheduleService::new(
        SqliteScheduleRepository::try_new(conn).unwrap(),
        SqliteStudyDirectory::try_new(conn).unwrap(),
        RecordingNotificationScheduler::default(),
    )
}

/// Creates a channel with a leader and a participant.
pub fn seed_channel(conn: &Connection, name: &str) -> StudyChannelId {
    let directory = SqliteStudyDirectory::try_new(conn).unwrap();
    let channel = directory.create_channel(name).unwrap();
    directory
        .upsert_member(channel.id, LEADER, MemberRole::Leader)
        .unwrap();
    directory
        .upsert_member(channel.id, PARTICIPANT, MemberRole::Participant)
        .unwrap();
    channel.id
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

pub fn at(day: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    day.and_time(time(hour, minute))
}

/// A fixed instant well before every test series.
pub fn before_series() -> NaiveDateTime {
    at(date(2024, 8, 15), 10, 0)
}

pub fn details(name: &str) -> ScheduleDetails {
    ScheduleDetails {
        name: name.to_string(),
        content: "chapter review".to_string(),
        start_time: time(20, 0),
        end_time: time(21, 0),
        place_id: Some(42),
    }
}

pub fn create_single(
    service: &TestService<'_>,
    channel_id: StudyChannelId,
    on: NaiveDate,
) -> SingleSchedule {
    service
        .create_single_schedule(
            channel_id,
            &SingleScheduleCreateRequest {
                member_id: LEADER,
                date: on,
                details: details("one-off"),
            },
        )
        .unwrap()
}

pub fn create_repeat(
    service: &TestService<'_>,
    channel_id: StudyChannelId,
    start: NaiveDate,
    end: NaiveDate,
    cycle: RepeatCycle,
) -> RepeatSchedule {
    service
        .create_repeat_schedule(
            channel_id,
            &RepeatScheduleCreateRequest {
                member_id: LEADER,
                start_date: start,
                end_date: end,
                cycle,
                situation: RepeatSituation::for_date(start, cycle),
                details: details("series"),
            },
        )
        .unwrap()
}

/// Weekly Sunday series 2024-09-01..2024-12-29.
pub fn autumn_weekly(service: &TestService<'_>, channel_id: StudyChannelId) -> RepeatSchedule {
    create_repeat(
        service,
        channel_id,
        date(2024, 9, 1),
        date(2024, 12, 29),
        RepeatCycle::Weekly,
    )
}

pub fn repeats(service: &TestService<'_>, channel_id: StudyChannelId) -> Vec<RepeatSchedule> {
    use studybadge_core::ScheduleRepository;
    service.repo().list_repeats(channel_id).unwrap()
}

pub fn singles(service: &TestService<'_>, channel_id: StudyChannelId) -> Vec<SingleSchedule> {
    use studybadge_core::ScheduleRepository;
    service.repo().list_singles(channel_id).unwrap()
}
