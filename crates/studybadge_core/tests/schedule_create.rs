mod common;

use chrono::Weekday;
use common::{
    autumn_weekly, create_single, date, details, repeats, seed_channel, service, singles,
    Recorded, LEADER, OUTSIDER, PARTICIPANT,
};
use studybadge_core::{
    open_db_in_memory, NoticeKind, RepeatCycle, RepeatScheduleCreateRequest, RepeatSituation,
    ScheduleRepository, ScheduleServiceError, ScheduleValidationError,
    SingleScheduleCreateRequest,
};

#[test]
fn create_single_persists_and_registers_notification() {
    let conn = open_db_in_memory().unwrap();
    let channel_id = seed_channel(&conn, "algorithms");
    let service = service(&conn);

    let created = create_single(&service, channel_id, date(2024, 9, 3));

    let loaded = service.repo().find_single(created.id).unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.details.place_id, Some(42));
    assert_eq!(
        service.notifier().events(),
        vec![
            Recorded::ScheduleSingle {
                id: created.id,
                date: date(2024, 9, 3),
            },
            Recorded::Announce {
                kind: NoticeKind::ScheduleCreate,
                date: date(2024, 9, 3),
            },
        ]
    );
}

#[test]
fn create_repeat_persists_series_and_registers_notification() {
    let conn = open_db_in_memory().unwrap();
    let channel_id = seed_channel(&conn, "algorithms");
    let service = service(&conn);

    let series = autumn_weekly(&service, channel_id);

    let loaded = service.repo().find_repeat(series.id).unwrap().unwrap();
    assert_eq!(loaded.start_date, date(2024, 9, 1));
    assert_eq!(loaded.end_date, date(2024, 12, 29));
    assert_eq!(loaded.cycle, RepeatCycle::Weekly);
    assert_eq!(loaded.situation, RepeatSituation::Weekday(Weekday::Sun));
    assert_eq!(
        service.notifier().events()[0],
        Recorded::ScheduleRepeat {
            id: series.id,
            start: date(2024, 9, 1),
            end: date(2024, 12, 29),
        }
    );
}

#[test]
fn create_repeat_rejects_inconsistent_situation() {
    let conn = open_db_in_memory().unwrap();
    let channel_id = seed_channel(&conn, "algorithms");
    let service = service(&conn);

    let err = service
        .create_repeat_schedule(
            channel_id,
            &RepeatScheduleCreateRequest {
                member_id: LEADER,
                start_date: date(2024, 9, 1),
                end_date: date(2024, 12, 29),
                cycle: RepeatCycle::Weekly,
                situation: RepeatSituation::Weekday(Weekday::Mon),
                details: details("series"),
            },
        )
        .unwrap_err();

    assert!(matches!(
        err,
        ScheduleServiceError::InvalidRepeatSituation {
            cycle: RepeatCycle::Weekly,
            ..
        }
    ));
    assert!(repeats(&service, channel_id).is_empty());
    assert!(service.notifier().events().is_empty());
}

#[test]
fn create_repeat_rejects_monthly_day_mismatch() {
    let conn = open_db_in_memory().unwrap();
    let channel_id = seed_channel(&conn, "algorithms");
    let service = service(&conn);

    let err = service
        .create_repeat_schedule(
            channel_id,
            &RepeatScheduleCreateRequest {
                member_id: LEADER,
                start_date: date(2024, 9, 15),
                end_date: date(2024, 12, 15),
                cycle: RepeatCycle::Monthly,
                situation: RepeatSituation::DayOfMonth(14),
                details: details("series"),
            },
        )
        .unwrap_err();

    assert!(matches!(
        err,
        ScheduleServiceError::InvalidRepeatSituation { .. }
    ));
}

#[test]
fn create_repeat_rejects_series_without_range() {
    let conn = open_db_in_memory().unwrap();
    let channel_id = seed_channel(&conn, "algorithms");
    let service = service(&conn);

    let err = service
        .create_repeat_schedule(
            channel_id,
            &RepeatScheduleCreateRequest {
                member_id: LEADER,
                start_date: date(2024, 9, 1),
                end_date: date(2024, 9, 1),
                cycle: RepeatCycle::Weekly,
                situation: RepeatSituation::Weekday(Weekday::Sun),
                details: details("series"),
            },
        )
        .unwrap_err();

    assert!(matches!(
        err,
        ScheduleServiceError::InvalidSchedule(ScheduleValidationError::InvalidSeriesRange { .. })
    ));
    assert!(repeats(&service, channel_id).is_empty());
}

#[test]
fn create_single_rejects_blank_name_and_reversed_times() {
    let conn = open_db_in_memory().unwrap();
    let channel_id = seed_channel(&conn, "algorithms");
    let service = service(&conn);

    let blank = details("  ");
    let err = service
        .create_single_schedule(
            channel_id,
            &SingleScheduleCreateRequest {
                member_id: LEADER,
                date: date(2024, 9, 3),
                details: blank,
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ScheduleServiceError::InvalidSchedule(ScheduleValidationError::BlankName)
    ));

    let mut reversed = details("review");
    std::mem::swap(&mut reversed.start_time, &mut reversed.end_time);
    let err = service
        .create_single_schedule(
            channel_id,
            &SingleScheduleCreateRequest {
                member_id: LEADER,
                date: date(2024, 9, 3),
                details: reversed,
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ScheduleServiceError::InvalidSchedule(ScheduleValidationError::EndBeforeStart { .. })
    ));
    assert!(singles(&service, channel_id).is_empty());
}

#[test]
fn create_requires_existing_channel_and_leader() {
    let conn = open_db_in_memory().unwrap();
    let channel_id = seed_channel(&conn, "algorithms");
    let service = service(&conn);
    let request = |member_id| SingleScheduleCreateRequest {
        member_id,
        date: date(2024, 9, 3),
        details: details("review"),
    };

    let err = service
        .create_single_schedule(channel_id + 100, &request(LEADER))
        .unwrap_err();
    assert!(matches!(
        err,
        ScheduleServiceError::NotFoundStudyChannel(id) if id == channel_id + 100
    ));

    let err = service
        .create_single_schedule(channel_id, &request(PARTICIPANT))
        .unwrap_err();
    assert!(matches!(
        err,
        ScheduleServiceError::NotStudyLeader {
            member_id: PARTICIPANT,
            ..
        }
    ));

    let err = service
        .create_single_schedule(channel_id, &request(OUTSIDER))
        .unwrap_err();
    assert!(matches!(
        err,
        ScheduleServiceError::NotStudyMember {
            member_id: OUTSIDER,
            ..
        }
    ));

    assert!(singles(&service, channel_id).is_empty());
    assert!(service.notifier().events().is_empty());
}

#[test]
fn leader_of_one_channel_cannot_create_in_another() {
    let conn = open_db_in_memory().unwrap();
    let first = seed_channel(&conn, "algorithms");
    let directory = studybadge_core::SqliteStudyDirectory::try_new(&conn).unwrap();
    let second = directory.create_channel("databases").unwrap();
    let service = service(&conn);

    let err = service
        .create_single_schedule(
            second.id,
            &SingleScheduleCreateRequest {
                member_id: LEADER,
                date: date(2024, 9, 3),
                details: details("review"),
            },
        )
        .unwrap_err();

    assert!(matches!(err, ScheduleServiceError::NotStudyMember { .. }));
    assert!(singles(&service, first).is_empty());
}
