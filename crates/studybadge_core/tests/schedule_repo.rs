use chrono::{NaiveDate, NaiveTime, Weekday};
use studybadge_core::{
    open_db_in_memory, ChannelDirectory, RepeatCycle, RepeatSchedule, RepeatSituation, RepoError,
    ScheduleDetails, ScheduleRepository, SingleSchedule, SqliteScheduleRepository,
    SqliteStudyDirectory,
};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn details(name: &str) -> ScheduleDetails {
    ScheduleDetails {
        name: name.to_string(),
        content: "chapter 3".to_string(),
        start_time: NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(21, 0, 0).unwrap(),
        place_id: None,
    }
}

#[test]
fn channel_exists_tracks_created_channels() {
    let conn = open_db_in_memory().unwrap();
    let directory = SqliteStudyDirectory::try_new(&conn).unwrap();

    let channel = directory.create_channel("  algorithms ").unwrap();
    assert_eq!(channel.name, "algorithms");
    assert!(directory.channel_exists(channel.id).unwrap());
    assert!(!directory.channel_exists(channel.id + 1).unwrap());
}

#[test]
fn single_save_update_and_delete_round_trip() {
    let conn = open_db_in_memory().unwrap();
    let channel = SqliteStudyDirectory::try_new(&conn)
        .unwrap()
        .create_channel("algorithms")
        .unwrap();
    let repo = SqliteScheduleRepository::try_new(&conn).unwrap();

    let single = SingleSchedule::new(channel.id, date(2024, 9, 3), details("review"));
    let stored = repo.save_single(&single).unwrap();
    assert_eq!(stored, single);
    assert_eq!(repo.find_single(single.id).unwrap(), Some(single.clone()));

    let mut renamed = stored.clone();
    renamed.details.name = "graph review".to_string();
    let updated = repo.save_single(&renamed).unwrap();
    assert_eq!(updated.version, stored.version + 1);
    assert_eq!(
        repo.find_single(single.id).unwrap().unwrap().details.name,
        "graph review"
    );

    let stale = repo.save_single(&renamed).unwrap_err();
    assert!(matches!(stale, RepoError::Conflict { id, .. } if id == single.id));

    repo.delete_single(single.id).unwrap();
    assert_eq!(repo.find_single(single.id).unwrap(), None);
    assert!(repo.list_singles(channel.id).unwrap().is_empty());

    let missing = repo.delete_single(single.id).unwrap_err();
    assert!(matches!(missing, RepoError::NotFound(id) if id == single.id));
}

#[test]
fn repeat_save_and_delete_round_trip() {
    let conn = open_db_in_memory().unwrap();
    let channel = SqliteStudyDirectory::try_new(&conn)
        .unwrap()
        .create_channel("algorithms")
        .unwrap();
    let repo = SqliteScheduleRepository::try_new(&conn).unwrap();

    let series = RepeatSchedule::new(
        channel.id,
        date(2024, 9, 1),
        date(2024, 12, 29),
        RepeatCycle::Weekly,
        RepeatSituation::Weekday(Weekday::Sun),
        details("weekly sync"),
    );
    repo.save_repeat(&series).unwrap();
    assert_eq!(repo.list_repeats(channel.id).unwrap(), vec![series.clone()]);

    repo.delete_repeat(series.id).unwrap();
    assert_eq!(repo.find_repeat(series.id).unwrap(), None);

    let missing = repo.delete_repeat(series.id).unwrap_err();
    assert!(matches!(missing, RepoError::NotFound(id) if id == series.id));
}

#[test]
fn save_repeat_rejects_one_date_series() {
    let conn = open_db_in_memory().unwrap();
    let channel = SqliteStudyDirectory::try_new(&conn)
        .unwrap()
        .create_channel("algorithms")
        .unwrap();
    let repo = SqliteScheduleRepository::try_new(&conn).unwrap();

    let series = RepeatSchedule::new(
        channel.id,
        date(2024, 9, 1),
        date(2024, 9, 1),
        RepeatCycle::Weekly,
        RepeatSituation::Weekday(Weekday::Sun),
        details("weekly sync"),
    );
    let err = repo.save_repeat(&series).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert!(repo.list_repeats(channel.id).unwrap().is_empty());
}
