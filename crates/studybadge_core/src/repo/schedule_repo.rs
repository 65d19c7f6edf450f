//! Schedule repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide save/find/delete/range-query APIs over `single_schedules` and
//!   `repeat_schedules`.
//! - Apply one engine operation's mutation set atomically.
//!
//! # Invariants
//! - Write paths call `validate()` before SQL mutations.
//! - Updates and deletes issued from a mutation set match on
//!   `(id, version)`; a mismatch is a `Conflict`, never a silent overwrite.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::channel::StudyChannelId;
use crate::model::mutation::ScheduleMutation;
use crate::model::schedule::{
    RepeatCycle, RepeatSchedule, RepeatSituation, ScheduleDetails, ScheduleId,
    ScheduleValidationError, SingleSchedule,
};
use crate::recurrence::month_bounds_of;
use chrono::NaiveDate;
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::time::Instant;
use thiserror::Error;
use uuid::Uuid;

const SINGLE_SELECT_SQL: &str = "SELECT
    id,
    study_channel_id,
    schedule_name,
    schedule_content,
    schedule_date,
    start_time,
    end_time,
    place_id,
    version
FROM single_schedules";

const REPEAT_SELECT_SQL: &str = "SELECT
    id,
    study_channel_id,
    schedule_name,
    schedule_content,
    repeat_start_date,
    repeat_end_date,
    repeat_cycle,
    repeat_situation,
    start_time,
    end_time,
    place_id,
    version
FROM repeat_schedules";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for schedule and directory persistence.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{0}")]
    Validation(#[from] ScheduleValidationError),
    #[error("{0}")]
    Db(#[from] DbError),
    #[error("schedule not found: {0}")]
    NotFound(ScheduleId),
    /// Another writer changed the record after it was loaded.
    #[error("schedule {id} was modified concurrently (expected version {expected_version})")]
    Conflict {
        id: ScheduleId,
        expected_version: i64,
    },
    #[error("repository requires schema version {expected_version}, got {actual_version}")]
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    #[error("invalid persisted schedule data: {0}")]
    InvalidData(String),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence contract consumed by the schedule engine.
pub trait ScheduleRepository {
    /// Inserts or updates by identity; returns the stored record.
    fn save_single(&self, schedule: &SingleSchedule) -> RepoResult<SingleSchedule>;
    fn find_single(&self, id: ScheduleId) -> RepoResult<Option<SingleSchedule>>;
    fn delete_single(&self, id: ScheduleId) -> RepoResult<()>;
    fn list_singles(&self, channel_id: StudyChannelId) -> RepoResult<Vec<SingleSchedule>>;
    /// Singles dated inside `[from, to]`, ordered by date.
    fn list_singles_in_range(
        &self,
        channel_id: StudyChannelId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepoResult<Vec<SingleSchedule>>;

    /// Inserts or updates by identity; returns the stored record.
    fn save_repeat(&self, schedule: &RepeatSchedule) -> RepoResult<RepeatSchedule>;
    fn find_repeat(&self, id: ScheduleId) -> RepoResult<Option<RepeatSchedule>>;
    fn delete_repeat(&self, id: ScheduleId) -> RepoResult<()>;
    fn list_repeats(&self, channel_id: StudyChannelId) -> RepoResult<Vec<RepeatSchedule>>;
    /// Series whose range intersects the month containing `any_date_in_month`.
    fn list_repeats_in_month(
        &self,
        channel_id: StudyChannelId,
        any_date_in_month: NaiveDate,
    ) -> RepoResult<Vec<RepeatSchedule>>;
    /// Series whose range intersects `[from, to]`.
    fn list_repeats_in_range(
        &self,
        channel_id: StudyChannelId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepoResult<Vec<RepeatSchedule>>;

    /// Applies all mutations in one transaction and returns them with the
    /// stored versions filled in. Any failure rolls back every write.
    fn apply_mutations(
        &self,
        mutations: Vec<ScheduleMutation>,
    ) -> RepoResult<Vec<ScheduleMutation>>;
}

/// SQLite-backed schedule repository.
pub struct SqliteScheduleRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteScheduleRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_migrated(conn)?;
        Ok(Self { conn })
    }
}

impl ScheduleRepository for SqliteScheduleRepository<'_> {
    fn save_single(&self, schedule: &SingleSchedule) -> RepoResult<SingleSchedule> {
        if single_exists(self.conn, schedule.id)? {
            update_single(self.conn, schedule)
        } else {
            insert_single(self.conn, schedule)?;
            Ok(schedule.clone())
        }
    }

    fn find_single(&self, id: ScheduleId) -> RepoResult<Option<SingleSchedule>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SINGLE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_single_row(row)?)),
            None => Ok(None),
        }
    }

    fn delete_single(&self, id: ScheduleId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM single_schedules WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn list_singles(&self, channel_id: StudyChannelId) -> RepoResult<Vec<SingleSchedule>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SINGLE_SELECT_SQL}
             WHERE study_channel_id = ?1
             ORDER BY schedule_date ASC, start_time ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([channel_id])?;
        let mut schedules = Vec::new();
        while let Some(row) = rows.next()? {
            schedules.push(parse_single_row(row)?);
        }
        Ok(schedules)
    }

    fn list_singles_in_range(
        &self,
        channel_id: StudyChannelId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepoResult<Vec<SingleSchedule>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SINGLE_SELECT_SQL}
             WHERE study_channel_id = ?1
               AND schedule_date BETWEEN ?2 AND ?3
             ORDER BY schedule_date ASC, start_time ASC, id ASC;"
        ))?;
        let mut rows = stmt.query(params![channel_id, from, to])?;
        let mut schedules = Vec::new();
        while let Some(row) = rows.next()? {
            schedules.push(parse_single_row(row)?);
        }
        Ok(schedules)
    }

    fn save_repeat(&self, schedule: &RepeatSchedule) -> RepoResult<RepeatSchedule> {
        if repeat_exists(self.conn, schedule.id)? {
            update_repeat(self.conn, schedule)
        } else {
            insert_repeat(self.conn, schedule)?;
            Ok(schedule.clone())
        }
    }

    fn find_repeat(&self, id: ScheduleId) -> RepoResult<Option<RepeatSchedule>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{REPEAT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_repeat_row(row)?)),
            None => Ok(None),
        }
    }

    fn delete_repeat(&self, id: ScheduleId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM repeat_schedules WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn list_repeats(&self, channel_id: StudyChannelId) -> RepoResult<Vec<RepeatSchedule>> {
        let mut stmt = self.conn.prepare(&format!(
            "{REPEAT_SELECT_SQL}
             WHERE study_channel_id = ?1
             ORDER BY repeat_start_date ASC, start_time ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([channel_id])?;
        let mut schedules = Vec::new();
        while let Some(row) = rows.next()? {
            schedules.push(parse_repeat_row(row)?);
        }
        Ok(schedules)
    }

    fn list_repeats_in_month(
        &self,
        channel_id: StudyChannelId,
        any_date_in_month: NaiveDate,
    ) -> RepoResult<Vec<RepeatSchedule>> {
        let (first, last) = month_bounds_of(any_date_in_month).ok_or_else(|| {
            RepoError::InvalidData(format!("no month bounds for {any_date_in_month}"))
        })?;
        self.list_repeats_in_range(channel_id, first, last)
    }

    fn list_repeats_in_range(
        &self,
        channel_id: StudyChannelId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepoResult<Vec<RepeatSchedule>> {
        let mut stmt = self.conn.prepare(&format!(
            "{REPEAT_SELECT_SQL}
             WHERE study_channel_id = ?1
               AND repeat_start_date <= ?3
               AND repeat_end_date >= ?2
             ORDER BY repeat_start_date ASC, start_time ASC, id ASC;"
        ))?;
        let mut rows = stmt.query(params![channel_id, from, to])?;
        let mut schedules = Vec::new();
        while let Some(row) = rows.next()? {
            schedules.push(parse_repeat_row(row)?);
        }
        Ok(schedules)
    }

    fn apply_mutations(
        &self,
        mutations: Vec<ScheduleMutation>,
    ) -> RepoResult<Vec<ScheduleMutation>> {
        let started_at = Instant::now();
        let count = mutations.len();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let mut applied = Vec::with_capacity(count);
        for mutation in mutations {
            match apply_one(&tx, mutation) {
                Ok(stored) => applied.push(stored),
                Err(err) => {
                    error!(
                        "event=schedule_apply module=repo status=error mutations={count} duration_ms={} error={err}",
                        started_at.elapsed().as_millis()
                    );
                    // Dropping `tx` rolls back every write made so far.
                    return Err(err);
                }
            }
        }
        tx.commit()?;

        info!(
            "event=schedule_apply module=repo status=ok mutations={count} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(applied)
    }
}

fn apply_one(conn: &Connection, mutation: ScheduleMutation) -> RepoResult<ScheduleMutation> {
    match mutation {
        ScheduleMutation::InsertSingle(schedule) => {
            insert_single(conn, &schedule)?;
            Ok(ScheduleMutation::InsertSingle(schedule))
        }
        ScheduleMutation::UpdateSingle { before, after } => {
            let stored = update_single(conn, &after)?;
            Ok(ScheduleMutation::UpdateSingle {
                before,
                after: stored,
            })
        }
        ScheduleMutation::DeleteSingle(schedule) => {
            delete_versioned(conn, "single_schedules", schedule.id, schedule.version)?;
            Ok(ScheduleMutation::DeleteSingle(schedule))
        }
        ScheduleMutation::InsertRepeat(schedule) => {
            insert_repeat(conn, &schedule)?;
            Ok(ScheduleMutation::InsertRepeat(schedule))
        }
        ScheduleMutation::UpdateRepeat { before, after } => {
            let stored = update_repeat(conn, &after)?;
            Ok(ScheduleMutation::UpdateRepeat {
                before,
                after: stored,
            })
        }
        ScheduleMutation::DeleteRepeat(schedule) => {
            delete_versioned(conn, "repeat_schedules", schedule.id, schedule.version)?;
            Ok(ScheduleMutation::DeleteRepeat(schedule))
        }
    }
}

fn insert_single(conn: &Connection, schedule: &SingleSchedule) -> RepoResult<()> {
    schedule.validate()?;
    let details = &schedule.details;
    conn.execute(
        "INSERT INTO single_schedules (
            id,
            study_channel_id,
            schedule_name,
            schedule_content,
            schedule_date,
            start_time,
            end_time,
            place_id,
            version
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
        params![
            schedule.id.to_string(),
            schedule.channel_id,
            details.name.as_str(),
            details.content.as_str(),
            schedule.date,
            details.start_time,
            details.end_time,
            details.place_id,
            schedule.version,
        ],
    )?;
    Ok(())
}

fn update_single(conn: &Connection, schedule: &SingleSchedule) -> RepoResult<SingleSchedule> {
    schedule.validate()?;
    let details = &schedule.details;
    let changed = conn.execute(
        "UPDATE single_schedules
         SET
            schedule_name = ?1,
            schedule_content = ?2,
            schedule_date = ?3,
            start_time = ?4,
            end_time = ?5,
            place_id = ?6,
            version = version + 1,
            updated_at = (strftime('%s', 'now') * 1000)
         WHERE id = ?7 AND version = ?8;",
        params![
            details.name.as_str(),
            details.content.as_str(),
            schedule.date,
            details.start_time,
            details.end_time,
            details.place_id,
            schedule.id.to_string(),
            schedule.version,
        ],
    )?;

    if changed == 0 {
        return Err(missing_or_conflict(
            single_exists(conn, schedule.id)?,
            schedule.id,
            schedule.version,
        ));
    }

    Ok(SingleSchedule {
        version: schedule.version + 1,
        ..schedule.clone()
    })
}

fn insert_repeat(conn: &Connection, schedule: &RepeatSchedule) -> RepoResult<()> {
    schedule.validate()?;
    let details = &schedule.details;
    conn.execute(
        "INSERT INTO repeat_schedules (
            id,
            study_channel_id,
            schedule_name,
            schedule_content,
            repeat_start_date,
            repeat_end_date,
            repeat_cycle,
            repeat_situation,
            start_time,
            end_time,
            place_id,
            version
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12);",
        params![
            schedule.id.to_string(),
            schedule.channel_id,
            details.name.as_str(),
            details.content.as_str(),
            schedule.start_date,
            schedule.end_date,
            schedule.cycle.as_str(),
            schedule.situation.to_db(),
            details.start_time,
            details.end_time,
            details.place_id,
            schedule.version,
        ],
    )?;
    Ok(())
}

fn update_repeat(conn: &Connection, schedule: &RepeatSchedule) -> RepoResult<RepeatSchedule> {
    schedule.validate()?;
    let details = &schedule.details;
    let changed = conn.execute(
        "UPDATE repeat_schedules
         SET
            schedule_name = ?1,
            schedule_content = ?2,
            repeat_start_date = ?3,
            repeat_end_date = ?4,
            repeat_cycle = ?5,
            repeat_situation = ?6,
            start_time = ?7,
            end_time = ?8,
            place_id = ?9,
            version = version + 1,
            updated_at = (strftime('%s', 'now') * 1000)
         WHERE id = ?10 AND version = ?11;",
        params![
            details.name.as_str(),
            details.content.as_str(),
            schedule.start_date,
            schedule.end_date,
            schedule.cycle.as_str(),
            schedule.situation.to_db(),
            details.start_time,
            details.end_time,
            details.place_id,
            schedule.id.to_string(),
            schedule.version,
        ],
    )?;

    if changed == 0 {
        return Err(missing_or_conflict(
            repeat_exists(conn, schedule.id)?,
            schedule.id,
            schedule.version,
        ));
    }

    Ok(RepeatSchedule {
        version: schedule.version + 1,
        ..schedule.clone()
    })
}

fn delete_versioned(
    conn: &Connection,
    table: &'static str,
    id: ScheduleId,
    version: i64,
) -> RepoResult<()> {
    let changed = conn.execute(
        &format!("DELETE FROM {table} WHERE id = ?1 AND version = ?2;"),
        params![id.to_string(), version],
    )?;
    if changed == 0 {
        return Err(missing_or_conflict(
            row_exists(conn, table, id)?,
            id,
            version,
        ));
    }
    Ok(())
}

fn missing_or_conflict(exists: bool, id: ScheduleId, expected_version: i64) -> RepoError {
    if exists {
        RepoError::Conflict {
            id,
            expected_version,
        }
    } else {
        RepoError::NotFound(id)
    }
}

fn single_exists(conn: &Connection, id: ScheduleId) -> RepoResult<bool> {
    row_exists(conn, "single_schedules", id)
}

fn repeat_exists(conn: &Connection, id: ScheduleId) -> RepoResult<bool> {
    row_exists(conn, "repeat_schedules", id)
}

fn row_exists(conn: &Connection, table: &'static str, id: ScheduleId) -> RepoResult<bool> {
    let found = conn
        .query_row(
            &format!("SELECT 1 FROM {table} WHERE id = ?1;"),
            [id.to_string()],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn parse_single_row(row: &Row<'_>) -> RepoResult<SingleSchedule> {
    let schedule = SingleSchedule {
        id: parse_uuid(row, "single_schedules")?,
        channel_id: row.get("study_channel_id")?,
        date: row.get("schedule_date")?,
        details: parse_details(row)?,
        version: row.get("version")?,
    };
    schedule.validate()?;
    Ok(schedule)
}

fn parse_repeat_row(row: &Row<'_>) -> RepoResult<RepeatSchedule> {
    let cycle_text: String = row.get("repeat_cycle")?;
    let cycle = RepeatCycle::parse(&cycle_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid repeat cycle `{cycle_text}` in repeat_schedules.repeat_cycle"
        ))
    })?;

    let situation_text: String = row.get("repeat_situation")?;
    let situation = RepeatSituation::parse(&situation_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid repeat situation `{situation_text}` in repeat_schedules.repeat_situation"
        ))
    })?;

    let schedule = RepeatSchedule {
        id: parse_uuid(row, "repeat_schedules")?,
        channel_id: row.get("study_channel_id")?,
        start_date: row.get("repeat_start_date")?,
        end_date: row.get("repeat_end_date")?,
        cycle,
        situation,
        details: parse_details(row)?,
        version: row.get("version")?,
    };
    schedule.validate()?;
    Ok(schedule)
}

fn parse_details(row: &Row<'_>) -> RepoResult<ScheduleDetails> {
    Ok(ScheduleDetails {
        name: row.get("schedule_name")?,
        content: row.get("schedule_content")?,
        start_time: row.get("start_time")?,
        end_time: row.get("end_time")?,
        place_id: row.get("place_id")?,
    })
}

fn parse_uuid(row: &Row<'_>, table: &str) -> RepoResult<ScheduleId> {
    let text: String = row.get("id")?;
    Uuid::parse_str(&text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{text}` in {table}.id")))
}

/// Rejects connections that have not been migrated to the latest schema.
pub(crate) fn ensure_connection_migrated(conn: &Connection) -> RepoResult<()> {
    let actual_version = current_user_version(conn)?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}
