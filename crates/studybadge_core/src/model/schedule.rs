//! Schedule (occurrence) domain model.
//!
//! # Responsibility
//! - Define the two occurrence kinds: one-off `SingleSchedule` and recurring
//!   `RepeatSchedule`.
//! - Define the recurrence vocabulary (`RepeatCycle`, `RepeatSituation`).
//! - Provide invariant checks used by repositories before any write.
//!
//! # Invariants
//! - `id` is stable and never reused for another schedule.
//! - `details.end_time` is never earlier than `details.start_time`.
//! - A persisted `RepeatSchedule` always has `start_date < end_date`; a
//!   one-date-wide series is represented as a `SingleSchedule` instead.

use crate::model::channel::StudyChannelId;
use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;
use uuid::Uuid;

/// Stable identifier for both schedule kinds.
pub type ScheduleId = Uuid;

/// Opaque reference to an externally managed place.
pub type PlaceId = i64;

/// Which schedule table an edit request originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleType {
    Single,
    Repeat,
}

/// Stepping unit of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatCycle {
    Daily,
    Weekly,
    Monthly,
}

impl RepeatCycle {
    /// Stable storage/wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    /// Parses the storage/wire name, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }
}

impl Display for RepeatCycle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cycle-specific constraint every date of a series must satisfy.
///
/// `Everyday` is the natural pairing for `RepeatCycle::Daily`; daily series
/// accept any situation, matching how daily cycles ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RepeatSituation {
    Everyday,
    Weekday(Weekday),
    DayOfMonth(u32),
}

impl RepeatSituation {
    /// Derives the situation a series starting on `date` naturally has.
    pub fn for_date(date: NaiveDate, cycle: RepeatCycle) -> Self {
        match cycle {
            RepeatCycle::Daily => Self::Everyday,
            RepeatCycle::Weekly => Self::Weekday(date.weekday()),
            RepeatCycle::Monthly => Self::DayOfMonth(date.day()),
        }
    }

    /// Storage encoding: `everyday`, a lowercase weekday name, or `1..=31`.
    pub fn to_db(self) -> String {
        match self {
            Self::Everyday => "everyday".to_string(),
            Self::Weekday(weekday) => weekday_name(weekday).to_string(),
            Self::DayOfMonth(day) => day.to_string(),
        }
    }

    /// Inverse of [`RepeatSituation::to_db`]. Also accepts short weekday
    /// names (`mon`, `TUE`) for CLI input.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        if normalized == "everyday" {
            return Some(Self::Everyday);
        }
        if let Ok(day) = normalized.parse::<u32>() {
            return (1..=31).contains(&day).then_some(Self::DayOfMonth(day));
        }
        normalized.parse::<Weekday>().ok().map(Self::Weekday)
    }
}

impl Display for RepeatSituation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_db())
    }
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Mutable, user-facing fields shared by both schedule kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDetails {
    pub name: String,
    pub content: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub place_id: Option<PlaceId>,
}

impl ScheduleDetails {
    /// Checks field-level invariants.
    pub fn validate(&self) -> Result<(), ScheduleValidationError> {
        if self.name.trim().is_empty() {
            return Err(ScheduleValidationError::BlankName);
        }
        if self.end_time < self.start_time {
            return Err(ScheduleValidationError::EndBeforeStart {
                start_time: self.start_time,
                end_time: self.end_time,
            });
        }
        Ok(())
    }
}

/// Invariant violations detected on schedule records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleValidationError {
    #[error("schedule name must not be blank")]
    BlankName,
    #[error("schedule end time {end_time} is earlier than start time {start_time}")]
    EndBeforeStart {
        start_time: NaiveTime,
        end_time: NaiveTime,
    },
    #[error("series start {start_date} must be before series end {end_date}")]
    InvalidSeriesRange {
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
}

/// One meeting on exactly one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleSchedule {
    pub id: ScheduleId,
    pub channel_id: StudyChannelId,
    pub date: NaiveDate,
    pub details: ScheduleDetails,
    /// Optimistic-lock counter; `0` for records not yet updated.
    pub version: i64,
}

impl SingleSchedule {
    /// Creates a not-yet-persisted single schedule with a generated ID.
    pub fn new(channel_id: StudyChannelId, date: NaiveDate, details: ScheduleDetails) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel_id,
            date,
            details,
            version: 0,
        }
    }

    pub fn validate(&self) -> Result<(), ScheduleValidationError> {
        self.details.validate()
    }
}

/// A closed range of dates `[start_date, end_date]` stepped by `cycle`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatSchedule {
    pub id: ScheduleId,
    pub channel_id: StudyChannelId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub cycle: RepeatCycle,
    pub situation: RepeatSituation,
    pub details: ScheduleDetails,
    pub version: i64,
}

impl RepeatSchedule {
    /// Creates a not-yet-persisted series with a generated ID.
    pub fn new(
        channel_id: StudyChannelId,
        start_date: NaiveDate,
        end_date: NaiveDate,
        cycle: RepeatCycle,
        situation: RepeatSituation,
        details: ScheduleDetails,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel_id,
            start_date,
            end_date,
            cycle,
            situation,
            details,
            version: 0,
        }
    }

    /// Checks field invariants and the strict `start_date < end_date` rule.
    pub fn validate(&self) -> Result<(), ScheduleValidationError> {
        self.details.validate()?;
        if self.start_date >= self.end_date {
            return Err(ScheduleValidationError::InvalidSeriesRange {
                start_date: self.start_date,
                end_date: self.end_date,
            });
        }
        Ok(())
    }

    /// Whether the series has shrunk to a single date and must be collapsed.
    pub fn is_degenerate(&self) -> bool {
        self.start_date == self.end_date
    }

    /// Copy of this series' fields as a fresh series over another range.
    pub fn with_range(&self, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self::new(
            self.channel_id,
            start_date,
            end_date,
            self.cycle,
            self.situation,
            self.details.clone(),
        )
    }

    /// Materializes one date of this series as a standalone single schedule.
    pub fn single_at(&self, date: NaiveDate) -> SingleSchedule {
        SingleSchedule::new(self.channel_id, date, self.details.clone())
    }
}

/// Read-side union of both schedule kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Schedule {
    Single(SingleSchedule),
    Repeat(RepeatSchedule),
}

impl Schedule {
    pub fn id(&self) -> ScheduleId {
        match self {
            Self::Single(schedule) => schedule.id,
            Self::Repeat(schedule) => schedule.id,
        }
    }

    pub fn schedule_type(&self) -> ScheduleType {
        match self {
            Self::Single(_) => ScheduleType::Single,
            Self::Repeat(_) => ScheduleType::Repeat,
        }
    }
}

/// One concrete dated meeting, expanded from either schedule kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleOccurrence {
    pub schedule_id: ScheduleId,
    pub schedule_type: ScheduleType,
    pub date: NaiveDate,
    pub details: ScheduleDetails,
}

#[cfg(test)]
mod tests {
    use super::{RepeatCycle, RepeatSituation, ScheduleDetails, ScheduleValidationError};
    use chrono::{NaiveDate, NaiveTime, Weekday};

    fn details() -> ScheduleDetails {
        ScheduleDetails {
            name: "algorithms".to_string(),
            content: String::new(),
            start_time: NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(21, 0, 0).unwrap(),
            place_id: None,
        }
    }

    #[test]
    fn situation_storage_encoding_roundtrips() {
        for situation in [
            RepeatSituation::Everyday,
            RepeatSituation::Weekday(Weekday::Sun),
            RepeatSituation::DayOfMonth(31),
        ] {
            assert_eq!(RepeatSituation::parse(&situation.to_db()), Some(situation));
        }
        assert_eq!(
            RepeatSituation::parse("TUE"),
            Some(RepeatSituation::Weekday(Weekday::Tue))
        );
        assert_eq!(RepeatSituation::parse("32"), None);
        assert_eq!(RepeatSituation::parse("someday"), None);
    }

    #[test]
    fn situation_for_date_matches_cycle() {
        let date = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
        assert_eq!(
            RepeatSituation::for_date(date, RepeatCycle::Weekly),
            RepeatSituation::Weekday(Weekday::Sun)
        );
        assert_eq!(
            RepeatSituation::for_date(date, RepeatCycle::Monthly),
            RepeatSituation::DayOfMonth(1)
        );
    }

    #[test]
    fn details_reject_end_before_start() {
        let mut value = details();
        value.end_time = NaiveTime::from_hms_opt(19, 0, 0).unwrap();
        assert!(matches!(
            value.validate(),
            Err(ScheduleValidationError::EndBeforeStart { .. })
        ));
    }

    #[test]
    fn details_reject_blank_name() {
        let mut value = details();
        value.name = "   ".to_string();
        assert_eq!(value.validate(), Err(ScheduleValidationError::BlankName));
    }
}
