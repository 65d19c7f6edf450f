//! Planner for excising one occurrence from a repeating series.
//!
//! # Responsibility
//! - Turn `(series, date, scope, replacement)` into the exact list of
//!   persistence mutations: shrink, split, delete, or materialize singles.
//! - Apply the collapse rule to every recomputed series.
//!
//! # Invariants
//! - Pure: no I/O, no clock reads.
//! - No emitted `InsertRepeat`/`UpdateRepeat` has `start_date == end_date`.
//! - Recomputed boundaries always land on real occurrences of the series.

use crate::model::mutation::ScheduleMutation;
use crate::model::schedule::{RepeatCycle, RepeatSchedule, RepeatSituation, ScheduleId, SingleSchedule};
use crate::recurrence::{
    classify_position, is_member, is_situation_consistent, occurrence_dates, step_backward,
    step_forward, SeriesPosition,
};
use crate::service::request::EditScope;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeriesPlanError {
    #[error("{date} is not an occurrence of repeating schedule {schedule_id}")]
    NotIncluded {
        date: NaiveDate,
        schedule_id: ScheduleId,
    },
    #[error("{date} does not satisfy {cycle} situation {situation}")]
    InvalidSituation {
        date: NaiveDate,
        cycle: RepeatCycle,
        situation: RepeatSituation,
    },
    #[error("date arithmetic left the supported range near {0}")]
    DateOutOfRange(NaiveDate),
}

/// Plans removal of `date` from `series` under `scope`.
///
/// `replacement`, when given, is materialized after the series is reshaped;
/// edits pass the edited single occurrence, deletes pass `None`.
pub fn plan_occurrence_removal(
    series: &RepeatSchedule,
    date: NaiveDate,
    scope: EditScope,
    replacement: Option<SingleSchedule>,
) -> Result<Vec<ScheduleMutation>, SeriesPlanError> {
    if !is_member(date, series.cycle, series.start_date, series.end_date) {
        return Err(SeriesPlanError::NotIncluded {
            date,
            schedule_id: series.id,
        });
    }

    let position = classify_position(date, series.cycle, series.start_date, series.end_date);
    let mut mutations = Vec::new();

    match (scope, position) {
        (EditScope::ThisAndFuture, SeriesPosition::First) => {
            mutations.push(ScheduleMutation::DeleteRepeat(series.clone()));
        }
        // TODO: confirm with product whether occurrences after the second
        // should survive here; the whole series is dropped today.
        (EditScope::ThisAndFuture, SeriesPosition::Second) => {
            mutations.push(ScheduleMutation::InsertSingle(
                series.single_at(series.start_date),
            ));
            mutations.push(ScheduleMutation::DeleteRepeat(series.clone()));
        }
        (
            EditScope::ThisAndFuture,
            SeriesPosition::Middle | SeriesPosition::PreLast | SeriesPosition::Last,
        )
        | (EditScope::ThisOnly, SeriesPosition::Last) => {
            let end = last_occurrence_before(series, date)?;
            reshape(series, series.start_date, end, &mut mutations)?;
        }
        (EditScope::ThisOnly, SeriesPosition::First) => {
            let start = first_occurrence_after(series, date)?;
            reshape(series, start, series.end_date, &mut mutations)?;
        }
        (EditScope::ThisOnly, SeriesPosition::Second) => {
            mutations.push(ScheduleMutation::InsertSingle(
                series.single_at(series.start_date),
            ));
            let start = first_occurrence_after(series, date)?;
            reshape(series, start, series.end_date, &mut mutations)?;
        }
        (EditScope::ThisOnly, SeriesPosition::PreLast) => {
            mutations.push(ScheduleMutation::InsertSingle(series.single_at(series.end_date)));
            let end = last_occurrence_before(series, date)?;
            reshape(series, series.start_date, end, &mut mutations)?;
        }
        (EditScope::ThisOnly, SeriesPosition::Middle) => {
            let right_start = first_occurrence_after(series, date)?;
            ensure_situation(series, right_start)?;
            let right = series.with_range(right_start, series.end_date);
            mutations.push(if right.is_degenerate() {
                ScheduleMutation::InsertSingle(right.single_at(right.start_date))
            } else {
                ScheduleMutation::InsertRepeat(right)
            });

            let left_end = last_occurrence_before(series, date)?;
            reshape(series, series.start_date, left_end, &mut mutations)?;
        }
    }

    if let Some(single) = replacement {
        mutations.push(ScheduleMutation::InsertSingle(single));
    }

    Ok(mutations)
}

/// Rewrites `series` to `[start, end]`, collapsing it when one date remains.
fn reshape(
    series: &RepeatSchedule,
    start: NaiveDate,
    end: NaiveDate,
    mutations: &mut Vec<ScheduleMutation>,
) -> Result<(), SeriesPlanError> {
    if start != series.start_date {
        ensure_situation(series, start)?;
    }

    if start == end {
        mutations.push(ScheduleMutation::InsertSingle(series.single_at(start)));
        mutations.push(ScheduleMutation::DeleteRepeat(series.clone()));
        return Ok(());
    }

    let mut after = series.clone();
    after.start_date = start;
    after.end_date = end;
    mutations.push(ScheduleMutation::UpdateRepeat {
        before: series.clone(),
        after,
    });
    Ok(())
}

fn ensure_situation(series: &RepeatSchedule, start: NaiveDate) -> Result<(), SeriesPlanError> {
    if is_situation_consistent(start, series.cycle, series.situation) {
        Ok(())
    } else {
        Err(SeriesPlanError::InvalidSituation {
            date: start,
            cycle: series.cycle,
            situation: series.situation,
        })
    }
}

/// One cycle step after `date`, snapped forward onto a real occurrence.
fn first_occurrence_after(
    series: &RepeatSchedule,
    date: NaiveDate,
) -> Result<NaiveDate, SeriesPlanError> {
    let stepped = step_forward(date, series.cycle).ok_or(SeriesPlanError::DateOutOfRange(date))?;
    occurrence_dates(series.cycle, series.start_date, series.end_date)
        .find(|candidate| *candidate >= stepped)
        .ok_or(SeriesPlanError::DateOutOfRange(stepped))
}

/// One cycle step before `date`, snapped back onto a real occurrence.
fn last_occurrence_before(
    series: &RepeatSchedule,
    date: NaiveDate,
) -> Result<NaiveDate, SeriesPlanError> {
    let stepped = step_backward(date, series.cycle).ok_or(SeriesPlanError::DateOutOfRange(date))?;
    occurrence_dates(series.cycle, series.start_date, series.end_date)
        .take_while(|candidate| *candidate <= stepped)
        .last()
        .ok_or(SeriesPlanError::DateOutOfRange(stepped))
}
