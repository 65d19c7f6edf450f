//! Recurrence calculator: pure date arithmetic over repeat cycles.
//!
//! # Responsibility
//! - Step dates by one cycle unit in either direction.
//! - Test series membership and situation consistency.
//! - Classify a date's position inside a series.
//! - Expand a series into concrete occurrence dates.
//!
//! # Invariants
//! - Functions here have no side effects and never read the clock.
//! - Month steps clamp to the last valid day (Jan 31 + 1 month = Feb 28/29);
//!   expansion only yields dates whose day-of-month equals the series start's.

use crate::model::schedule::{RepeatCycle, RepeatSituation};
use chrono::{Datelike, Days, Months, NaiveDate};

/// Where a member date sits inside `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesPosition {
    First,
    Second,
    Middle,
    PreLast,
    Last,
}

/// Advances `date` by one cycle unit. `None` only past chrono's date range.
pub fn step_forward(date: NaiveDate, cycle: RepeatCycle) -> Option<NaiveDate> {
    match cycle {
        RepeatCycle::Daily => date.checked_add_days(Days::new(1)),
        RepeatCycle::Weekly => date.checked_add_days(Days::new(7)),
        RepeatCycle::Monthly => date.checked_add_months(Months::new(1)),
    }
}

/// Retreats `date` by one cycle unit.
pub fn step_backward(date: NaiveDate, cycle: RepeatCycle) -> Option<NaiveDate> {
    match cycle {
        RepeatCycle::Daily => date.checked_sub_days(Days::new(1)),
        RepeatCycle::Weekly => date.checked_sub_days(Days::new(7)),
        RepeatCycle::Monthly => date.checked_sub_months(Months::new(1)),
    }
}

/// Whether `date` satisfies `situation` for `cycle`.
///
/// Daily series accept any situation. Weekly series need a matching weekday,
/// monthly series a matching day-of-month.
pub fn is_situation_consistent(
    date: NaiveDate,
    cycle: RepeatCycle,
    situation: RepeatSituation,
) -> bool {
    match (cycle, situation) {
        (RepeatCycle::Daily, _) => true,
        (RepeatCycle::Weekly, RepeatSituation::Weekday(weekday)) => date.weekday() == weekday,
        (RepeatCycle::Monthly, RepeatSituation::DayOfMonth(day)) => date.day() == day,
        _ => false,
    }
}

/// Whether `date` is one of the occurrences of the series `[start, end]`.
pub fn is_member(date: NaiveDate, cycle: RepeatCycle, start: NaiveDate, end: NaiveDate) -> bool {
    if date < start || date > end {
        return false;
    }

    match cycle {
        RepeatCycle::Daily => true,
        RepeatCycle::Weekly => (date - start).num_days() % 7 == 0,
        RepeatCycle::Monthly => date.day() == start.day(),
    }
}

/// Classifies `date` inside `[start, end]`.
///
/// Checked in order FIRST, LAST, SECOND, PRE_LAST, MIDDLE, so a two-date
/// series only ever yields `First` or `Last`.
pub fn classify_position(
    date: NaiveDate,
    cycle: RepeatCycle,
    start: NaiveDate,
    end: NaiveDate,
) -> SeriesPosition {
    if date == start {
        SeriesPosition::First
    } else if date == end {
        SeriesPosition::Last
    } else if step_forward(start, cycle) == Some(date) {
        SeriesPosition::Second
    } else if step_backward(end, cycle) == Some(date) {
        SeriesPosition::PreLast
    } else {
        SeriesPosition::Middle
    }
}

/// Expands `[start, end]` into its occurrence dates in ascending order.
pub fn occurrence_dates(
    cycle: RepeatCycle,
    start: NaiveDate,
    end: NaiveDate,
) -> impl Iterator<Item = NaiveDate> {
    let anchor_day = start.day();
    (0u32..)
        .map_while(move |index| nth_step(start, cycle, index))
        .take_while(move |date| *date <= end)
        .filter(move |date| cycle != RepeatCycle::Monthly || date.day() == anchor_day)
}

/// Occurrence dates of `[start, end]` that fall inside `[from, to]`.
pub fn occurrence_dates_between(
    cycle: RepeatCycle,
    start: NaiveDate,
    end: NaiveDate,
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<NaiveDate> {
    occurrence_dates(cycle, start, end)
        .skip_while(|date| *date < from)
        .take_while(|date| *date <= to)
        .collect()
}

/// First and last day of the given calendar month.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = first
        .checked_add_months(Months::new(1))?
        .checked_sub_days(Days::new(1))?;
    Some((first, last))
}

/// Month bounds of the month containing `date`.
pub fn month_bounds_of(date: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    month_bounds(date.year(), date.month())
}

fn nth_step(start: NaiveDate, cycle: RepeatCycle, index: u32) -> Option<NaiveDate> {
    match cycle {
        RepeatCycle::Daily => start.checked_add_days(Days::new(u64::from(index))),
        RepeatCycle::Weekly => start.checked_add_days(Days::new(u64::from(index) * 7)),
        // Stepping from the anchor, not the previous date, keeps day 31 from
        // drifting to day 28 after February.
        RepeatCycle::Monthly => start.checked_add_months(Months::new(index)),
    }
}
