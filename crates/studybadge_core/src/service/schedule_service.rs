//! Schedule use-case service (recurrence engine).
//!
//! # Responsibility
//! - Validate channel, membership and request preconditions.
//! - Turn create/edit/delete requests into one mutation plan per call.
//! - Commit the plan atomically, then dispatch notification registrations
//!   and a channel notice.
//!
//! # Invariants
//! - Nothing is written, and no notification is issued, when any
//!   precondition fails.
//! - The current instant is always supplied by the caller (`now`).
//! - Log lines are metadata-only: ids, dates, kinds, counts.

use crate::model::channel::{MemberId, StudyChannel, StudyChannelId};
use crate::model::mutation::ScheduleMutation;
use crate::model::schedule::{
    RepeatCycle, RepeatSchedule, RepeatSituation, Schedule, ScheduleId, ScheduleOccurrence,
    ScheduleType, ScheduleValidationError, SingleSchedule,
};
use crate::notify::{dispatch_mutations, ChannelNotice, NoticeTopic, NotificationScheduler};
use crate::recurrence::{
    is_member, is_situation_consistent, month_bounds, occurrence_dates_between,
};
use crate::repo::schedule_repo::{RepoError, ScheduleRepository};
use crate::repo::study_repo::{ChannelDirectory, MembershipAuthority};
use crate::service::request::{
    EditScope, RepeatScheduleCreateRequest, RepeatScheduleEdit, ScheduleDeleteRequest,
    ScheduleEditRequest, SingleScheduleCreateRequest, SingleScheduleEdit,
};
use crate::service::series_plan::{plan_occurrence_removal, SeriesPlanError};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use log::{info, warn};
use std::time::Instant;
use thiserror::Error;

pub type ScheduleServiceResult<T> = Result<T, ScheduleServiceError>;

/// Caller-facing failures of the schedule engine.
#[derive(Debug, Error)]
pub enum ScheduleServiceError {
    #[error("study channel not found: {0}")]
    NotFoundStudyChannel(StudyChannelId),
    #[error("single schedule not found: {0}")]
    NotFoundSingleSchedule(ScheduleId),
    #[error("repeat schedule not found: {0}")]
    NotFoundRepeatSchedule(ScheduleId),
    #[error("member {member_id} does not belong to study channel {channel_id}")]
    NotStudyMember {
        member_id: MemberId,
        channel_id: StudyChannelId,
    },
    #[error("member {member_id} is not the leader of study channel {channel_id}")]
    NotStudyLeader {
        member_id: MemberId,
        channel_id: StudyChannelId,
    },
    #[error("{date} does not satisfy {cycle} situation {situation}")]
    InvalidRepeatSituation {
        date: NaiveDate,
        cycle: RepeatCycle,
        situation: RepeatSituation,
    },
    #[error("repeat cycle cannot change from {existing} to {requested}")]
    IncompatibleRepeatCycleEdit {
        existing: RepeatCycle,
        requested: RepeatCycle,
    },
    #[error("{date} is not an occurrence of repeating schedule {schedule_id}")]
    NotIncludedInRepeatSchedule {
        date: NaiveDate,
        schedule_id: ScheduleId,
    },
    #[error("selected date {selected} does not match single schedule date {stored}")]
    NotEqualSingleScheduleDate {
        selected: NaiveDate,
        stored: NaiveDate,
    },
    #[error("cannot delete a schedule dated {date} before today ({today})")]
    CanNotDeleteForBeforeDate { date: NaiveDate, today: NaiveDate },
    #[error("same-day schedule start time {start_time} is before current time {now}")]
    InvalidScheduleModification {
        start_time: NaiveTime,
        now: NaiveTime,
    },
    #[error("illegal schedule edit request: {0}")]
    IllegalArgumentForScheduleEditRequest(&'static str),
    #[error("illegal schedule request: {0}")]
    IllegalArgumentForScheduleRequest(String),
    #[error("date arithmetic left the supported range near {0}")]
    DateOutOfRange(NaiveDate),
    #[error("{0}")]
    InvalidSchedule(#[from] ScheduleValidationError),
    #[error("{0}")]
    Repo(#[from] RepoError),
}

impl From<SeriesPlanError> for ScheduleServiceError {
    fn from(value: SeriesPlanError) -> Self {
        match value {
            SeriesPlanError::NotIncluded { date, schedule_id } => {
                Self::NotIncludedInRepeatSchedule { date, schedule_id }
            }
            SeriesPlanError::InvalidSituation {
                date,
                cycle,
                situation,
            } => Self::InvalidRepeatSituation {
                date,
                cycle,
                situation,
            },
            SeriesPlanError::DateOutOfRange(date) => Self::DateOutOfRange(date),
        }
    }
}

impl ScheduleServiceError {
    /// Stable snake_case code used in log lines.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFoundStudyChannel(_) => "not_found_study_channel",
            Self::NotFoundSingleSchedule(_) => "not_found_single_schedule",
            Self::NotFoundRepeatSchedule(_) => "not_found_repeat_schedule",
            Self::NotStudyMember { .. } => "not_study_member",
            Self::NotStudyLeader { .. } => "not_study_leader",
            Self::InvalidRepeatSituation { .. } => "invalid_repeat_situation",
            Self::IncompatibleRepeatCycleEdit { .. } => "incompatible_repeat_cycle_edit",
            Self::NotIncludedInRepeatSchedule { .. } => "not_included_in_repeat_schedule",
            Self::NotEqualSingleScheduleDate { .. } => "not_equal_single_schedule_date",
            Self::CanNotDeleteForBeforeDate { .. } => "can_not_delete_for_before_date",
            Self::InvalidScheduleModification { .. } => "invalid_schedule_modification",
            Self::IllegalArgumentForScheduleEditRequest(_) => "illegal_schedule_edit_request",
            Self::IllegalArgumentForScheduleRequest(_) => "illegal_schedule_request",
            Self::DateOutOfRange(_) => "date_out_of_range",
            Self::InvalidSchedule(_) => "invalid_schedule",
            Self::Repo(RepoError::Conflict { .. }) => "conflict",
            Self::Repo(_) => "repo",
        }
    }
}

/// Committed effects of one edit/delete call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleChanges {
    /// Applied mutations, in order, with stored versions.
    pub mutations: Vec<ScheduleMutation>,
    pub notice: ChannelNotice,
}

/// Recurrence engine over injected persistence, directory and notifier.
pub struct ScheduleService<R, D, N>
where
    R: ScheduleRepository,
    D: ChannelDirectory + MembershipAuthority,
    N: NotificationScheduler,
{
    repo: R,
    directory: D,
    notifier: N,
}

impl<R, D, N> ScheduleService<R, D, N>
where
    R: ScheduleRepository,
    D: ChannelDirectory + MembershipAuthority,
    N: NotificationScheduler,
{
    pub fn new(repo: R, directory: D, notifier: N) -> Self {
        Self {
            repo,
            directory,
            notifier,
        }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Creates a one-off schedule.
    pub fn create_single_schedule(
        &self,
        channel_id: StudyChannelId,
        request: &SingleScheduleCreateRequest,
    ) -> ScheduleServiceResult<SingleSchedule> {
        let channel = self.require_leader(channel_id, request.member_id)?;
        let schedule = SingleSchedule::new(channel_id, request.date, request.details.clone());
        schedule.validate()?;

        let changes = self.commit(
            &channel,
            NoticeTopic::SingleCreated,
            schedule.date,
            vec![ScheduleMutation::InsertSingle(schedule.clone())],
            "create",
        )?;
        Ok(stored_single(&changes.mutations).unwrap_or(schedule))
    }

    /// Creates a repeating series.
    pub fn create_repeat_schedule(
        &self,
        channel_id: StudyChannelId,
        request: &RepeatScheduleCreateRequest,
    ) -> ScheduleServiceResult<RepeatSchedule> {
        let channel = self.require_leader(channel_id, request.member_id)?;
        ensure_situation(request.start_date, request.cycle, request.situation)?;
        let series = RepeatSchedule::new(
            channel_id,
            request.start_date,
            request.end_date,
            request.cycle,
            request.situation,
            request.details.clone(),
        );
        series.validate()?;

        let changes = self.commit(
            &channel,
            NoticeTopic::RepeatCreated,
            series.start_date,
            vec![ScheduleMutation::InsertRepeat(series.clone())],
            "create",
        )?;
        Ok(stored_repeat(&changes.mutations).unwrap_or(series))
    }

    /// Applies a whole-schedule edit, dispatched on `(edit tag, origin type)`.
    ///
    /// Editing one occurrence of a series into a single schedule needs a
    /// scope and goes through [`Self::edit_repeat_occurrence`].
    pub fn edit_schedule(
        &self,
        channel_id: StudyChannelId,
        request: ScheduleEditRequest,
        now: NaiveDateTime,
    ) -> ScheduleServiceResult<ScheduleChanges> {
        let channel = self.require_channel(channel_id)?;
        if let ScheduleEditRequest::Single(edit) = &request {
            if edit.origin_type != ScheduleType::Single {
                return Err(ScheduleServiceError::IllegalArgumentForScheduleEditRequest(
                    "single edit of a repeating schedule requires an edit scope",
                ));
            }
        }
        self.require_leader_of(&channel, request.member_id())?;

        match request {
            ScheduleEditRequest::Single(edit) => self.edit_single_to_single(&channel, edit),
            ScheduleEditRequest::Repeat(edit) => match edit.origin_type {
                ScheduleType::Single => self.edit_single_to_repeat(&channel, edit),
                ScheduleType::Repeat => self.edit_repeat_to_repeat(&channel, edit, now),
            },
        }
    }

    /// Replaces one occurrence of a series (and, for `ThisAndFuture`, all
    /// later ones) with the single schedule described by `edit`.
    pub fn edit_repeat_occurrence(
        &self,
        channel_id: StudyChannelId,
        scope: EditScope,
        edit: SingleScheduleEdit,
        now: NaiveDateTime,
    ) -> ScheduleServiceResult<ScheduleChanges> {
        if edit.origin_type != ScheduleType::Repeat {
            return Err(ScheduleServiceError::IllegalArgumentForScheduleEditRequest(
                "occurrence edit requires a repeating origin schedule",
            ));
        }
        let channel = self.require_leader(channel_id, edit.member_id)?;
        let series = self.load_repeat(channel_id, edit.schedule_id)?;
        edit.details.validate()?;

        let selected_date = edit.selected_date;
        if !is_member(selected_date, series.cycle, series.start_date, series.end_date) {
            return Err(ScheduleServiceError::NotIncludedInRepeatSchedule {
                date: selected_date,
                schedule_id: series.id,
            });
        }
        ensure_same_day_times(
            selected_date,
            &[series.details.start_time, edit.details.start_time],
            now,
        )?;

        let replacement = SingleSchedule::new(channel_id, selected_date, edit.details);
        let plan = plan_occurrence_removal(&series, selected_date, scope, Some(replacement))?;

        info!(
            "event=schedule_plan module=service status=ok kind=repeat_to_single scope={} schedule_id={} date={} mutations={}",
            scope.as_str(),
            series.id,
            selected_date,
            plan.len()
        );
        self.commit(
            &channel,
            NoticeTopic::RepeatToSingle,
            selected_date,
            plan,
            "edit",
        )
    }

    /// Deletes a single schedule on its own date.
    pub fn delete_single_schedule(
        &self,
        channel_id: StudyChannelId,
        request: &ScheduleDeleteRequest,
        now: NaiveDateTime,
    ) -> ScheduleServiceResult<ScheduleChanges> {
        let channel = self.require_channel(channel_id)?;
        let schedule = self.load_single(channel_id, request.schedule_id)?;

        if request.selected_date != schedule.date {
            return Err(ScheduleServiceError::NotEqualSingleScheduleDate {
                selected: request.selected_date,
                stored: schedule.date,
            });
        }
        ensure_not_past_date(schedule.date, now)?;
        self.require_leader_of(&channel, request.member_id)?;

        let date = schedule.date;
        self.commit(
            &channel,
            NoticeTopic::SingleDeleted,
            date,
            vec![ScheduleMutation::DeleteSingle(schedule)],
            "delete",
        )
    }

    /// Removes one occurrence of a series (and, for `ThisAndFuture`, all
    /// later ones).
    pub fn delete_repeat_occurrence(
        &self,
        channel_id: StudyChannelId,
        scope: EditScope,
        request: &ScheduleDeleteRequest,
        now: NaiveDateTime,
    ) -> ScheduleServiceResult<ScheduleChanges> {
        let channel = self.require_channel(channel_id)?;
        let series = self.load_repeat(channel_id, request.schedule_id)?;
        let selected_date = request.selected_date;

        let plan = plan_occurrence_removal(&series, selected_date, scope, None)?;
        ensure_not_past_date(selected_date, now)?;
        self.require_leader_of(&channel, request.member_id)?;

        info!(
            "event=schedule_plan module=service status=ok kind=repeat_delete scope={} schedule_id={} date={} mutations={}",
            scope.as_str(),
            series.id,
            selected_date,
            plan.len()
        );
        self.commit(
            &channel,
            NoticeTopic::RepeatDeleted,
            selected_date,
            plan,
            "delete",
        )
    }

    /// Every single and repeating schedule of the channel.
    pub fn list_schedules(
        &self,
        member_id: MemberId,
        channel_id: StudyChannelId,
    ) -> ScheduleServiceResult<Vec<Schedule>> {
        self.require_member(channel_id, member_id)?;
        let mut schedules: Vec<Schedule> = self
            .repo
            .list_singles(channel_id)?
            .into_iter()
            .map(Schedule::Single)
            .collect();
        schedules.extend(
            self.repo
                .list_repeats(channel_id)?
                .into_iter()
                .map(Schedule::Repeat),
        );
        Ok(schedules)
    }

    /// Singles dated in the month plus series intersecting it.
    pub fn list_schedules_in_month(
        &self,
        member_id: MemberId,
        channel_id: StudyChannelId,
        year: i32,
        month: u32,
    ) -> ScheduleServiceResult<Vec<Schedule>> {
        self.require_member(channel_id, member_id)?;
        let (first, last) = month_bounds(year, month).ok_or_else(|| {
            ScheduleServiceError::IllegalArgumentForScheduleRequest(format!(
                "invalid year/month {year}-{month}"
            ))
        })?;

        let mut schedules: Vec<Schedule> = self
            .repo
            .list_singles_in_range(channel_id, first, last)?
            .into_iter()
            .map(Schedule::Single)
            .collect();
        schedules.extend(
            self.repo
                .list_repeats_in_month(channel_id, first)?
                .into_iter()
                .map(Schedule::Repeat),
        );
        Ok(schedules)
    }

    pub fn get_single_schedule(
        &self,
        member_id: MemberId,
        channel_id: StudyChannelId,
        schedule_id: ScheduleId,
    ) -> ScheduleServiceResult<SingleSchedule> {
        self.require_member(channel_id, member_id)?;
        self.load_single(channel_id, schedule_id)
    }

    pub fn get_repeat_schedule(
        &self,
        member_id: MemberId,
        channel_id: StudyChannelId,
        schedule_id: ScheduleId,
    ) -> ScheduleServiceResult<RepeatSchedule> {
        self.require_member(channel_id, member_id)?;
        self.load_repeat(channel_id, schedule_id)
    }

    /// Concrete dated occurrences inside `[from, to]`, ordered by date then
    /// start time.
    pub fn list_occurrences(
        &self,
        member_id: MemberId,
        channel_id: StudyChannelId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ScheduleServiceResult<Vec<ScheduleOccurrence>> {
        self.require_member(channel_id, member_id)?;
        if from > to {
            return Err(ScheduleServiceError::IllegalArgumentForScheduleRequest(
                format!("range start {from} is after range end {to}"),
            ));
        }

        let mut occurrences: Vec<ScheduleOccurrence> = self
            .repo
            .list_singles_in_range(channel_id, from, to)?
            .into_iter()
            .map(|single| ScheduleOccurrence {
                schedule_id: single.id,
                schedule_type: ScheduleType::Single,
                date: single.date,
                details: single.details,
            })
            .collect();

        for series in self.repo.list_repeats_in_range(channel_id, from, to)? {
            let dates = occurrence_dates_between(
                series.cycle,
                series.start_date,
                series.end_date,
                from,
                to,
            );
            occurrences.extend(dates.into_iter().map(|date| ScheduleOccurrence {
                schedule_id: series.id,
                schedule_type: ScheduleType::Repeat,
                date,
                details: series.details.clone(),
            }));
        }

        occurrences.sort_by(|left, right| {
            left.date
                .cmp(&right.date)
                .then(left.details.start_time.cmp(&right.details.start_time))
                .then(left.schedule_id.cmp(&right.schedule_id))
        });
        Ok(occurrences)
    }

    fn edit_single_to_single(
        &self,
        channel: &StudyChannel,
        edit: SingleScheduleEdit,
    ) -> ScheduleServiceResult<ScheduleChanges> {
        let before = self.load_single(channel.id, edit.schedule_id)?;
        let after = SingleSchedule {
            details: edit.details,
            ..before.clone()
        };
        after.validate()?;

        let date = before.date;
        self.commit(
            channel,
            NoticeTopic::SingleToSingle,
            date,
            vec![ScheduleMutation::UpdateSingle { before, after }],
            "edit",
        )
    }

    fn edit_single_to_repeat(
        &self,
        channel: &StudyChannel,
        edit: RepeatScheduleEdit,
    ) -> ScheduleServiceResult<ScheduleChanges> {
        let single = self.load_single(channel.id, edit.schedule_id)?;
        ensure_situation(edit.selected_date, edit.cycle, edit.situation)?;

        let series = RepeatSchedule::new(
            channel.id,
            edit.selected_date,
            edit.end_date,
            edit.cycle,
            edit.situation,
            edit.details,
        );
        series.validate()?;

        let date = single.date;
        self.commit(
            channel,
            NoticeTopic::SingleToRepeat,
            date,
            vec![
                ScheduleMutation::InsertRepeat(series),
                ScheduleMutation::DeleteSingle(single),
            ],
            "edit",
        )
    }

    fn edit_repeat_to_repeat(
        &self,
        channel: &StudyChannel,
        edit: RepeatScheduleEdit,
        now: NaiveDateTime,
    ) -> ScheduleServiceResult<ScheduleChanges> {
        let before = self.load_repeat(channel.id, edit.schedule_id)?;
        if edit.cycle != before.cycle {
            return Err(ScheduleServiceError::IncompatibleRepeatCycleEdit {
                existing: before.cycle,
                requested: edit.cycle,
            });
        }
        if edit.end_date != before.end_date {
            warn!(
                "event=schedule_edit module=service status=ok kind=repeat_to_repeat schedule_id={} end_date_ignored={}",
                before.id, edit.end_date
            );
        }
        ensure_situation(edit.selected_date, edit.cycle, edit.situation)?;
        ensure_same_day_times(
            edit.selected_date,
            &[before.details.start_time, edit.details.start_time],
            now,
        )?;

        let after = RepeatSchedule {
            start_date: edit.selected_date,
            situation: edit.situation,
            details: edit.details,
            ..before.clone()
        };
        let date = after.start_date;
        let mutations = if after.is_degenerate() {
            // Moving the start onto the stored end leaves one date.
            after.details.validate()?;
            vec![
                ScheduleMutation::InsertSingle(after.single_at(date)),
                ScheduleMutation::DeleteRepeat(before),
            ]
        } else {
            after.validate()?;
            vec![ScheduleMutation::UpdateRepeat { before, after }]
        };

        self.commit(
            channel,
            NoticeTopic::RepeatToRepeat,
            date,
            mutations,
            "edit",
        )
    }

    fn commit(
        &self,
        channel: &StudyChannel,
        topic: NoticeTopic,
        date: NaiveDate,
        mutations: Vec<ScheduleMutation>,
        operation: &'static str,
    ) -> ScheduleServiceResult<ScheduleChanges> {
        let started_at = Instant::now();
        let count = mutations.len();
        let applied = match self.repo.apply_mutations(mutations) {
            Ok(applied) => applied,
            Err(err) => {
                let err = ScheduleServiceError::from(err);
                warn!(
                    "event=schedule_{operation} module=service status=error channel_id={} date={date} mutations={count} duration_ms={} error_code={}",
                    channel.id,
                    started_at.elapsed().as_millis(),
                    err.error_code()
                );
                return Err(err);
            }
        };

        dispatch_mutations(&self.notifier, &applied);
        let notice = ChannelNotice::new(channel, topic, date);
        self.notifier.announce(&notice);

        info!(
            "event=schedule_{operation} module=service status=ok channel_id={} kind={:?} date={date} mutations={count} duration_ms={}",
            channel.id,
            topic,
            started_at.elapsed().as_millis()
        );
        Ok(ScheduleChanges {
            mutations: applied,
            notice,
        })
    }

    fn require_channel(&self, channel_id: StudyChannelId) -> ScheduleServiceResult<StudyChannel> {
        self.directory
            .get_channel(channel_id)?
            .ok_or(ScheduleServiceError::NotFoundStudyChannel(channel_id))
    }

    fn require_member(
        &self,
        channel_id: StudyChannelId,
        member_id: MemberId,
    ) -> ScheduleServiceResult<StudyChannel> {
        let channel = self.require_channel(channel_id)?;
        if !self.directory.is_member(member_id, channel_id)? {
            return Err(ScheduleServiceError::NotStudyMember {
                member_id,
                channel_id,
            });
        }
        Ok(channel)
    }

    fn require_leader(
        &self,
        channel_id: StudyChannelId,
        member_id: MemberId,
    ) -> ScheduleServiceResult<StudyChannel> {
        let channel = self.require_channel(channel_id)?;
        self.require_leader_of(&channel, member_id)?;
        Ok(channel)
    }

    fn require_leader_of(
        &self,
        channel: &StudyChannel,
        member_id: MemberId,
    ) -> ScheduleServiceResult<()> {
        if !self.directory.is_member(member_id, channel.id)? {
            return Err(ScheduleServiceError::NotStudyMember {
                member_id,
                channel_id: channel.id,
            });
        }
        if !self.directory.is_leader(member_id, channel.id)? {
            warn!(
                "event=schedule_auth module=service status=rejected channel_id={} member_id={member_id}",
                channel.id
            );
            return Err(ScheduleServiceError::NotStudyLeader {
                member_id,
                channel_id: channel.id,
            });
        }
        Ok(())
    }

    fn load_single(
        &self,
        channel_id: StudyChannelId,
        schedule_id: ScheduleId,
    ) -> ScheduleServiceResult<SingleSchedule> {
        self.repo
            .find_single(schedule_id)?
            .filter(|schedule| schedule.channel_id == channel_id)
            .ok_or(ScheduleServiceError::NotFoundSingleSchedule(schedule_id))
    }

    fn load_repeat(
        &self,
        channel_id: StudyChannelId,
        schedule_id: ScheduleId,
    ) -> ScheduleServiceResult<RepeatSchedule> {
        self.repo
            .find_repeat(schedule_id)?
            .filter(|schedule| schedule.channel_id == channel_id)
            .ok_or(ScheduleServiceError::NotFoundRepeatSchedule(schedule_id))
    }
}

fn ensure_situation(
    date: NaiveDate,
    cycle: RepeatCycle,
    situation: RepeatSituation,
) -> ScheduleServiceResult<()> {
    if is_situation_consistent(date, cycle, situation) {
        Ok(())
    } else {
        Err(ScheduleServiceError::InvalidRepeatSituation {
            date,
            cycle,
            situation,
        })
    }
}

/// On `now`'s date, every given start time must not already have passed.
fn ensure_same_day_times(
    date: NaiveDate,
    start_times: &[NaiveTime],
    now: NaiveDateTime,
) -> ScheduleServiceResult<()> {
    if date != now.date() {
        return Ok(());
    }
    let current_time = now.time();
    match start_times.iter().find(|start| **start < current_time) {
        Some(start_time) => Err(ScheduleServiceError::InvalidScheduleModification {
            start_time: *start_time,
            now: current_time,
        }),
        None => Ok(()),
    }
}

fn ensure_not_past_date(date: NaiveDate, now: NaiveDateTime) -> ScheduleServiceResult<()> {
    let today = now.date();
    if date < today {
        return Err(ScheduleServiceError::CanNotDeleteForBeforeDate { date, today });
    }
    Ok(())
}

fn stored_single(mutations: &[ScheduleMutation]) -> Option<SingleSchedule> {
    mutations.iter().find_map(|mutation| match mutation {
        ScheduleMutation::InsertSingle(schedule) => Some(schedule.clone()),
        _ => None,
    })
}

fn stored_repeat(mutations: &[ScheduleMutation]) -> Option<RepeatSchedule> {
    mutations.iter().find_map(|mutation| match mutation {
        ScheduleMutation::InsertRepeat(schedule) => Some(schedule.clone()),
        _ => None,
    })
}
