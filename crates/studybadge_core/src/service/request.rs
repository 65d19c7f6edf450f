//! Request models accepted by the schedule engine.

use crate::model::channel::MemberId;
use crate::model::schedule::{
    RepeatCycle, RepeatSituation, ScheduleDetails, ScheduleId, ScheduleType,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How far an edit/delete on one occurrence of a series propagates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditScope {
    /// Only the selected occurrence; earlier and later ones are preserved.
    ThisOnly,
    /// The selected occurrence and every later one.
    ThisAndFuture,
}

impl EditScope {
    /// Maps the "apply to following events too" flag used by clients.
    pub fn from_after_event_same(after_event_same: bool) -> Self {
        if after_event_same {
            Self::ThisAndFuture
        } else {
            Self::ThisOnly
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ThisOnly => "this_only",
            Self::ThisAndFuture => "this_and_future",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleScheduleCreateRequest {
    pub member_id: MemberId,
    pub date: NaiveDate,
    pub details: ScheduleDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatScheduleCreateRequest {
    pub member_id: MemberId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub cycle: RepeatCycle,
    pub situation: RepeatSituation,
    pub details: ScheduleDetails,
}

/// Edit whose result is a single schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleScheduleEdit {
    pub origin_type: ScheduleType,
    pub schedule_id: ScheduleId,
    pub member_id: MemberId,
    /// Date of the occurrence being edited.
    pub selected_date: NaiveDate,
    pub details: ScheduleDetails,
}

/// Edit whose result is a repeating schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatScheduleEdit {
    pub origin_type: ScheduleType,
    pub schedule_id: ScheduleId,
    pub member_id: MemberId,
    /// New series start date.
    pub selected_date: NaiveDate,
    /// Ignored for repeat-to-repeat edits, which keep the stored end date.
    pub end_date: NaiveDate,
    pub cycle: RepeatCycle,
    pub situation: RepeatSituation,
    pub details: ScheduleDetails,
}

/// Edit request tagged by the kind of schedule it produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "edit_type", rename_all = "snake_case")]
pub enum ScheduleEditRequest {
    Single(SingleScheduleEdit),
    Repeat(RepeatScheduleEdit),
}

impl ScheduleEditRequest {
    pub fn member_id(&self) -> MemberId {
        match self {
            Self::Single(edit) => edit.member_id,
            Self::Repeat(edit) => edit.member_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDeleteRequest {
    pub schedule_id: ScheduleId,
    pub member_id: MemberId,
    pub selected_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::{EditScope, ScheduleEditRequest, SingleScheduleEdit};
    use crate::model::schedule::{ScheduleDetails, ScheduleType};
    use chrono::{NaiveDate, NaiveTime};
    use uuid::Uuid;

    #[test]
    fn after_event_same_flag_maps_to_scope() {
        assert_eq!(EditScope::from_after_event_same(true), EditScope::ThisAndFuture);
        assert_eq!(EditScope::from_after_event_same(false), EditScope::ThisOnly);
    }

    #[test]
    fn edit_request_carries_tag_and_origin() {
        let request = ScheduleEditRequest::Single(SingleScheduleEdit {
            origin_type: ScheduleType::Repeat,
            schedule_id: Uuid::nil(),
            member_id: 7,
            selected_date: NaiveDate::from_ymd_opt(2024, 9, 8).unwrap(),
            details: ScheduleDetails {
                name: "review".to_string(),
                content: String::new(),
                start_time: NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(21, 0, 0).unwrap(),
                place_id: None,
            },
        });

        assert_eq!(request.member_id(), 7);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["edit_type"], "single");
        assert_eq!(value["origin_type"], "repeat");
    }
}
