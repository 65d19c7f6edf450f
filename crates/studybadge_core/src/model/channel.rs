//! Study channel and membership read models.

use serde::{Deserialize, Serialize};

/// Identifier of a study channel (group owning schedules).
pub type StudyChannelId = i64;

/// Identifier of a member account managed outside this crate.
pub type MemberId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyChannel {
    pub id: StudyChannelId,
    pub name: String,
}

/// Role a member holds inside one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Leader,
    Participant,
}

impl MemberRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Leader => "leader",
            Self::Participant => "participant",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "leader" => Some(Self::Leader),
            "participant" => Some(Self::Participant),
            _ => None,
        }
    }
}
