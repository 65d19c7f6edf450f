//! Study channel directory and membership lookups.
//!
//! # Responsibility
//! - Answer "does this channel exist" and "is this member the leader".
//! - Provide minimal channel/member administration for hosts and tests.
//!
//! # Invariants
//! - A member holds at most one role per channel.

use crate::model::channel::{MemberId, MemberRole, StudyChannel, StudyChannelId};
use crate::repo::schedule_repo::{ensure_connection_migrated, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Channel lookup contract.
pub trait ChannelDirectory {
    fn channel_exists(&self, channel_id: StudyChannelId) -> RepoResult<bool>;
    fn get_channel(&self, channel_id: StudyChannelId) -> RepoResult<Option<StudyChannel>>;
}

/// Membership/role lookup contract.
pub trait MembershipAuthority {
    fn is_member(&self, member_id: MemberId, channel_id: StudyChannelId) -> RepoResult<bool>;
    fn is_leader(&self, member_id: MemberId, channel_id: StudyChannelId) -> RepoResult<bool>;
}

/// SQLite-backed directory over `study_channels` and `study_members`.
pub struct SqliteStudyDirectory<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudyDirectory<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_migrated(conn)?;
        Ok(Self { conn })
    }

    /// Creates a channel and returns it with its assigned ID.
    pub fn create_channel(&self, name: &str) -> RepoResult<StudyChannel> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(RepoError::InvalidData(
                "study channel name must not be blank".to_string(),
            ));
        }
        self.conn
            .execute("INSERT INTO study_channels (name) VALUES (?1);", [trimmed])?;
        Ok(StudyChannel {
            id: self.conn.last_insert_rowid(),
            name: trimmed.to_string(),
        })
    }

    /// Adds a member or replaces the role they already hold.
    pub fn upsert_member(
        &self,
        channel_id: StudyChannelId,
        member_id: MemberId,
        role: MemberRole,
    ) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO study_members (study_channel_id, member_id, role)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (study_channel_id, member_id) DO UPDATE SET role = excluded.role;",
            params![channel_id, member_id, role.as_str()],
        )?;
        Ok(())
    }

    fn member_role(
        &self,
        member_id: MemberId,
        channel_id: StudyChannelId,
    ) -> RepoResult<Option<MemberRole>> {
        let role: Option<String> = self
            .conn
            .query_row(
                "SELECT role FROM study_members
                 WHERE study_channel_id = ?1 AND member_id = ?2;",
                params![channel_id, member_id],
                |row| row.get(0),
            )
            .optional()?;

        role.map(|value| {
            MemberRole::parse(&value).ok_or_else(|| {
                RepoError::InvalidData(format!("invalid role `{value}` in study_members.role"))
            })
        })
        .transpose()
    }
}

impl ChannelDirectory for SqliteStudyDirectory<'_> {
    fn channel_exists(&self, channel_id: StudyChannelId) -> RepoResult<bool> {
        Ok(self.get_channel(channel_id)?.is_some())
    }

    fn get_channel(&self, channel_id: StudyChannelId) -> RepoResult<Option<StudyChannel>> {
        let channel = self
            .conn
            .query_row(
                "SELECT id, name FROM study_channels WHERE id = ?1;",
                [channel_id],
                |row| {
                    Ok(StudyChannel {
                        id: row.get("id")?,
                        name: row.get("name")?,
                    })
                },
            )
            .optional()?;
        Ok(channel)
    }
}

impl MembershipAuthority for SqliteStudyDirectory<'_> {
    fn is_member(&self, member_id: MemberId, channel_id: StudyChannelId) -> RepoResult<bool> {
        Ok(self.member_role(member_id, channel_id)?.is_some())
    }

    fn is_leader(&self, member_id: MemberId, channel_id: StudyChannelId) -> RepoResult<bool> {
        Ok(self.member_role(member_id, channel_id)? == Some(MemberRole::Leader))
    }
}
