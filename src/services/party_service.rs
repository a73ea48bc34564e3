//! Domain service for instance-run parties.
//!
//! A party is an announcement: a creator, a zone, a ready time, and a set
//! of invited players. Creation also produces the group-chat notification
//! text; actually delivering it is the caller's concern.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors specific to party operations.
#[derive(Debug, Error)]
pub enum PartyError {
    #[error("Instance zone not found")]
    ZoneNotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for PartyError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for PartyError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Party creation payload.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePartyInput {
    pub zone_id: String,
    pub ready_time: String,
    pub invited_user_ids: Vec<i32>,
    /// Optional character choice per invited user, enriching the
    /// notification roster.
    #[serde(default)]
    pub selected_character_ids: HashMap<i32, i32>,
}

/// A player as shown in party rosters.
#[derive(Debug, Clone, Serialize)]
pub struct PartyMemberInfo {
    pub telegram_id: i64,
    pub username: Option<String>,
}

/// Party DTO for responses.
#[derive(Debug, Clone, Serialize)]
pub struct PartyInfo {
    pub id: i32,
    pub zone_id: String,
    pub zone_name: String,
    pub creator: PartyMemberInfo,
    pub invited: Vec<PartyMemberInfo>,
    pub ready_time: String,
    pub status: String,
    pub created_at: String,
}

/// A freshly created party plus its notification text.
#[derive(Debug, Clone)]
pub struct PartyCreated {
    pub party: PartyInfo,
    pub notification: String,
}

/// Domain service trait for parties.
#[async_trait::async_trait]
pub trait PartyService: Send + Sync {
    /// Creates a party in `pending` status.
    ///
    /// # Errors
    ///
    /// Returns [`PartyError::ZoneNotFound`] for an unknown zone and
    /// [`PartyError::Validation`] for an unparseable ready time.
    async fn create_party(
        &self,
        creator_id: i32,
        input: CreatePartyInput,
    ) -> Result<PartyCreated, PartyError>;

    /// Parties the user created or is invited to, newest first.
    async fn parties_for_user(&self, user_id: i32) -> Result<Vec<PartyInfo>, PartyError>;
}
