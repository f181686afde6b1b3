//! ScoutMember entity - a verified scouting-organisation membership

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entities::MemberRecord;

/// Verified scouting membership attached to a User
///
/// Created on first successful verification and updated in place on
/// re-verification; a membership number is never duplicated into two rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoutMember {
    /// External identity key, unique across users
    pub membership_number: String,
    pub firstname: String,
    pub lastname: String,
    /// Opaque verification payload retained for later role derivation
    pub details: serde_json::Value,
    pub verified_at: DateTime<Utc>,
}

impl ScoutMember {
    /// Decode the retained verification payload, if it still parses
    pub fn member_record(&self) -> Option<MemberRecord> {
        MemberRecord::from_details(&self.details)
    }
}
