//! Test fixtures and data generators

use std::sync::atomic::{AtomicU64, Ordering};

use scoutlink_core::entities::{MemberDetail, MemberRecord};
use scoutlink_core::traits::ScoutCredentials;

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Credentials for a member the default verifier accepts
pub fn credentials(membership_number: &str) -> ScoutCredentials {
    ScoutCredentials {
        membership_number: membership_number.to_string(),
        firstname: "Ben".to_string(),
        lastname: "Jamin".to_string(),
    }
}

/// A unique email address
pub fn unique_email() -> String {
    format!("member{}@example.com", unique_suffix())
}

/// A current-membership registry payload with the given classification
pub fn member_record(membership_number: &str, class_id: &str, current: bool) -> MemberRecord {
    MemberRecord {
        detail: MemberDetail {
            reg_id: membership_number.to_string(),
            firstname: "Ben".to_string(),
            surname: "Jamin".to_string(),
            status: "A".to_string(),
            member_status: if current { "Active" } else { "Expired" }.to_string(),
            class_id: class_id.to_string(),
            mem_flag: current,
        },
        ..Default::default()
    }
}
