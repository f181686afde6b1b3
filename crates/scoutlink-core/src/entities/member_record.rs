//! MemberRecord - the membership portal's verification payload
//!
//! The portal answers both positive and negative lookups with the same
//! envelope; a negative result carries `detail.memFlag = false` and little
//! else, so every field other than the flag is defaulted.

use serde::{Deserialize, Serialize};

/// Verification payload returned by the membership portal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberRecord {
    #[serde(default)]
    pub detail: MemberDetail,
    #[serde(rename = "wwcDojStatus", default, skip_serializing_if = "Option::is_none")]
    pub wwc_doj_status: Option<WwcDojStatus>,
    #[serde(rename = "searchLog", default)]
    pub search_log: bool,
}

/// The member detail block of a portal response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberDetail {
    #[serde(rename = "RegID", default)]
    pub reg_id: String,
    #[serde(rename = "Firstname", default)]
    pub firstname: String,
    #[serde(rename = "Surname", default)]
    pub surname: String,
    #[serde(rename = "Status", default)]
    pub status: String,
    #[serde(rename = "MemberStatus", default)]
    pub member_status: String,
    /// Section classification code, e.g. "LDR", "ROVER", "VENT", "SCOUT"
    #[serde(rename = "ClassID", default)]
    pub class_id: String,
    /// True iff the registrar considers this a current member
    #[serde(rename = "memFlag", default)]
    pub mem_flag: bool,
}

/// Working-with-children registry status block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WwcDojStatus {
    #[serde(rename = "RegID", default)]
    pub reg_id: String,
    #[serde(rename = "DojStatus", default)]
    pub doj_status: String,
    #[serde(rename = "Message", default)]
    pub message: String,
    #[serde(rename = "Current", default)]
    pub current: bool,
}

impl MemberRecord {
    /// True iff the payload asserts a current membership
    #[inline]
    pub fn is_current_member(&self) -> bool {
        self.detail.mem_flag
    }

    /// Decode a retained JSONB payload; `None` if it no longer parses
    pub fn from_details(details: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(details.clone()).ok()
    }

    /// Re-encode for retention as an opaque payload
    pub fn to_details(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_negative_response() {
        let json = serde_json::json!({
            "detail": { "memFlag": false },
            "module": { "ModRequired": false },
            "wwcDojStatus": { "WWCCRequired": false },
            "searchLog": false,
        });

        let record: MemberRecord = serde_json::from_value(json).unwrap();
        assert!(!record.is_current_member());
    }

    #[test]
    fn test_decodes_positive_response() {
        let json = serde_json::json!({
            "detail": {
                "RegID": "1234567",
                "Firstname": "Ben",
                "Surname": "Jamin",
                "Status": "A",
                "MemberStatus": "Active",
                "ClassID": "VENT",
                "memFlag": true,
            },
            "wwcDojStatus": {
                "RegID": "1234567",
                "DojStatus": "OK",
                "Message": "",
                "Current": true,
            },
            "searchLog": true,
        });

        let record: MemberRecord = serde_json::from_value(json).unwrap();
        assert!(record.is_current_member());
        assert_eq!(record.detail.class_id, "VENT");
        assert_eq!(record.detail.firstname, "Ben");
    }

    #[test]
    fn test_details_roundtrip() {
        let record = MemberRecord {
            detail: MemberDetail {
                reg_id: "42".to_string(),
                mem_flag: true,
                class_id: "LDR".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };

        let details = record.to_details();
        let back = MemberRecord::from_details(&details).unwrap();
        assert_eq!(back, record);
    }
}
