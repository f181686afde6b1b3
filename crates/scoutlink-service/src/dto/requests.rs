//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use serde::Deserialize;
use validator::Validate;

/// Web verification form submission
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 16, message = "Membership number is required"))]
    pub membership_number: String,

    #[validate(length(min = 1, max = 64, message = "First name is required"))]
    pub firstname: String,

    #[validate(length(min = 1, max = 64, message = "Last name is required"))]
    pub lastname: String,

    #[validate(length(min = 1, max = 16, message = "Minecraft username must be 1-16 characters"))]
    pub minecraft_username: Option<String>,
}

/// Admin-triggered re-verification, keyed by email
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Pagination query for the admin listing
#[derive(Debug, Clone, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
}

fn default_page() -> i64 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_request_validation() {
        let request = VerifyRequest {
            email: "not-an-email".to_string(),
            membership_number: "1234567".to_string(),
            firstname: "Ben".to_string(),
            lastname: "Jamin".to_string(),
            minecraft_username: None,
        };
        assert!(request.validate().is_err());

        let request = VerifyRequest {
            email: "ben@x.com".to_string(),
            ..request
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_list_query_defaults_to_first_page() {
        let query: ListQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.page, 1);
    }
}
