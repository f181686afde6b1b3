//! Web verification handlers
//!
//! The public form flow: serve the static page, accept the submitted
//! credentials, verify against the membership registry, and optionally
//! link a Minecraft username in the same request.

use axum::{extract::State, response::Html, Json};
use scoutlink_core::traits::ScoutCredentials;
use scoutlink_core::UserDescriptor;
use scoutlink_service::dto::{VerifyRequest, VerifyResponse};
use scoutlink_service::VerificationService;
use tracing::info;

use crate::extractors::ValidatedJson;
use crate::response::ApiResult;
use crate::state::AppState;

/// Serve the verification form
///
/// GET /verify
pub async fn verify_page() -> Html<&'static str> {
    Html(include_str!("../../static/verify.html"))
}

/// Handle a verification form submission
///
/// POST /verify
///
/// A failed registry match is a normal outcome of the form, not an error,
/// so it comes back as `{"success": false}` with a friendly message.
pub async fn submit_verification(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<VerifyRequest>,
) -> ApiResult<Json<VerifyResponse>> {
    let service = VerificationService::new(state.service_context());

    let credentials = ScoutCredentials {
        membership_number: request.membership_number.clone(),
        firstname: request.firstname.clone(),
        lastname: request.lastname.clone(),
    };
    let descriptor = UserDescriptor::by_email(&request.email);

    match service.verify(&credentials, &descriptor).await {
        Ok((user, _)) => {
            info!(user_id = %user.id, "web verification succeeded");
        }
        Err(e) if e.is_member_not_verified() => {
            return Ok(Json(VerifyResponse::failure(
                "No current member matched those details. \
                 Check the membership number and name spelling, then try again.",
            )));
        }
        Err(e) => return Err(e.into()),
    }

    if let Some(username) = &request.minecraft_username {
        service.link_minecraft_username(username, &descriptor).await?;
    }

    Ok(Json(VerifyResponse::success()))
}
