//! Admin handlers
//!
//! Operator-facing endpoints: page through all users and re-run
//! verification for a user identified by email.

use axum::{
    extract::{Query, State},
    Json,
};
use scoutlink_common::AppError;
use scoutlink_core::traits::ScoutCredentials;
use scoutlink_core::UserDescriptor;
use scoutlink_service::dto::{AdminUpdateRequest, ListQuery, ListUsersResponse, UserResponse};
use scoutlink_service::{IdentityResolver, ResolveOptions, VerificationService};
use tracing::info;

use crate::extractors::ValidatedJson;
use crate::response::ApiResult;
use crate::state::AppState;

/// Page size for the admin listing
const ADMIN_PAGE_SIZE: i64 = 50;

/// List users, 50 per page
///
/// GET /admin/list?page=
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ListUsersResponse>> {
    let service = VerificationService::new(state.service_context());
    let users = service.list_users(query.page, ADMIN_PAGE_SIZE).await?;

    Ok(Json(ListUsersResponse {
        page: query.page.max(1),
        per_page: ADMIN_PAGE_SIZE,
        users: users.iter().map(UserResponse::from).collect(),
    }))
}

/// Re-verify a user's membership by email
///
/// POST /admin/update
///
/// Looks up the user, replays verification with the stored credentials,
/// and returns the refreshed record.
pub async fn admin_update(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<AdminUpdateRequest>,
) -> ApiResult<Json<UserResponse>> {
    let ctx = state.service_context();
    let descriptor = UserDescriptor::by_email(&request.email);

    let resolver = IdentityResolver::new(ctx);
    let user = resolver.resolve(&descriptor, ResolveOptions::lookup()).await?;

    let Some(scout) = &user.scout_member else {
        return Err(AppError::InvalidInput(
            "user has no verified membership to refresh".to_string(),
        )
        .into());
    };
    let credentials = ScoutCredentials {
        membership_number: scout.membership_number.clone(),
        firstname: scout.firstname.clone(),
        lastname: scout.lastname.clone(),
    };

    let service = VerificationService::new(ctx);
    let (user, _) = service.verify(&credentials, &descriptor).await?;
    info!(user_id = %user.id, "admin re-verification completed");

    Ok(Json(UserResponse::from(&user)))
}
