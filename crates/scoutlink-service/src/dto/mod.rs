//! Data transfer objects shared by the API and bot adapters

mod mappers;
mod requests;
mod responses;

pub use requests::{AdminUpdateRequest, ListQuery, VerifyRequest};
pub use responses::{
    DiscordMemberResponse, ListUsersResponse, MinecraftPlayerResponse, ScoutMemberResponse,
    UserResponse, VerifyResponse,
};
