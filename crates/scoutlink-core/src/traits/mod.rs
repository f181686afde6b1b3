//! Ports - traits the domain needs the infrastructure to implement

mod repositories;
mod verifier;

pub use repositories::{NewUser, RepoResult, ScoutVerification, UserRepository};
pub use verifier::{MembershipVerifier, ScoutCredentials};
