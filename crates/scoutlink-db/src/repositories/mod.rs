//! Repository implementations

pub mod error;
mod user;

pub use user::PgUserRepository;
