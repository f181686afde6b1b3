//! Entity <-> model mappers

mod user;

pub use user::assemble_user;
