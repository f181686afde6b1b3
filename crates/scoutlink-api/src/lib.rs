//! # scoutlink-api
//!
//! Web adapter built with Axum: the public verification form and the
//! admin endpoints, backed by the same service layer as the Discord bot.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::run;
