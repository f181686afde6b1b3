//! # scoutlink-extranet
//!
//! HTTP client for the scouting membership portal, implementing the
//! `MembershipVerifier` trait from `scoutlink-core`.

mod client;

pub use client::ExtranetClient;
