//! # mirror-github
//!
//! GitHub REST client implementing [`mirror_core::RemoteHost`] for an
//! organisation that receives forge mirrors.

pub mod client;
pub mod error;

pub use client::GitHubClient;
