//! Core domain types
//!
//! These types describe a remote image generation job as seen by the client:
//! what was requested, what the remote service reports about it, and how it
//! ended.

pub mod job;
pub mod prompt;
pub mod request;
