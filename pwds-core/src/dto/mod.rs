//! Data Transfer Objects for the remote prediction API
//!
//! Lightweight structures matching the JSON bodies exchanged with the
//! prediction service. Conversions into domain types live next to them.

pub mod prediction;
