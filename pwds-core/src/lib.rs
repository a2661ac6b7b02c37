//! PWDS Core
//!
//! Core types shared by the PWDS image generation tooling.
//!
//! This crate contains:
//! - Domain types: jobs, generation requests, terminal outcomes, prompts
//! - DTOs: wire representations of the remote prediction API

pub mod domain;
pub mod dto;
