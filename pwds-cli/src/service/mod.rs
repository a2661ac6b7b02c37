//! Service layer
//!
//! Services contain the business logic of the CLI: running generation jobs
//! through the poller and persisting what they produce.

mod generation;

pub use generation::{GenerationOutcome, GenerationService, RenderOptions};
