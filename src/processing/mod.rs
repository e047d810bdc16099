//! Audio-to-report processing pipeline.

pub mod orchestrator;
pub mod result;

pub use orchestrator::{Orchestrator, OrchestratorConfig};
pub use result::{ProcessingResult, ProcessingStatus};
