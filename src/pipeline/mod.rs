/// Processing pipeline module
///
/// This module handles everything between a discovered file and a show request:
/// - Shared data structures (data.rs)
/// - Reading just-created images with bounded retry (reader.rs)
/// - Persisting artifacts to the output directory (writer.rs)
/// - Per-file orchestration with fallback (coordinator.rs)

pub mod coordinator;
pub mod data;
pub mod reader;
pub mod writer;

pub use coordinator::{Coordinator, PipelineMode, PipelineTiming};
