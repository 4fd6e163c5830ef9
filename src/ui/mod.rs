/// Presentation layer
///
/// - Hand-off channel from pipeline tasks to the UI thread (handoff.rs)
/// - Full-screen iced viewer that drains it (viewer.rs)

pub mod handoff;
pub mod viewer;
