/// Transform client module
///
/// This module wraps the remote image generation call:
/// - The `TransformClient` seam used by the pipeline (this file)
/// - The Gemini `generateContent` REST client (gemini.rs)
/// - Inline payload decoding (payload.rs)

pub mod gemini;
pub mod payload;

use async_trait::async_trait;

use crate::pipeline::data::{TransformRequest, TransformResult};

pub use gemini::GeminiClient;

/// Remote image generation.
///
/// Implementations never retry and never fail with an error: every failure
/// is reported as `TransformResult::Unavailable` with a detail string.
#[async_trait]
pub trait TransformClient: Send + Sync + 'static {
    async fn transform(&self, request: &TransformRequest, api_key: &str) -> TransformResult;
}
