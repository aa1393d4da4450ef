use std::pin::Pin;

use async_trait::async_trait;
use bgate_common::ApiError;
use bytes::Bytes;
use futures_util::Stream;

/// Ordered native chunk payloads from a model-response stream. Each item
/// is one decoded chunk body; an error item ends the stream.
pub type NativeChunkStream = Pin<Box<dyn Stream<Item = Result<Bytes, ApiError>> + Send>>;

/// Seam between the dispatcher and the Bedrock runtime.
///
/// The dispatcher only ever sees opaque payload bytes; signing, transport
/// and event-stream framing live behind this trait, which also makes the
/// HTTP layer testable without a network.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    /// One-shot invocation; resolves to the complete native response body.
    async fn invoke(&self, model_id: &str, payload: Bytes) -> Result<Bytes, ApiError>;

    /// Streaming invocation; resolves to the ordered native chunk stream.
    async fn invoke_stream(
        &self,
        model_id: &str,
        payload: Bytes,
    ) -> Result<NativeChunkStream, ApiError>;
}
