use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use bgate_common::ApiError;
use bgate_protocol::openai::chat_completions::request::CreateChatCompletionRequest;
use bgate_protocol::openai::chat_completions::response::CreateChatCompletionResponse;
use bgate_transform::{ResponseMeta, SamplingParams};
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use tracing::warn;
use uuid::Uuid;

use crate::adapter::{self, ChunkTranslator};
use crate::invoker::{ModelInvoker, NativeChunkStream};
use crate::registry::ResolvedModel;

pub(crate) fn now_epoch_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs() as i64)
        .unwrap_or_default()
}

fn new_meta(external_model: &str) -> ResponseMeta {
    ResponseMeta {
        id: format!("chatcmpl-{}", Uuid::new_v4()),
        created: now_epoch_seconds(),
        model: external_model.to_string(),
    }
}

pub struct StreamBody {
    pub content_type: &'static str,
    pub stream: Pin<Box<dyn Stream<Item = Result<Bytes, io::Error>> + Send>>,
}

impl StreamBody {
    pub fn new<S>(content_type: &'static str, stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, io::Error>> + Send + 'static,
    {
        Self {
            content_type,
            stream: Box::pin(stream),
        }
    }
}

impl std::fmt::Debug for StreamBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamBody")
            .field("content_type", &self.content_type)
            .field("stream", &"<opaque>")
            .finish()
    }
}

#[derive(Debug)]
pub enum ChatOutcome {
    Complete(CreateChatCompletionResponse),
    Stream(StreamBody),
}

/// Run one chat invocation end to end. Sync vs stream is decided purely
/// by the request's `stream` flag; transform failures surface before the
/// invoker is ever called.
pub async fn dispatch_chat(
    invoker: Arc<dyn ModelInvoker>,
    resolved: &ResolvedModel,
    request: &CreateChatCompletionRequest,
    trace_id: &str,
) -> Result<ChatOutcome, ApiError> {
    let params = SamplingParams::from_request(request);
    let payload = adapter::build_payload(resolved.family, request, &params)?;
    let meta = new_meta(&resolved.external);

    if request.is_stream() {
        let translator = ChunkTranslator::new(resolved.family)?;
        let native = invoker
            .invoke_stream(&resolved.bedrock_id, Bytes::from(payload))
            .await?;
        let stream = translate_stream(native, translator, meta, trace_id.to_string());
        Ok(ChatOutcome::Stream(StreamBody::new(
            "text/event-stream",
            stream,
        )))
    } else {
        let body = invoker
            .invoke(&resolved.bedrock_id, Bytes::from(payload))
            .await?;
        let response = adapter::parse_response(resolved.family, &body, &meta)?;
        Ok(ChatOutcome::Complete(response))
    }
}

/// Drive the native chunk stream through the family translator, emitting
/// each translated chunk as an SSE frame in arrival order. Ends with the
/// usage summary chunk and `data: [DONE]`; a mid-stream failure emits one
/// terminal error frame instead — never silent truncation. Dropping the
/// returned stream drops the native body with it.
fn translate_stream(
    mut native: NativeChunkStream,
    mut translator: ChunkTranslator,
    meta: ResponseMeta,
    trace_id: String,
) -> impl Stream<Item = Result<Bytes, io::Error>> {
    async_stream::stream! {
        while let Some(item) = native.next().await {
            let payload = match item {
                Ok(payload) => payload,
                Err(err) => {
                    warn!(
                        event = "stream_aborted",
                        trace_id = %trace_id,
                        error = %err,
                    );
                    yield Ok(sse_error_bytes(&err));
                    return;
                }
            };
            let chunks = match translator.transform_chunk(&payload, &meta) {
                Ok(chunks) => chunks,
                Err(err) => {
                    warn!(
                        event = "stream_chunk_rejected",
                        trace_id = %trace_id,
                        error = %err,
                    );
                    yield Ok(sse_error_bytes(&err));
                    return;
                }
            };
            for chunk in chunks {
                if let Some(bytes) = sse_json_bytes(&chunk) {
                    yield Ok(bytes);
                }
            }
        }
        if let Some(bytes) = sse_json_bytes(&translator.usage_chunk(&meta)) {
            yield Ok(bytes);
        }
        yield Ok(Bytes::from_static(b"data: [DONE]\n\n"));
    }
}

fn sse_json_bytes<T: serde::Serialize>(value: &T) -> Option<Bytes> {
    let payload = serde_json::to_vec(value).ok()?;
    let mut data = Vec::with_capacity(payload.len() + 8);
    data.extend_from_slice(b"data: ");
    data.extend_from_slice(&payload);
    data.extend_from_slice(b"\n\n");
    Some(Bytes::from(data))
}

fn sse_error_bytes(err: &ApiError) -> Bytes {
    sse_json_bytes(&err.envelope()).unwrap_or_else(|| Bytes::from_static(b"data: {}\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ProviderFamily;
    use futures_util::stream;

    fn meta() -> ResponseMeta {
        ResponseMeta {
            id: "chatcmpl-test".to_string(),
            created: 1_700_000_000,
            model: "gpt-4-llama".to_string(),
        }
    }

    fn native(items: Vec<Result<Bytes, ApiError>>) -> NativeChunkStream {
        Box::pin(stream::iter(items))
    }

    async fn collect_frames(
        stream: impl Stream<Item = Result<Bytes, io::Error>>,
    ) -> Vec<String> {
        stream
            .map(|item| String::from_utf8_lossy(&item.expect("frame")).to_string())
            .collect()
            .await
    }

    #[tokio::test]
    async fn sse_frames_end_with_usage_and_done() {
        let translator =
            ChunkTranslator::new(ProviderFamily::Meta).expect("llama translator");
        let chunks = native(vec![
            Ok(Bytes::from_static(br#"{"generation":"Hello"}"#)),
            Ok(Bytes::from_static(
                br#"{"generation":"","prompt_token_count":5,"generation_token_count":1,"stop_reason":"stop"}"#,
            )),
        ]);

        let frames =
            collect_frames(translate_stream(chunks, translator, meta(), "t".to_string())).await;

        assert!(frames[0].starts_with("data: "));
        assert!(frames[0].contains("Hello"));
        let usage = &frames[frames.len() - 2];
        assert!(usage.contains("\"total_tokens\":6"));
        assert_eq!(frames.last().map(String::as_str), Some("data: [DONE]\n\n"));
    }

    #[tokio::test]
    async fn mid_stream_failure_is_a_terminal_error_frame() {
        let translator =
            ChunkTranslator::new(ProviderFamily::Meta).expect("llama translator");
        let chunks = native(vec![
            Ok(Bytes::from_static(br#"{"generation":"Hel"}"#)),
            Err(ApiError::upstream("connection reset", "ConnectionError")),
        ]);

        let frames =
            collect_frames(translate_stream(chunks, translator, meta(), "t".to_string())).await;

        let last = frames.last().expect("terminal frame");
        assert!(last.contains("bedrock_error"));
        assert!(!frames.iter().any(|frame| frame.contains("[DONE]")));
    }
}
