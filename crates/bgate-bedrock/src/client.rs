use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use bgate_common::ApiError;
use bgate_core::{ModelInvoker, NativeChunkStream};
use bytes::Bytes;
use futures_util::StreamExt;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::eventstream::{frame_to_chunk, FrameDecoder};
use crate::sign::{encode_path_segment, sign_request, Credentials};

const MAX_ATTEMPTS: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// One signed HTTP client bound to a region. Cheap to clone the `Arc`
/// around; built once per region by the [`crate::ClientPool`].
pub struct BedrockClient {
    http: reqwest::Client,
    region: String,
    host: String,
    credentials: Credentials,
}

impl BedrockClient {
    pub fn new(region: impl Into<String>, credentials: Credentials) -> Result<Self, ApiError> {
        let region = region.into();
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| ApiError::internal(format!("http client build failed: {err}")))?;
        Ok(Self {
            host: format!("bedrock-runtime.{region}.amazonaws.com"),
            http,
            region,
            credentials,
        })
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    fn invoke_path(model_id: &str) -> String {
        format!("/model/{}/invoke", encode_path_segment(model_id))
    }

    fn stream_path(model_id: &str) -> String {
        format!(
            "/model/{}/invoke-with-response-stream",
            encode_path_segment(model_id)
        )
    }

    /// Send one signed POST, retrying connection-level failures and 5xx
    /// up to [`MAX_ATTEMPTS`]. 4xx responses are never retried; the
    /// request is re-signed on each attempt so the date stays fresh.
    async fn send(
        &self,
        path: &str,
        accept: &'static str,
        body: &Bytes,
    ) -> Result<reqwest::Response, ApiError> {
        let url = format!("https://{}{path}", self.host);

        for attempt in 1..=MAX_ATTEMPTS {
            let mut headers = BTreeMap::new();
            headers.insert("content-type".to_string(), "application/json".to_string());
            headers.insert("accept".to_string(), accept.to_string());
            sign_request(
                &self.credentials,
                &self.region,
                "POST",
                &self.host,
                path,
                body,
                OffsetDateTime::now_utc(),
                &mut headers,
            )?;

            let mut builder = self.http.post(&url);
            for (name, value) in &headers {
                builder = builder.header(name, value);
            }

            match builder.body(body.clone()).send().await {
                Ok(response) if response.status().is_server_error() && attempt < MAX_ATTEMPTS => {
                    warn!(
                        event = "upstream_retry",
                        region = %self.region,
                        path = %path,
                        status = response.status().as_u16(),
                        attempt = attempt,
                    );
                }
                Ok(response) => return check_status(response).await,
                Err(err) if retryable(&err) && attempt < MAX_ATTEMPTS => {
                    warn!(
                        event = "upstream_retry",
                        region = %self.region,
                        path = %path,
                        error = %err,
                        attempt = attempt,
                    );
                }
                Err(err) => {
                    return Err(ApiError::upstream(
                        format!("bedrock request failed: {err}"),
                        "ConnectionError",
                    ))
                }
            }
        }
        Err(ApiError::upstream(
            "bedrock request failed after retries",
            "ConnectionError",
        ))
    }
}

fn retryable(err: &reqwest::Error) -> bool {
    err.is_connect() || err.is_timeout()
}

/// Map a non-success Bedrock reply into the error taxonomy. Throttling
/// keeps its own 429 class; everything else is a uniform upstream error
/// with the AWS exception type preserved as detail.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let code = response
        .headers()
        .get("x-amzn-errortype")
        .and_then(|value| value.to_str().ok())
        .map(|value| value.split(':').next().unwrap_or(value).to_string())
        .unwrap_or_else(|| format!("Http{}", status.as_u16()));
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|value| value["message"].as_str().map(str::to_string))
        .unwrap_or(body);
    let message = if message.is_empty() {
        format!("bedrock returned status {}", status.as_u16())
    } else {
        message
    };

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS || code == "ThrottlingException" {
        return Err(ApiError::RateLimit(message));
    }
    Err(ApiError::upstream(message, code))
}

#[async_trait]
impl ModelInvoker for BedrockClient {
    async fn invoke(&self, model_id: &str, payload: Bytes) -> Result<Bytes, ApiError> {
        info!(
            event = "upstream_request",
            region = %self.region,
            model_id = %model_id,
            is_stream = false,
        );
        let response = self
            .send(&Self::invoke_path(model_id), "application/json", &payload)
            .await?;
        response.bytes().await.map_err(|err| {
            ApiError::upstream(
                format!("failed to read bedrock response: {err}"),
                "ConnectionError",
            )
        })
    }

    async fn invoke_stream(
        &self,
        model_id: &str,
        payload: Bytes,
    ) -> Result<NativeChunkStream, ApiError> {
        info!(
            event = "upstream_request",
            region = %self.region,
            model_id = %model_id,
            is_stream = true,
        );
        let response = self
            .send(
                &Self::stream_path(model_id),
                "application/vnd.amazon.eventstream",
                &payload,
            )
            .await?;

        let mut body = response.bytes_stream();
        let stream = async_stream::stream! {
            let mut decoder = FrameDecoder::new();
            while let Some(item) = body.next().await {
                let data = match item {
                    Ok(data) => data,
                    Err(err) => {
                        yield Err(ApiError::upstream(
                            format!("bedrock stream read failed: {err}"),
                            "ConnectionError",
                        ));
                        return;
                    }
                };
                decoder.feed(&data);
                loop {
                    match decoder.next_frame() {
                        Ok(Some(frame)) => match frame_to_chunk(&frame) {
                            Ok(Some(chunk)) => yield Ok(chunk),
                            Ok(None) => {}
                            Err(err) => {
                                yield Err(err);
                                return;
                            }
                        },
                        Ok(None) => break,
                        Err(err) => {
                            yield Err(err);
                            return;
                        }
                    }
                }
            }
        };
        Ok(Box::pin(stream))
    }
}
