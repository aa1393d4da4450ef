use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use bgate_common::ApiError;
use bgate_protocol::openai::chat_completions::request::CreateChatCompletionRequest;
use bgate_protocol::openai::list_models::response::{ListModelsResponse, ModelListObjectType};
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::CoreState;
use crate::dispatch::{dispatch_chat, ChatOutcome, StreamBody};
use crate::registry::ProviderFamily;

const REQUEST_ID_HEADER: &str = "x-bgate-request-id";

pub async fn chat_completions(
    State(state): State<Arc<CoreState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let trace_id = Uuid::new_v4().to_string();
    let started_at = Instant::now();

    let auth_ctx = match state.auth.authenticate(&headers) {
        Ok(ctx) => ctx,
        Err(err) => return error_response(err, &trace_id),
    };

    let request: CreateChatCompletionRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(err) => {
            return error_response(
                ApiError::bad_request(format!("invalid request body: {err}")),
                &trace_id,
            )
        }
    };

    // Shape checks come before alias resolution; a malformed request never
    // reaches the registry, let alone the invoker.
    if request.model.trim().is_empty() {
        return error_response(
            ApiError::bad_request("missing required field 'model'"),
            &trace_id,
        );
    }
    if request.messages.is_empty() {
        return error_response(
            ApiError::bad_request("missing required field 'messages'"),
            &trace_id,
        );
    }

    info!(
        event = "downstream_received",
        trace_id = %trace_id,
        model = %request.model,
        account = ?auth_ctx.account_id,
        is_stream = request.is_stream(),
    );

    let resolved = match state.registry.resolve(&request.model) {
        Ok(resolved) => resolved,
        Err(err) => return error_response(err, &trace_id),
    };

    // Operator-tunable sampling defaults apply to the Claude family only;
    // the other families keep their fixed contract defaults.
    let mut request = request;
    if resolved.family == ProviderFamily::Anthropic {
        request.temperature = request
            .temperature
            .or(Some(state.config.default_temperature));
        request.top_p = request.top_p.or(Some(state.config.default_top_p));
        request.max_tokens = request.max_tokens.or(Some(state.config.default_max_tokens));
    }

    match dispatch_chat(state.invoker.clone(), &resolved, &request, &trace_id).await {
        Ok(ChatOutcome::Complete(response)) => {
            info!(
                event = "downstream_responded",
                trace_id = %trace_id,
                model = %resolved.external,
                status = 200,
                elapsed_ms = started_at.elapsed().as_millis() as u64,
                is_stream = false,
            );
            json_response(StatusCode::OK, &response, &trace_id)
        }
        Ok(ChatOutcome::Stream(body)) => {
            info!(
                event = "downstream_responded",
                trace_id = %trace_id,
                model = %resolved.external,
                status = 200,
                elapsed_ms = started_at.elapsed().as_millis() as u64,
                is_stream = true,
            );
            stream_response(body, &trace_id)
        }
        Err(err) => {
            warn!(
                event = "downstream_responded",
                trace_id = %trace_id,
                model = %resolved.external,
                status = err.status().as_u16(),
                elapsed_ms = started_at.elapsed().as_millis() as u64,
                error = %err,
            );
            error_response(err, &trace_id)
        }
    }
}

pub async fn list_models(State(state): State<Arc<CoreState>>, headers: HeaderMap) -> Response {
    let trace_id = Uuid::new_v4().to_string();

    if let Err(err) = state.auth.authenticate(&headers) {
        return error_response(err, &trace_id);
    }

    let listing = ListModelsResponse {
        object: ModelListObjectType::List,
        data: state.registry.aliases(),
    };
    json_response(StatusCode::OK, &listing, &trace_id)
}

pub async fn not_found() -> Response {
    let trace_id = Uuid::new_v4().to_string();
    error_response(ApiError::not_found("unknown endpoint"), &trace_id)
}

pub async fn method_not_allowed() -> Response {
    envelope_response(
        StatusCode::METHOD_NOT_ALLOWED,
        serde_json::json!({
            "error": {
                "message": "method not allowed",
                "type": "method_not_allowed",
                "code": "method_not_allowed",
            }
        }),
        None,
    )
}

fn json_response<T: serde::Serialize>(status: StatusCode, value: &T, trace_id: &str) -> Response {
    match serde_json::to_vec(value) {
        Ok(body) => {
            let mut resp = Response::new(Body::from(body));
            *resp.status_mut() = status;
            resp.headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            set_request_id(&mut resp, trace_id);
            resp
        }
        Err(err) => error_response(
            ApiError::internal(format!("response serialization failed: {err}")),
            trace_id,
        ),
    }
}

fn stream_response(body: StreamBody, trace_id: &str) -> Response {
    let mut resp = Response::new(Body::from_stream(body.stream));
    resp.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(body.content_type));
    set_request_id(&mut resp, trace_id);
    resp
}

fn error_response(err: ApiError, trace_id: &str) -> Response {
    if let ApiError::Internal(detail) = &err {
        warn!(event = "internal_error", trace_id = %trace_id, detail = %detail);
    }
    envelope_response(err.status(), err.envelope(), Some(trace_id))
}

fn envelope_response(
    status: StatusCode,
    envelope: serde_json::Value,
    trace_id: Option<&str>,
) -> Response {
    let mut resp = Response::new(Body::from(envelope.to_string()));
    *resp.status_mut() = status;
    resp.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Some(trace_id) = trace_id {
        set_request_id(&mut resp, trace_id);
    }
    resp
}

fn set_request_id(resp: &mut Response, trace_id: &str) {
    if let Ok(value) = HeaderValue::from_str(trace_id) {
        resp.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
}
