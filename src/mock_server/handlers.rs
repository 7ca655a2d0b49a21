//! Request interception handler.

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use url::Url;

use crate::mock_server::state::{self, SharedState};
use crate::models::{RequestDescription, ResponseSpec};

/// Headers from raw captures that describe the original connection rather
/// than the response.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "content-length",
    "keep-alive",
    "transfer-encoding",
];

/// Answer any request with the most recent matching stub.
pub async fn intercept(State(state): State<SharedState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let Some(url) = request_url(&parts.uri, &parts.headers) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "Invalid request target",
                "message": format!("Cannot build an absolute URL from '{}'", parts.uri)
            })),
        )
            .into_response();
    };

    let body = match to_bytes(body, usize::MAX).await {
        Ok(body) => body,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "error": "Unreadable request body",
                    "message": e.to_string()
                })),
            )
                .into_response()
        }
    };

    let request = RequestDescription {
        method: parts.method.as_str().to_string(),
        url,
        headers: parts
            .headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect(),
        body: body.to_vec(),
        received_at: Utc::now(),
    };

    // Release the table before running the responder; handlers may
    // inspect other stubs.
    let (matched, unmatched_status) = {
        let state = state::lock(&state);
        (
            state.find(&request.method, request.url.as_str()),
            state.unmatched_status(),
        )
    };

    match matched {
        Some(stub) => {
            tracing::trace!(method = %request.method, url = %request.url, "Matched stub");
            stub.handle.record(request.clone());
            into_response(stub.responder.respond(&request))
        }
        None => {
            tracing::warn!(
                method = %request.method,
                url = %request.url,
                "No fixture matched request"
            );
            let status =
                StatusCode::from_u16(unmatched_status).unwrap_or(StatusCode::NOT_IMPLEMENTED);
            (
                status,
                Json(serde_json::json!({
                    "error": "no fixture matched",
                    "method": request.method,
                    "url": request.url.as_str()
                })),
            )
                .into_response()
        }
    }
}

/// Absolute URL for a proxied (absolute-form) or direct (origin-form) request.
fn request_url(uri: &Uri, headers: &HeaderMap) -> Option<Url> {
    if uri.scheme().is_some() && uri.authority().is_some() {
        return Url::parse(&uri.to_string()).ok();
    }

    let host = headers.get(header::HOST)?.to_str().ok()?;
    let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
    Url::parse(&format!("http://{host}{path}")).ok()
}

fn into_response(spec: ResponseSpec) -> Response {
    let status = StatusCode::from_u16(spec.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut builder = Response::builder().status(status);

    for (name, value) in &spec.headers {
        if HOP_BY_HOP.iter().any(|h| name.eq_ignore_ascii_case(h)) {
            continue;
        }
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => builder = builder.header(name, value),
            _ => tracing::warn!(header = %name, "Skipping invalid response header"),
        }
    }

    builder
        .body(Body::from(spec.body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
