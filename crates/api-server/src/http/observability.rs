use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{info, warn};
use uuid::Uuid;

const REQUEST_ID_HEADER: &str = "x-request-id";
const MAX_REQUEST_ID_LEN: usize = 128;

#[derive(Clone, Debug)]
pub(super) struct RequestContext {
    pub(super) request_id: String,
}

/// What `/analyze` did with a request. Handlers attach it to the response so
/// the completion log line can carry it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum AnalysisOutcome {
    Assessed { risk_score: i64 },
    Rejected,
    Unconfigured,
    UpstreamFailed,
}

impl AnalysisOutcome {
    fn as_str(self) -> &'static str {
        match self {
            Self::Assessed { .. } => "assessed",
            Self::Rejected => "rejected",
            Self::Unconfigured => "unconfigured",
            Self::UpstreamFailed => "upstream_failed",
        }
    }

    fn risk_score(self) -> Option<i64> {
        match self {
            Self::Assessed { risk_score } => Some(risk_score),
            _ => None,
        }
    }
}

pub(super) fn with_outcome(mut response: Response, outcome: AnalysisOutcome) -> Response {
    response.extensions_mut().insert(outcome);
    response
}

pub(super) async fn request_observability_middleware(mut req: Request, next: Next) -> Response {
    let request_id = resolve_request_id(&req);
    req.extensions_mut().insert(RequestContext {
        request_id: request_id.clone(),
    });

    let method = req.method().clone();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| req.uri().path().to_string(), |matched| matched.as_str().to_string());
    let started_at = Instant::now();

    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    let status = response.status();
    let latency_ms = u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX);
    let outcome = response.extensions().get::<AnalysisOutcome>().copied();
    let outcome_label = outcome.map_or("-", AnalysisOutcome::as_str);
    let risk_score = outcome.and_then(AnalysisOutcome::risk_score);

    if status.is_server_error() {
        warn!(
            request_id = %request_id,
            %method,
            route = %route,
            status = status.as_u16(),
            outcome = outcome_label,
            latency_ms,
            "request failed"
        );
    } else {
        info!(
            request_id = %request_id,
            %method,
            route = %route,
            status = status.as_u16(),
            outcome = outcome_label,
            risk_score,
            latency_ms,
            "request completed"
        );
    }

    response
}

fn resolve_request_id(req: &Request) -> String {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(normalize_request_id)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Caller ids are echoed into logs and headers, so only a short token of
/// `[A-Za-z0-9._-]` is trusted.
fn normalize_request_id(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_REQUEST_ID_LEN {
        return None;
    }

    trimmed
        .bytes()
        .all(|byte| byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.'))
        .then(|| trimmed.to_string())
}
