use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use teger_shared::analysis::AnalysisError;
use teger_shared::models::ErrorDetail;
use tracing::{error, warn};

pub(super) const CONFIGURATION_ERROR_DETAIL: &str = "Server API Key not configured.";
pub(super) const UPSTREAM_ERROR_DETAIL: &str = "Internal reasoning engine error.";

pub(super) fn detail_response(status: StatusCode, detail: &str) -> Response {
    (status, Json(ErrorDetail::new(detail))).into_response()
}

/// Maps an analysis failure to one of two fixed messages. The underlying
/// error is logged and never returned to the caller.
pub(super) fn analysis_error_response(request_id: &str, err: AnalysisError) -> Response {
    match err {
        AnalysisError::Configuration => {
            error!(request_id = %request_id, "analysis rejected: GEMINI_API_KEY is not set");
            detail_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                CONFIGURATION_ERROR_DETAIL,
            )
        }
        AnalysisError::Upstream(upstream) => {
            error!(request_id = %request_id, error = %upstream, "reasoning engine call failed");
            detail_response(StatusCode::INTERNAL_SERVER_ERROR, UPSTREAM_ERROR_DETAIL)
        }
    }
}

pub(super) fn json_rejection_response(request_id: &str, rejection: JsonRejection) -> Response {
    let status = rejection.status();
    let detail = rejection.body_text();
    warn!(request_id = %request_id, status = status.as_u16(), "request body rejected: {detail}");
    detail_response(status, &detail)
}
