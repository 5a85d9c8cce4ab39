use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use teger_shared::analysis::AnalysisError;
use teger_shared::models::AnalysisRequest;

use super::AppState;
use super::errors::{analysis_error_response, json_rejection_response};
use super::observability::{AnalysisOutcome, RequestContext, with_outcome};

pub(super) async fn analyze(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return with_outcome(
                json_rejection_response(&context.request_id, rejection),
                AnalysisOutcome::Rejected,
            );
        }
    };

    match state
        .analyzer
        .analyze(&request, Some(&context.request_id))
        .await
    {
        Ok(assessment) => {
            let outcome = AnalysisOutcome::Assessed {
                risk_score: assessment.risk_score,
            };
            with_outcome((StatusCode::OK, Json(assessment)).into_response(), outcome)
        }
        Err(err) => {
            let outcome = match &err {
                AnalysisError::Configuration => AnalysisOutcome::Unconfigured,
                AnalysisError::Upstream(_) => AnalysisOutcome::UpstreamFailed,
            };
            with_outcome(analysis_error_response(&context.request_id, err), outcome)
        }
    }
}
