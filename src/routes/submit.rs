//! Questionnaire submission route

use bytes::Bytes;
use hyper::{Method, Response, StatusCode};

use super::{
    intake_error_response, json_response, method_not_allowed, parse_json_object, FormRoute,
    FullBody, SuccessResponse,
};
use crate::server::AppState;
use crate::submission::{SubmissionPayload, SAVE_FAILED};
use crate::types::IntakeError;

/// Handle a questionnaire submission (POST /submitEngagementForm)
pub async fn handle_submit(state: &AppState, method: &Method, body: Bytes) -> Response<FullBody> {
    if !FormRoute::Submit.accepts(method) {
        return method_not_allowed(FormRoute::Submit);
    }

    let payload: SubmissionPayload = match parse_json_object(&body) {
        Ok(payload) => payload,
        Err(e) => return intake_error_response(e, SAVE_FAILED),
    };

    let outcome = tokio::time::timeout(state.args.request_timeout(), state.service.submit(payload))
        .await
        .unwrap_or(Err(IntakeError::Timeout(state.args.request_timeout_ms)));

    match outcome {
        Ok(_) => json_response(StatusCode::OK, &SuccessResponse { success: true }),
        Err(e) => intake_error_response(e, SAVE_FAILED),
    }
}
