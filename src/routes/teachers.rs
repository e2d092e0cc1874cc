//! Teacher picker route

use bytes::Bytes;
use hyper::{Method, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    intake_error_response, json_response, method_not_allowed, parse_json_object, FormRoute,
    FullBody,
};
use crate::roster::{list_form_teachers, TeacherSummary, LOAD_FAILED};
use crate::server::AppState;
use crate::submission::MISSING_TOKEN;
use crate::types::IntakeError;

/// Body form of the listing request
#[derive(Debug, Default, Deserialize)]
pub struct TeachersRequest {
    #[serde(default)]
    pub token: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct TeachersResponse {
    pub teachers: Vec<TeacherSummary>,
}

/// Query string form of the listing request
#[derive(Debug, Default, Deserialize)]
pub struct TeachersQuery {
    #[serde(default)]
    pub token: Option<String>,
}

/// Non-empty `token` from a raw query string
pub fn token_from_query(query: Option<&str>) -> Option<String> {
    let params: TeachersQuery = serde_urlencoded::from_str(query?).ok()?;
    params.token.filter(|token| !token.is_empty())
}

/// Handle the teacher listing (GET|POST /listFormTeachers)
pub async fn handle_list_teachers(
    state: &AppState,
    method: &Method,
    query: Option<&str>,
    body: Bytes,
) -> Response<FullBody> {
    if !FormRoute::Teachers.accepts(method) {
        return method_not_allowed(FormRoute::Teachers);
    }

    let token = match token_from_query(query) {
        Some(token) => token,
        None => match parse_json_object::<TeachersRequest>(&body) {
            Ok(TeachersRequest {
                token: Some(Value::String(token)),
            }) if !token.is_empty() => token,
            Ok(_) => {
                return intake_error_response(
                    IntakeError::BadRequest(MISSING_TOKEN.to_string()),
                    LOAD_FAILED,
                )
            }
            Err(e) => return intake_error_response(e, LOAD_FAILED),
        },
    };

    let outcome = tokio::time::timeout(
        state.args.request_timeout(),
        list_form_teachers(&state.service, &token),
    )
    .await
    .unwrap_or(Err(IntakeError::Timeout(state.args.request_timeout_ms)));

    match outcome {
        Ok(teachers) => json_response(StatusCode::OK, &TeachersResponse { teachers }),
        Err(e) => intake_error_response(e, LOAD_FAILED),
    }
}
