//! HTTP routes for the intake service

pub mod health;
pub mod submit;
pub mod teachers;

pub use health::{health_check, version_info};
pub use submit::handle_submit;
pub use teachers::handle_list_teachers;

use bytes::Bytes;
use http_body_util::Full;
use hyper::{header, Method, Response, StatusCode};
use serde::Serialize;
use tracing::{debug, error};

use crate::types::IntakeError;

pub type FullBody = Full<Bytes>;

/// Form endpoints reachable from the browser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormRoute {
    Submit,
    Teachers,
}

impl FormRoute {
    /// Match a request path, including the versioned aliases
    pub fn from_path(path: &str) -> Option<Self> {
        match path.trim_end_matches('/') {
            "/submitEngagementForm" | "/api/v1/engagement-form" => Some(Self::Submit),
            "/listFormTeachers" | "/api/v1/engagement-form/teachers" => Some(Self::Teachers),
            _ => None,
        }
    }

    /// Methods accepted by the route, excluding OPTIONS
    pub fn methods(&self) -> &'static [Method] {
        match self {
            Self::Submit => &[Method::POST],
            Self::Teachers => &[Method::GET, Method::POST],
        }
    }

    /// Value for the Allow / Access-Control-Allow-Methods headers
    pub fn allow_header(&self) -> String {
        let mut methods: Vec<&str> = self.methods().iter().map(Method::as_str).collect();
        methods.push("OPTIONS");
        methods.join(", ")
    }

    pub fn accepts(&self, method: &Method) -> bool {
        self.methods().contains(method)
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Success acknowledgement body
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<FullBody> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());
    let mut response = Response::new(Full::new(Bytes::from(json)));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    response
}

pub fn error_response(status: StatusCode, error: &str) -> Response<FullBody> {
    json_response(
        status,
        &ErrorResponse {
            error: error.to_string(),
        },
    )
}

/// Turn an intake error into a response, logging faults in full.
///
/// Faults are answered with `generic`; client errors keep their message.
pub fn intake_error_response(err: IntakeError, generic: &str) -> Response<FullBody> {
    if err.is_client_error() {
        debug!("Request rejected: {}", err);
    } else {
        error!("Request failed: {}", err);
    }
    let (status, message) = err.into_status_code_and_body(generic);
    error_response(status, &message)
}

/// 405 for a known route hit with the wrong verb
pub fn method_not_allowed(route: FormRoute) -> Response<FullBody> {
    let mut response = intake_error_response(IntakeError::MethodNotAllowed, "");
    if let Ok(value) = header::HeaderValue::from_str(&route.allow_header()) {
        response.headers_mut().insert(header::ALLOW, value);
    }
    response
}

/// CORS preflight response for a form route
pub fn preflight_response(route: FormRoute) -> Response<FullBody> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = StatusCode::NO_CONTENT;
    let headers = response.headers_mut();
    if let Ok(value) = header::HeaderValue::from_str(&route.allow_header()) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, value);
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        header::HeaderValue::from_static("Content-Type"),
    );
    response
}

/// Not found response
pub fn not_found_response(path: &str) -> Response<FullBody> {
    let body = serde_json::json!({
        "error": "Not Found",
        "path": path,
    });
    json_response(StatusCode::NOT_FOUND, &body)
}

/// Parse a JSON object body into a payload type.
///
/// An empty body reads as an empty payload, so the field checks report what
/// is missing. Malformed JSON and non-object values are rejected.
pub(crate) fn parse_json_object<T>(body: &Bytes) -> Result<T, IntakeError>
where
    T: serde::de::DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|_| IntakeError::BadRequest(INVALID_BODY.to_string()))?;

    if !value.is_object() {
        return Err(IntakeError::BadRequest(INVALID_BODY.to_string()));
    }

    serde_json::from_value(value).map_err(|_| IntakeError::BadRequest(INVALID_BODY.to_string()))
}

pub const INVALID_BODY: &str = "invalid request body";
pub const UNREADABLE_BODY: &str = "failed to read request body";
