//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo for async handling.

use bytes::Bytes;
use http_body_util::{BodyExt, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{header, Method, Request, Response};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::Args;
use crate::routes::{self, FormRoute, FullBody};
use crate::store::EngagementStore;
use crate::submission::SubmissionService;
use crate::types::{IntakeError, Result};

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub service: SubmissionService,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(args: Args, store: Arc<dyn EngagementStore>) -> Self {
        let service = SubmissionService::new(store, args.token_mode);
        Self {
            args,
            service,
            started_at: Instant::now(),
        }
    }
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "Engagement intake listening on {} as node {}",
        state.args.listen, state.args.node_id
    );

    if state.args.dev_mode {
        warn!("Development mode enabled");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new()
                        .preserve_header_case(true)
                        .title_case_headers(true)
                        .serve_connection(io, service)
                        .await
                    {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> std::result::Result<Response<FullBody>, Infallible> {
    let request_id = Uuid::new_v4();
    let span = info_span!("request", id = %request_id);

    async move {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let query = req.uri().query().map(str::to_string);

        info!("[{}] {} {}", addr, method, path);

        let response = dispatch(&state, method, &path, query.as_deref(), req).await;
        debug!(status = response.status().as_u16(), "Request complete");

        Ok(with_cors(response, &state.args.cors_allow_origin))
    }
    .instrument(span)
    .await
}

async fn dispatch(
    state: &AppState,
    method: Method,
    path: &str,
    query: Option<&str>,
    req: Request<Incoming>,
) -> Response<FullBody> {
    if let Some(route) = FormRoute::from_path(path) {
        if method == Method::OPTIONS {
            return routes::preflight_response(route);
        }

        let body = if method == Method::POST {
            match read_body(req, state.args.max_body_bytes).await {
                Ok(body) => body,
                Err(e) => return routes::intake_error_response(e, routes::UNREADABLE_BODY),
            }
        } else {
            Bytes::new()
        };

        return match route {
            FormRoute::Submit => routes::handle_submit(state, &method, body).await,
            FormRoute::Teachers => {
                routes::handle_list_teachers(state, &method, query, body).await
            }
        };
    }

    match (method, path) {
        (Method::GET, "/health" | "/healthz") => routes::health_check(state),
        (Method::GET, "/version") => routes::version_info(),
        _ => routes::not_found_response(path),
    }
}

/// Collect a request body, refusing anything over `limit` bytes
pub async fn read_body<B>(req: Request<B>, limit: usize) -> Result<Bytes>
where
    B: hyper::body::Body,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) => {
            debug!("Failed to read request body: {}", e);
            Err(IntakeError::BadRequest(routes::UNREADABLE_BODY.to_string()))
        }
    }
}

/// Stamp the CORS origin header on a response
pub fn with_cors(mut response: Response<FullBody>, origin: &str) -> Response<FullBody> {
    let value = header::HeaderValue::from_str(origin)
        .unwrap_or_else(|_| header::HeaderValue::from_static("*"));
    response
        .headers_mut()
        .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
    response
}
