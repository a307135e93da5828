//! Pingora serving adapter.
//!
//! Turns a pingora server session into a buffered `http::Request`, runs it
//! through the application, and hands the response back to pingora.

use crate::app::App;
use crate::config::Config;
use crate::core::pipeline::response::client_error;
use crate::core::pipeline::{RemoteAddr, Request, Response};
use async_trait::async_trait;
use bytes::BytesMut;
use http::StatusCode;
use http::header::{CONNECTION, CONTENT_LENGTH, HeaderValue};
use pingora::apps::http_app::{HttpServer, ServeHttp};
use pingora::protocols::http::ServerSession;
use pingora::services::listening::Service;
use std::sync::Arc;
use tracing::{info, warn};

pub struct SnipboxService {
    app: Arc<App>,
    max_body_size: usize,
}

impl SnipboxService {
    #[must_use]
    pub fn new(app: Arc<App>, max_body_size: usize) -> Self {
        Self { app, max_body_size }
    }

    async fn read_request(&self, session: &mut ServerSession) -> Result<Request, Response> {
        let header = session.req_header();

        let declared = header
            .headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(0);
        if declared > self.max_body_size {
            return Err(client_error(StatusCode::PAYLOAD_TOO_LARGE));
        }

        let mut builder = http::Request::builder()
            .method(header.method.clone())
            .uri(header.uri.clone())
            .version(header.version);
        if let Some(headers) = builder.headers_mut() {
            headers.extend(header.headers.clone());
        }

        let mut body = BytesMut::new();
        loop {
            match session.read_request_body().await {
                Ok(Some(chunk)) => {
                    if body.len() + chunk.len() > self.max_body_size {
                        return Err(client_error(StatusCode::PAYLOAD_TOO_LARGE));
                    }
                    body.extend_from_slice(&chunk);
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "failed to read request body");
                    return Err(client_error(StatusCode::BAD_REQUEST));
                }
            }
        }

        let mut req = builder
            .body(body.freeze())
            .map_err(|_| client_error(StatusCode::BAD_REQUEST))?;

        let addr = session
            .client_addr()
            .map_or_else(|| "-".to_string(), ToString::to_string);
        req.extensions_mut().insert(RemoteAddr(addr));
        Ok(req)
    }
}

fn into_pingora(resp: Response) -> http::Response<Vec<u8>> {
    let (mut parts, body) = resp.into_parts();
    parts
        .headers
        .insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
    http::Response::from_parts(parts, body.to_vec())
}

fn wants_close(resp: &Response) -> bool {
    resp.headers()
        .get(CONNECTION)
        .is_some_and(|v| v.as_bytes().eq_ignore_ascii_case(b"close"))
}

#[async_trait]
impl ServeHttp for SnipboxService {
    async fn response(&self, session: &mut ServerSession) -> http::Response<Vec<u8>> {
        let resp = match self.read_request(session).await {
            Ok(req) => self.app.handle(req).await,
            Err(resp) => resp,
        };

        if wants_close(&resp) || resp.status() == StatusCode::PAYLOAD_TOO_LARGE {
            session.set_keepalive(None);
        }
        into_pingora(resp)
    }
}

/// Builds the listening service for `config`, TLS when cert and key are set.
///
/// # Errors
///
/// Returns an error if the TLS material cannot be loaded.
pub fn listening_service(
    app: Arc<App>,
    config: &Config,
) -> pingora::Result<Service<HttpServer<SnipboxService>>> {
    let svc = SnipboxService::new(app, config.max_body_size);
    let mut service = Service::new("snipbox".to_string(), HttpServer::new_app(svc));
    let addr = config.listen_addr.to_string();

    if let Some(tls) = &config.tls {
        service.add_tls(
            &addr,
            &tls.cert_path.to_string_lossy(),
            &tls.key_path.to_string_lossy(),
        )?;
        info!(addr = %addr, "https listener configured");
    } else {
        service.add_tcp(&addr);
        info!(addr = %addr, "http listener configured");
    }
    Ok(service)
}
