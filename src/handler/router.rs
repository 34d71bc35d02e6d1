//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, access
//! logging, and dispatch between the entry document and static files.

use crate::config::Config;
use crate::handler::static_files;
use crate::http;
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::sync::Arc;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub access_log: bool,
}

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    config: Arc<Config>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method();
    let uri = req.uri();
    let path = uri.path();

    let access_log = config.logging.access_log;
    if access_log {
        logger::log_request(method, uri, req.version());
    }

    if let Some(resp) = check_http_method(method) {
        return Ok(resp);
    }

    let ctx = RequestContext {
        path,
        is_head: *method == Method::HEAD,
        access_log,
    };

    Ok(route_request(&ctx, &config).await)
}

/// Check HTTP method and reject anything other than GET/HEAD
fn check_http_method(method: &Method) -> Option<Response<Full<Bytes>>> {
    match method {
        &Method::GET | &Method::HEAD => None,
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Route request: `/` serves the entry document, everything else is looked
/// up as a static file under the served root.
pub async fn route_request(ctx: &RequestContext<'_>, config: &Config) -> Response<Full<Bytes>> {
    if ctx.path == "/" {
        static_files::serve_entry_document(ctx, config).await
    } else {
        static_files::serve_path(ctx, config).await
    }
}
