//! Static file serving module
//!
//! Resolves request paths against the served root, guards against
//! traversal, and builds file responses.

use crate::config::Config;
use crate::handler::router::RequestContext;
use crate::http::{self, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use percent_encoding::percent_decode_str;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Serve the entry document (`index.html` in the served root) for `/`
pub async fn serve_entry_document(
    ctx: &RequestContext<'_>,
    config: &Config,
) -> Response<Full<Bytes>> {
    let file_path = Path::new(&config.server.root).join(&config.server.index_file);
    match load_file(&file_path).await {
        Some((content, content_type)) => {
            if ctx.access_log {
                logger::log_response(200, content.len());
            }
            http::build_file_response(content, content_type, ctx.is_head)
        }
        None => {
            if ctx.access_log {
                logger::log_response(404, 0);
            }
            http::build_404_response()
        }
    }
}

/// Serve a static file from the served root
pub async fn serve_path(ctx: &RequestContext<'_>, config: &Config) -> Response<Full<Bytes>> {
    match load_from_root(&config.server.root, ctx.path).await {
        Some((content, content_type)) => {
            if ctx.access_log {
                logger::log_response(200, content.len());
            }
            http::build_file_response(content, content_type, ctx.is_head)
        }
        None => {
            if ctx.access_log {
                logger::log_response(404, 0);
            }
            http::build_404_response()
        }
    }
}

/// Look up `path` under `root` and read it
///
/// Returns `None` (mapped to 404 by the caller) when the path is unsafe,
/// missing, or names a directory.
async fn load_from_root(root: &str, path: &str) -> Option<(Vec<u8>, &'static str)> {
    let file_path = resolve_request_path(root, path)?;

    // Canonicalize both ends so symlinks can't escape the root
    let root_canonical = match Path::new(root).canonicalize() {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!("Served root '{root}' not accessible: {e}"));
            return None;
        }
    };
    let file_canonical = file_path.canonicalize().ok()?;
    if !file_canonical.starts_with(&root_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            path,
            file_canonical.display()
        ));
        return None;
    }

    // Directory listings are denied
    if !file_canonical.is_file() {
        return None;
    }

    load_file(&file_canonical).await
}

/// Read a file and infer its content type from the extension
async fn load_file(path: &Path) -> Option<(Vec<u8>, &'static str)> {
    let content = fs::read(path).await.ok()?;
    let content_type = mime::get_content_type(path.extension().and_then(|e| e.to_str()));
    Some((content, content_type))
}

/// Join a request path onto the served root, keeping only normal components
///
/// The path is percent-decoded first, so `%20` can name a space on disk
/// while an encoded `..` decodes to a parent component and is rejected like
/// a literal one. `..`, absolute prefixes, and sequences decoding to
/// invalid UTF-8 are all rejected before the filesystem is consulted.
fn resolve_request_path(root: &str, request_path: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(request_path).decode_utf8().ok()?;
    let relative = decoded.trim_start_matches('/');

    let mut clean = PathBuf::new();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    Some(Path::new(root).join(clean))
}
