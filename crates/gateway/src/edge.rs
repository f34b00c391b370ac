//! Edge path filter.
//!
//! Runs before routing. Any filtered path containing `..` is refused with
//! `403 {"error": "Forbidden"}`.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use tracing::warn;

use crate::ErrorResponse;

/// Static asset extensions that bypass the filter. Matched as prefixes of
/// the text after a `.`, so `htm` covers `html` and `woff` covers `woff2`.
const STATIC_EXTENSIONS: &[&str] = &[
    "htm",
    "css",
    "jpg",
    "jpeg",
    "webp",
    "png",
    "gif",
    "svg",
    "ttf",
    "woff",
    "ico",
    "csv",
    "doc",
    "xls",
    "zip",
    "webmanifest",
];

/// Whether the filter applies to `path`.
///
/// API paths are always filtered. Otherwise framework internals under
/// `/_next` and paths that look like static assets are skipped.
pub fn is_filtered(path: &str) -> bool {
    let rest = path.strip_prefix('/').unwrap_or(path);
    if rest.starts_with("api") || rest.starts_with("trpc") {
        return true;
    }
    if rest.starts_with("_next") {
        return false;
    }
    !looks_static(rest)
}

fn looks_static(path: &str) -> bool {
    path.match_indices('.').any(|(i, _)| {
        let after = &path[i + 1..];
        (after.starts_with("js") && !after.starts_with("json"))
            || STATIC_EXTENSIONS.iter().any(|ext| after.starts_with(ext))
    })
}

pub async fn edge_filter(req: Request, next: Next) -> Response {
    let path = req.uri().path();
    if is_filtered(path) && path.contains("..") {
        warn!(path = %path, "Rejected path traversal attempt");
        return (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "Forbidden".into(),
            }),
        )
            .into_response();
    }
    next.run(req).await
}
