use axum::{
    body::Body,
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "ui/dist"]
struct Asset;

/// Serves the embedded web client. Unknown paths fall back to `index.html`
/// so client-side routes resolve, except under `/api/` where a miss is a
/// real 404.
pub async fn serve_asset(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    let lookup = if path.is_empty() { "index.html" } else { path };

    if let Some(response) = embedded_file(lookup) {
        return response;
    }

    if !uri.path().starts_with("/api/") {
        if let Some(response) = embedded_file("index.html") {
            return response;
        }
    }

    (StatusCode::NOT_FOUND, "404 Not Found").into_response()
}

fn embedded_file(path: &str) -> Option<Response> {
    let content = Asset::get(path)?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    Some(([(header::CONTENT_TYPE, mime.as_ref())], Body::from(content.data)).into_response())
}
