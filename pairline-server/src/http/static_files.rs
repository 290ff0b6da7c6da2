//! Embedded landing page
//!
//! The page is the only embedded asset and is served for every path the
//! router does not otherwise handle.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "public/"]
struct PublicAssets;

const LANDING_PAGE: &str = "index.html";

pub async fn static_handler() -> Response {
    match PublicAssets::get(LANDING_PAGE) {
        Some(page) => Html(page.data.into_owned()).into_response(),
        None => (StatusCode::NOT_FOUND, "Landing page not embedded").into_response(),
    }
}
