//! 404 Not Found page.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::html::error_view;

/// Route handler for pages that do not exist.
pub async fn get_404_not_found() -> Response {
    get_404_not_found_response()
}

/// Get a response that renders the 404 not found page.
pub fn get_404_not_found_response() -> Response {
    (
        StatusCode::NOT_FOUND,
        error_view(
            "Not Found",
            "404",
            "Page not found.",
            "Sorry, we couldn't find the page you were looking for.",
        ),
    )
        .into_response()
}
