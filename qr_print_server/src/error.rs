use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use log::error;
use thiserror::Error;

/// Faults that escape the per-stage handling in the web layer. Rendered as
/// a generic error page; full detail stays in the server log.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("io error")]
    Io(#[from] std::io::Error),
    #[error("blocking task failed")]
    Join(#[from] tokio::task::JoinError),
}

const ERROR_PAGE: &str = "<!doctype html>\
<html><head><meta charset=\"utf-8\"><title>Error</title></head>\
<body><h1>Something went wrong</h1>\
<p>The request could not be completed. Please try again.</p>\
<p><a href=\"/\">Back to the form</a></p></body></html>";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("unhandled error: {self:?}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(ERROR_PAGE.to_string()),
        )
            .into_response()
    }
}
