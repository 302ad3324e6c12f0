//! Request-level errors and their HTTP rendering.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("template rendering failed: {0}")]
    Template(#[from] tera::Error),
    #[error("invalid upload: {0}")]
    Multipart(#[from] MultipartError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Multipart(e) => e.status(),
            AppError::Store(_) | AppError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {self:?}");
        } else {
            tracing::warn!("Request rejected: {self}");
        }

        let body = format!(
            "<!DOCTYPE html><html><body><h1>{}</h1><p>Please try again later.</p>\
             <p><a href=\"/\">Home</a></p></body></html>",
            status.canonical_reason().unwrap_or("Error")
        );
        (status, Html(body)).into_response()
    }
}
