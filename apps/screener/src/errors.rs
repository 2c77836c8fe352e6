use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Request-scoped failures of the classification pipeline.
/// None of these are fatal to the process; the shell reports them per request.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Could not decode text: {0}")]
    DecodeError(String),

    #[error("Could not extract text from PDF: {0}")]
    ExtractionError(String),

    #[error("Vectorization failed: {0}")]
    VectorizationError(String),

    #[error("Inference failed: {0}")]
    InferenceError(String),
}

/// Failures while loading the persisted vectorizer/classifier artifacts.
/// Fatal at startup.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Failed to read artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unsupported artifact format version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },

    #[error("Invalid artifact: {0}")]
    Invalid(String),
}

/// Application-level error type for the HTTP shell.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upload error: {0}")]
    Upload(#[from] MultipartError),

    #[error(transparent)]
    Classify(#[from] ClassifyError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Upload(e) => (e.status(), "UPLOAD_ERROR", e.body_text()),
            AppError::Classify(err) => match err {
                ClassifyError::UnsupportedFormat(_) => (
                    StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    "UNSUPPORTED_FORMAT",
                    err.to_string(),
                ),
                ClassifyError::DecodeError(_) => {
                    (StatusCode::BAD_REQUEST, "DECODE_ERROR", err.to_string())
                }
                ClassifyError::ExtractionError(_) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "EXTRACTION_ERROR",
                    err.to_string(),
                ),
                ClassifyError::VectorizationError(msg) => {
                    tracing::error!("Vectorization error: {msg}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "VECTORIZATION_ERROR",
                        "The resume could not be vectorized".to_string(),
                    )
                }
                ClassifyError::InferenceError(msg) => {
                    tracing::error!("Inference error: {msg}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INFERENCE_ERROR",
                        "The classifier could not produce a prediction".to_string(),
                    )
                }
            },
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
