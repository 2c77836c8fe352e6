use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::document::{ContentType, RawDocument};
use crate::models::prediction::ClassifyResponse;
use crate::state::AppState;

const FILE_FIELD: &str = "file";
const OCTET_STREAM: &str = "application/octet-stream";

/// POST /api/v1/classify
/// Multipart upload with a `file` field holding a .txt or .pdf resume.
pub async fn handle_classify(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ClassifyResponse>, AppError> {
    let request_id = Uuid::new_v4();
    let document = read_upload(&mut multipart).await?;
    let content_type = document.content_type().clone();
    info!(
        %request_id,
        content_type = content_type.as_mime(),
        bytes = document.bytes().len(),
        "classifying resume"
    );

    // CPU-bound (PDF parsing, vectorization) — keep it off the async workers.
    let classifier = Arc::clone(&state.classifier);
    let category = tokio::task::spawn_blocking(move || classifier.classify_document(&document))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("classification task failed: {e}")))?
        .map_err(|e| {
            warn!(%request_id, "classification failed: {e}");
            e
        })?;

    info!(%request_id, %category, "resume classified");

    Ok(Json(ClassifyResponse {
        request_id,
        category,
        content_type,
        classified_at: Utc::now(),
    }))
}

/// Pulls the `file` field out of the form. Other fields are skipped.
async fn read_upload(multipart: &mut Multipart) -> Result<RawDocument, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let content_type = resolve_content_type(field.content_type(), field.file_name());
        let bytes = field.bytes().await?;
        return Ok(RawDocument::new(bytes, content_type));
    }

    Err(AppError::Validation(format!(
        "multipart field '{FILE_FIELD}' is required"
    )))
}

/// The declared type wins; browsers that send no type or octet-stream fall
/// back to the file extension.
fn resolve_content_type(declared: Option<&str>, file_name: Option<&str>) -> ContentType {
    match declared {
        Some(mime) if !mime.is_empty() && !mime.starts_with(OCTET_STREAM) => {
            ContentType::from_mime(mime)
        }
        _ => file_name
            .and_then(ContentType::from_file_name)
            .unwrap_or_else(|| ContentType::from_mime(declared.unwrap_or(OCTET_STREAM))),
    }
}
