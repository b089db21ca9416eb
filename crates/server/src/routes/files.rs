use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::info;

use models::FileId;

use crate::errors::ApiError;
use crate::startup::AppState;
use crate::store::StoredFile;

#[derive(Serialize)]
pub struct Uploaded {
    pub id: FileId,
}

/// Multipart upload; only the `file` field is read.
pub async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> Result<(StatusCode, Json<Uploaded>), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("cannot read file: {e}")))?;
        let size = bytes.len();
        let id = state.store.put_file(StoredFile { name, content_type, bytes: bytes.to_vec() }).await;
        info!(%id, size, "file stored");
        return Ok((StatusCode::CREATED, Json(Uploaded { id })));
    }
    Err(ApiError::bad_request("multipart field 'file' is required"))
}

pub async fn download(State(state): State<AppState>, Path(id): Path<FileId>) -> Result<Response, ApiError> {
    let file = state.store.file(&id).await.ok_or_else(|| ApiError::not_found(format!("file '{id}' not found")))?;
    let content_type = file.content_type.unwrap_or_else(|| "application/octet-stream".to_string());
    Ok(([(header::CONTENT_TYPE, content_type)], file.bytes).into_response())
}
