//! Ephemeral file sharing handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use toolbox_core::error::{AppError, ErrorKind};

use crate::dto::response::UploadResponse;
use crate::error::ApiResult;
use crate::state::AppState;

/// Multipart field carrying the upload.
const FILE_FIELD: &str = "file";

/// Characters left as-is in an RFC 5987 `filename*` value.
const FILENAME_STAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// POST /sharefile
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::validation("The 'file' field must carry a filename."))?;
        let content = field.bytes().await.map_err(multipart_error)?;

        let receipt = state.store.put(&file_name, content).await?;
        return Ok(Json(UploadResponse::from(receipt)));
    }

    Err(AppError::validation("Missing multipart field 'file'.").into())
}

/// GET /sharefile/{uuid}
pub async fn download(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> ApiResult<Response> {
    let file = state.store.get(&handle).await?;
    let disposition = HeaderValue::from_str(&content_disposition(file.original_name()))
        .map_err(|e| AppError::internal(format!("Invalid Content-Disposition header: {e}")))?;

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from(file.content),
    )
        .into_response())
}

/// `attachment` disposition with an ASCII fallback name and the exact
/// UTF-8 name in `filename*`.
fn content_disposition(name: &str) -> String {
    let fallback: String = name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();
    let encoded = utf8_percent_encode(name, FILENAME_STAR);
    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::new(ErrorKind::PayloadTooLarge, e.body_text())
    } else {
        AppError::validation(format!("Multipart error: {}", e.body_text()))
    }
}
