//! Document handlers: upload, listing, viewing, deletion, and the
//! download-request workflow endpoints.

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use uuid::Uuid;

use docsense_core::error::AppError;
use docsense_entity::document::{Document, DocumentStatus};
use docsense_service::document::{DocumentQuery, UploadInput};
use docsense_storage::ByteStream;

use crate::dto::request::{DocumentListQuery, DownloadQuery, RequestDownloadRequest};
use crate::dto::response::{ApiResponse, DocumentResponse, DownloadStatusResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// POST /api/documents/upload (multipart)
pub async fn upload_document(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<DocumentResponse>>), ApiError> {
    let mut original_name = None;
    let mut mime_type = None;
    let mut data = None;
    let mut title = None;
    let mut tags = None;
    let mut is_public = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("document") => {
                original_name = field.file_name().map(str::to_string);
                mime_type = field.content_type().map(str::to_string);
                data = Some(field.bytes().await.map_err(|e| {
                    AppError::validation(format!("Failed to read upload: {e}"))
                })?);
            }
            Some("title") => {
                title = Some(read_text_field(field).await?);
            }
            Some("tags") => {
                tags = Some(read_text_field(field).await?);
            }
            Some("is_public") | Some("isPublic") => {
                is_public = read_text_field(field).await? == "true";
            }
            _ => {}
        }
    }

    let data = data.ok_or_else(|| AppError::validation("No file uploaded"))?;

    let document = state
        .upload_service
        .upload(
            &auth,
            UploadInput {
                original_name: original_name
                    .ok_or_else(|| AppError::validation("Uploaded file has no filename"))?,
                mime_type: mime_type
                    .unwrap_or_else(|| "application/octet-stream".to_string()),
                data,
                title,
                tags,
                is_public,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Document uploaded successfully",
            document.into(),
        )),
    ))
}

/// GET /api/documents
pub async fn list_documents(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<DocumentListQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let page = PaginationParams {
        page: query.page,
        limit: query.limit,
    }
    .into_page_request();

    let status = match query.status.as_deref() {
        None | Some("all") | Some("") => None,
        Some(s) => Some(parse_document_status(s)?),
    };

    let service_query = DocumentQuery {
        search: query.search,
        file_type: query.file_type.filter(|t| t != "all"),
        status,
        sort_by: query.sort_by,
        descending: !matches!(query.sort_order.as_deref(), Some("asc")),
    };

    let (documents, stats) = state
        .document_service
        .list(&auth, service_query, page)
        .await?;
    let documents = documents.map(DocumentResponse::from);

    Ok(Json(ApiResponse::ok(serde_json::json!({
        "documents": documents,
        "stats": stats,
    }))))
}

/// GET /api/documents/{id}
pub async fn get_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DocumentResponse>>, ApiError> {
    let document = state.document_service.get(&auth, id).await?;
    Ok(Json(ApiResponse::ok(document.into())))
}

/// GET /api/documents/{id}/view — inline secure viewer stream.
pub async fn view_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let (document, stream) = state.document_service.view(&auth, id).await?;
    stream_response(&document, stream, "inline", true)
}

/// DELETE /api/documents/{id}
pub async fn delete_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.document_service.delete(&auth, id).await?;
    Ok(Json(ApiResponse::message("Document deleted successfully")))
}

/// POST /api/documents/{id}/request-download
pub async fn request_download(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<RequestDownloadRequest>,
) -> Result<(StatusCode, Json<ApiResponse<serde_json::Value>>), ApiError> {
    let request = state
        .download_service
        .create_request(&auth, id, &req.reason)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Download request submitted successfully",
            serde_json::json!({
                "request_id": request.id,
                "status": request.status,
            }),
        )),
    ))
}

/// GET /api/documents/{id}/download-status
pub async fn download_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DownloadStatusResponse>>, ApiError> {
    let status = state.download_service.status_for(&auth, id).await?;
    Ok(Json(ApiResponse::ok(status.into())))
}

/// GET /api/documents/download?token=...
///
/// Consumes one unit of the token's allowance and streams the document
/// as an attachment.
pub async fn download_document(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    let token = query
        .token
        .ok_or_else(|| AppError::validation("Download token required"))?;

    let grant = state.download_service.download_by_token(&token).await?;
    let stream = state.document_service.open_content(&grant.document).await?;
    stream_response(&grant.document, stream, "attachment", false)
}

async fn read_text_field(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError(AppError::validation(format!("Malformed form field: {e}"))))
}

fn parse_document_status(s: &str) -> Result<DocumentStatus, ApiError> {
    match s {
        "processing" => Ok(DocumentStatus::Processing),
        "processed" => Ok(DocumentStatus::Processed),
        "failed" => Ok(DocumentStatus::Failed),
        "archived" => Ok(DocumentStatus::Archived),
        _ => Err(ApiError(AppError::validation(format!(
            "Invalid document status: {s}"
        )))),
    }
}

/// Build a streaming file response with content headers.
fn stream_response(
    document: &Document,
    stream: ByteStream,
    disposition: &str,
    no_cache: bool,
) -> Result<Response, ApiError> {
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, &document.mime_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("{disposition}; filename=\"{}\"", document.original_name),
        )
        .header(header::CONTENT_LENGTH, document.file_size);

    if no_cache {
        builder = builder
            .header(header::CACHE_CONTROL, "no-cache, no-store, must-revalidate")
            .header(header::PRAGMA, "no-cache")
            .header(header::EXPIRES, "0");
    }

    builder
        .body(Body::from_stream(stream))
        .map_err(|e| ApiError(AppError::internal(format!("Failed to build response: {e}"))))
}
