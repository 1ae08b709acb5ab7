// 🌐 Web surface - upload a PDF, see both tables, download the xlsx
//
//   GET  /                      upload page
//   GET  /api/health            health check
//   POST /api/offsets           multipart "file" → JSON tables
//   POST /api/offsets/export    multipart "file" → offsets_pendientes.xlsx

use crate::config::ServerConfig;
use crate::error::OffsetError;
use crate::export::{EXPORT_FILE_NAME, XLSX_MIME};
use crate::parser::RawRecord;
use crate::pending::PendingSummary;
use crate::pipeline::{self, OffsetReport};
use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Multipart field carrying the PDF
pub const UPLOAD_FIELD: &str = "file";

/// API Response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn failure(message: String) -> Self {
        Self {
            success: false,
            data: (),
            error: Some(message),
        }
    }
}

/// Both tables as shown on the page
#[derive(Serialize)]
pub struct OffsetsResponse {
    pub rows: Vec<RawRecord>,
    pub pending: Vec<PendingSummary>,
    pub row_count: usize,
    pub entity_count: usize,
    pub total_pending: f64,
}

impl From<OffsetReport> for OffsetsResponse {
    fn from(report: OffsetReport) -> Self {
        Self {
            row_count: report.row_count(),
            entity_count: report.entity_count(),
            total_pending: report.total_pending(),
            rows: report.rows.rows().iter().map(|r| r.record.clone()).collect(),
            pending: report.pending,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing multipart field 'file'")]
    MissingFile,

    #[error("upload failed: {0}")]
    Upload(#[from] MultipartError),

    #[error(transparent)]
    Offsets(#[from] OffsetError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::MissingFile => StatusCode::BAD_REQUEST,
            ApiError::Upload(e) => e.status(),
            ApiError::Offsets(e) if e.is_document_format() => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Offsets(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("request failed: {}", self);
        } else {
            warn!("request rejected: {}", self);
        }

        (status, Json(ApiResponse::failure(self.to_string()))).into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET / - Serve the upload page
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

/// POST /api/offsets - Process an uploaded PDF and return both tables
async fn process_offsets(multipart: Multipart) -> Result<Json<ApiResponse<OffsetsResponse>>, ApiError> {
    let report = run_upload(multipart).await?;
    Ok(Json(ApiResponse::ok(report.into())))
}

/// POST /api/offsets/export - Process an uploaded PDF and return the xlsx
async fn export_offsets(multipart: Multipart) -> Result<Response, ApiError> {
    let report = run_upload(multipart).await?;
    let xlsx = report.to_xlsx()?;

    let disposition = format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, XLSX_MIME.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        xlsx,
    )
        .into_response())
}

async fn read_pdf_upload(mut multipart: Multipart) -> Result<Bytes, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(UPLOAD_FIELD) {
            let file_name = field.file_name().unwrap_or("upload.pdf").to_string();
            let bytes = field.bytes().await?;
            info!(file = %file_name, bytes = bytes.len(), "pdf received");
            return Ok(bytes);
        }
    }
    Err(ApiError::MissingFile)
}

/// The pipeline is synchronous; keep it off the async workers.
async fn run_upload(multipart: Multipart) -> Result<OffsetReport, ApiError> {
    let bytes = read_pdf_upload(multipart).await?;
    let report = tokio::task::spawn_blocking(move || pipeline::process_pdf(&bytes))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;
    Ok(report)
}

// ============================================================================
// Router
// ============================================================================

pub fn router(config: &ServerConfig) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/offsets", post(process_offsets))
        .route("/offsets/export", post(export_offsets));

    Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf_fixture::build_pdf;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    const BOUNDARY: &str = "offsets-test-boundary";

    fn multipart_request(uri: &str, field: &str, payload: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"report.pdf\"\r\nContent-Type: application/pdf\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(payload);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn sample_pdf() -> Vec<u8> {
        build_pdf(&[&[
            "10/5/2024 02:15:30 PM PUMP-01 X some noise Offset: Value (12.5 -> 10.0) CESAR",
            "10/5/2024 03:15:30 PM PUMP-02 Y Offset: Value (1 -> 3)",
        ]])
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = router(&ServerConfig::default());
        let response = app
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], "OK");
    }

    #[tokio::test]
    async fn test_index_page_is_served() {
        let app = router(&ServerConfig::default());
        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_process_returns_both_tables() {
        let app = router(&ServerConfig::default());
        let response = app
            .oneshot(multipart_request("/api/offsets", UPLOAD_FIELD, &sample_pdf()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["data"]["row_count"], 2);
        assert_eq!(json["data"]["entity_count"], 2);
        assert_eq!(json["data"]["rows"][0]["user"], "CESAR");
        assert_eq!(json["data"]["pending"][1]["entity"], "PUMP-02");
        assert_eq!(json["data"]["pending"][1]["difference_pending"], 2.0);
    }

    #[tokio::test]
    async fn test_export_is_downloadable_xlsx() {
        let app = router(&ServerConfig::default());
        let response = app
            .oneshot(multipart_request("/api/offsets/export", UPLOAD_FIELD, &sample_pdf()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], XLSX_MIME);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"offsets_pendientes.xlsx\""
        );

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        // xlsx is a zip container
        assert_eq!(&bytes[..2], b"PK");
    }

    #[tokio::test]
    async fn test_invalid_pdf_is_unprocessable() {
        let app = router(&ServerConfig::default());
        let response = app
            .oneshot(multipart_request("/api/offsets", UPLOAD_FIELD, b"plain text"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = json_body(response).await;
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().unwrap().contains("Document format error"));
    }

    #[tokio::test]
    async fn test_missing_file_field_is_bad_request() {
        let app = router(&ServerConfig::default());
        let response = app
            .oneshot(multipart_request("/api/offsets", "attachment", &sample_pdf()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
