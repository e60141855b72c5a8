use crate::models::{HealthResponse, UploadResponse};
use crate::storage::ImageStore;
use aws_sdk_s3::primitives::ByteStream;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct AppState {
    pub images: ImageStore,
    /// Cancelled on shutdown; aborts uploads still in flight
    pub shutdown: CancellationToken,
    pub max_upload_size: usize,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/images", post(upload_image))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(state.max_upload_size))
        .with_state(state)
}

/// POST /images - Store an image and return its public URL
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), (StatusCode, String)> {
    let mut image: Option<(Bytes, Option<String>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (e.status(), format!("Invalid multipart data: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "image" | "file" => {
                let content_type = field.content_type().map(str::to_string);
                // Oversized bodies surface here as 413
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| (e.status(), format!("Failed to read image: {}", e)))?;
                image = Some((data, content_type));
            }
            _ => {}
        }
    }

    let (data, content_type) =
        image.ok_or_else(|| (StatusCode::BAD_REQUEST, "No image provided".to_string()))?;

    let cancel = state.shutdown.child_token();
    let url = state
        .images
        .store_with_content_type(ByteStream::from(data), content_type, &cancel)
        .await
        .map_err(|e| {
            tracing::error!("Failed to store image: {}", e);
            if e.is_cancelled() {
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Upload cancelled".to_string(),
                )
            } else {
                (StatusCode::BAD_GATEWAY, "Failed to store image".to_string())
            }
        })?;

    Ok((StatusCode::CREATED, Json(UploadResponse { url })))
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
