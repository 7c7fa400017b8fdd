use axum::{
    extract::{rejection::BytesRejection, DefaultBodyLimit},
    http::StatusCode,
    routing::{get, post},
    Router,
    Json,
};
use bytes::Bytes;
use message_signature_verifier::common::handler;
use message_signature_verifier::common::types::{HealthResponse, VerifySignatureResponse};
use message_signature_verifier::config::{self, ServerConfig};
use message_signature_verifier::error::{ApiError, ApiResult};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// Create a new router with the verification and health endpoints
pub fn create_router() -> Router {
    Router::new()
        .route("/health", get(health_check).fallback(not_found))
        .route(
            "/api/verify-signature",
            post(handle_verify_signature)
                .fallback(not_found)
                .layer(DefaultBodyLimit::max(handler::MAX_BODY_BYTES)),
        )
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

// Handle the verify request
async fn handle_verify_signature(
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Json<VerifySignatureResponse>> {
    // Keep the JSON error shape for body rejections too
    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::InvalidRequest(rejection.body_text())
        }
    })?;

    // Malformed requests never reach the verifier
    let request = handler::parse_request(&body)?;
    tracing::info!(message_len = request.message.len(), "Received verify request");

    // Recovery is CPU-bound, keep it off the async workers
    let response = tokio::task::spawn_blocking(move || handler::respond(request))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(response))
}


#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    config::load_dotenv();
    config::init_tracing();

    let server_config = ServerConfig::from_env()?;

    // Create the router
    let app = create_router();

    let addr = server_config.socket_addr();
    tracing::info!("Verifier service listening on {}", addr);

    // Run the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
