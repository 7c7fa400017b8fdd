use lambda_http::http::Method;
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use message_signature_verifier::common::handler;
use message_signature_verifier::common::types::HealthResponse;
use message_signature_verifier::error::ApiError;
use serde::Serialize;

/// Main function for the Lambda handler
#[tokio::main]
async fn main() -> Result<(), Error> {
    // CloudWatch stamps each line itself
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .without_time()
        .with_line_number(false)
        .init();

    run(service_fn(handle_request)).await
}

/// Route the incoming request
async fn handle_request(event: Request) -> Result<Response<Body>, Error> {
    let path = event.uri().path();
    tracing::info!(method = %event.method(), path, "Received request");

    match (event.method(), path) {
        (&Method::GET, "/health") => json_response(200, &HealthResponse::ok()),
        (&Method::POST, "/api/verify-signature") => handle_verify_request(event).await,
        _ => error_response(ApiError::NotFound),
    }
}

/// Handle the verify request
async fn handle_verify_request(event: Request) -> Result<Response<Body>, Error> {
    if event.body().len() > handler::MAX_BODY_BYTES {
        return error_response(ApiError::PayloadTooLarge);
    }

    let request = match handler::parse_request(event.body()) {
        Ok(request) => request,
        Err(e) => return error_response(e),
    };

    match tokio::task::spawn_blocking(move || handler::respond(request)).await {
        Ok(response) => json_response(200, &response),
        Err(e) => error_response(ApiError::Internal(e.to_string())),
    }
}

fn error_response(error: ApiError) -> Result<Response<Body>, Error> {
    error.log();
    json_response(error.status_code().as_u16(), &error.body())
}

fn json_response<T: Serialize>(status: u16, body: &T) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Body::from(serde_json::to_string(body)?))?)
}
