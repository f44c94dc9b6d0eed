use axum::http::{header, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use serde_json::json;

use stockhub_core::DomainError;
use stockhub_events::HubError;
use stockhub_infra::MutationError;

/// Methods accepted by the mutation endpoint (sent with 405 responses).
const MUTATION_METHODS: &str = "POST, PUT, DELETE";

pub fn mutation_error_to_response(err: MutationError) -> axum::response::Response {
    match err {
        MutationError::Domain(DomainError::InvalidInput(msg)) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_input", msg)
        }
        MutationError::Domain(DomainError::UnsupportedOperation(msg)) => {
            let mut res = json_error(StatusCode::METHOD_NOT_ALLOWED, "method_not_allowed", msg);
            res.headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static(MUTATION_METHODS));
            res
        }
        MutationError::Hub(e) => hub_error_to_response(e),
    }
}

pub fn hub_error_to_response(err: HubError) -> axum::response::Response {
    json_error(StatusCode::SERVICE_UNAVAILABLE, "hub_unavailable", err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
