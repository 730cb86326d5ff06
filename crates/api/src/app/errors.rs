use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use itemflow_infra::ItemServiceError;

pub fn service_error_to_response(err: ItemServiceError) -> axum::response::Response {
    match err {
        ItemServiceError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", err.to_string()),
        ItemServiceError::InvalidTransition(_) => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "invalid_transition",
            err.to_string(),
        ),
        ItemServiceError::Store(e) => {
            tracing::error!(error = %e, "item store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        }
    }
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
