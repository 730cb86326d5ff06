use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use itemflow_core::ItemId;
use itemflow_items::ItemView;

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_item))
        .route("/:id", get(get_item).put(update_item))
        .route("/:id/prepare-for-closing", post(prepare_item_for_closing))
        .route("/:id/close", post(close_item))
}

fn parse_id(raw: &str) -> Result<ItemId, axum::response::Response> {
    raw.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid item id"))
}

fn item_response(status: StatusCode, item: itemflow_items::Item) -> axum::response::Response {
    (status, Json(ItemView::from(item))).into_response()
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateItemRequest>,
) -> axum::response::Response {
    match services.items().create(body.name, body.number).await {
        Ok(item) => item_response(StatusCode::CREATED, item),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateItemRequest>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.items().update(id, body.name, body.number).await {
        Ok(item) => item_response(StatusCode::OK, item),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.items().get(id).await {
        Ok(item) => item_response(StatusCode::OK, item),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn prepare_item_for_closing(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.items().prepare_for_closing(id).await {
        Ok(item) => item_response(StatusCode::OK, item),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn close_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.items().close(id).await {
        Ok(item) => item_response(StatusCode::OK, item),
        Err(e) => errors::service_error_to_response(e),
    }
}
