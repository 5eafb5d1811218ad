use std::sync::Arc;

use axum::{Json, extract::State};

use crate::catalog::CatalogItem;
use crate::gateway::error::ApiResult;
use crate::gateway::state::AppState;
use crate::gateway::types::ErrorBody;

/// List every catalog item
#[utoipa::path(
    get,
    path = "/api/services",
    responses(
        (status = 200, description = "Catalog items", body = [CatalogItem]),
        (status = 500, description = "Store failure", body = ErrorBody)
    ),
    tag = "Catalog"
)]
pub async fn list_services(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<CatalogItem>>> {
    Ok(Json(state.catalog.list_items().await?))
}
