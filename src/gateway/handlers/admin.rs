//! Back-office handlers
//!
//! Everything here except [`admin_login`] sits behind
//! `admin_auth_middleware`, which injects [`AdminClaims`].

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use super::parse_id;
use crate::admin::AdminClaims;
use crate::catalog::{CatalogItem, CatalogItemDraft};
use crate::error::StoreError;
use crate::gateway::error::ApiResult;
use crate::gateway::state::AppState;
use crate::gateway::types::{
    AdminLoginRequest, AdminLoginResponse, CatalogItemRequest, CatalogItemResponse, ErrorBody,
    OrderPatchRequest, OrderUpdateRequest, SetStatusRequest, SuccessResponse, ValidatedJson,
    optional_i64,
};
use crate::order::{AdminOrderView, OrderId, OrderPatch, OrderStatus, StatusAuditEntry};

/// Operator login
#[utoipa::path(
    post,
    path = "/api/admin/login",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Session issued", body = AdminLoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorBody)
    ),
    tag = "Admin"
)]
pub async fn admin_login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<AdminLoginRequest>,
) -> ApiResult<Json<AdminLoginResponse>> {
    let session = state.admin.login(&req.admin_id, &req.password)?;
    Ok(Json(AdminLoginResponse {
        success: true,
        token: session.token,
        expires_at: session.expires_at,
    }))
}

/// Every order with item name and owner email, newest first
#[utoipa::path(
    get,
    path = "/api/admin/orders",
    responses(
        (status = 200, description = "All orders", body = [AdminOrderView]),
        (status = 401, description = "Missing or invalid session", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<AdminOrderView>>> {
    Ok(Json(state.orders.list_all().await?))
}

fn to_patch(req: &OrderPatchRequest) -> Result<OrderPatch, StoreError> {
    OrderPatch::new(
        req.telegram_id.as_deref(),
        optional_i64(req.amount.as_ref(), "amount")?,
        req.utr.as_deref(),
        req.status.as_deref(),
    )
}

/// Partially update an order
#[utoipa::path(
    patch,
    path = "/api/admin/orders/{order_id}",
    params(("order_id" = String, Path, description = "Order token")),
    request_body = OrderPatchRequest,
    responses(
        (status = 200, description = "Order updated", body = SuccessResponse),
        (status = 400, description = "Empty or invalid patch", body = ErrorBody),
        (status = 401, description = "Missing or invalid session", body = ErrorBody),
        (status = 404, description = "Unknown order", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn patch_order(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AdminClaims>,
    Path(order_id): Path<String>,
    ValidatedJson(req): ValidatedJson<OrderPatchRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    let patch = to_patch(&req)?;
    state
        .orders
        .patch_order(&OrderId::from_raw(order_id), patch, &claims.sub)
        .await?;
    Ok(Json(SuccessResponse::ok()))
}

/// Partially update an order named in the body
#[utoipa::path(
    post,
    path = "/api/admin/orders/update",
    request_body = OrderUpdateRequest,
    responses(
        (status = 200, description = "Order updated", body = SuccessResponse),
        (status = 400, description = "Missing order id or invalid patch", body = ErrorBody),
        (status = 401, description = "Missing or invalid session", body = ErrorBody),
        (status = 404, description = "Unknown order", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_order(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AdminClaims>,
    ValidatedJson(req): ValidatedJson<OrderUpdateRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    let patch = to_patch(&req.patch)?;
    state
        .orders
        .patch_order(&OrderId::from_raw(req.order_id.trim()), patch, &claims.sub)
        .await?;
    Ok(Json(SuccessResponse::ok()))
}

/// Force an order into any status (audited)
#[utoipa::path(
    post,
    path = "/api/admin/orders/{order_id}/status",
    params(("order_id" = String, Path, description = "Order token")),
    request_body = SetStatusRequest,
    responses(
        (status = 200, description = "Status set", body = SuccessResponse),
        (status = 400, description = "Unknown status", body = ErrorBody),
        (status = 401, description = "Missing or invalid session", body = ErrorBody),
        (status = 404, description = "Unknown order", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn set_order_status(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AdminClaims>,
    Path(order_id): Path<String>,
    ValidatedJson(req): ValidatedJson<SetStatusRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    let status: OrderStatus = req
        .status
        .parse()
        .map_err(|e: crate::order::UnknownStatus| StoreError::validation(e.to_string()))?;
    let reason = req.reason.as_deref().map(str::trim).filter(|r| !r.is_empty());

    state
        .orders
        .set_status(&OrderId::from_raw(order_id), status, &claims.sub, reason)
        .await?;
    Ok(Json(SuccessResponse::ok()))
}

/// Forced status changes of one order, oldest first
#[utoipa::path(
    get,
    path = "/api/admin/orders/{order_id}/history",
    params(("order_id" = String, Path, description = "Order token")),
    responses(
        (status = 200, description = "Audit rows", body = [StatusAuditEntry]),
        (status = 401, description = "Missing or invalid session", body = ErrorBody),
        (status = 404, description = "Unknown order", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn order_history(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
) -> ApiResult<Json<Vec<StatusAuditEntry>>> {
    Ok(Json(
        state
            .orders
            .status_history(&OrderId::from_raw(order_id))
            .await?,
    ))
}

/// Delete an order
#[utoipa::path(
    delete,
    path = "/api/admin/orders/{order_id}",
    params(("order_id" = String, Path, description = "Order token")),
    responses(
        (status = 200, description = "Order deleted", body = SuccessResponse),
        (status = 401, description = "Missing or invalid session", body = ErrorBody),
        (status = 404, description = "Unknown order", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_order(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AdminClaims>,
    Path(order_id): Path<String>,
) -> ApiResult<Json<SuccessResponse>> {
    let order_id = OrderId::from_raw(order_id);
    state.orders.delete_order(&order_id).await?;
    tracing::info!(order_id = %order_id, actor = %claims.sub, "Order removed by admin");
    Ok(Json(SuccessResponse::ok()))
}

fn to_draft(req: &CatalogItemRequest) -> Result<CatalogItemDraft, StoreError> {
    CatalogItemDraft::new(&req.name, req.price.to_i64("price")?, &req.duration)
}

/// Add a catalog item
#[utoipa::path(
    post,
    path = "/api/admin/services",
    request_body = CatalogItemRequest,
    responses(
        (status = 200, description = "Item created", body = CatalogItemResponse),
        (status = 400, description = "Invalid item", body = ErrorBody),
        (status = 401, description = "Missing or invalid session", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_service(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CatalogItemRequest>,
) -> ApiResult<Json<CatalogItemResponse>> {
    let service: CatalogItem = state.catalog.create_item(to_draft(&req)?).await?;
    Ok(Json(CatalogItemResponse {
        success: true,
        service,
    }))
}

/// Replace a catalog item's name, price and duration
#[utoipa::path(
    put,
    path = "/api/admin/services/{id}",
    params(("id" = i64, Path, description = "Catalog item id")),
    request_body = CatalogItemRequest,
    responses(
        (status = 200, description = "Item updated", body = CatalogItemResponse),
        (status = 400, description = "Invalid item", body = ErrorBody),
        (status = 401, description = "Missing or invalid session", body = ErrorBody),
        (status = 404, description = "Unknown item", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<CatalogItemRequest>,
) -> ApiResult<Json<CatalogItemResponse>> {
    let id = parse_id(&id, "service id")?;
    let service = state.catalog.update_item(id, to_draft(&req)?).await?;
    Ok(Json(CatalogItemResponse {
        success: true,
        service,
    }))
}

/// Delete a catalog item that no order references
#[utoipa::path(
    delete,
    path = "/api/admin/services/{id}",
    params(("id" = i64, Path, description = "Catalog item id")),
    responses(
        (status = 200, description = "Item deleted", body = SuccessResponse),
        (status = 401, description = "Missing or invalid session", body = ErrorBody),
        (status = 404, description = "Unknown item", body = ErrorBody),
        (status = 409, description = "Item still referenced by orders", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<SuccessResponse>> {
    let id = parse_id(&id, "service id")?;
    state.catalog.delete_item(id).await?;
    Ok(Json(SuccessResponse::ok()))
}
