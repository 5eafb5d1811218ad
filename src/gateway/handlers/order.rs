//! Storefront order handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};

use super::parse_id;
use crate::error::StoreError;
use crate::gateway::error::ApiResult;
use crate::gateway::state::AppState;
use crate::gateway::types::{
    ConfirmOrderRequest, CreateOrderRequest, CreateOrderResponse, ErrorBody, SuccessResponse,
    ValidatedJson, optional_i64,
};
use crate::order::{NewOrder, OrderId, OrderStatus, OrderView};

/// Place an order for a catalog item
///
/// `amount` must equal the item's current price. `userId` is optional;
/// omitted means a guest order.
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order created in pending state", body = CreateOrderResponse),
        (status = 400, description = "Invalid input or unknown item/user", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    ),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateOrderRequest>,
) -> ApiResult<Json<CreateOrderResponse>> {
    let order = NewOrder::new(
        &req.telegram_id,
        req.service_id.to_i64("serviceId")?,
        req.amount.to_i64("amount")?,
        optional_i64(req.user_id.as_ref(), "userId")?,
    )?;

    let order_id = state.orders.create_order(order).await?;
    Ok(Json(CreateOrderResponse {
        order_id: order_id.into_string(),
    }))
}

/// Fetch one order
#[utoipa::path(
    get,
    path = "/api/orders/{order_id}",
    params(("order_id" = String, Path, description = "Order token, e.g. MARS-7K2Q9ZP4X")),
    responses(
        (status = 200, description = "Order", body = OrderView),
        (status = 404, description = "Unknown order", body = ErrorBody)
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
) -> ApiResult<Json<OrderView>> {
    Ok(Json(state.orders.get_order(&OrderId::from_raw(order_id)).await?))
}

/// A customer's orders, newest first
#[utoipa::path(
    get,
    path = "/api/user/orders/{user_id}",
    params(("user_id" = i64, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Orders with item names", body = [OrderView]),
        (status = 400, description = "Invalid user id", body = ErrorBody)
    ),
    tag = "Orders"
)]
pub async fn list_user_orders(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<OrderView>>> {
    let user_id = parse_id(&user_id, "user id")?;
    Ok(Json(state.orders.list_for_user(user_id).await?))
}

/// Submit a payment reference, or (admin) set an order's status
///
/// With `status` the call is an operator override and needs an admin
/// bearer token. Otherwise `utr` is recorded and the order moves to
/// `processing`.
#[utoipa::path(
    post,
    path = "/api/orders/confirm",
    request_body = ConfirmOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = SuccessResponse),
        (status = 400, description = "Missing UTR or unknown status", body = ErrorBody),
        (status = 401, description = "Status change without admin session", body = ErrorBody),
        (status = 404, description = "Unknown order", body = ErrorBody),
        (status = 409, description = "Order is closed", body = ErrorBody)
    ),
    security((), ("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn confirm_order(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ValidatedJson(req): ValidatedJson<ConfirmOrderRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    let order_id = OrderId::from_raw(req.order_id.trim());

    if let Some(raw) = req.status.as_deref().filter(|s| !s.trim().is_empty()) {
        let claims = state.admin.authorize(&headers)?;
        let status: OrderStatus = raw
            .parse()
            .map_err(|e: crate::order::UnknownStatus| StoreError::validation(e.to_string()))?;
        state
            .orders
            .set_status(&order_id, status, &claims.sub, None)
            .await?;
        return Ok(Json(SuccessResponse::ok()));
    }

    let utr = req.utr.as_deref().unwrap_or_default();
    state.orders.submit_payment(&order_id, utr).await?;
    Ok(Json(SuccessResponse::ok()))
}
