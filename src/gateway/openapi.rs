//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:3000/docs`
//! - OpenAPI JSON: `http://localhost:3000/api-docs/openapi.json`

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::account::{LoginRequest, RegisterRequest, UserIdentity};
use crate::catalog::CatalogItem;
use crate::chat::{ChatRole, ChatTurn};
use crate::gateway::types::{
    AdminLoginRequest, AdminLoginResponse, CatalogItemRequest, CatalogItemResponse, ChatRequest,
    ChatResponse, ConfirmOrderRequest, CreateOrderRequest, CreateOrderResponse, ErrorBody,
    HealthResponse, LoginResponse, OrderPatchRequest, OrderUpdateRequest, RegisterResponse,
    SetStatusRequest, SuccessResponse,
};
use crate::order::{AdminOrderView, OrderStatus, OrderView, StatusAuditEntry};

/// Admin session (JWT from `/api/admin/login`)
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            let scheme = HttpBuilder::new()
                .scheme(HttpAuthScheme::Bearer)
                .bearer_format("JWT")
                .description(Some("Admin session token returned by POST /api/admin/login"))
                .build();
            components.add_security_scheme("bearer_auth", SecurityScheme::Http(scheme));
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mars Storefront API",
        version = "1.0.0",
        description = "Subscription-pack storefront: catalog, accounts, orders with payment confirmation, and an operator back office."
    ),
    servers(
        (url = "http://localhost:3000", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::auth::register,
        crate::gateway::handlers::auth::login,
        crate::gateway::handlers::catalog::list_services,
        crate::gateway::handlers::order::create_order,
        crate::gateway::handlers::order::get_order,
        crate::gateway::handlers::order::list_user_orders,
        crate::gateway::handlers::order::confirm_order,
        crate::gateway::handlers::chat::chat,
        crate::gateway::handlers::admin::admin_login,
        crate::gateway::handlers::admin::list_orders,
        crate::gateway::handlers::admin::patch_order,
        crate::gateway::handlers::admin::update_order,
        crate::gateway::handlers::admin::set_order_status,
        crate::gateway::handlers::admin::order_history,
        crate::gateway::handlers::admin::delete_order,
        crate::gateway::handlers::admin::create_service,
        crate::gateway::handlers::admin::update_service,
        crate::gateway::handlers::admin::delete_service,
    ),
    components(
        schemas(
            ErrorBody,
            HealthResponse,
            SuccessResponse,
            RegisterRequest,
            RegisterResponse,
            LoginRequest,
            LoginResponse,
            UserIdentity,
            CatalogItem,
            CatalogItemRequest,
            CatalogItemResponse,
            CreateOrderRequest,
            CreateOrderResponse,
            ConfirmOrderRequest,
            OrderStatus,
            OrderView,
            AdminOrderView,
            StatusAuditEntry,
            AdminLoginRequest,
            AdminLoginResponse,
            OrderPatchRequest,
            OrderUpdateRequest,
            SetStatusRequest,
            ChatRole,
            ChatTurn,
            ChatRequest,
            ChatResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Catalog", description = "Subscription packs for sale"),
        (name = "Account", description = "Customer registration and login"),
        (name = "Orders", description = "Order placement and payment confirmation"),
        (name = "Admin", description = "Operator back office (bearer session required)"),
        (name = "Chat", description = "Support assistant relay"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;
