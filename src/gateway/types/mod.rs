//! Gateway types module
//!
//! - [`request`]: camelCase request bodies and [`LenientInt`]
//! - [`response`]: response bodies and [`ErrorBody`]
//! - [`extract`]: [`ValidatedJson`] extractor

pub mod extract;
pub mod request;
pub mod response;

pub use extract::{ValidatedJson, validation_message};
pub use request::{
    AdminLoginRequest, CatalogItemRequest, ChatRequest, ConfirmOrderRequest, CreateOrderRequest,
    LenientInt, OrderPatchRequest, OrderUpdateRequest, SetStatusRequest, optional_i64,
};
pub use response::{
    AdminLoginResponse, CatalogItemResponse, ChatResponse, CreateOrderResponse, ErrorBody,
    HealthResponse, LoginResponse, RegisterResponse, SuccessResponse,
};
