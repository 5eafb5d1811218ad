//! Request bodies
//!
//! Keys are camelCase, matching what the storefront client sends.

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::chat::ChatTurn;
use crate::error::{StoreError, StoreResult};

/// Integer that may arrive as a JSON number or a numeric string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LenientInt {
    Int(i64),
    Float(f64),
    Text(String),
}

impl LenientInt {
    /// Resolve to an integer, naming `field` in the error
    pub fn to_i64(&self, field: &str) -> StoreResult<i64> {
        let invalid = || StoreError::validation(format!("{} must be an integer", field));
        match self {
            LenientInt::Int(v) => Ok(*v),
            LenientInt::Float(v) if v.fract() == 0.0 && v.is_finite() => {
                if *v < i64::MIN as f64 || *v > i64::MAX as f64 {
                    Err(invalid())
                } else {
                    Ok(*v as i64)
                }
            }
            LenientInt::Float(_) => Err(invalid()),
            LenientInt::Text(s) => s.trim().parse().map_err(|_| invalid()),
        }
    }
}

/// Resolve an optional lenient integer
pub fn optional_i64(value: Option<&LenientInt>, field: &str) -> StoreResult<Option<i64>> {
    value.map(|v| v.to_i64(field)).transpose()
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "Telegram ID is required"))]
    #[schema(example = "@player")]
    pub telegram_id: String,
    #[schema(value_type = i64, example = 2)]
    pub service_id: LenientInt,
    #[schema(value_type = i64, example = 400)]
    pub amount: LenientInt,
    /// Omitted or null for guest checkout
    #[serde(default)]
    #[schema(value_type = Option<i64>)]
    pub user_id: Option<LenientInt>,
}

/// Either a payment submission (`utr`) or an operator status change (`status`)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmOrderRequest {
    #[validate(length(min = 1, message = "Order ID is required"))]
    #[schema(example = "MARS-7K2Q9ZP4X")]
    pub order_id: String,
    #[serde(default)]
    #[schema(example = "123456789012")]
    pub utr: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminLoginRequest {
    #[validate(length(min = 1, message = "Admin ID and password are required"))]
    pub admin_id: String,
    #[validate(length(min = 1, message = "Admin ID and password are required"))]
    pub password: String,
}

/// Partial order update; absent fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderPatchRequest {
    #[serde(default)]
    pub telegram_id: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<i64>)]
    pub amount: Option<LenientInt>,
    #[serde(default)]
    pub utr: Option<String>,
    #[serde(default)]
    #[schema(example = "completed")]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdateRequest {
    #[validate(length(min = 1, message = "Order ID is required"))]
    pub order_id: String,
    #[serde(flatten)]
    pub patch: OrderPatchRequest,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetStatusRequest {
    #[validate(length(min = 1, message = "Status is required"))]
    #[schema(example = "failed")]
    pub status: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CatalogItemRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "7 Day Pack")]
    pub name: String,
    #[schema(value_type = i64, example = 400)]
    pub price: LenientInt,
    #[validate(length(min = 1, message = "Duration is required"))]
    #[schema(example = "7 Days")]
    pub duration: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChatRequest {
    #[validate(length(min = 1, max = 4000, message = "Message must be 1-4000 characters"))]
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_int_accepts_numbers_and_numeric_strings() {
        let body: CreateOrderRequest = serde_json::from_str(
            r#"{"telegramId":"@x","serviceId":"2","amount":400,"userId":null}"#,
        )
        .unwrap();
        assert_eq!(body.service_id.to_i64("serviceId").unwrap(), 2);
        assert_eq!(body.amount.to_i64("amount").unwrap(), 400);
        assert!(body.user_id.is_none());
    }

    #[test]
    fn test_lenient_int_rejects_garbage() {
        assert!(LenientInt::Text("abc".into()).to_i64("amount").is_err());
        assert!(LenientInt::Float(12.5).to_i64("amount").is_err());
        assert_eq!(LenientInt::Float(400.0).to_i64("amount").unwrap(), 400);
    }

    #[test]
    fn test_update_request_flattens_patch() {
        let body: OrderUpdateRequest =
            serde_json::from_str(r#"{"orderId":"MARS-1","status":"completed"}"#).unwrap();
        assert_eq!(body.order_id, "MARS-1");
        assert_eq!(body.patch.status.as_deref(), Some("completed"));
        assert!(body.patch.telegram_id.is_none());
    }

    #[test]
    fn test_chat_history_defaults_empty() {
        let body: ChatRequest = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        assert!(body.history.is_empty());
    }
}
