//! `ValidatedJson`: JSON body extractor that runs `validator` rules
//! before the handler sees the value.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::error::StoreError;
use crate::gateway::error::ApiError;

#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| {
                ApiError(StoreError::validation(format!("Invalid JSON: {}", e.body_text())))
            })?;

        value
            .validate()
            .map_err(|e| ApiError(StoreError::validation(validation_message(&e))))?;

        Ok(ValidatedJson(value))
    }
}

/// First message per failing field, sorted by field name
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let messages: Vec<String> = fields
        .into_iter()
        .filter_map(|(field, errs)| {
            errs.first().map(|e| match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .collect();

    if messages.is_empty() {
        "Invalid request".to_string()
    } else {
        messages.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::RegisterRequest;

    #[test]
    fn test_validation_message_uses_field_messages() {
        let req = RegisterRequest {
            email: "nope".to_string(),
            password: "short".to_string(),
        };
        let msg = validation_message(&req.validate().unwrap_err());
        assert!(msg.contains("valid email"));
        assert!(msg.contains("8-128"));
    }
}
