//! Inbound request payloads
//!
//! Validation rules mirror the storefront checkout form so the API gives
//! 1:1 field feedback on rejection.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "Product is required"))]
    pub product_id: String,

    #[validate(email(message = "Valid email is required"))]
    pub customer_email: String,

    /// Panel username: 3-20 chars, letters/digits/underscore only
    #[validate(
        length(min = 3, max = 20, message = "Username must be 3-20 characters"),
        custom(function = username_charset)
    )]
    pub customer_username: String,

    #[validate(length(min = 3, max = 30, message = "Server name must be 3-30 characters"))]
    pub server_name: String,
}

fn username_charset(value: &str) -> Result<(), ValidationError> {
    if value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Ok(());
    }
    let mut err = ValidationError::new("username_charset");
    err.message = Some("Username can only contain letters, numbers, and underscores".into());
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreateOrderRequest {
        CreateOrderRequest {
            product_id: "nodejs-bot".to_string(),
            customer_email: "budi@example.com".to_string(),
            customer_username: "budi_88".to_string(),
            server_name: "my discord bot".to_string(),
        }
    }

    #[test]
    fn accepts_valid_payload() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn rejects_bad_email() {
        let mut req = valid_request();
        req.customer_email = "not-an-email".to_string();
        let errs = req.validate().unwrap_err();
        assert!(errs.field_errors().contains_key("customer_email"));
    }

    #[test]
    fn rejects_username_with_symbols() {
        let mut req = valid_request();
        req.customer_username = "budi-88!".to_string();
        let errs = req.validate().unwrap_err();
        assert!(errs.field_errors().contains_key("customer_username"));
    }

    #[test]
    fn rejects_short_server_name() {
        let mut req = valid_request();
        req.server_name = "ab".to_string();
        assert!(req.validate().is_err());
    }
}
