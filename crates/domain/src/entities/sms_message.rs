//! SMS payload accepted by the mock SMS endpoint

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Outbound SMS request as sent by the front ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SmsMessage {
    /// Destination number, usually E.164 (e.g. `+911234567890`)
    #[validate(length(min = 1, max = 32, message = "must be between 1 and 32 characters"))]
    pub phone: String,

    /// Message text
    #[validate(length(min = 1, max = 1600, message = "must be between 1 and 1600 characters"))]
    pub message: String,
}

impl SmsMessage {
    /// Create a new SMS payload
    pub fn new(phone: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            message: message.into(),
        }
    }
}
