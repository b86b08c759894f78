//! Local stand-in for the upstream SMS endpoint

use axum::Json;
use domain::SmsMessage;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::middleware::ValidatedJson;

/// Confirmation message returned by the mock
pub const MOCK_SMS_MESSAGE: &str = "SMS sent successfully (mock)";

/// Mock SMS response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockSmsResponse {
    pub success: bool,
    pub message: String,
    /// Echo of the submitted message
    pub data: SmsMessage,
}

/// Log the SMS and report success without contacting any upstream
pub async fn send_sms(ValidatedJson(sms): ValidatedJson<SmsMessage>) -> Json<MockSmsResponse> {
    info!(
        phone = %sms.phone,
        message_chars = sms.message.chars().count(),
        "Mock SMS accepted"
    );

    Json(MockSmsResponse {
        success: true,
        message: MOCK_SMS_MESSAGE.to_string(),
        data: sms,
    })
}
