//! HTTP request handlers

pub mod fallback;
pub mod health;
pub mod mock_sms;
pub mod proxy;
