//! Value Objects - Immutable, identity-less domain primitives

mod bearer_token;
mod target_name;

pub use bearer_token::BearerToken;
pub use target_name::TargetName;
