//! Domain layer for the Rail Madad gateway
//!
//! Contains the routing vocabulary of the gateway: upstream targets, inbound
//! credentials, path rewrite rules and the topology that ties them together.
//! This layer performs no I/O.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::{AuthFailure, DomainError};
pub use value_objects::*;
