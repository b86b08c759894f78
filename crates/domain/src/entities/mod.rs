//! Domain entities - the gateway's routing vocabulary

mod credential_set;
mod route_rule;
mod routing_table;
mod sms_message;
mod topology;
mod upstream_target;

pub use credential_set::CredentialSet;
pub use route_rule::RouteRule;
pub use routing_table::RoutingTable;
pub use sms_message::SmsMessage;
pub use topology::Topology;
pub use upstream_target::UpstreamTarget;
