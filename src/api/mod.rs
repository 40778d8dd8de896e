//! HTTP API handlers for cadencer
//!
//! Thin plumbing: each endpoint validates its payload and delegates to the
//! engine services, returning structured success/error JSON.

pub mod audit;
pub mod captions;
pub mod clients;
pub mod health;
pub mod publish;

pub use audit::audit_routes;
pub use captions::caption_routes;
pub use clients::client_routes;
pub use health::health_routes;
pub use publish::publish_routes;
