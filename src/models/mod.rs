//! Domain models for cadencer

pub mod cadence;
pub mod client;
pub mod registry;

pub use cadence::{CadenceConfig, ContentType};
pub use client::{Client, ResourceEntry, ServiceKind};
pub use registry::ClientRegistry;
