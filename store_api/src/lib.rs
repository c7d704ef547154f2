//! Store API - Core Library
//!
//! A small HTTP service keeping store records in a process-lifetime,
//! lock-guarded registry.

pub mod cli;
pub mod error;
pub mod middleware;
pub mod model;
pub mod openapi;
pub mod registry;
pub mod server;
pub mod settings;
pub mod telemetry;

pub use error::{ApiError, RegistryError};
pub use model::Store;
pub use registry::StoreRegistry;
