//! The provider surface the host engine talks to.
//!
//! # Module Organization
//!
//! * [`config`] - Provider block settings and environment fallbacks
//! * [`builder`] - Builder wiring configuration and API client together
//! * [`core`] - The [`Provider`] struct and schema introspection
//! * [`operations`] - Validate, plan, CRUD, import and state upgrade

pub mod builder;
pub mod config;
pub mod core;
pub mod operations;

pub use builder::ProviderBuilder;
pub use config::{DEFAULT_BASE_URL, ProviderConfig};
pub use self::core::Provider;
