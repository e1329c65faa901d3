//! # Meest Express client library
//!
//! Authenticates against the Meest Express open API, keeps the bearer token
//! in a shared store so several processes can reuse it, and runs branch
//! searches with a whitelisted filter set.
//!
//! Modules:
//! - `api` — transport, authentication, branch search and filters
//! - `cache` — token, shared token record, token stores and the token cache
//! - `config` — service configuration and its loader
//! - `observability` — prometheus metrics

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod helpers;
pub mod observability;
pub mod tests;
pub mod utils;

pub use crate::api::filters::{FilterField, FilterSet};
pub use crate::api::meest::MeestExpress;
pub use crate::cache::store::{TokenStore, TokenStoreKind};
pub use crate::config::settings::ServiceConfig;
pub use crate::error::MeestError;
