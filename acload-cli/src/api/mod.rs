//! Asset Central Web API module
//!
//! OAuth2 client-credentials session, the transport seam used for every
//! HTTP call, and typed CRUD operations over the entity records.

pub mod auth;
pub mod client;
pub mod error;
pub mod query;
pub mod transport;

#[cfg(test)]
pub mod fake;

pub use auth::{Session, TokenInfo};
pub use client::AssetCentral;
pub use error::AcError;
pub use transport::{ApiRequest, ApiResponse, Transport};
