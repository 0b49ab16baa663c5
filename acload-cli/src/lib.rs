//! Asset Central client and spreadsheet bulk loader
//!
//! Typed records for the Asset Central resource schemas, an OAuth2
//! client-credentials session, CRUD operations against the REST API and the
//! staging pipeline that turns a workbook into dependency-ordered creates.

pub mod api;
pub mod bulk;
pub mod config;
pub mod entities;
pub mod staging;
pub mod workbook;

pub use api::{AcError, AssetCentral, Session, Transport};
pub use config::Config;
pub use entities::{Entity, EntityKind, RemoteId, Saved, Unsaved};
