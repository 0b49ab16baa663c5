//! Error taxonomy for remote operations

use crate::entities::EntityKind;

/// Failures of individual Asset Central operations.
///
/// Operations return `anyhow::Result`; callers that need to branch on the
/// kind of failure use `err.downcast_ref::<AcError>()`.
#[derive(Debug, Clone, PartialEq)]
pub enum AcError {
    /// Insert attempted for a local id that already exists remotely
    AlreadyExists {
        kind: EntityKind,
        local_id: String,
        remote_id: String,
    },
    /// Delete or load attempted for a local id with no remote match
    DoesNotExist { kind: EntityKind, local_id: String },
    /// Create request returned a non-success status
    CouldNotBeCreated {
        kind: EntityKind,
        local_id: String,
        status: u16,
        body: String,
    },
    /// Operation needs a remote id the record does not have
    InvalidState { reason: String },
    /// The API has no replace operation for this entity type
    NotSupported {
        kind: EntityKind,
        operation: &'static str,
    },
    /// Any other non-success response
    UnexpectedStatus {
        operation: String,
        status: u16,
        body: String,
    },
    /// Success response without the expected content
    MalformedResponse { operation: String, detail: String },
}

impl std::fmt::Display for AcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AcError::AlreadyExists {
                kind,
                local_id,
                remote_id,
            } => write!(
                f,
                "{} '{}' already exists in Asset Central (id {})",
                kind, local_id, remote_id
            ),
            AcError::DoesNotExist { kind, local_id } => {
                write!(f, "{} '{}' does not exist in Asset Central", kind, local_id)
            }
            AcError::CouldNotBeCreated {
                kind,
                local_id,
                status,
                body,
            } => write!(
                f,
                "{} '{}' could not be created (HTTP {}): {}",
                kind,
                local_id,
                status,
                truncate(body)
            ),
            AcError::InvalidState { reason } => write!(f, "Invalid state: {}", reason),
            AcError::NotSupported { kind, operation } => write!(
                f,
                "{} is not supported for {} records by the Asset Central API",
                operation, kind
            ),
            AcError::UnexpectedStatus {
                operation,
                status,
                body,
            } => write!(f, "{} failed (HTTP {}): {}", operation, status, truncate(body)),
            AcError::MalformedResponse { operation, detail } => {
                write!(f, "{} returned an unexpected response: {}", operation, detail)
            }
        }
    }
}

impl std::error::Error for AcError {}

/// Keep error bodies readable in logs
fn truncate(body: &str) -> String {
    const LIMIT: usize = 300;
    let body = body.trim();
    match body.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
