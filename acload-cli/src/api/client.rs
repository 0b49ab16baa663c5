//! Typed CRUD operations against Asset Central
//!
//! Every operation is a single awaited request (insert adds one existence
//! query first). Per-kind wire differences are looked up from
//! [`EntityKind`]; nothing here branches on the concrete record type.

use anyhow::{Context, Result};
use serde_json::Value;

use super::error::AcError;
use super::query::filtered_path;
use super::transport::{ApiRequest, ApiResponse, Transport};
use crate::entities::{Dimension, Entity, EntityKind, Model, RemoteId, Saved, Unsaved};

const DIMENSIONS_PATH: &str = "/uom/dimensions";

/// Asset Central API client over a transport
pub struct AssetCentral<T> {
    transport: T,
}

impl<T: Transport> AssetCentral<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send a request and fail with [`AcError::UnexpectedStatus`] on non-success
    async fn send_ok(&self, request: ApiRequest) -> Result<ApiResponse> {
        let label = request.describe();
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(AcError::UnexpectedStatus {
                operation: label,
                status: response.status,
                body: response.body,
            }
            .into());
        }
        Ok(response)
    }

    /// Query the collection of `kind` for objects with the given local id
    async fn query_internal_id(&self, kind: EntityKind, local_id: &str) -> Result<Vec<Value>> {
        let request = ApiRequest::get(filtered_path(kind.path(), local_id));
        let label = request.describe();
        let response = self.send_ok(request).await?;

        match response.json().with_context(|| label.clone())? {
            Value::Array(items) => Ok(items),
            other => Err(AcError::MalformedResponse {
                operation: label,
                detail: format!("expected a list, got {}", json_type(&other)),
            }
            .into()),
        }
    }

    /// Remote id of the first object of `kind` with this local id, if any
    pub async fn exists_kind(&self, kind: EntityKind, local_id: &str) -> Result<Option<RemoteId>> {
        let items = self.query_internal_id(kind, local_id).await?;
        let Some(first) = items.first() else {
            return Ok(None);
        };

        match kind.extract_id(first) {
            Some(id) => Ok(Some(id)),
            None => Err(AcError::MalformedResponse {
                operation: format!("query {} '{}'", kind, local_id),
                detail: format!("match has no '{}' field", kind.id_field().as_str()),
            }
            .into()),
        }
    }

    /// Remote id of the `E` with this local id, if it exists
    pub async fn exists<E: Entity>(&self, local_id: &str) -> Result<Option<RemoteId>> {
        self.exists_kind(E::KIND, local_id).await
    }

    /// Create the record remotely.
    ///
    /// Fails with [`AcError::AlreadyExists`] if the local id is already taken
    /// and [`AcError::CouldNotBeCreated`] if the service rejects the payload.
    pub async fn insert<E: Entity>(&self, record: Unsaved<E>) -> Result<Saved<E>> {
        let kind = E::KIND;
        let local_id = record.local_id().to_string();

        if let Some(remote_id) = self.exists::<E>(&local_id).await? {
            return Err(AcError::AlreadyExists {
                kind,
                local_id,
                remote_id: remote_id.to_string(),
            }
            .into());
        }

        let payload = serde_json::to_value(&record.fields)
            .with_context(|| format!("Failed to serialize {} '{}'", kind, local_id))?;
        let request = ApiRequest::post(kind.path(), payload);
        let response = self.transport.send(request).await?;

        if !response.is_success() {
            return Err(AcError::CouldNotBeCreated {
                kind,
                local_id,
                status: response.status,
                body: response.body,
            }
            .into());
        }

        let body = response
            .json()
            .with_context(|| format!("create {} '{}'", kind, local_id))?;
        let remote_id = kind
            .decode_created(&body)
            .ok_or_else(|| AcError::MalformedResponse {
                operation: format!("create {} '{}'", kind, local_id),
                detail: format!("no '{}' in response", kind.id_field().as_str()),
            })?;

        log::debug!("Created {} '{}' as {}", kind, local_id, remote_id);
        Ok(record.into_saved(remote_id))
    }

    /// Replace the remote record with the current fields
    pub async fn update<E: Entity>(&self, record: &Saved<E>) -> Result<()> {
        let kind = E::KIND;
        if !kind.supports_update() {
            return Err(AcError::NotSupported {
                kind,
                operation: "update",
            }
            .into());
        }

        let mut payload = serde_json::to_value(&record.fields)
            .with_context(|| format!("Failed to serialize {} '{}'", kind, record.local_id()))?;
        if let Some(map) = payload.as_object_mut() {
            map.insert(
                kind.id_field().as_str().to_string(),
                Value::String(record.remote_id.to_string()),
            );
        }

        self.send_ok(ApiRequest::put(kind.path(), Some(payload)))
            .await?;
        log::debug!("Updated {} '{}' ({})", kind, record.local_id(), record.remote_id);
        Ok(())
    }

    /// Delete a resource of `kind` by remote id
    pub async fn delete_remote(&self, kind: EntityKind, remote_id: &RemoteId) -> Result<()> {
        self.send_ok(ApiRequest::delete(kind.resource_path(remote_id)))
            .await?;
        log::debug!("Deleted {} {}", kind, remote_id);
        Ok(())
    }

    /// Delete by remote id given as text; empty text is an invalid state
    pub async fn delete_remote_str(&self, kind: EntityKind, remote_id: &str) -> Result<()> {
        let id = RemoteId::new(remote_id)?;
        self.delete_remote(kind, &id).await
    }

    /// Delete a saved record, returning it as unsaved
    pub async fn delete<E: Entity>(&self, record: Saved<E>) -> Result<Unsaved<E>> {
        self.delete_remote(E::KIND, &record.remote_id).await?;
        Ok(record.into_unsaved())
    }

    /// Look up the local id and delete the match
    pub async fn delete_by_local_id<E: Entity>(&self, local_id: &str) -> Result<RemoteId> {
        let Some(remote_id) = self.exists::<E>(local_id).await? else {
            return Err(AcError::DoesNotExist {
                kind: E::KIND,
                local_id: local_id.to_string(),
            }
            .into());
        };

        self.delete_remote(E::KIND, &remote_id).await?;
        Ok(remote_id)
    }

    /// Fetch and reconstruct the record with this local id
    pub async fn load<E: Entity>(&self, local_id: &str) -> Result<Saved<E>> {
        let kind = E::KIND;
        let mut items = self.query_internal_id(kind, local_id).await?;
        if items.is_empty() {
            return Err(AcError::DoesNotExist {
                kind,
                local_id: local_id.to_string(),
            }
            .into());
        }

        let first = items.swap_remove(0);
        let remote_id = kind
            .extract_id(&first)
            .ok_or_else(|| AcError::MalformedResponse {
                operation: format!("load {} '{}'", kind, local_id),
                detail: format!("match has no '{}' field", kind.id_field().as_str()),
            })?;
        let fields = E::reconcile(first)
            .with_context(|| format!("Failed to reconstruct {} '{}'", kind, local_id))?;

        Ok(Saved { remote_id, fields })
    }

    /// Publish a model so equipment can be created against it
    pub async fn publish(&self, model: &Saved<Model>) -> Result<()> {
        self.publish_model(&model.remote_id).await
    }

    pub async fn publish_model(&self, remote_id: &RemoteId) -> Result<()> {
        let path = format!("{}/publish", EntityKind::Model.resource_path(remote_id));
        self.send_ok(ApiRequest::put(path, None)).await?;
        log::debug!("Published model {}", remote_id);
        Ok(())
    }

    /// All unit-of-measure dimensions known to the tenant
    pub async fn dimensions(&self) -> Result<Vec<Dimension>> {
        let response = self.send_ok(ApiRequest::get(DIMENSIONS_PATH)).await?;
        let body = response.json().context("list dimensions")?;
        serde_json::from_value(body).context("Unexpected dimension list format")
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
