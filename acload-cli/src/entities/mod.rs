//! Asset Central entity records
//!
//! Each record mirrors the JSON schema the remote service accepts on create.
//! Records carry only the fields the service accepts; the remote id lives
//! outside the record, in [`Saved`], so an unsaved record can never be sent
//! with a stale id.
//!
//! Per-kind wire differences (collection path, id field name, create response
//! shape, delete addressing, update support) are resolved once through
//! [`EntityKind`] rather than at each call site.

mod description;
mod dimension;
mod equipment;
mod indicator;
mod indicator_group;
mod model;
mod template;

pub use description::Description;
pub use dimension::{Dimension, Unit};
pub use equipment::Equipment;
pub use indicator::{Indicator, IndicatorType, UnitOfMeasure};
pub use indicator_group::IndicatorGroup;
pub use model::{Model, PrimaryTemplate};
pub use template::{IdString, Template};

use anyhow::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::AcError;

/// Entity types with a remote collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Indicator,
    IndicatorGroup,
    Template,
    Model,
    Equipment,
}

/// Name of the field holding the remote id in query and create responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdField {
    Id,
    ModelId,
    EquipmentId,
}

impl IdField {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdField::Id => "id",
            IdField::ModelId => "modelId",
            IdField::EquipmentId => "equipmentId",
        }
    }
}

/// Shape of a successful create response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// `{ "id": ... }`
    Object,
    /// `[ { "id": ... } ]`
    ListWrapped,
}

/// How a single resource is addressed for delete and publish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteAddress {
    /// `/path/{id}`
    Slash,
    /// `/path({id})`
    Parens,
}

impl EntityKind {
    /// Creation dependency order; delete runs the reverse
    pub const LOAD_ORDER: [EntityKind; 5] = [
        EntityKind::Indicator,
        EntityKind::IndicatorGroup,
        EntityKind::Template,
        EntityKind::Model,
        EntityKind::Equipment,
    ];

    pub fn delete_order() -> impl Iterator<Item = EntityKind> {
        Self::LOAD_ORDER.into_iter().rev()
    }

    /// Collection path relative to the API base URL
    pub fn path(&self) -> &'static str {
        match self {
            EntityKind::Indicator => "/indicators",
            EntityKind::IndicatorGroup => "/indicatorgroups",
            EntityKind::Template => "/templates",
            EntityKind::Model => "/models",
            EntityKind::Equipment => "/equipment",
        }
    }

    pub fn id_field(&self) -> IdField {
        match self {
            EntityKind::Model => IdField::ModelId,
            EntityKind::Equipment => IdField::EquipmentId,
            _ => IdField::Id,
        }
    }

    pub fn create_shape(&self) -> ResponseShape {
        match self {
            EntityKind::Template => ResponseShape::ListWrapped,
            _ => ResponseShape::Object,
        }
    }

    pub fn delete_address(&self) -> DeleteAddress {
        match self {
            EntityKind::Model | EntityKind::Equipment => DeleteAddress::Parens,
            _ => DeleteAddress::Slash,
        }
    }

    /// Models and equipment cannot be replaced through this API
    pub fn supports_update(&self) -> bool {
        !matches!(self, EntityKind::Model | EntityKind::Equipment)
    }

    /// Path addressing a single resource
    pub fn resource_path(&self, id: &RemoteId) -> String {
        match self.delete_address() {
            DeleteAddress::Slash => format!("{}/{}", self.path(), id),
            DeleteAddress::Parens => format!("{}({})", self.path(), id),
        }
    }

    /// Read the remote id out of one response object
    pub fn extract_id(&self, object: &Value) -> Option<RemoteId> {
        object
            .get(self.id_field().as_str())
            .and_then(Value::as_str)
            .and_then(|s| RemoteId::new(s).ok())
    }

    /// Decode the remote id from a create response body
    pub fn decode_created(&self, body: &Value) -> Option<RemoteId> {
        let object = match (self.create_shape(), body) {
            (ResponseShape::ListWrapped, Value::Array(items)) => items.first()?,
            (ResponseShape::Object, Value::Object(_)) => body,
            // Tolerate the other shape rather than lose a created id
            (ResponseShape::ListWrapped, Value::Object(_)) => body,
            (ResponseShape::Object, Value::Array(items)) => items.first()?,
            _ => return None,
        };
        self.extract_id(object)
    }

    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Indicator => "indicator",
            EntityKind::IndicatorGroup => "indicator group",
            EntityKind::Template => "template",
            EntityKind::Model => "model",
            EntityKind::Equipment => "equipment",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Opaque identifier assigned by Asset Central, never empty
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RemoteId(String);

impl RemoteId {
    pub fn new(id: impl Into<String>) -> Result<Self, AcError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(AcError::InvalidState {
                reason: "remote id is empty".to_string(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RemoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A record of one Asset Central resource type
pub trait Entity: Serialize + DeserializeOwned + Clone + std::fmt::Debug + Send + Sync {
    const KIND: EntityKind;

    /// The caller-assigned local id (`internalId`)
    fn internal_id(&self) -> &str;

    /// Rebuild a record from an object returned by a query.
    ///
    /// The query shape differs from the create shape for several kinds, so
    /// implementors override this to reconcile renamed or flattened fields.
    fn reconcile(remote: Value) -> Result<Self> {
        Ok(serde_json::from_value(remote)?)
    }

    /// Mutable access to every cross-reference this record holds.
    ///
    /// During staging these hold local ids of dependencies; resolution
    /// rewrites them in place to remote ids.
    fn references_mut(&mut self) -> Vec<&mut String> {
        Vec::new()
    }

    fn references(&self) -> Vec<String> {
        let mut copy = self.clone();
        copy.references_mut().into_iter().map(|r| r.clone()).collect()
    }
}

/// A record that has not been created remotely
#[derive(Debug, Clone, PartialEq)]
pub struct Unsaved<E> {
    pub fields: E,
}

/// A record that exists remotely under `remote_id`
#[derive(Debug, Clone, PartialEq)]
pub struct Saved<E> {
    pub remote_id: RemoteId,
    pub fields: E,
}

impl<E: Entity> Unsaved<E> {
    pub fn new(fields: E) -> Self {
        Self { fields }
    }

    pub fn local_id(&self) -> &str {
        self.fields.internal_id()
    }

    /// Transition after a successful create
    pub fn into_saved(self, remote_id: RemoteId) -> Saved<E> {
        Saved {
            remote_id,
            fields: self.fields,
        }
    }
}

impl<E: Entity> Saved<E> {
    pub fn local_id(&self) -> &str {
        self.fields.internal_id()
    }

    /// Transition after a successful delete
    pub fn into_unsaved(self) -> Unsaved<E> {
        Unsaved {
            fields: self.fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_delete_order_is_reverse_of_load() {
        let order: Vec<_> = EntityKind::delete_order().collect();
        assert_eq!(
            order,
            vec![
                EntityKind::Equipment,
                EntityKind::Model,
                EntityKind::Template,
                EntityKind::IndicatorGroup,
                EntityKind::Indicator,
            ]
        );
    }

    #[test]
    fn test_resource_paths() {
        let id = RemoteId::new("ABC").unwrap();
        assert_eq!(EntityKind::Indicator.resource_path(&id), "/indicators/ABC");
        assert_eq!(EntityKind::Template.resource_path(&id), "/templates/ABC");
        assert_eq!(EntityKind::Model.resource_path(&id), "/models(ABC)");
        assert_eq!(EntityKind::Equipment.resource_path(&id), "/equipment(ABC)");
    }

    #[test]
    fn test_decode_created_shapes() {
        let template = json!([{ "id": "T1" }]);
        assert_eq!(
            EntityKind::Template.decode_created(&template),
            Some(RemoteId::new("T1").unwrap())
        );

        let model = json!({ "modelId": "M1", "id": "ignored" });
        assert_eq!(
            EntityKind::Model.decode_created(&model),
            Some(RemoteId::new("M1").unwrap())
        );

        let equipment = json!({ "equipmentId": "E1" });
        assert_eq!(
            EntityKind::Equipment.decode_created(&equipment),
            Some(RemoteId::new("E1").unwrap())
        );

        assert_eq!(EntityKind::Indicator.decode_created(&json!([])), None);
        assert_eq!(EntityKind::Indicator.decode_created(&json!({ "id": "" })), None);
        assert_eq!(EntityKind::Indicator.decode_created(&json!("I1")), None);
    }

    #[test]
    fn test_remote_id_rejects_empty() {
        let err = RemoteId::new("   ").unwrap_err();
        assert!(matches!(err, AcError::InvalidState { .. }));
        assert_eq!(RemoteId::new(" X ").unwrap().as_str(), "X");
    }

    #[test]
    fn test_update_support() {
        assert!(EntityKind::Indicator.supports_update());
        assert!(EntityKind::Template.supports_update());
        assert!(!EntityKind::Model.supports_update());
        assert!(!EntityKind::Equipment.supports_update());
    }
}
