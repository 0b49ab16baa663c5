//! In-memory stand-in for the Asset Central service, for tests
//!
//! Mirrors the behaviors the client depends on: filtered queries by local
//! id, per-kind id fields and create response shapes, rejection of deletes
//! while another resource still references the target, and the model
//! publish gate for equipment creation.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::{Value, json};

use super::transport::{ApiRequest, ApiResponse, Transport};
use crate::entities::{DeleteAddress, EntityKind, ResponseShape};

#[derive(Default)]
struct FakeState {
    collections: HashMap<EntityKind, Vec<Value>>,
    published: HashSet<String>,
    rejected: HashSet<EntityKind>,
    reject_publish: bool,
    fail_queries: bool,
    dimensions: Vec<Value>,
    requests: Vec<ApiRequest>,
}

#[derive(Default)]
pub struct FakeAssetCentral {
    state: Mutex<FakeState>,
}

impl FakeAssetCentral {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored resources of `kind`
    pub fn count(&self, kind: EntityKind) -> usize {
        let state = self.state.lock().unwrap();
        state.collections.get(&kind).map_or(0, Vec::len)
    }

    /// Local ids of stored resources of `kind`, in creation order
    pub fn local_ids(&self, kind: EntityKind) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .collections
            .get(&kind)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|i| i["internalId"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Stored object of `kind` with this local id
    pub fn stored(&self, kind: EntityKind, local_id: &str) -> Option<Value> {
        let state = self.state.lock().unwrap();
        state
            .collections
            .get(&kind)?
            .iter()
            .find(|i| i["internalId"] == local_id)
            .cloned()
    }

    /// Answer every create of `kind` with HTTP 400
    pub fn reject_creates(&self, kind: EntityKind) {
        self.state.lock().unwrap().rejected.insert(kind);
    }

    /// Answer every model publish with HTTP 500
    pub fn reject_publishes(&self) {
        self.state.lock().unwrap().reject_publish = true;
    }

    /// Answer every collection query with HTTP 500
    pub fn fail_queries(&self, fail: bool) {
        self.state.lock().unwrap().fail_queries = fail;
    }

    pub fn add_dimension(&self, id: &str, units: &[&str]) {
        let units: Vec<Value> = units.iter().map(|u| json!({ "id": u })).collect();
        self.state
            .lock()
            .unwrap()
            .dimensions
            .push(json!({ "id": id, "units": units }));
    }

    /// Every request received, in order
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    fn handle(state: &mut FakeState, request: &ApiRequest) -> ApiResponse {
        let (path, query) = match request.path.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (request.path.as_str(), None),
        };

        if path == "/uom/dimensions" && request.method == Method::GET {
            return ok(Value::Array(state.dimensions.clone()));
        }

        for kind in EntityKind::LOAD_ORDER {
            if path == kind.path() {
                let body = request.body.as_ref();
                return if request.method == Method::GET {
                    Self::query(state, kind, query)
                } else if request.method == Method::POST {
                    Self::create(state, kind, body)
                } else if request.method == Method::PUT {
                    Self::replace(state, kind, body)
                } else {
                    ApiResponse::new(405, "method not allowed")
                };
            }

            if let Some(rest) = path.strip_prefix(kind.path()) {
                if let Some((id, action)) = parse_resource(kind, rest) {
                    return if request.method == Method::DELETE && action.is_empty() {
                        Self::remove(state, kind, id)
                    } else if request.method == Method::PUT
                        && action == "/publish"
                        && kind == EntityKind::Model
                    {
                        Self::publish(state, id)
                    } else {
                        ApiResponse::new(405, "method not allowed")
                    };
                }
            }
        }

        ApiResponse::new(404, format!("no route for {}", request.path))
    }

    fn query(state: &FakeState, kind: EntityKind, query: Option<&str>) -> ApiResponse {
        if state.fail_queries {
            return ApiResponse::new(500, "internal server error");
        }

        let items = state.collections.get(&kind).cloned().unwrap_or_default();
        let Some(query) = query else {
            return ok(Value::Array(items));
        };

        let Some(local_id) = parse_internal_id_filter(query) else {
            return ApiResponse::new(400, format!("unsupported filter: {}", query));
        };

        let matches: Vec<Value> = items
            .into_iter()
            .filter(|i| i["internalId"] == local_id.as_str())
            .collect();
        ok(Value::Array(matches))
    }

    fn create(state: &mut FakeState, kind: EntityKind, body: Option<&Value>) -> ApiResponse {
        if state.rejected.contains(&kind) {
            return ApiResponse::new(400, "payload rejected");
        }
        let Some(Value::Object(fields)) = body else {
            return ApiResponse::new(400, "expected a JSON object");
        };

        if kind == EntityKind::Equipment {
            let model_id = fields.get("modelId").and_then(Value::as_str).unwrap_or("");
            if !state.published.contains(model_id) {
                return ApiResponse::new(400, format!("model '{}' is not published", model_id));
            }
        }

        let id = uuid::Uuid::new_v4().simple().to_string().to_uppercase();
        let mut object = fields.clone();
        object.insert(kind.id_field().as_str().to_string(), Value::String(id));
        let object = Value::Object(object);

        state
            .collections
            .entry(kind)
            .or_default()
            .push(object.clone());

        match kind.create_shape() {
            ResponseShape::Object => ok(object),
            ResponseShape::ListWrapped => ok(Value::Array(vec![object])),
        }
    }

    fn replace(state: &mut FakeState, kind: EntityKind, body: Option<&Value>) -> ApiResponse {
        let id_field = kind.id_field().as_str();
        let Some(id) = body.and_then(|b| b.get(id_field)).and_then(Value::as_str) else {
            return ApiResponse::new(400, "missing id");
        };

        let items = state.collections.entry(kind).or_default();
        match items.iter_mut().find(|i| i[id_field] == id) {
            Some(existing) => {
                *existing = body.cloned().unwrap_or(Value::Null);
                ok(existing.clone())
            }
            None => ApiResponse::new(404, format!("{} not found", id)),
        }
    }

    fn remove(state: &mut FakeState, kind: EntityKind, id: &str) -> ApiResponse {
        let id_field = kind.id_field().as_str();
        let Some(pos) = state
            .collections
            .get(&kind)
            .and_then(|items| items.iter().position(|i| i[id_field] == id))
        else {
            return ApiResponse::new(404, format!("{} not found", id));
        };

        let referenced = state.collections.iter().any(|(other_kind, items)| {
            items.iter().any(|item| {
                let own_id = item[other_kind.id_field().as_str()].as_str() == Some(id);
                !own_id && contains_string(item, id)
            })
        });
        if referenced {
            return ApiResponse::new(409, format!("{} is still referenced", id));
        }

        if let Some(items) = state.collections.get_mut(&kind) {
            items.remove(pos);
        }
        state.published.remove(id);

        match kind.delete_address() {
            DeleteAddress::Slash => ok(json!({ "id": id })),
            DeleteAddress::Parens => ApiResponse::new(204, ""),
        }
    }

    fn publish(state: &mut FakeState, id: &str) -> ApiResponse {
        let exists = state
            .collections
            .get(&EntityKind::Model)
            .is_some_and(|items| items.iter().any(|i| i["modelId"] == id));
        if !exists {
            return ApiResponse::new(404, format!("model {} not found", id));
        }
        if state.reject_publish {
            return ApiResponse::new(500, "publish failed");
        }
        state.published.insert(id.to_string());
        ok(json!({ "modelId": id, "status": "published" }))
    }
}

#[async_trait]
impl Transport for FakeAssetCentral {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());
        Ok(Self::handle(&mut state, &request))
    }
}

fn ok(body: Value) -> ApiResponse {
    ApiResponse::new(200, body.to_string())
}

/// `/{id}` or `({id})` plus any trailing action such as `/publish`
fn parse_resource(kind: EntityKind, rest: &str) -> Option<(&str, &str)> {
    match kind.delete_address() {
        DeleteAddress::Slash => {
            let id = rest.strip_prefix('/')?;
            (!id.is_empty() && !id.contains('/')).then_some((id, ""))
        }
        DeleteAddress::Parens => {
            let inner = rest.strip_prefix('(')?;
            let (id, action) = inner.split_once(')')?;
            Some((id, action))
        }
    }
}

fn parse_internal_id_filter(query: &str) -> Option<String> {
    let literal = query
        .strip_prefix("$filter=internalId+eq+'")?
        .strip_suffix('\'')?;
    let decoded = urlencoding::decode(literal).ok()?;
    Some(decoded.replace("''", "'"))
}

fn contains_string(value: &Value, needle: &str) -> bool {
    match value {
        Value::String(s) => s == needle,
        Value::Array(items) => items.iter().any(|v| contains_string(v, needle)),
        Value::Object(map) => map.values().any(|v| contains_string(v, needle)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter_round_trip() {
        let path = crate::api::query::filtered_path("/indicators", "O'Brien pump");
        let query = path.split_once('?').unwrap().1;
        assert_eq!(parse_internal_id_filter(query).unwrap(), "O'Brien pump");
    }

    #[test]
    fn test_parse_resource() {
        assert_eq!(parse_resource(EntityKind::Indicator, "/ABC"), Some(("ABC", "")));
        assert_eq!(
            parse_resource(EntityKind::Model, "(ABC)/publish"),
            Some(("ABC", "/publish"))
        );
        assert_eq!(parse_resource(EntityKind::Model, "/ABC"), None);
    }
}
