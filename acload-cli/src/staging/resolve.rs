//! Resolution of local-id references to remote ids

use std::collections::HashMap;

use crate::entities::{Entity, EntityKind, RemoteId, Saved, Unsaved};

/// Remote ids of the dependencies created so far in a run, by local id
#[derive(Debug, Clone)]
pub struct ResolutionPool {
    kind: EntityKind,
    ids: HashMap<String, RemoteId>,
    /// Records that exist remotely but must not be referenced, with the reason
    held_back: HashMap<String, String>,
}

/// References that matched nothing in the pool
#[derive(Debug, Clone, PartialEq)]
pub struct UnresolvedReferences {
    /// Kind of the record holding the references
    pub kind: EntityKind,
    pub local_id: String,
    /// Kind the references point to
    pub target: EntityKind,
    /// Local ids never created in this run
    pub missing: Vec<String>,
    /// Local ids that were created but are unusable, with the reason
    pub held_back: Vec<(String, String)>,
}

impl std::fmt::Display for UnresolvedReferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut problems = Vec::new();
        if !self.missing.is_empty() {
            problems.push(format!("not created in this run: {}", self.missing.join(", ")));
        }
        for (local_id, reason) in &self.held_back {
            problems.push(format!("'{}' ({})", local_id, reason));
        }
        write!(
            f,
            "{} '{}' references {} {}",
            self.kind,
            self.local_id,
            self.target,
            problems.join("; ")
        )
    }
}

impl std::error::Error for UnresolvedReferences {}

impl ResolutionPool {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            ids: HashMap::new(),
            held_back: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn insert(&mut self, local_id: impl Into<String>, remote_id: RemoteId) {
        let local_id = local_id.into();
        if let Some(previous) = self.ids.insert(local_id.clone(), remote_id) {
            log::warn!(
                "{} '{}' registered twice; replacing {}",
                self.kind,
                local_id,
                previous
            );
        }
    }

    /// Register a created record
    pub fn add<E: Entity>(&mut self, saved: &Saved<E>) {
        self.insert(saved.local_id(), saved.remote_id.clone());
    }

    pub fn get(&self, local_id: &str) -> Option<&RemoteId> {
        self.ids.get(local_id)
    }

    /// Record a created record that dependents cannot use, such as an
    /// unpublished model
    pub fn hold_back(&mut self, local_id: impl Into<String>, reason: impl Into<String>) {
        self.held_back.insert(local_id.into(), reason.into());
    }

    /// Replace every reference in `record` with its remote id.
    ///
    /// All-or-nothing: if any reference is missing the record is left as it
    /// was and every missing local id is reported.
    pub fn resolve<E: Entity>(&self, record: &mut Unsaved<E>) -> Result<(), UnresolvedReferences> {
        let mut missing = Vec::new();
        let mut held_back = Vec::new();
        for reference in record.fields.references() {
            if self.ids.contains_key(&reference) {
                continue;
            }
            match self.held_back.get(&reference) {
                Some(reason) => held_back.push((reference, reason.clone())),
                None => missing.push(reference),
            }
        }

        if !missing.is_empty() || !held_back.is_empty() {
            return Err(UnresolvedReferences {
                kind: E::KIND,
                local_id: record.local_id().to_string(),
                target: self.kind,
                missing,
                held_back,
            });
        }

        for reference in record.fields.references_mut() {
            if let Some(remote_id) = self.ids.get(reference.as_str()) {
                *reference = remote_id.to_string();
            }
        }
        Ok(())
    }
}
