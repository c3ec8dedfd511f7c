//! # Patch Operations
//!
//! Typed differential updates. The wire form is adjacently tagged:
//!
//! ```json
//! {"op": "Map", "data": [[1, {"op": "Mrg", "data": {"b": {"op": "Rpl", "data": "pizza"}}}]]}
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{PatchError, PatchResult};

/// A differential update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "data")]
pub enum Patch {
    /// Leave the target untouched
    Nop,
    /// Replace the target, present or not
    Rpl(Value),
    /// Insert into an absent slot
    Ins(Value),
    /// Remove a present target
    Del,
    /// Apply per-field patches to an object
    Mrg(BTreeMap<String, Patch>),
    /// Apply per-key patches to a keyed collection
    Map(Vec<(Value, Patch)>),
}

impl Patch {
    /// Decode a patch from a JSON request body
    pub fn from_json(body: &Value) -> PatchResult<Self> {
        Patch::deserialize(body).map_err(|e| PatchError::Decode(e.to_string()))
    }

    /// Decode a patch from raw bytes
    pub fn from_slice(bytes: &[u8]) -> PatchResult<Self> {
        let body: Value =
            serde_json::from_slice(bytes).map_err(|e| PatchError::Decode(e.to_string()))?;
        Self::from_json(&body)
    }

    pub fn op_name(&self) -> &'static str {
        match self {
            Patch::Nop => "Nop",
            Patch::Rpl(_) => "Rpl",
            Patch::Ins(_) => "Ins",
            Patch::Del => "Del",
            Patch::Mrg(_) => "Mrg",
            Patch::Map(_) => "Map",
        }
    }

    /// Keyed entries of a collection patch
    pub fn entries(&self) -> PatchResult<&[(Value, Patch)]> {
        match self {
            Patch::Map(entries) => Ok(entries),
            other => Err(PatchError::NotAMap(other.op_name())),
        }
    }

    /// Apply to a single value slot. `None` means absent, before or after.
    pub fn apply(&self, target: Option<&Value>) -> PatchResult<Option<Value>> {
        match self {
            Patch::Nop => Ok(target.cloned()),
            Patch::Rpl(value) => Ok(Some(value.clone())),
            Patch::Ins(value) => match target {
                Some(_) => Err(PatchError::AlreadyPresent),
                None => Ok(Some(value.clone())),
            },
            Patch::Del => match target {
                Some(_) => Ok(None),
                None => Err(PatchError::Missing("Del")),
            },
            Patch::Mrg(fields) => {
                let mut object = match target {
                    Some(Value::Object(object)) => object.clone(),
                    Some(_) => return Err(PatchError::NotAnObject),
                    None => return Err(PatchError::Missing("Mrg")),
                };
                for (name, op) in fields {
                    match op.apply(object.get(name))? {
                        Some(value) => {
                            object.insert(name.clone(), value);
                        }
                        None => {
                            object.remove(name);
                        }
                    }
                }
                Ok(Some(Value::Object(object)))
            }
            Patch::Map(_) => Err(PatchError::NestedMap),
        }
    }
}
