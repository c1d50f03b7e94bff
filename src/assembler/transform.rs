//! Backend payload normalization
//!
//! The store answers with a single `module:container` key. Before rendering,
//! the payload is reshaped so the module is always the top element:
//!
//! ```text
//! {"sonic-vlan:VLAN_LIST": [...]}          // list read
//!   -> {"sonic-vlan": {"VLAN_LIST": [...]}}
//!   -> {"sonic-vlan": {"VLAN": {"VLAN_LIST": [...]}}}   // container restored
//! ```

use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::types::GetRequest;
use crate::{NetconfError, Result};

/// A backend payload rooted at its module element.
#[derive(Debug, Clone, PartialEq)]
pub struct ModulePayload {
    pub module: String,
    pub body: Value,
}

/// Reshape a backend answer for `request`.
///
/// Returns `None` for an empty answer (`{}`).
pub fn normalize(request: &GetRequest, json: &str) -> Result<Option<ModulePayload>> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| NetconfError::backend_payload(&request.path, e.to_string()))?;

    let Value::Object(root) = value else {
        return Err(NetconfError::backend_payload(&request.path, "payload is not a JSON object"));
    };

    if root.is_empty() {
        return Ok(None);
    }
    if root.len() > 1 {
        return Err(NetconfError::backend_payload(
            &request.path,
            format!("expected one top-level key, found {}", root.len()),
        ));
    }

    let Some((key, inner)) = root.into_iter().next() else {
        return Ok(None);
    };
    let Some((module, container)) = key.split_once(':') else {
        return Err(NetconfError::backend_payload(
            &request.path,
            format!("top-level key {key:?} has no module prefix"),
        ));
    };

    let mut body = if module == container { inner } else { wrap(container, inner) };

    if !request.filters.is_empty() {
        if let Some(list) = request.list_name() {
            let fields: HashSet<&str> = request.filters.iter().map(String::as_str).collect();
            trace!(list, ?fields, "Applying field filters");
            retain_list_fields(&mut body, list, &fields);
        }
    }

    restore_container(request, &mut body);

    Ok(Some(ModulePayload { module: module.to_string(), body }))
}

fn wrap(name: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(name.to_string(), value);
    Value::Object(map)
}

/// Keep only `fields` in every entry of each list named `list`.
fn retain_list_fields(value: &mut Value, list: &str, fields: &HashSet<&str>) {
    let Value::Object(map) = value else { return };

    for (name, child) in map.iter_mut() {
        if name == list {
            match child {
                Value::Array(entries) => {
                    for entry in entries.iter_mut() {
                        retain_fields(entry, fields);
                    }
                }
                Value::Object(_) => retain_fields(child, fields),
                _ => {}
            }
        } else {
            retain_list_fields(child, list, fields);
        }
    }
}

fn retain_fields(entry: &mut Value, fields: &HashSet<&str>) {
    if let Value::Object(map) = entry {
        map.retain(|name, _| fields.contains(name.as_str()));
    }
}

/// Re-nest an element read directly under the module beneath its container.
///
/// List reads come back without the container level the client asked for.
fn restore_container(request: &GetRequest, body: &mut Value) {
    let (Some(container), Some(element)) = (request.container.as_deref(), request.element.as_deref())
    else {
        return;
    };
    let Value::Object(map) = body else { return };

    if map.contains_key(container) || !map.get(element).is_some_and(is_non_empty) {
        return;
    }

    debug!(path = %request.path, container, element, "Restoring container level");
    let flattened = std::mem::take(map);
    *body = wrap(container, Value::Object(flattened));
}

fn is_non_empty(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::String(text) => !text.is_empty(),
        _ => true,
    }
}
