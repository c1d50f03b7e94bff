//! Subtree filter to model path resolution
//!
//! A `<get>` filter names what to read as nested elements: model, container,
//! list. Each leaf of that tree becomes one [`GetRequest`]. List entries are
//! selected by their key leaves: a key with a value turns into a `[key=value]`
//! predicate, a key left empty turns into a residual filter that limits the
//! fields returned for every list entry.
//!
//! ```rust
//! use netconf_bridge::resolver::resolve_filter;
//! use netconf_bridge::schema::KeyMap;
//!
//! let xml = r#"<get><filter type="subtree"><sonic-vlan><VLAN/></sonic-vlan></filter></get>"#;
//! let doc = roxmltree::Document::parse(xml).unwrap();
//!
//! let requests = resolve_filter(doc.root_element(), &KeyMap::default()).unwrap();
//! assert_eq!(requests.len(), 1);
//! assert_eq!(requests[0].path, "/sonic-vlan:sonic-vlan/VLAN");
//! assert!(requests[0].filters.is_empty());
//! ```

use roxmltree::Node;
use tracing::{debug, trace};

use crate::schema::KeyMap;
use crate::types::GetRequest;
use crate::{NetconfError, Result};

/// Resolve the `<filter>` found under `rpc` into query descriptors.
///
/// Descriptors come back in document order.
pub fn resolve_filter(rpc: Node<'_, '_>, key_map: &KeyMap) -> Result<Vec<GetRequest>> {
    let filter = find_descendant(rpc, "filter").ok_or(NetconfError::MissingFilter)?;

    let mut requests = Vec::new();
    for model in element_children(filter) {
        let module = model.tag_name().name();
        let containers: Vec<_> = element_children(model).collect();
        if containers.is_empty() {
            requests.push(GetRequest::model(module));
            continue;
        }

        for container in containers {
            let container_name = container.tag_name().name();
            let elements: Vec<_> = element_children(container).collect();
            if elements.is_empty() {
                requests.push(GetRequest::container(module, container_name));
                continue;
            }

            for element in elements {
                requests.push(resolve_element(module, container_name, element, key_map));
            }
        }
    }

    debug!(
        paths = ?requests.iter().map(|r| r.path.as_str()).collect::<Vec<_>>(),
        "Resolved filter"
    );
    Ok(requests)
}

fn resolve_element(
    module: &str,
    container: &str,
    element: Node<'_, '_>,
    key_map: &KeyMap,
) -> GetRequest {
    let mut request = GetRequest::element(module, container, element.tag_name().name());
    let keys = key_map.keys_for(&request.path);

    for key in keys {
        // The element itself never counts as its own key leaf
        let Some(leaf) = element.descendants().skip(1).find(|n| is_named(*n, key)) else {
            continue;
        };

        let value = leaf.text().map(str::trim).unwrap_or_default();
        if value.is_empty() {
            trace!(key = %key, "Empty key leaf used as field filter");
            request.filters.push(key.clone());
        } else {
            request.push_predicate(key, value);
        }
    }

    request
}

/// First descendant element of `node` (itself included) with local name `name`.
pub fn find_descendant<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.descendants().find(|n| is_named(*n, name))
}

/// Element children of `node`, skipping text and comments.
pub fn element_children<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(Node::is_element)
}

fn is_named(node: Node<'_, '_>, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}
