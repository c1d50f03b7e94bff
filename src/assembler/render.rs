//! JSON to XML rendering
//!
//! Objects become elements with one child per field, arrays become repeated
//! elements, scalars become text and `null` an empty element. Entries of lists
//! with known keys emit their key leaves first, in declared key order, then
//! the remaining fields in payload order.

use serde_json::{Map, Value};

use crate::Result;
use crate::schema::KeyMap;
use crate::xml::XmlWriter;

use super::transform::ModulePayload;

/// Render a normalized payload as an XML fragment.
///
/// `namespace` is attached to the module element as `xmlns` when present.
/// The fragment is escaped for placement in an `rpc-reply`.
pub fn render(payload: &ModulePayload, key_map: &KeyMap, namespace: Option<&str>) -> Result<String> {
    let mut xml = XmlWriter::for_reply();
    let path = format!("/{0}:{0}", payload.module);
    let attributes: Vec<(&str, &str)> = namespace.map(|ns| ("xmlns", ns)).into_iter().collect();

    write_element(&mut xml, &payload.module, &payload.body, &path, key_map, &attributes)?;
    xml.finish()
}

fn write_element(
    xml: &mut XmlWriter,
    name: &str,
    value: &Value,
    path: &str,
    key_map: &KeyMap,
    attributes: &[(&str, &str)],
) -> Result<()> {
    match value {
        Value::Array(entries) => {
            for entry in entries {
                write_element(xml, name, entry, path, key_map, attributes)?;
            }
            Ok(())
        }
        Value::Object(fields) => {
            xml.start(name, attributes)?;
            for (child, child_value) in ordered_fields(fields, key_map.keys_for(path)) {
                let child_path = format!("{path}/{child}");
                write_element(xml, child, child_value, &child_path, key_map, &[])?;
            }
            xml.end(name)
        }
        Value::Null => xml.empty(name, attributes),
        Value::String(text) => write_leaf(xml, name, text, attributes),
        scalar => write_leaf(xml, name, &scalar.to_string(), attributes),
    }
}

fn write_leaf(
    xml: &mut XmlWriter,
    name: &str,
    text: &str,
    attributes: &[(&str, &str)],
) -> Result<()> {
    xml.start(name, attributes)?;
    xml.text(text)?;
    xml.end(name)
}

/// Key fields in key order, then everything else in payload order.
fn ordered_fields<'a>(fields: &'a Map<String, Value>, keys: &[String]) -> Vec<(&'a String, &'a Value)> {
    let mut ordered: Vec<_> = keys.iter().filter_map(|key| fields.get_key_value(key)).collect();
    ordered.extend(fields.iter().filter(|(name, _)| !keys.iter().any(|key| key == *name)));
    ordered
}
