//! Schema registry built from the device's module set

use std::collections::BTreeMap;

use tracing::debug;

use crate::ServerConfig;
use crate::Result;
use crate::types::{GetSchemaRequest, ModuleRecord, ModuleSet, SchemaDescriptor};
use crate::xml::{NS_NETCONF_MONITORING, NS_YANG_LIBRARY, XmlWriter};

/// Schema format reported for every registered module.
pub const YANG_FORMAT: &str = "yang";

/// Fields of a `netconf-state/schemas/schema` entry, in emission order.
const SCHEMA_FIELDS: [&str; 5] = ["identifier", "version", "format", "namespace", "location"];

/// Immutable view of every YANG module the device exposes.
///
/// Descriptors are keyed by lower-cased identifier; one identifier can carry
/// several revisions. Module records keep the order the schema source reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaRegistry {
    module_set_id: String,
    schemas: BTreeMap<String, Vec<SchemaDescriptor>>,
    modules: Vec<ModuleRecord>,
}

impl SchemaRegistry {
    /// Populate a registry from a module enumeration.
    pub fn from_module_set(set: &ModuleSet, config: &ServerConfig) -> Self {
        let mut schemas: BTreeMap<String, Vec<SchemaDescriptor>> = BTreeMap::new();
        let mut modules = Vec::with_capacity(set.modules.len());

        for module in &set.modules {
            let descriptor = SchemaDescriptor {
                identifier: module.name.to_lowercase(),
                version: module.revision.clone(),
                format: YANG_FORMAT.to_string(),
                namespace: module.namespace.clone(),
                location: config.schema_location.clone(),
                model_path: config.model_path(&module.name),
            };
            schemas.entry(descriptor.identifier.clone()).or_default().push(descriptor);

            modules.push(ModuleRecord {
                name: module.name.clone(),
                namespace: module.namespace.clone(),
                revision: module.revision.clone(),
                conformance_type: module.conformance,
                schema_url: module
                    .schema
                    .clone()
                    .unwrap_or_else(|| config.default_schema_url(&module.name)),
            });
        }

        debug!(
            module_set_id = %set.module_set_id,
            modules = modules.len(),
            identifiers = schemas.len(),
            "Schema registry populated"
        );

        Self { module_set_id: set.module_set_id.clone(), schemas, modules }
    }

    pub fn module_set_id(&self) -> &str {
        &self.module_set_id
    }

    pub fn modules(&self) -> &[ModuleRecord] {
        &self.modules
    }

    /// Every descriptor registered under `identifier`, matched case-insensitively.
    pub fn descriptors(&self, identifier: &str) -> &[SchemaDescriptor] {
        self.schemas.get(&identifier.to_lowercase()).map(Vec::as_slice).unwrap_or(&[])
    }

    /// XML namespace of a module, taken from its first descriptor.
    pub fn namespace_of(&self, module: &str) -> Option<&str> {
        self.descriptors(module).first().map(|d| d.namespace.as_str())
    }

    /// First descriptor satisfying a `get-schema` request.
    pub fn find_schema(&self, request: &GetSchemaRequest) -> Option<&SchemaDescriptor> {
        self.descriptors(&request.identifier).iter().find(|d| request.matches(d))
    }

    /// Iterate all descriptors in identifier order.
    pub fn all_descriptors(&self) -> impl Iterator<Item = &SchemaDescriptor> {
        self.schemas.values().flatten()
    }

    /// RFC 7895 `modules-state` document, escaped for an `rpc-reply`.
    pub fn modules_state_xml(&self) -> Result<String> {
        let mut xml = XmlWriter::for_reply();
        xml.start("modules-state", &[("xmlns", NS_YANG_LIBRARY)])?;
        xml.leaf("module-set-id", &self.module_set_id)?;
        for module in &self.modules {
            xml.start("module", &[])?;
            xml.leaf("name", &module.name)?;
            xml.leaf("revision", &module.revision)?;
            xml.leaf("schema", &module.schema_url)?;
            xml.leaf("namespace", &module.namespace)?;
            xml.leaf("conformance-type", module.conformance_type.as_str())?;
            xml.end("module")?;
        }
        xml.end("modules-state")?;
        xml.finish()
    }

    /// RFC 6022 `netconf-state/schemas` listing.
    ///
    /// `predicates` narrow the listing to entries whose field equals the given
    /// value (identifiers compare case-insensitively). When `fields` is
    /// non-empty only those fields and the predicate keys are emitted for
    /// each entry. The listing is escaped for an `rpc-reply`.
    pub fn schemas_xml(&self, predicates: &[(&str, &str)], fields: &[String]) -> Result<String> {
        let mut xml = XmlWriter::for_reply();
        xml.start("netconf-state", &[("xmlns", NS_NETCONF_MONITORING)])?;
        xml.start("schemas", &[])?;

        for descriptor in self.all_descriptors() {
            if !predicates.iter().all(|(key, value)| field_matches(descriptor, key, value)) {
                continue;
            }

            xml.start("schema", &[])?;
            for field in SCHEMA_FIELDS {
                let selected = fields.is_empty()
                    || fields.iter().any(|f| f == field)
                    || predicates.iter().any(|(key, _)| *key == field);
                if !selected {
                    continue;
                }
                if let Some(value) = field_value(descriptor, field) {
                    xml.leaf(field, value)?;
                }
            }
            xml.end("schema")?;
        }

        xml.end("schemas")?;
        xml.end("netconf-state")?;
        xml.finish()
    }
}

fn field_value<'a>(descriptor: &'a SchemaDescriptor, field: &str) -> Option<&'a str> {
    match field {
        "identifier" => Some(descriptor.identifier.as_str()),
        "version" => Some(descriptor.version.as_str()),
        "format" => Some(descriptor.format.as_str()),
        "namespace" => Some(descriptor.namespace.as_str()),
        "location" => Some(descriptor.location.as_str()),
        _ => None,
    }
}

fn field_matches(descriptor: &SchemaDescriptor, key: &str, value: &str) -> bool {
    match (key, field_value(descriptor, key)) {
        ("identifier" | "format", Some(actual)) => actual.eq_ignore_ascii_case(value),
        (_, Some(actual)) => actual == value,
        // Unknown predicate keys select nothing
        (_, None) => false,
    }
}
