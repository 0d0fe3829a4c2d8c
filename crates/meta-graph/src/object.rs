//! Data objects: value holders shaped by an object node's fields.

use std::collections::BTreeMap;

use meta_core::{NodeRole, TypeId, Value};
use serde::Serialize;
use tracing::trace;

use crate::error::{GraphError, Result};
use crate::graph::MetaGraph;
use crate::node::NodeId;

/// Attribute holding a field's default value.
pub const DEFAULT_VALUE_ATTR: &str = "defaultValue";

/// An instance of a metadata object, keyed by field name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataObject {
    object_type: TypeId,
    object_name: String,
    values: BTreeMap<String, Value>,
}

impl DataObject {
    pub fn object_type(&self) -> &TypeId {
        &self.object_type
    }

    /// Name of the object node this instance was created from.
    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    pub fn is_set(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    /// Clear a field, returning its previous value.
    pub fn unset(&mut self, field: &str) -> Option<Value> {
        self.values.remove(field)
    }

    /// Set fields in name order.
    pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl MetaGraph {
    /// Create an instance of `object` with every declared default applied.
    ///
    /// Each field, own or inherited, with a `defaultValue` attribute gets
    /// that value coerced to the field's value kind. Fields without a
    /// default stay unset.
    ///
    /// # Errors
    ///
    /// `NotAnObject` if the node is not an object, or `InvalidValue` if a
    /// default does not coerce.
    pub fn new_instance(&self, object: NodeId) -> Result<DataObject> {
        let node = self.get(object)?;
        if node.role() != NodeRole::Object {
            return Err(GraphError::NotAnObject {
                name: node.name().to_string(),
            });
        }
        let mut instance = DataObject {
            object_type: node.type_id().clone(),
            object_name: node.name().to_string(),
            values: BTreeMap::new(),
        };
        for &field in self.object_fields(object)?.iter() {
            let Some(default) = self.attribute_value(field, DEFAULT_VALUE_ATTR)? else {
                continue;
            };
            let field_node = self.get(field)?;
            let value = match field_node.value_kind() {
                Some(kind) => kind.coerce(default)?,
                None => default,
            };
            trace!(object = node.name(), field = field_node.name(), %value, "Applied default");
            instance.values.insert(field_node.name().to_string(), value);
        }
        Ok(instance)
    }

    /// Set a field of `instance`, coerced to the field's value kind.
    pub fn assign(&self, object: NodeId, instance: &mut DataObject, field: &str, value: impl Into<Value>) -> Result<()> {
        let field_id = self.meta_field(object, field)?.ok_or_else(|| GraphError::UnknownField {
            object: instance.object_name.clone(),
            field: field.to_string(),
        })?;
        let value = match self.get(field_id)?.value_kind() {
            Some(kind) => kind.coerce(value.into())?,
            None => value.into(),
        };
        instance.values.insert(field.to_string(), value);
        Ok(())
    }
}
