//! Component Schema Encoding
//!
//! Turns reflected component types into portable schema records and component
//! instances into `{field: value}` records.
//!
//! # Type table
//!
//! | field type | semantic type | storage type | size | ref type |
//! |------------|---------------|--------------|------|----------|
//! | `Bool`     | `bool`        | `i32`        | 1    |          |
//! | `Int32`    | `i32`         | `i32`        | 1    |          |
//! | `Float32`  | `f32`         | `f32`        | 1    |          |
//! | `Vec2`     | `vec2`        | `f32`        | 2    |          |
//! | `Vec3`     | `vec3`        | `f32`        | 3    |          |
//! | `Vec4`     | `vec4`        | `f32`        | 4    |          |
//! | `NodeRef`  | `ref`         | `u32`        | 1    | `node`   |
//!
//! Any other type is rejected with [`ExportError::UnsupportedFieldType`].

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::errors::{ExportError, Result};
use crate::export::handle::{Resource, ResourceKind};
use crate::scene::NodeKey;
use crate::scene::component::{Component, ComponentType, FieldInfo, FieldType, FieldValue};

impl Resource for ComponentType {
    const KIND: ResourceKind = ResourceKind::ComponentDefinition;
}

// ============================================================================
// Type descriptors
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    Bool,
    I32,
    F32,
    Vec2,
    Vec3,
    Vec4,
    Ref,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    I32,
    U32,
    F32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefTarget {
    Node,
}

/// Portable encoding of one field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub semantic: SemanticType,
    pub storage: StorageType,
    pub size: u32,
    pub ref_type: Option<RefTarget>,
}

impl TypeDescriptor {
    const fn scalar(semantic: SemanticType, storage: StorageType, size: u32) -> Self {
        Self {
            semantic,
            storage,
            size,
            ref_type: None,
        }
    }

    /// Looks the field type up in the portable type table.
    #[must_use]
    pub const fn of(ty: FieldType) -> Option<Self> {
        let descriptor = match ty {
            FieldType::Bool => Self::scalar(SemanticType::Bool, StorageType::I32, 1),
            FieldType::Int32 => Self::scalar(SemanticType::I32, StorageType::I32, 1),
            FieldType::Float32 => Self::scalar(SemanticType::F32, StorageType::F32, 1),
            FieldType::Vec2 => Self::scalar(SemanticType::Vec2, StorageType::F32, 2),
            FieldType::Vec3 => Self::scalar(SemanticType::Vec3, StorageType::F32, 3),
            FieldType::Vec4 => Self::scalar(SemanticType::Vec4, StorageType::F32, 4),
            FieldType::NodeRef => Self {
                semantic: SemanticType::Ref,
                storage: StorageType::U32,
                size: 1,
                ref_type: Some(RefTarget::Node),
            },
            FieldType::Other(_) => return None,
        };
        Some(descriptor)
    }
}

// ============================================================================
// Encoded values and records
// ============================================================================

/// A field value in portable form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EncodedValue {
    /// Node reference to "no object".
    Null,
    Bool(bool),
    Int(i32),
    Float(f32),
    Vector(Vec<f32>),
    /// Resolved node index.
    Index(u32),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub semantic_type: SemanticType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_type: Option<RefTarget>,
    pub storage_type: StorageType,
    pub size: u32,
    #[serde(rename = "default", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<EncodedValue>,
}

/// Schema of one component type, in field declaration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaRecord {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub props: Vec<FieldDescriptor>,
}

/// `{field: value}` of one component instance. Keeps field order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentInstanceRecord {
    fields: Vec<(String, EncodedValue)>,
}

impl ComponentInstanceRecord {
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&EncodedValue> {
        self.fields.iter().find(|(name, _)| name == field).map(|(_, v)| v)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EncodedValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl Serialize for ComponentInstanceRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

// ============================================================================
// Node resolution
// ============================================================================

/// Resolves host node references to document node indices.
pub trait NodeResolver {
    fn resolve_node(&mut self, node: NodeKey) -> Result<u32>;
}

impl<F: FnMut(NodeKey) -> Result<u32>> NodeResolver for F {
    fn resolve_node(&mut self, node: NodeKey) -> Result<u32> {
        self(node)
    }
}

// ============================================================================
// SchemaEncoder
// ============================================================================

/// Stateless encoder for component schemas and instances.
pub struct SchemaEncoder;

impl SchemaEncoder {
    /// Portable type of one field, or [`ExportError::UnsupportedFieldType`].
    pub fn describe(component: &str, field: &FieldInfo) -> Result<TypeDescriptor> {
        TypeDescriptor::of(field.ty).ok_or_else(|| ExportError::UnsupportedFieldType {
            component: component.to_string(),
            field: field.name.to_string(),
            type_name: field.ty.to_string(),
        })
    }

    /// Encodes one field value.
    ///
    /// A null node reference becomes [`EncodedValue::Null`]; a non-null one is
    /// resolved through `resolver`.
    pub fn encode_value(
        component: &str,
        field: &str,
        value: &FieldValue,
        resolver: &mut dyn NodeResolver,
    ) -> Result<EncodedValue> {
        let encoded = match value {
            FieldValue::Bool(v) => EncodedValue::Bool(*v),
            FieldValue::Int32(v) => EncodedValue::Int(*v),
            FieldValue::Float32(v) => EncodedValue::Float(*v),
            FieldValue::Vec2(v) => EncodedValue::Vector(v.to_array().to_vec()),
            FieldValue::Vec3(v) => EncodedValue::Vector(v.to_array().to_vec()),
            FieldValue::Vec4(v) => EncodedValue::Vector(v.to_array().to_vec()),
            FieldValue::NodeRef(None) => EncodedValue::Null,
            FieldValue::NodeRef(Some(node)) => {
                EncodedValue::Index(resolver.resolve_node(*node).map_err(|err| ExportError::Encoding {
                    component: component.to_string(),
                    field: field.to_string(),
                    reason: err.to_string(),
                })?)
            }
            FieldValue::Unsupported(type_name) => {
                return Err(ExportError::Encoding {
                    component: component.to_string(),
                    field: field.to_string(),
                    reason: format!("unsupported type `{type_name}`"),
                });
            }
        };
        Ok(encoded)
    }

    /// Builds the schema record of a component type.
    ///
    /// Default values come from a default-constructed instance. A field whose
    /// default is a null node reference carries no default.
    pub fn schema_for(ty: &ComponentType, resolver: &mut dyn NodeResolver) -> Result<SchemaRecord> {
        let defaults = ty.create_default();
        let mut props = Vec::new();

        for field in ty.eligible_fields() {
            let descriptor = Self::describe(ty.name(), &field)?;

            let default_value = match defaults.field_value(field.name) {
                None | Some(FieldValue::NodeRef(None)) => None,
                Some(value) => Some(Self::encode_value(ty.name(), field.name, &value, resolver)?),
            };

            props.push(FieldDescriptor {
                name: field.name.to_string(),
                semantic_type: descriptor.semantic,
                ref_type: descriptor.ref_type,
                storage_type: descriptor.storage,
                size: descriptor.size,
                default_value,
            });
        }

        Ok(SchemaRecord {
            name: ty.name().to_string(),
            props,
        })
    }

    /// Encodes every schema-eligible field of `component`.
    ///
    /// Fields that fail to encode are left out of the record and reported in
    /// the returned error list.
    pub fn encode_instance(
        component: &dyn Component,
        resolver: &mut dyn NodeResolver,
    ) -> (ComponentInstanceRecord, Vec<ExportError>) {
        let ty = component.component_type();
        let mut record = ComponentInstanceRecord::default();
        let mut errors = Vec::new();

        for field in ty.eligible_fields() {
            let Some(value) = component.field_value(field.name) else {
                errors.push(ExportError::Encoding {
                    component: ty.name().to_string(),
                    field: field.name.to_string(),
                    reason: "field has no value".to_string(),
                });
                continue;
            };

            match Self::encode_value(ty.name(), field.name, &value, resolver) {
                Ok(encoded) => record.fields.push((field.name.to_string(), encoded)),
                Err(err) => errors.push(err),
            }
        }

        (record, errors)
    }
}
