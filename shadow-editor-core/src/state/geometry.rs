use std::collections::BTreeMap;

use super::{AttributeError, Value};

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, serde::Serialize, serde::Deserialize,
)]
pub enum GeometryKind {
    BoxBufferGeometry,
    BufferGeometry,
    CircleBufferGeometry,
    CylinderBufferGeometry,
    IcosahedronBufferGeometry,
    LatheBufferGeometry,
    PlaneBufferGeometry,
    SphereBufferGeometry,
    TeapotBufferGeometry,
    TorusBufferGeometry,
    TorusKnotBufferGeometry,
}

/// Shape of a mesh, described by its generator parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Geometry {
    uuid: uuid::Uuid,
    #[serde(rename = "type")]
    kind: GeometryKind,
    #[serde(default)]
    name: String,
    #[serde(default)]
    parameters: BTreeMap<String, Value>,
}

impl Geometry {
    #[must_use]
    pub fn new(kind: GeometryKind) -> Self {
        Self {
            uuid: uuid::Uuid::new_v4(),
            kind,
            name: String::new(),
            parameters: BTreeMap::new(),
        }
    }
    /// A unit cube.
    #[must_use]
    pub fn unit_box() -> Self {
        Self::new(GeometryKind::BoxBufferGeometry)
            .with_parameter("width", 1.0)
            .with_parameter("height", 1.0)
            .with_parameter("depth", 1.0)
    }
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }
    #[must_use]
    pub fn uuid(&self) -> uuid::Uuid {
        self.uuid
    }
    #[must_use]
    pub fn kind(&self) -> GeometryKind {
        self.kind
    }
    #[must_use]
    pub fn get(&self, attribute: &str) -> Value {
        match attribute {
            "uuid" => Value::String(self.uuid.to_string()),
            "type" => Value::String(self.kind.to_string()),
            "name" => Value::String(self.name.clone()),
            _ => self.parameters.get(attribute).cloned().unwrap_or_default(),
        }
    }
    pub fn set(&mut self, attribute: &str, value: Value) -> Result<(), AttributeError> {
        match attribute {
            "uuid" | "type" => Err(AttributeError::ReadOnly(attribute.to_owned())),
            "name" => match value {
                Value::String(name) => {
                    self.name = name;
                    Ok(())
                }
                _ => Err(AttributeError::mismatch(attribute, "string")),
            },
            _ if value.is_null() => {
                self.parameters.remove(attribute);
                Ok(())
            }
            _ => {
                self.parameters.insert(attribute.to_owned(), value);
                Ok(())
            }
        }
    }
}
