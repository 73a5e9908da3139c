use std::collections::BTreeMap;

use super::{AttributeError, Value};
use crate::color::Color;

/// Texture slots a material may fill.
pub const MAP_SLOTS: &[&str] = &[
    "map",
    "alphaMap",
    "aoMap",
    "bumpMap",
    "displacementMap",
    "emissiveMap",
    "envMap",
    "gradientMap",
    "lightMap",
    "metalnessMap",
    "normalMap",
    "roughnessMap",
    "specularMap",
];

fn default_repeat() -> [f32; 2] {
    [1.0; 2]
}
fn default_true() -> bool {
    true
}

/// An image bound to a material slot.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Texture {
    pub uuid: uuid::Uuid,
    #[serde(default)]
    pub name: String,
    /// Where the image was loaded from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    /// Inline image data, usually a data URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default = "default_repeat")]
    pub repeat: [f32; 2],
    #[serde(default)]
    pub offset: [f32; 2],
    #[serde(default = "default_true")]
    pub flip_y: bool,
}

impl Texture {
    #[must_use]
    pub fn new(source_file: impl Into<String>) -> Self {
        Self {
            uuid: uuid::Uuid::new_v4(),
            name: String::new(),
            source_file: Some(source_file.into()),
            image: None,
            repeat: default_repeat(),
            offset: [0.0; 2],
            flip_y: true,
        }
    }
}

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, serde::Serialize, serde::Deserialize,
)]
pub enum MaterialKind {
    LineBasicMaterial,
    LineDashedMaterial,
    MeshBasicMaterial,
    MeshDepthMaterial,
    MeshLambertMaterial,
    MeshNormalMaterial,
    MeshPhongMaterial,
    MeshPhysicalMaterial,
    MeshStandardMaterial,
    MeshToonMaterial,
    PointsMaterial,
    RawShaderMaterial,
    ShaderMaterial,
    SpriteMaterial,
}

/// Surface description of a mesh.
///
/// Every mutation bumps [`Material::version`], which renderers compare against to know
/// when to re-upload the material.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    uuid: uuid::Uuid,
    #[serde(rename = "type")]
    kind: MaterialKind,
    #[serde(default)]
    name: String,
    #[serde(default)]
    properties: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    maps: BTreeMap<String, Texture>,
    #[serde(default)]
    version: u64,
}

impl Material {
    /// A new material with a fresh uuid, white and fully opaque.
    #[must_use]
    pub fn new(kind: MaterialKind) -> Self {
        let properties = [
            ("color".to_owned(), Value::from(Color::WHITE)),
            ("opacity".to_owned(), Value::Number(1.0)),
            ("transparent".to_owned(), Value::Bool(false)),
        ]
        .into_iter()
        .collect();
        Self {
            uuid: uuid::Uuid::new_v4(),
            kind,
            name: String::new(),
            properties,
            maps: BTreeMap::new(),
            version: 0,
        }
    }
    #[must_use]
    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self
        }
    }
    #[must_use]
    pub fn with_property(mut self, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(attribute.into(), value.into());
        self
    }
    #[must_use]
    pub fn uuid(&self) -> uuid::Uuid {
        self.uuid
    }
    #[must_use]
    pub fn kind(&self) -> MaterialKind {
        self.kind
    }
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }
    /// Read an attribute by name. Absent attributes read as [`Value::Null`].
    #[must_use]
    pub fn get(&self, attribute: &str) -> Value {
        match attribute {
            "uuid" => Value::String(self.uuid.to_string()),
            "type" => Value::String(self.kind.to_string()),
            "name" => Value::String(self.name.clone()),
            _ => self.properties.get(attribute).cloned().unwrap_or_default(),
        }
    }
    /// Write an attribute by name.
    pub fn set(&mut self, attribute: &str, value: Value) -> Result<(), AttributeError> {
        match attribute {
            "uuid" | "type" => return Err(AttributeError::ReadOnly(attribute.to_owned())),
            "name" => match value {
                Value::String(name) => self.name = name,
                _ => return Err(AttributeError::mismatch(attribute, "string")),
            },
            _ if value.is_null() => {
                self.properties.remove(attribute);
            }
            _ => {
                self.properties.insert(attribute.to_owned(), value);
            }
        }
        self.needs_update();
        Ok(())
    }
    /// Read a color attribute. Fails if the attribute is absent or of another type.
    pub fn color(&self, attribute: &str) -> Result<Color, AttributeError> {
        self.get(attribute)
            .as_color()
            .ok_or_else(|| AttributeError::mismatch(attribute, "color"))
    }
    #[must_use]
    pub fn map(&self, slot: &str) -> Option<&Texture> {
        self.maps.get(slot)
    }
    /// Fill or empty a texture slot.
    pub fn set_map(&mut self, slot: &str, texture: Option<Texture>) -> Result<(), AttributeError> {
        check_slot(slot)?;
        match texture {
            Some(texture) => {
                self.maps.insert(slot.to_owned(), texture);
            }
            None => {
                self.maps.remove(slot);
            }
        }
        self.needs_update();
        Ok(())
    }
    pub fn maps(&self) -> impl Iterator<Item = (&str, &Texture)> + '_ {
        self.maps.iter().map(|(slot, texture)| (slot.as_str(), texture))
    }
    /// Continue counting from the version of the material this one replaces.
    pub(crate) fn supersede(&mut self, previous: u64) {
        self.version = self.version.max(previous);
        self.needs_update();
    }
    fn needs_update(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}

pub(crate) fn check_slot(slot: &str) -> Result<(), AttributeError> {
    if MAP_SLOTS.contains(&slot) {
        Ok(())
    } else {
        Err(AttributeError::Unknown(slot.to_owned()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn mutation_bumps_version() {
        let mut material = Material::new(MaterialKind::MeshStandardMaterial);
        assert_eq!(material.version(), 0);
        material.set("opacity", Value::Number(0.5)).unwrap();
        assert_eq!(material.version(), 1);
        material
            .set_map("map", Some(Texture::new("bricks.png")))
            .unwrap();
        assert_eq!(material.version(), 2);
        assert_eq!(material.get("opacity"), Value::Number(0.5));
    }
    #[test]
    fn read_only_and_slots() {
        let mut material = Material::new(MaterialKind::MeshBasicMaterial);
        assert_eq!(
            material.set("type", Value::from("x")),
            Err(AttributeError::ReadOnly("type".to_owned()))
        );
        assert_eq!(
            material.set_map("notAMap", None),
            Err(AttributeError::Unknown("notAMap".to_owned()))
        );
        // Failed writes leave the version alone.
        assert_eq!(material.version(), 0);
        assert_eq!(material.color("color"), Ok(Color::WHITE));
        assert!(material.color("opacity").is_err());
    }
    #[test]
    fn null_removes_property() {
        let mut material = Material::new(MaterialKind::MeshPhongMaterial).with_property("shininess", 30.0);
        material.set("shininess", Value::Null).unwrap();
        assert!(material.get("shininess").is_null());
    }
}
