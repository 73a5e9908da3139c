use std::collections::BTreeMap;

use super::{
    geometry::Geometry,
    material::Material,
    transform::{Euler, Vector3},
    AttributeError, Value,
};
use crate::color::Color;

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, serde::Serialize, serde::Deserialize,
)]
pub enum ObjectKind {
    Scene,
    Object3D,
    Group,
    Mesh,
    Line,
    Points,
    Sprite,
    PerspectiveCamera,
    OrthographicCamera,
    AmbientLight,
    DirectionalLight,
    HemisphereLight,
    PointLight,
    SpotLight,
    RectAreaLight,
}

impl ObjectKind {
    #[must_use]
    pub fn is_light(self) -> bool {
        matches!(
            self,
            Self::AmbientLight
                | Self::DirectionalLight
                | Self::HemisphereLight
                | Self::PointLight
                | Self::SpotLight
                | Self::RectAreaLight
        )
    }
}

fn default_true() -> bool {
    true
}
fn empty_user_data() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// A node of the scene graph.
///
/// Typed attributes are addressed by their camelCase names through [`Object3D::attribute`]
/// and [`Object3D::set_attribute`]. Any other name addresses free-form properties, which is
/// where kind-specific attributes such as a light's `color` and `intensity` live.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Object3D {
    uuid: uuid::Uuid,
    #[serde(rename = "type")]
    kind: ObjectKind,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: Vector3,
    #[serde(default)]
    pub rotation: Euler,
    #[serde(default = "Vector3::one")]
    pub scale: Vector3,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub cast_shadow: bool,
    #[serde(default)]
    pub receive_shadow: bool,
    #[serde(default = "default_true")]
    pub frustum_culled: bool,
    #[serde(default)]
    pub render_order: i32,
    #[serde(default = "empty_user_data")]
    pub user_data: serde_json::Value,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    properties: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<Material>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
}

impl Object3D {
    /// A fresh object with a new uuid and the defaults of its kind.
    #[must_use]
    pub fn new(kind: ObjectKind) -> Self {
        let mut properties = BTreeMap::new();
        if kind.is_light() {
            properties.insert("color".to_owned(), Value::from(Color::WHITE));
            properties.insert("intensity".to_owned(), Value::Number(1.0));
        }
        if kind == ObjectKind::PerspectiveCamera {
            properties.insert("fov".to_owned(), Value::Number(50.0));
            properties.insert("near".to_owned(), Value::Number(0.1));
            properties.insert("far".to_owned(), Value::Number(2000.0));
        }
        Self {
            uuid: uuid::Uuid::new_v4(),
            kind,
            name: String::new(),
            position: Vector3::ZERO,
            rotation: Euler::default(),
            scale: Vector3::ONE,
            visible: true,
            cast_shadow: false,
            receive_shadow: false,
            frustum_culled: true,
            render_order: 0,
            user_data: empty_user_data(),
            properties,
            material: None,
            geometry: None,
        }
    }
    #[must_use]
    pub fn mesh(geometry: Geometry, material: Material) -> Self {
        Self {
            geometry: Some(geometry),
            material: Some(material),
            ..Self::new(ObjectKind::Mesh)
        }
    }
    #[must_use]
    pub fn with_uuid(self, uuid: uuid::Uuid) -> Self {
        Self { uuid, ..self }
    }
    #[must_use]
    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self
        }
    }
    #[must_use]
    pub fn with_position(self, position: Vector3) -> Self {
        Self { position, ..self }
    }
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }
    #[must_use]
    pub fn uuid(&self) -> uuid::Uuid {
        self.uuid
    }
    /// Only the scene may change an object's uuid, as it indexes objects by it.
    pub(crate) fn set_uuid(&mut self, uuid: uuid::Uuid) {
        self.uuid = uuid;
    }
    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        self.kind
    }
    /// Read an attribute by name. Absent attributes read as [`Value::Null`].
    #[must_use]
    pub fn attribute(&self, name: &str) -> Value {
        match name {
            "uuid" => Value::String(self.uuid.to_string()),
            "type" => Value::String(self.kind.to_string()),
            "name" => Value::String(self.name.clone()),
            "position" => Value::Vector3(self.position),
            "rotation" => Value::Euler(self.rotation),
            "scale" => Value::Vector3(self.scale),
            "visible" => Value::Bool(self.visible),
            "castShadow" => Value::Bool(self.cast_shadow),
            "receiveShadow" => Value::Bool(self.receive_shadow),
            "frustumCulled" => Value::Bool(self.frustum_culled),
            "renderOrder" => Value::Number(f64::from(self.render_order)),
            "userData" => Value::Json(self.user_data.clone()),
            _ => self.properties.get(name).cloned().unwrap_or_default(),
        }
    }
    /// Check that `value` could be written to the attribute `name`, without writing it.
    pub fn check_attribute(name: &str, value: &Value) -> Result<(), AttributeError> {
        let expected = match name {
            "uuid" | "type" | "parent" | "children" | "material" | "geometry" => {
                return Err(AttributeError::ReadOnly(name.to_owned()))
            }
            "name" => "string",
            "position" | "scale" => "vector3",
            "rotation" => "euler",
            "visible" | "castShadow" | "receiveShadow" | "frustumCulled" => "bool",
            // Any JSON is user data.
            "userData" => return Ok(()),
            "renderOrder" => match value.as_number() {
                Some(n) if n.fract() == 0.0 && (f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(&n) => {
                    return Ok(())
                }
                _ => return Err(AttributeError::mismatch(name, "integer")),
            },
            // Free-form, anything goes.
            _ => return Ok(()),
        };
        if value.kind() == expected {
            Ok(())
        } else {
            Err(AttributeError::mismatch(name, expected))
        }
    }
    /// Write an attribute by name. Writing `Null` to a free-form attribute removes it.
    pub fn set_attribute(&mut self, name: &str, value: Value) -> Result<(), AttributeError> {
        Self::check_attribute(name, &value)?;
        match (name, value) {
            ("name", Value::String(s)) => self.name = s,
            ("position", Value::Vector3(v)) => self.position = v,
            ("rotation", Value::Euler(e)) => self.rotation = e,
            ("scale", Value::Vector3(v)) => self.scale = v,
            ("visible", Value::Bool(b)) => self.visible = b,
            ("castShadow", Value::Bool(b)) => self.cast_shadow = b,
            ("receiveShadow", Value::Bool(b)) => self.receive_shadow = b,
            ("frustumCulled", Value::Bool(b)) => self.frustum_culled = b,
            // Range and integrality checked above.
            #[allow(clippy::cast_possible_truncation)]
            ("renderOrder", Value::Number(n)) => self.render_order = n as i32,
            ("userData", value) => self.user_data = value.into_json(),
            (_, Value::Null) => {
                self.properties.remove(name);
            }
            (_, value) => {
                self.properties.insert(name.to_owned(), value);
            }
        }
        Ok(())
    }
    /// Read a color attribute. Fails if it is absent or of another type.
    pub fn color(&self, name: &str) -> Result<Color, AttributeError> {
        self.attribute(name)
            .as_color()
            .ok_or_else(|| AttributeError::mismatch(name, "color"))
    }
}

/// An owned subtree of the scene graph: an object followed by its children, in order.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ObjectSnapshot {
    pub object: Object3D,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ObjectSnapshot>,
}

impl ObjectSnapshot {
    #[must_use]
    pub fn new(object: Object3D) -> Self {
        Self {
            object,
            children: Vec::new(),
        }
    }
    #[must_use]
    pub fn with_child(mut self, child: impl Into<ObjectSnapshot>) -> Self {
        self.children.push(child.into());
        self
    }
    #[must_use]
    pub fn uuid(&self) -> uuid::Uuid {
        self.object.uuid
    }
    /// Every uuid in this subtree, pre-order.
    #[must_use]
    pub fn uuids(&self) -> Vec<uuid::Uuid> {
        let mut uuids = Vec::new();
        let mut stack = vec![self];
        while let Some(next) = stack.pop() {
            uuids.push(next.uuid());
            stack.extend(next.children.iter().rev());
        }
        uuids
    }
}

impl From<Object3D> for ObjectSnapshot {
    fn from(object: Object3D) -> Self {
        Self::new(object)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn typed_attributes() {
        let mut object = Object3D::new(ObjectKind::Group);
        object
            .set_attribute("position", Value::Vector3(Vector3::new(1.0, 2.0, 3.0)))
            .unwrap();
        assert_eq!(object.position, Vector3::new(1.0, 2.0, 3.0));
        object.set_attribute("visible", Value::Bool(false)).unwrap();
        assert_eq!(object.attribute("visible"), Value::Bool(false));
        object.set_attribute("renderOrder", Value::Number(4.0)).unwrap();
        assert_eq!(object.render_order, 4);

        assert_eq!(
            object.set_attribute("visible", Value::Number(1.0)),
            Err(AttributeError::mismatch("visible", "bool"))
        );
        assert!(object.set_attribute("renderOrder", Value::Number(0.5)).is_err());
        assert_eq!(
            object.set_attribute("uuid", Value::from("abc")),
            Err(AttributeError::ReadOnly("uuid".to_owned()))
        );
    }
    #[test]
    fn free_form_properties() {
        let mut light = Object3D::new(ObjectKind::PointLight);
        assert_eq!(light.color("color"), Ok(Color::WHITE));
        light.set_attribute("distance", Value::Number(10.0)).unwrap();
        assert_eq!(light.attribute("distance"), Value::Number(10.0));
        light.set_attribute("distance", Value::Null).unwrap();
        assert!(light.attribute("distance").is_null());
        assert!(light.color("intensity").is_err());
    }
    #[test]
    fn snapshot_uuids_pre_order() {
        let a = Object3D::new(ObjectKind::Group);
        let b = Object3D::new(ObjectKind::Group);
        let c = Object3D::new(ObjectKind::Group);
        let d = Object3D::new(ObjectKind::Group);
        let expected = vec![a.uuid(), b.uuid(), c.uuid(), d.uuid()];
        let snapshot = ObjectSnapshot::new(a)
            .with_child(ObjectSnapshot::new(b).with_child(c))
            .with_child(d);
        assert_eq!(snapshot.uuids(), expected);
    }
    #[test]
    fn defaults_when_deserializing() {
        let uuid = uuid::Uuid::new_v4();
        let json = serde_json::json!({ "uuid": uuid, "type": "Mesh" });
        let object: Object3D = serde_json::from_value(json).unwrap();
        assert_eq!(object.uuid(), uuid);
        assert_eq!(object.scale, Vector3::ONE);
        assert!(object.visible);
    }
}
