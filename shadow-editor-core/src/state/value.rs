use super::transform::{Euler, Vector3};
use crate::color::Color;

/// Dynamically typed attribute value, as read and written by the generic setters.
///
/// `Null` stands for an absent attribute. Writing `Null` to a free-form attribute removes it.
///
/// Persisted as the bare JSON value. Colors are packed `0xRRGGBB` numbers, and any JSON
/// that isn't one of the typed forms reads back as [`Value::Json`].
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize, strum::IntoStaticStr)]
#[serde(untagged)]
#[strum(serialize_all = "camelCase")]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Vector3(Vector3),
    Euler(Euler),
    /// Arbitrary user data.
    Json(serde_json::Value),
}

impl Value {
    /// Name of the contained type, for diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.into()
    }
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
    /// Read a packed color. Any whole number in `0..=0xFFFFFF` is one.
    #[must_use]
    pub fn as_color(&self) -> Option<Color> {
        match self {
            // Range and integrality checked, cast cannot truncate.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            Self::Number(n) if n.fract() == 0.0 && (0.0..=f64::from(Color::WHITE.hex())).contains(n) => {
                Some(Color::from_hex(*n as u32))
            }
            _ => None,
        }
    }
    #[must_use]
    pub fn as_vector3(&self) -> Option<Vector3> {
        match self {
            Self::Vector3(v) => Some(*v),
            _ => None,
        }
    }
    #[must_use]
    pub fn as_euler(&self) -> Option<Euler> {
        match self {
            Self::Euler(e) => Some(*e),
            _ => None,
        }
    }
    /// The JSON this value persists as.
    #[must_use]
    pub fn into_json(self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => b.into(),
            Self::Number(n) => n.into(),
            Self::String(s) => s.into(),
            Self::Vector3(v) => serde_json::json!(v),
            Self::Euler(e) => serde_json::json!(e),
            Self::Json(json) => json,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}
impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}
impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}
impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}
impl From<Color> for Value {
    fn from(value: Color) -> Self {
        Self::Number(f64::from(value.hex()))
    }
}
impl From<Vector3> for Value {
    fn from(value: Vector3) -> Self {
        Self::Vector3(value)
    }
}
impl From<Euler> for Value {
    fn from(value: Euler) -> Self {
        Self::Euler(value)
    }
}
impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}
