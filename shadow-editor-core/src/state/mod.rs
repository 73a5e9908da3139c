//! # State
//!
//! Everything commands act on: the scene graph, the materials and geometries hanging off
//! its objects, and the scripts attached to them.

pub mod geometry;
pub mod material;
pub mod object;
pub mod scene;
pub mod script;
pub mod transform;
pub mod value;

pub use geometry::{Geometry, GeometryKind};
pub use material::{Material, MaterialKind, Texture};
pub use object::{Object3D, ObjectKind, ObjectSnapshot};
pub use scene::{Scene, SceneError};
pub use script::{Script, ScriptAttribute, ScriptKind, ScriptLibrary};
pub use transform::{Euler, EulerOrder, Vector3};
pub use value::Value;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AttributeError {
    #[error("attribute {0:?} is read-only")]
    ReadOnly(String),
    #[error("unknown attribute {0:?}")]
    Unknown(String),
    #[error("attribute {attribute:?} expects a {expected} value")]
    TypeMismatch {
        attribute: String,
        expected: &'static str,
    },
}
impl AttributeError {
    pub(crate) fn mismatch(attribute: &str, expected: &'static str) -> Self {
        Self::TypeMismatch {
            attribute: attribute.to_owned(),
            expected,
        }
    }
}
