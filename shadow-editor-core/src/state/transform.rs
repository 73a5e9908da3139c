/// A position or scale in object space. Persisted as `[x, y, z]`.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const ZERO: Self = Self::splat(0.0);
    pub const ONE: Self = Self::splat(1.0);
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
    #[must_use]
    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v, z: v }
    }
    #[must_use]
    pub const fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
    // Used as a serde default.
    pub(crate) const fn one() -> Self {
        Self::ONE
    }
}

impl Default for Vector3 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<[f32; 3]> for Vector3 {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<Vector3> for [f32; 3] {
    fn from(value: Vector3) -> Self {
        value.to_array()
    }
}

/// Order in which euler angles are applied.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::EnumString,
    strum::Display,
    serde::Serialize,
    serde::Deserialize,
)]
#[allow(clippy::upper_case_acronyms)]
pub enum EulerOrder {
    #[default]
    XYZ,
    YZX,
    ZXY,
    XZY,
    YXZ,
    ZYX,
}

/// A rotation, in radians about each axis. Persisted as `[x, y, z, order]`.
#[derive(Copy, Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "(f32, f32, f32, EulerOrder)", into = "(f32, f32, f32, EulerOrder)")]
pub struct Euler {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub order: EulerOrder,
}

impl Euler {
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x,
            y,
            z,
            order: EulerOrder::XYZ,
        }
    }
    #[must_use]
    pub const fn with_order(self, order: EulerOrder) -> Self {
        Self { order, ..self }
    }
}

impl From<(f32, f32, f32, EulerOrder)> for Euler {
    fn from((x, y, z, order): (f32, f32, f32, EulerOrder)) -> Self {
        Self { x, y, z, order }
    }
}

impl From<Euler> for (f32, f32, f32, EulerOrder) {
    fn from(value: Euler) -> Self {
        (value.x, value.y, value.z, value.order)
    }
}
