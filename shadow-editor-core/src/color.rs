/// A 24-bit sRGB color, packed as `0xRRGGBB`.
///
/// This is the representation color attributes are stored and persisted in. Bits above
/// the low 24 are always zero.
#[repr(transparent)]
#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(from = "u32", into = "u32")]
#[allow(clippy::module_name_repetitions)]
pub struct Color(u32);
impl Color {
    pub const BLACK: Self = Self(0x00_0000);
    pub const WHITE: Self = Self(0xFF_FFFF);
    /// Create a color from packed `0xRRGGBB`. Excess high bits are discarded.
    #[must_use]
    pub const fn from_hex(hex: u32) -> Self {
        Self(hex & 0xFF_FFFF)
    }
    #[must_use]
    pub const fn hex(self) -> u32 {
        self.0
    }
    /// Create a color from normalized channels. Values are clamped to `[0, 1]`.
    pub fn from_rgb_lossy(r: f32, g: f32, b: f32) -> Result<Self, ColorError> {
        let channel = |v: f32| -> Result<u32, ColorError> {
            if !v.is_finite() {
                return Err(ColorError::NotFinite);
            }
            // Clamped to [0, 255] above, cast cannot truncate.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            Ok((v.clamp(0.0, 1.0) * 255.0).round() as u32)
        };
        Ok(Self(channel(r)? << 16 | channel(g)? << 8 | channel(b)?))
    }
    /// Normalized `[r, g, b]` channels.
    #[must_use]
    pub fn as_rgb(self) -> [f32; 3] {
        let channel = |shift: u32| f32::from(((self.0 >> shift) & 0xFF) as u8) / 255.0;
        [channel(16), channel(8), channel(0)]
    }
}
impl From<u32> for Color {
    fn from(value: u32) -> Self {
        Self::from_hex(value)
    }
}
impl From<Color> for u32 {
    fn from(value: Color) -> Self {
        value.0
    }
}
impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}
impl std::str::FromStr for Color {
    type Err = ColorError;
    /// Parses `#rrggbb`, `0xrrggbb` or bare `rrggbb`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix('#')
            .or_else(|| s.strip_prefix("0x"))
            .unwrap_or(s);
        if digits.len() != 6 {
            return Err(ColorError::InvalidHex(s.to_owned()));
        }
        u32::from_str_radix(digits, 16)
            .map(Self)
            .map_err(|_| ColorError::InvalidHex(s.to_owned()))
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("color channel is not finite")]
    NotFinite,
    #[error("{0:?} is not a hex color")]
    InvalidHex(String),
}
