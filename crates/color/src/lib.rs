use bitut::BitUtils;
use glam::Vec4;
use serde::{Deserialize, Serialize};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Converts a value in range `0..=OLD_MAX` to a value in the range `0..=NEW_MAX`.
#[inline(always)]
pub fn convert_range<const OLD_MAX: u32, const NEW_MAX: u32>(value: u8) -> u8 {
    const {
        assert!(OLD_MAX != 0);
        assert!(OLD_MAX <= 255);
        assert!(NEW_MAX <= 255);
    };

    let value = value as u32;
    ((value * NEW_MAX + OLD_MAX / 2) / OLD_MAX) as u8
}

/// A single RGBA8 color. In memory, the channels are laid out as R, G, B, A, which means that
/// as a little-endian `u32` red lives in the lowest byte.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Immutable,
    IntoBytes,
    FromBytes,
    KnownLayout,
    Default,
    Serialize,
    Deserialize,
)]
#[repr(C)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    #[inline(always)]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    #[inline(always)]
    pub fn from_u32(value: u32) -> Self {
        let [r, g, b, a] = value.to_le_bytes();
        Self { r, g, b, a }
    }

    #[inline(always)]
    pub fn to_u32(self) -> u32 {
        u32::from_le_bytes([self.r, self.g, self.b, self.a])
    }

    /// Decodes a 16-bit color with red in the lowest 5 bits and blue in the highest 5.
    #[inline(always)]
    pub fn from_rgb565(value: u16) -> Self {
        Self {
            r: convert_range::<31, 255>(value.bits(0, 5) as u8),
            g: convert_range::<63, 255>(value.bits(5, 11) as u8),
            b: convert_range::<31, 255>(value.bits(11, 16) as u8),
            a: 255,
        }
    }

    #[inline(always)]
    pub fn from_rgba5551(value: u16) -> Self {
        Self {
            r: convert_range::<31, 255>(value.bits(0, 5) as u8),
            g: convert_range::<31, 255>(value.bits(5, 10) as u8),
            b: convert_range::<31, 255>(value.bits(10, 15) as u8),
            a: if value.bit(15) { 255 } else { 0 },
        }
    }

    #[inline(always)]
    pub fn from_rgba4444(value: u16) -> Self {
        Self {
            r: convert_range::<15, 255>(value.bits(0, 4) as u8),
            g: convert_range::<15, 255>(value.bits(4, 8) as u8),
            b: convert_range::<15, 255>(value.bits(8, 12) as u8),
            a: convert_range::<15, 255>(value.bits(12, 16) as u8),
        }
    }
}

/// A color with floating point channels, usually in the `0.0..=1.0` range.
#[derive(Debug, Clone, Copy, PartialEq, Immutable, IntoBytes, FromBytes, Default)]
#[repr(C)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    #[inline(always)]
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Converts back into an [`Rgba8`], clamping each channel to `0.0..=1.0` and rounding to the
    /// nearest representable value.
    #[inline(always)]
    pub fn to_rgba8(self) -> Rgba8 {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Rgba8 {
            r: channel(self.r),
            g: channel(self.g),
            b: channel(self.b),
            a: channel(self.a),
        }
    }
}

impl From<Rgba8> for Rgba {
    fn from(value: Rgba8) -> Self {
        Self {
            r: value.r as f32 / 255.0,
            g: value.g as f32 / 255.0,
            b: value.b as f32 / 255.0,
            a: value.a as f32 / 255.0,
        }
    }
}

impl From<Vec4> for Rgba {
    fn from(value: Vec4) -> Self {
        Self::new(value.x, value.y, value.z, value.w)
    }
}

impl From<Rgba> for Vec4 {
    fn from(value: Rgba) -> Self {
        Vec4::new(value.r, value.g, value.b, value.a)
    }
}

impl From<Rgba8> for Vec4 {
    fn from(value: Rgba8) -> Self {
        Rgba::from(value).into()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn u32_is_little_endian_rgba() {
        let color = Rgba8::from_u32(0xFF00_80FF);
        assert_eq!(color, Rgba8::new(0xFF, 0x80, 0x00, 0xFF));
        assert_eq!(color.to_u32(), 0xFF00_80FF);
    }

    #[test]
    fn packed_formats() {
        assert_eq!(Rgba8::from_rgb565(0x001F), Rgba8::new(255, 0, 0, 255));
        assert_eq!(Rgba8::from_rgb565(0x07E0), Rgba8::new(0, 255, 0, 255));
        assert_eq!(Rgba8::from_rgb565(0xF800), Rgba8::new(0, 0, 255, 255));

        assert_eq!(Rgba8::from_rgba5551(0x7C00), Rgba8::new(0, 0, 255, 0));
        assert_eq!(Rgba8::from_rgba5551(0x8000), Rgba8::new(0, 0, 0, 255));

        assert_eq!(Rgba8::from_rgba4444(0xF00F), Rgba8::new(255, 0, 0, 255));
        assert_eq!(Rgba8::from_rgba4444(0x0880), Rgba8::new(0, 136, 136, 0));
    }

    #[test]
    fn float_roundtrip_rounds_to_nearest() {
        let color = Rgba8::new(0, 1, 128, 255);
        assert_eq!(Rgba::from(color).to_rgba8(), color);

        let halfway = Rgba::new(0.5, 1.5, -0.25, 0.999);
        assert_eq!(halfway.to_rgba8(), Rgba8::new(128, 255, 0, 255));
    }
}
