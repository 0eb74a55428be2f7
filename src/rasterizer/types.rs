//! Core cell types for the rasterizer

use glam::Vec4;

/// RGBA color (0-255 per channel), stored in memory in R, G, B, A order
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0, a: 255 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255, a: 255 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Pack a normalized [0, 1] float color, saturating out-of-range channels
    pub fn from_vec4(color: Vec4) -> Self {
        use super::simd::{Kernels, Scalar};
        Scalar.pack_color(color)
    }

    /// Little-endian view of the packed pixel: byte 0 is red
    pub const fn from_bits(bits: u32) -> Self {
        let [r, g, b, a] = bits.to_le_bytes();
        Self { r, g, b, a }
    }

    pub fn to_vec4(self) -> Vec4 {
        Vec4::new(self.r as f32, self.g as f32, self.b as f32, self.a as f32) / 255.0
    }

    /// In-memory byte order
    pub const fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Byte order used by true-color TGA files
    pub const fn to_bgra_bytes(self) -> [u8; 4] {
        [self.b, self.g, self.r, self.a]
    }
}

/// Packed depth/stencil cell.
///
/// The low 24 bits hold an unsigned fixed-point depth in `[0, DEPTH_MAX]`
/// mapping floating depth `[0, 1]`; the high 8 bits hold a stencil value the
/// rasterizer never reads. Smaller depth is nearer.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DepthStencil(u32);

impl DepthStencil {
    pub const DEPTH_BITS: u32 = 24;
    pub const DEPTH_MASK: u32 = (1 << Self::DEPTH_BITS) - 1;
    pub const DEPTH_MAX: u32 = Self::DEPTH_MASK;
    const STENCIL_SHIFT: u32 = Self::DEPTH_BITS;

    /// Clear value: the far plane with a zero stencil
    pub const FAR: DepthStencil = DepthStencil(Self::DEPTH_MAX);

    pub const fn new(depth: u32, stencil: u8) -> Self {
        Self((depth & Self::DEPTH_MASK) | ((stencil as u32) << Self::STENCIL_SHIFT))
    }

    /// Fixed-point depth for `z` in `[0, 1]`: `floor(z * DEPTH_MAX)`.
    ///
    /// Out-of-range input saturates to the nearest bound; the rasterizer
    /// discards such fragments before they get here.
    #[inline]
    pub fn encode(z: f32) -> u32 {
        // float -> int `as` casts saturate, so only the upper bound needs care
        ((z * Self::DEPTH_MAX as f32) as u32).min(Self::DEPTH_MAX)
    }

    /// Inverse of [`encode`](Self::encode), up to quantization
    pub fn decode(depth: u32) -> f32 {
        (depth & Self::DEPTH_MASK) as f32 / Self::DEPTH_MAX as f32
    }

    #[inline]
    pub const fn depth(self) -> u32 {
        self.0 & Self::DEPTH_MASK
    }

    #[inline]
    pub const fn stencil(self) -> u8 {
        (self.0 >> Self::STENCIL_SHIFT) as u8
    }

    #[inline]
    pub const fn with_depth(self, depth: u32) -> Self {
        Self((self.0 & !Self::DEPTH_MASK) | (depth & Self::DEPTH_MASK))
    }

    pub const fn with_stencil(self, stencil: u8) -> Self {
        Self::new(self.depth(), stencil)
    }

    /// Depth test: strictly nearer wins, stencil bits are ignored
    #[inline]
    pub const fn passes(depth: u32, stored: DepthStencil) -> bool {
        depth < stored.depth()
    }

    pub const fn bits(self) -> u32 {
        self.0
    }
}
