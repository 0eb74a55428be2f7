//! Numeric kernels used in the per-pixel loop
//!
//! Each kernel has a portable scalar version and an SSE4.1 version. The
//! rasterizer is generic over [`Kernels`], so the choice is made once per
//! draw call and the pixel loop itself never branches on it.

use glam::Vec4;

use super::types::Color;

/// Per-pixel math the rasterizer's hot loop depends on
pub trait Kernels: Copy {
    /// True when the three barycentric lanes (x, y, z) are all >= 0.
    /// The w lane is padding and ignored. `-0.0` counts as non-negative.
    fn all_nonnegative(&self, bary: Vec4) -> bool;

    /// Dot `bary` against each of the four channel vectors and gather the
    /// results into one vector: `(bary.xs, bary.ys, bary.zs, bary.ws)`.
    fn interpolate(&self, bary: Vec4, channels: &[Vec4; 4]) -> Vec4;

    /// Scale a normalized color by 255 and narrow it to 8 bits per channel,
    /// rounding to nearest and saturating to `[0, 255]`.
    fn pack_color(&self, color: Vec4) -> Color;
}

/// Portable fallback
#[derive(Debug, Clone, Copy, Default)]
pub struct Scalar;

impl Kernels for Scalar {
    #[inline]
    fn all_nonnegative(&self, bary: Vec4) -> bool {
        !(bary.x < 0.0 || bary.y < 0.0 || bary.z < 0.0)
    }

    #[inline]
    fn interpolate(&self, bary: Vec4, channels: &[Vec4; 4]) -> Vec4 {
        Vec4::new(
            bary.dot(channels[0]),
            bary.dot(channels[1]),
            bary.dot(channels[2]),
            bary.dot(channels[3]),
        )
    }

    #[inline]
    fn pack_color(&self, color: Vec4) -> Color {
        let c = color * 255.0;
        Color::with_alpha(narrow(c.x), narrow(c.y), narrow(c.z), narrow(c.w))
    }
}

/// Saturating f32 -> u8 with round-half-to-even, matching `cvtps2dq`
#[inline]
fn narrow(v: f32) -> u8 {
    // f32::max returns the non-NaN operand, so NaN lands on 0
    v.max(0.0).min(255.0).round_ties_even() as u8
}

#[cfg(target_arch = "x86_64")]
pub use sse41::Sse41;

#[cfg(target_arch = "x86_64")]
mod sse41 {
    use std::arch::x86_64::*;

    use glam::Vec4;

    use super::Kernels;
    use crate::rasterizer::types::Color;

    /// SSE4.1 kernels.
    ///
    /// Only obtainable through [`Sse41::detect`], so holding a value proves
    /// the running CPU supports the instructions used below.
    #[derive(Debug, Clone, Copy)]
    pub struct Sse41 {
        _detected: (),
    }

    impl Sse41 {
        pub fn detect() -> Option<Self> {
            if is_x86_feature_detected!("sse4.1") {
                Some(Self { _detected: () })
            } else {
                None
            }
        }
    }

    #[inline]
    fn load(v: Vec4) -> __m128 {
        let lanes = v.to_array();
        unsafe { _mm_loadu_ps(lanes.as_ptr()) }
    }

    #[inline]
    fn store(v: __m128) -> Vec4 {
        let mut lanes = [0.0f32; 4];
        unsafe { _mm_storeu_ps(lanes.as_mut_ptr(), v) };
        Vec4::from_array(lanes)
    }

    impl Kernels for Sse41 {
        #[inline]
        fn all_nonnegative(&self, bary: Vec4) -> bool {
            // compare first so -0.0 (sign bit set) still reads as inside
            let mask = unsafe { _mm_movemask_ps(_mm_cmplt_ps(load(bary), _mm_setzero_ps())) };
            mask & 0b0111 == 0
        }

        #[inline]
        fn interpolate(&self, bary: Vec4, channels: &[Vec4; 4]) -> Vec4 {
            let r = unsafe {
                interpolate(
                    load(bary),
                    load(channels[0]),
                    load(channels[1]),
                    load(channels[2]),
                    load(channels[3]),
                )
            };
            store(r)
        }

        #[inline]
        fn pack_color(&self, color: Vec4) -> Color {
            Color::from_bits(unsafe { pack(load(color)) })
        }
    }

    #[inline]
    #[target_feature(enable = "sse4.1")]
    unsafe fn interpolate(bary: __m128, x: __m128, y: __m128, z: __m128, w: __m128) -> __m128 {
        // 0xF1: multiply all four lanes, write the sum into lane 0 only
        let bx = _mm_dp_ps(bary, x, 0xF1);
        let by = _mm_dp_ps(bary, y, 0xF1);
        // by.0 -> lane 1, zero lanes 2 and 3
        let bxy = _mm_insert_ps(bx, by, 0b00_01_1100);
        let bz = _mm_dp_ps(bary, z, 0xF1);
        let bw = _mm_dp_ps(bary, w, 0xF1);
        let bzw = _mm_insert_ps(bz, bw, 0b00_01_1100);
        _mm_movelh_ps(bxy, bzw)
    }

    #[inline]
    #[target_feature(enable = "sse4.1")]
    unsafe fn pack(color: __m128) -> u32 {
        let scaled = _mm_mul_ps(color, _mm_set1_ps(255.0));
        // maxps returns its second operand on NaN, so NaN becomes 0
        let clamped = _mm_min_ps(_mm_max_ps(scaled, _mm_setzero_ps()), _mm_set1_ps(255.0));
        let i32s = _mm_cvtps_epi32(clamped);
        let i16s = _mm_packus_epi32(i32s, i32s);
        let i8s = _mm_packus_epi16(i16s, i16s);
        _mm_cvtsi128_si32(i8s) as u32
    }
}

/// The kernel implementation a render context dispatches to
#[derive(Debug, Clone, Copy)]
pub enum KernelSet {
    Scalar(Scalar),
    #[cfg(target_arch = "x86_64")]
    Sse41(Sse41),
}

impl KernelSet {
    /// Fastest kernels the running CPU supports
    pub fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            if let Some(k) = Sse41::detect() {
                return KernelSet::Sse41(k);
            }
        }
        KernelSet::Scalar(Scalar)
    }

    pub fn name(&self) -> &'static str {
        match self {
            KernelSet::Scalar(_) => "scalar",
            #[cfg(target_arch = "x86_64")]
            KernelSet::Sse41(_) => "sse4.1",
        }
    }
}

impl Default for KernelSet {
    fn default() -> Self {
        Self::detect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: [f32; 9] = [0.0, -0.0, 1.0, -1.0, 0.25, -1.0e-7, 1.0e-7, 3.5, -250.0];

    fn all_bary_samples() -> Vec<Vec4> {
        let mut out = Vec::new();
        for &x in &SAMPLES {
            for &y in &SAMPLES {
                for &z in &SAMPLES {
                    out.push(Vec4::new(x, y, z, -1.0));
                }
            }
        }
        out
    }

    #[test]
    fn test_scalar_inside_ignores_padding_lane() {
        assert!(Scalar.all_nonnegative(Vec4::new(0.2, 0.3, 0.5, -9.0)));
        assert!(Scalar.all_nonnegative(Vec4::new(0.0, 0.0, 1.0, 0.0)));
        assert!(!Scalar.all_nonnegative(Vec4::new(-0.1, 0.6, 0.5, 0.0)));
    }

    #[test]
    fn test_scalar_inside_treats_negative_zero_as_inside() {
        assert!(Scalar.all_nonnegative(Vec4::new(-0.0, -0.0, -0.0, -0.0)));
    }

    #[test]
    fn test_scalar_interpolate() {
        let bary = Vec4::new(0.5, 0.25, 0.25, 0.0);
        let channels = [
            Vec4::new(1.0, 0.0, 0.0, 0.0),
            Vec4::new(0.0, 1.0, 0.0, 0.0),
            Vec4::new(2.0, 2.0, 2.0, 0.0),
            Vec4::new(4.0, 8.0, 0.0, 0.0),
        ];
        let r = Scalar.interpolate(bary, &channels);
        assert!((r - Vec4::new(0.5, 0.25, 2.0, 4.0)).abs().max_element() < 1.0e-6);
    }

    #[test]
    fn test_scalar_pack_saturates() {
        assert_eq!(Scalar.pack_color(Vec4::new(300.0, -50.0, 1.0, 0.0)), Color::with_alpha(255, 0, 255, 0));
        assert_eq!(Scalar.pack_color(Vec4::new(f32::NAN, 0.5, 2.0, 1.0)), Color::with_alpha(0, 128, 255, 255));
    }

    #[test]
    fn test_scalar_pack_rounds_to_nearest() {
        // 0.999999 * 255 rounds up rather than truncating to 254
        assert_eq!(Scalar.pack_color(Vec4::splat(0.999_999)), Color::WHITE);
        assert_eq!(Scalar.pack_color(Vec4::splat(0.001)), Color::with_alpha(0, 0, 0, 0));
    }

    #[test]
    fn test_detect_names_a_kernel() {
        let k = KernelSet::detect();
        assert!(k.name() == "scalar" || k.name() == "sse4.1");
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn test_sse_inside_matches_scalar() {
        let Some(sse) = Sse41::detect() else { return };
        for bary in all_bary_samples() {
            assert_eq!(sse.all_nonnegative(bary), Scalar.all_nonnegative(bary), "{bary:?}");
        }
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn test_sse_interpolate_matches_scalar() {
        let Some(sse) = Sse41::detect() else { return };
        let channels = [
            Vec4::new(0.1, 0.9, 0.4, 0.0),
            Vec4::new(-3.0, 2.5, 7.0, 0.0),
            Vec4::new(1.0, 1.0, 1.0, 0.0),
            Vec4::new(0.0, 100.0, -100.0, 0.0),
        ];
        for bary in all_bary_samples() {
            let bary = bary.truncate().extend(0.0);
            let a = sse.interpolate(bary, &channels);
            let b = Scalar.interpolate(bary, &channels);
            let tolerance = 1.0e-4 * (1.0 + b.abs().max_element());
            assert!((a - b).abs().max_element() <= tolerance, "{a:?} vs {b:?}");
        }
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn test_sse_pack_matches_scalar() {
        let Some(sse) = Sse41::detect() else { return };
        let mut v = -0.5f32;
        while v < 1.5 {
            let color = Vec4::new(v, 1.0 - v, v * 0.5, 1.0);
            assert_eq!(sse.pack_color(color), Scalar.pack_color(color), "{color:?}");
            v += 0.0009765625;
        }
        let extremes = Vec4::new(300.0, -50.0, 1.0e30, f32::NAN);
        assert_eq!(sse.pack_color(extremes), Scalar.pack_color(extremes));
        assert_eq!(sse.pack_color(extremes), Color::with_alpha(255, 0, 255, 0));
    }
}
