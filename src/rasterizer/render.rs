//! Render context and triangle rasterization
//!
//! Triangles are scan-converted with edge functions: the bounding box is
//! walked pixel by pixel while the three normalized barycentric weights are
//! updated incrementally. Depth and 1/w interpolate linearly in screen
//! space; user attributes are interpolated perspective-correct.

use glam::{IVec2, Vec4, Vec4Swizzles};

use super::framebuffer::Framebuffer;
use super::math::{clip_to_ndc, edge, Viewport};
use super::simd::{KernelSet, Kernels};
use super::types::{Color, DepthStencil};

/// Counters returned by [`RenderContext::draw_triangle`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    /// Pixel centers probed inside the bounding box
    pub pixels_tested: u64,
    /// Probes that passed the inside test
    pub pixels_covered: u64,
    /// Fragments that passed the depth test and were shaded
    pub depth_passed: u64,
}

/// Totals saturate instead of wrapping when accumulated over many draws
impl std::ops::AddAssign for DrawStats {
    fn add_assign(&mut self, rhs: Self) {
        self.pixels_tested = self.pixels_tested.saturating_add(rhs.pixels_tested);
        self.pixels_covered = self.pixels_covered.saturating_add(rhs.pixels_covered);
        self.depth_passed = self.depth_passed.saturating_add(rhs.depth_passed);
    }
}

/// Owns the framebuffer and the viewport/depth-range state
pub struct RenderContext {
    fbo: Framebuffer,
    viewport: Viewport,
    kernels: KernelSet,
}

impl RenderContext {
    /// Framebuffer of `width x height`, full-size viewport, depth range
    /// 0..1, cleared to opaque black.
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_kernels(width, height, KernelSet::detect())
    }

    pub fn with_kernels(width: usize, height: usize, kernels: KernelSet) -> Self {
        log::info!("rasterizer using {} kernels", kernels.name());
        let mut ctx = Self {
            fbo: Framebuffer::new(width, height),
            viewport: Viewport::full(width, height),
            kernels,
        };
        ctx.clear(Vec4::new(0.0, 0.0, 0.0, 1.0));
        ctx
    }

    /// Reallocate the framebuffer, reset the viewport to cover it and clear
    pub fn resize(&mut self, width: usize, height: usize) {
        self.fbo.resize(width, height);
        let (near, far) = self.viewport.depth_range();
        self.viewport = Viewport::new(0, 0, width as i32, height as i32, near, far);
        self.clear(Vec4::new(0.0, 0.0, 0.0, 1.0));
    }

    pub fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        log::debug!("viewport ({x}, {y}) {width}x{height}");
        self.viewport.set_rect(x, y, width, height);
    }

    pub fn depth_range(&mut self, near: f32, far: f32) {
        log::debug!("depth range {near}..{far}");
        self.viewport.set_depth_range(near, far);
    }

    pub fn viewport_state(&self) -> &Viewport {
        &self.viewport
    }

    pub fn kernels(&self) -> KernelSet {
        self.kernels
    }

    /// Fill color with `color` (normalized RGBA) and depth with the far plane
    pub fn clear(&mut self, color: Vec4) {
        self.fbo.fill(Color::from_vec4(color), DepthStencil::FAR);
    }

    /// Reset depth only, keeping the color attachment
    pub fn clear_depth(&mut self) {
        self.fbo.fill_depth(DepthStencil::FAR);
    }

    pub fn clip_to_ndc(&self, clip: Vec4) -> Vec4 {
        clip_to_ndc(clip)
    }

    pub fn ndc_to_viewport(&self, ndc: Vec4) -> Vec4 {
        self.viewport.ndc_to_viewport(ndc)
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.fbo
    }

    pub fn framebuffer_mut(&mut self) -> &mut Framebuffer {
        &mut self.fbo
    }

    /// Rasterize one triangle.
    ///
    /// `positions` are clip-space; `attrs[v]` holds the `N` attribute slots
    /// of vertex `v`. `vertex_shader` runs once per vertex and may rewrite
    /// the position and attributes in place. `fragment_shader` receives the
    /// fragment coordinate `(x, y, z, 1/w)` and the perspective-correct
    /// attributes, and returns a normalized RGBA color.
    pub fn draw_triangle<const N: usize, V, F>(
        &mut self,
        positions: [Vec4; 3],
        attrs: [[Vec4; N]; 3],
        mut vertex_shader: V,
        mut fragment_shader: F,
    ) -> DrawStats
    where
        V: FnMut(&mut Vec4, &mut [Vec4; N]),
        F: FnMut(Vec4, &[Vec4; N]) -> Vec4,
    {
        let mut positions = positions;
        let mut attrs = attrs;
        for (pos, slots) in positions.iter_mut().zip(attrs.iter_mut()) {
            vertex_shader(pos, slots);
            *pos = self.viewport.ndc_to_viewport(clip_to_ndc(*pos));
        }

        let stats = match self.kernels {
            KernelSet::Scalar(k) => self.rasterize(k, &positions, &attrs, &mut fragment_shader),
            // an Sse41 value only exists once the CPU reported sse4.1
            #[cfg(target_arch = "x86_64")]
            KernelSet::Sse41(k) => unsafe {
                self.rasterize_sse41(k, &positions, &attrs, &mut fragment_shader)
            },
        };
        log::trace!(
            "triangle: {} tested, {} covered, {} shaded",
            stats.pixels_tested,
            stats.pixels_covered,
            stats.depth_passed
        );
        stats
    }

    /// The pixel loop compiled with sse4.1 enabled, so the kernel intrinsics
    /// inline into it
    #[cfg(target_arch = "x86_64")]
    #[target_feature(enable = "sse4.1")]
    unsafe fn rasterize_sse41<const N: usize, F>(
        &mut self,
        k: super::simd::Sse41,
        positions: &[Vec4; 3],
        attrs: &[[Vec4; N]; 3],
        fragment_shader: &mut F,
    ) -> DrawStats
    where
        F: FnMut(Vec4, &[Vec4; N]) -> Vec4,
    {
        self.rasterize(k, positions, attrs, fragment_shader)
    }

    /// Scan-convert a triangle already in viewport space (w holds 1/w_clip)
    #[inline(always)]
    fn rasterize<K: Kernels, const N: usize, F>(
        &mut self,
        k: K,
        positions: &[Vec4; 3],
        attrs: &[[Vec4; N]; 3],
        fragment_shader: &mut F,
    ) -> DrawStats
    where
        F: FnMut(Vec4, &[Vec4; N]) -> Vec4,
    {
        let mut stats = DrawStats::default();
        let [a, b, c] = *positions;
        let (a2, b2, c2) = (a.xy(), b.xy(), c.xy());

        // Zero area gives inf/NaN weights; those fragments fail the depth clip below.
        let inverse_area = 1.0 / edge(c2 - a2, b2 - a2);

        let bcd = c2 - b2;
        let cad = a2 - c2;
        let abd = b2 - a2;

        // One vector per attribute channel holding the three vertices' values,
        // so each interpolated channel is a single dot product.
        let channels: [[Vec4; 4]; N] = std::array::from_fn(|i| {
            let (va, vb, vc) = (attrs[0][i], attrs[1][i], attrs[2][i]);
            [
                Vec4::new(va.x, vb.x, vc.x, 0.0),
                Vec4::new(va.y, vb.y, vc.y, 0.0),
                Vec4::new(va.z, vb.z, vc.z, 0.0),
                Vec4::new(va.w, vb.w, vc.w, 0.0),
            ]
        });
        let zs = Vec4::new(a.z, b.z, c.z, 0.0);
        let ws = Vec4::new(a.w, b.w, c.w, 0.0);

        let (w, h) = (self.fbo.width() as i32, self.fbo.height() as i32);
        let lo = a2.min(b2).min(c2).round().as_ivec2().max(IVec2::ZERO);
        let hi = a2.max(b2).max(c2).round().as_ivec2().min(IVec2::new(w - 1, h - 1));
        if lo.x > hi.x || lo.y > hi.y {
            return stats;
        }

        let p = glam::Vec2::new(lo.x as f32 + 0.5, lo.y as f32 + 0.5);
        let mut bary_row =
            Vec4::new(edge(p - b2, bcd), edge(p - c2, cad), edge(p - a2, abd), 0.0) * inverse_area;
        // d(weights)/dx is added per column; d(weights)/dy is -step_row
        let step_col = Vec4::new(bcd.y, cad.y, abd.y, 0.0) * inverse_area;
        let step_row = Vec4::new(bcd.x, cad.x, abd.x, 0.0) * inverse_area;

        for y in lo.y..=hi.y {
            let mut bary = bary_row;
            let mut was_inside = false;

            for x in lo.x..=hi.x {
                stats.pixels_tested += 1;
                if k.all_nonnegative(bary) {
                    was_inside = true;
                    stats.pixels_covered += 1;

                    // depth and 1/w are linear in screen space
                    let z = bary.dot(zs);
                    let w_interp = bary.dot(ws);

                    if (0.0..=1.0).contains(&z) {
                        let (ux, uy) = (x as usize, y as usize);
                        let incoming = DepthStencil::encode(z);
                        let stored = self.fbo.depth_mut(ux, uy);

                        if DepthStencil::passes(incoming, *stored) {
                            *stored = stored.with_depth(incoming);
                            stats.depth_passed += 1;

                            // ws holds 1/w per vertex, w_interp their interpolated sum
                            let perspective = bary * ws / w_interp;
                            let frag_attrs: [Vec4; N] =
                                std::array::from_fn(|i| k.interpolate(perspective, &channels[i]));
                            let frag_coord = Vec4::new(x as f32, y as f32, z, w_interp);

                            let color = fragment_shader(frag_coord, &frag_attrs);
                            *self.fbo.pixel_mut(ux, uy) = k.pack_color(color);
                        }
                    }
                } else if was_inside {
                    // convex: each row's coverage is one contiguous span
                    break;
                }

                bary += step_col;
            }

            bary_row -= step_row;
        }

        stats
    }
}
