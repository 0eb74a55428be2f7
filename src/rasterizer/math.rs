//! Edge functions and the clip -> NDC -> viewport transform

use glam::{Vec2, Vec4};

/// Signed parallelogram area spanned by `p` and `d` (2x2 determinant).
///
/// Positive when `d` lies clockwise of `p` in a y-down frame.
#[inline]
pub fn edge(p: Vec2, d: Vec2) -> f32 {
    p.x * d.y - p.y * d.x
}

/// Perspective divide.
///
/// x, y and z are divided by w; the result's w holds `1 / w`, which the
/// rasterizer needs later for perspective-correct interpolation.
#[inline]
pub fn clip_to_ndc(clip: Vec4) -> Vec4 {
    let w_inv = 1.0 / clip.w;
    let mut ndc = clip * w_inv;
    ndc.w = w_inv;
    ndc
}

/// Viewport rectangle plus depth range, with the derived affine transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    origin: Vec2,
    size: Vec2,
    near: f32,
    far: f32,
    center: Vec4,
    scale: Vec4,
}

impl Viewport {
    pub fn new(x: i32, y: i32, width: i32, height: i32, near: f32, far: f32) -> Self {
        let mut vp = Self {
            origin: Vec2::new(x as f32, y as f32),
            size: Vec2::new(width as f32, height as f32),
            near,
            far,
            center: Vec4::ZERO,
            scale: Vec4::ONE,
        };
        vp.update();
        vp
    }

    /// Rectangle covering a whole `width x height` target, depth range 0..1
    pub fn full(width: usize, height: usize) -> Self {
        Self::new(0, 0, width as i32, height as i32, 0.0, 1.0)
    }

    pub fn set_rect(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.origin = Vec2::new(x as f32, y as f32);
        self.size = Vec2::new(width as f32, height as f32);
        self.update();
    }

    pub fn set_depth_range(&mut self, near: f32, far: f32) {
        self.near = near;
        self.far = far;
        self.update();
    }

    fn update(&mut self) {
        let half = self.size / 2.0;
        self.center = Vec4::new(
            self.origin.x + half.x,
            self.origin.y + half.y,
            (self.near + self.far) / 2.0,
            0.0,
        );
        // w passes through untouched
        self.scale = Vec4::new(half.x, half.y, (self.far - self.near) / 2.0, 1.0);
    }

    /// NDC -> pixel space. Expects the output of [`clip_to_ndc`].
    #[inline]
    pub fn ndc_to_viewport(&self, ndc: Vec4) -> Vec4 {
        ndc * self.scale + self.center
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn depth_range(&self) -> (f32, f32) {
        (self.near, self.far)
    }

    pub fn center(&self) -> Vec4 {
        self.center
    }

    pub fn scale(&self) -> Vec4 {
        self.scale
    }
}
