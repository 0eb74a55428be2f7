//! Color + depth/stencil render target

use super::types::{Color, DepthStencil};

/// Framebuffer for software rendering.
///
/// Both attachments are indexed `y * width + x` and always hold
/// `width * height` cells. Coordinates are the caller's responsibility:
/// out-of-range access panics through slice indexing.
pub struct Framebuffer {
    width: usize,
    height: usize,
    color: Vec<Color>,
    depth: Vec<DepthStencil>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let mut fb = Self {
            width: 0,
            height: 0,
            color: Vec::new(),
            depth: Vec::new(),
        };
        fb.resize(width, height);
        fb
    }

    /// Reallocate both attachments. Contents afterwards are unspecified;
    /// clear before drawing.
    pub fn resize(&mut self, width: usize, height: usize) {
        let n = width
            .checked_mul(height)
            .unwrap_or_else(|| panic!("framebuffer size {width}x{height} overflows usize"));
        log::debug!("framebuffer resize {}x{} -> {}x{}", self.width, self.height, width, height);
        self.width = width;
        self.height = height;
        self.color = vec![Color::default(); n];
        self.depth = vec![DepthStencil::default(); n];
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn num_pixels(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height, "({x}, {y}) outside framebuffer");
        y * self.width + x
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Color {
        self.color[self.index(x, y)]
    }

    #[inline]
    pub fn pixel_mut(&mut self, x: usize, y: usize) -> &mut Color {
        let idx = self.index(x, y);
        &mut self.color[idx]
    }

    #[inline]
    pub fn depth(&self, x: usize, y: usize) -> DepthStencil {
        self.depth[self.index(x, y)]
    }

    #[inline]
    pub fn depth_mut(&mut self, x: usize, y: usize) -> &mut DepthStencil {
        let idx = self.index(x, y);
        &mut self.depth[idx]
    }

    /// Overwrite every cell of both attachments
    pub fn fill(&mut self, color: Color, depth: DepthStencil) {
        self.color.fill(color);
        self.depth.fill(depth);
    }

    pub fn fill_depth(&mut self, depth: DepthStencil) {
        self.depth.fill(depth);
    }

    pub fn color_attachment(&self) -> &[Color] {
        &self.color
    }

    pub fn depth_attachment(&self) -> &[DepthStencil] {
        &self.depth
    }

    /// Color attachment as tightly packed RGBA bytes
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.color.iter().flat_map(|c| c.to_bytes()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_lengths_follow_resize() {
        let mut fb = Framebuffer::new(4, 3);
        assert_eq!(fb.num_pixels(), 12);
        assert_eq!(fb.color_attachment().len(), 12);
        assert_eq!(fb.depth_attachment().len(), 12);

        fb.resize(7, 5);
        assert_eq!((fb.width(), fb.height()), (7, 5));
        assert_eq!(fb.color_attachment().len(), 35);
        assert_eq!(fb.depth_attachment().len(), 35);
    }

    #[test]
    fn test_pixel_indexing_is_row_major() {
        let mut fb = Framebuffer::new(4, 3);
        fb.fill(Color::BLACK, DepthStencil::FAR);
        *fb.pixel_mut(2, 1) = Color::RED;
        *fb.depth_mut(3, 2) = DepthStencil::new(5, 0);

        assert_eq!(fb.color_attachment()[4 + 2], Color::RED);
        assert_eq!(fb.pixel(2, 1), Color::RED);
        assert_eq!(fb.pixel(1, 2), Color::BLACK);
        assert_eq!(fb.depth_attachment()[2 * 4 + 3].depth(), 5);
    }

    #[test]
    fn test_rgba_bytes() {
        let mut fb = Framebuffer::new(2, 1);
        fb.fill(Color::BLUE, DepthStencil::FAR);
        assert_eq!(fb.to_rgba_bytes(), vec![0, 0, 255, 255, 0, 0, 255, 255]);
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_access_panics() {
        let fb = Framebuffer::new(2, 2);
        let _ = fb.pixel(0, 2);
    }
}
