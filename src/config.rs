//! Render and scene descriptions loaded from RON

use std::path::Path;

use glam::Vec4;
use serde::{Deserialize, Serialize};

use crate::error::{RasterError, Result};
use crate::rasterizer::RenderContext;

/// Viewport rectangle in framebuffer pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Render target setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: usize,
    pub height: usize,
    /// Defaults to the whole framebuffer
    pub viewport: Option<ViewportRect>,
    pub depth_range: (f32, f32),
    /// Normalized RGBA
    pub clear_color: [f32; 4],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            viewport: None,
            depth_range: (0.0, 1.0),
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RasterError::Dimensions {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

impl RenderContext {
    /// Build a cleared context from a validated config
    pub fn from_config(config: &RenderConfig) -> Result<Self> {
        config.validate()?;
        let mut ctx = RenderContext::new(config.width, config.height);
        let (near, far) = config.depth_range;
        ctx.depth_range(near, far);
        if let Some(vp) = config.viewport {
            ctx.viewport(vp.x, vp.y, vp.width, vp.height);
        }
        ctx.clear(Vec4::from_array(config.clear_color));
        Ok(ctx)
    }
}

/// One triangle with a color per vertex
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangleDesc {
    /// Clip-space positions
    pub positions: [[f32; 4]; 3],
    pub colors: [[f32; 4]; 3],
}

impl TriangleDesc {
    pub fn positions(&self) -> [Vec4; 3] {
        self.positions.map(Vec4::from_array)
    }

    /// Per-vertex attribute slots: one slot, the color
    pub fn attributes(&self) -> [[Vec4; 1]; 3] {
        self.colors.map(|c| [Vec4::from_array(c)])
    }
}

/// A render setup plus the triangles to draw, in submission order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub render: RenderConfig,
    pub triangles: Vec<TriangleDesc>,
    /// Output path without extension; `.tga` and `.png` are appended
    pub output: String,
}

impl Default for SceneConfig {
    /// Default render setup with nothing to draw
    fn default() -> Self {
        Self {
            render: RenderConfig::default(),
            triangles: Vec::new(),
            output: "render".to_string(),
        }
    }
}

impl SceneConfig {
    /// Two overlapping RGB triangles, the nearer one drawn first
    pub fn demo() -> Self {
        const R: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
        const G: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
        const B: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
        Self {
            render: RenderConfig::default(),
            triangles: vec![
                TriangleDesc {
                    positions: [[-1.0, -1.0, -0.5, 1.0], [0.0, 1.0, -0.5, 1.0], [1.0, -1.0, -0.5, 1.0]],
                    colors: [R, G, B],
                },
                TriangleDesc {
                    positions: [[-0.5, 0.5, 0.0, 1.0], [0.5, 0.5, 0.0, 1.0], [-0.25, -0.25, 0.0, 1.0]],
                    colors: [B, G, R],
                },
            ],
            ..Self::default()
        }
    }

    pub fn from_ron_str(src: &str) -> Result<Self> {
        let scene: SceneConfig = ron::from_str(src)?;
        scene.render.validate()?;
        Ok(scene)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path)?;
        let scene = Self::from_ron_str(&src)?;
        log::debug!("loaded {} triangles from {}", scene.triangles.len(), path.display());
        Ok(scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scene() {
        let src = r#"(
            render: (
                width: 64,
                height: 32,
                viewport: Some((x: 0, y: 0, width: 32, height: 32)),
                clear_color: (0.0, 0.0, 0.5, 1.0),
            ),
            triangles: [
                (
                    positions: ((-1.0, -1.0, 0.0, 1.0), (1.0, -1.0, 0.0, 1.0), (0.0, 1.0, 0.0, 1.0)),
                    colors: ((1.0, 1.0, 1.0, 1.0), (1.0, 1.0, 1.0, 1.0), (1.0, 1.0, 1.0, 1.0)),
                ),
            ],
            output: "out/test",
        )"#;
        let scene = SceneConfig::from_ron_str(src).unwrap();
        assert_eq!(scene.render.width, 64);
        assert_eq!(scene.render.depth_range, (0.0, 1.0));
        assert_eq!(scene.render.viewport.map(|v| v.width), Some(32));
        assert_eq!(scene.triangles.len(), 1);
        assert_eq!(scene.triangles[0].attributes()[2][0], Vec4::ONE);
        assert_eq!(scene.output, "out/test");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let scene = SceneConfig::from_ron_str("(render: (width: 8, height: 8))").unwrap();
        assert!(scene.triangles.is_empty());
        assert_eq!(scene.render.clear_color, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(scene.output, "render");
    }

    #[test]
    fn test_scene_without_triangles_draws_nothing() {
        let scene = SceneConfig::from_ron_str("(output: \"empty\")").unwrap();
        assert!(scene.triangles.is_empty());
        assert_eq!(scene.render, RenderConfig::default());
        assert!(SceneConfig::default().triangles.is_empty());
        assert_eq!(SceneConfig::demo().triangles.len(), 2);
    }

    #[test]
    fn test_zero_sized_target_is_rejected() {
        let err = SceneConfig::from_ron_str("(render: (width: 0, height: 8))").unwrap_err();
        assert!(matches!(err, RasterError::Dimensions { width: 0, height: 8 }));
    }

    #[test]
    fn test_malformed_scene_is_a_config_error() {
        let err = SceneConfig::from_ron_str("(render: (width: \"wide\"))").unwrap_err();
        assert!(matches!(err, RasterError::Config(_)));
    }

    #[test]
    fn test_context_from_config_applies_clear_color() {
        let config = RenderConfig {
            width: 4,
            height: 4,
            clear_color: [0.0, 0.0, 1.0, 1.0],
            ..RenderConfig::default()
        };
        let ctx = RenderContext::from_config(&config).unwrap();
        assert!(ctx
            .framebuffer()
            .color_attachment()
            .iter()
            .all(|&c| c == crate::rasterizer::Color::BLUE));
    }
}
