//! Hamlet: a software triangle rasterizer
//!
//! Draws clip-space triangles into a color + depth framebuffer without a
//! GPU. A caller creates a [`RenderContext`], sets the viewport and depth
//! range, clears, and then issues [`RenderContext::draw_triangle`] calls
//! with a vertex and a fragment shader closure.

pub mod config;
pub mod error;
pub mod logging;
pub mod rasterizer;

pub use config::{RenderConfig, SceneConfig, TriangleDesc, ViewportRect};
pub use error::{RasterError, Result};
pub use rasterizer::*;

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
