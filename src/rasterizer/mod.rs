//! CPU triangle rasterizer
//!
//! Features:
//! - Edge-function scan conversion with incremental barycentrics
//! - 24-bit fixed-point depth buffer with an 8-bit stencil field
//! - Perspective-correct attribute interpolation
//! - SSE4.1 kernels for the inside test, interpolation and color packing,
//!   with scalar fallbacks

mod export;
mod framebuffer;
mod math;
mod render;
mod simd;
mod types;

pub use export::*;
pub use framebuffer::*;
pub use math::*;
pub use render::*;
pub use simd::*;
pub use types::*;
