//! Demo driver: render a scene description to TGA and PNG
//!
//! Usage: `hamlet-raster [-v|--verbose] [scene.ron]`. Without a scene the
//! built-in two-triangle demo is drawn.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use glam::Vec4;
use hamlet_raster::logging::init_logging;
use hamlet_raster::{save_png, save_tga, DrawStats, RenderContext, SceneConfig, VERSION};

fn main() -> anyhow::Result<()> {
    let mut verbose = false;
    let mut scene_path = None;
    for arg in std::env::args_os().skip(1) {
        if arg == "-v" || arg == "--verbose" {
            verbose = true;
        } else if scene_path.is_none() {
            scene_path = Some(PathBuf::from(arg));
        }
    }

    init_logging(verbose);
    log::info!("hamlet-raster v{}", VERSION);

    let scene = match scene_path {
        Some(path) => SceneConfig::load(&path)
            .with_context(|| format!("failed to load scene {}", path.display()))?,
        None => SceneConfig::demo(),
    };

    let mut ctx = RenderContext::from_config(&scene.render).context("invalid render config")?;

    let start = Instant::now();
    let mut stats = DrawStats::default();
    for tri in &scene.triangles {
        stats += ctx.draw_triangle(
            tri.positions(),
            tri.attributes(),
            |_: &mut Vec4, _: &mut [Vec4; 1]| {},
            |_: Vec4, attrs: &[Vec4; 1]| attrs[0],
        );
    }
    log::info!(
        "rendering {} triangles took {:?} ({} fragments shaded)",
        scene.triangles.len(),
        start.elapsed(),
        stats.depth_passed
    );

    let tga = format!("{}.tga", scene.output);
    let png = format!("{}.png", scene.output);
    save_tga(ctx.framebuffer(), &tga).with_context(|| format!("failed to write {tga}"))?;
    save_png(ctx.framebuffer(), &png).with_context(|| format!("failed to write {png}"))?;
    Ok(())
}
