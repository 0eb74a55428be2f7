//! Framebuffer dumps: uncompressed true-color TGA and PNG

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::framebuffer::Framebuffer;
use crate::error::{RasterError, Result};

pub const TGA_HEADER_LEN: usize = 18;

/// Uncompressed true-color
const TGA_IMAGE_TYPE: u8 = 2;
/// Descriptor bits 0bUUDDAAAA: 8 alpha bits, default direction
const TGA_DESCRIPTOR: u8 = 0x08;

fn dimensions_u16(fb: &Framebuffer) -> Result<(u16, u16)> {
    let err = || RasterError::Dimensions {
        width: fb.width(),
        height: fb.height(),
    };
    let w = u16::try_from(fb.width()).map_err(|_| err())?;
    let h = u16::try_from(fb.height()).map_err(|_| err())?;
    Ok((w, h))
}

/// 18-byte header: no image ID, no color map, 32 bpp
pub fn tga_header(width: u16, height: u16) -> [u8; TGA_HEADER_LEN] {
    let mut h = [0u8; TGA_HEADER_LEN];
    // [0] id length, [1] color map type, [3..8] color map spec: all zero
    h[2] = TGA_IMAGE_TYPE;
    // [8..12] x/y origin stay zero
    h[12..14].copy_from_slice(&width.to_le_bytes());
    h[14..16].copy_from_slice(&height.to_le_bytes());
    h[16] = 32;
    h[17] = TGA_DESCRIPTOR;
    h
}

/// Write the color attachment as TGA: header, then BGRA pixels in
/// framebuffer row order.
pub fn write_tga<W: Write>(fb: &Framebuffer, mut out: W) -> Result<()> {
    let (w, h) = dimensions_u16(fb)?;
    out.write_all(&tga_header(w, h))?;
    let body: Vec<u8> = fb
        .color_attachment()
        .iter()
        .flat_map(|c| c.to_bgra_bytes())
        .collect();
    out.write_all(&body)?;
    out.flush()?;
    Ok(())
}

pub fn save_tga<P: AsRef<Path>>(fb: &Framebuffer, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_tga(fb, BufWriter::new(file))?;
    log::info!("wrote {} ({}x{})", path.display(), fb.width(), fb.height());
    Ok(())
}

pub fn to_rgba_image(fb: &Framebuffer) -> Result<image::RgbaImage> {
    let err = || RasterError::Dimensions {
        width: fb.width(),
        height: fb.height(),
    };
    let w = u32::try_from(fb.width()).map_err(|_| err())?;
    let h = u32::try_from(fb.height()).map_err(|_| err())?;
    image::RgbaImage::from_raw(w, h, fb.to_rgba_bytes()).ok_or_else(err)
}

pub fn save_png<P: AsRef<Path>>(fb: &Framebuffer, path: P) -> Result<()> {
    let path = path.as_ref();
    to_rgba_image(fb)?.save_with_format(path, image::ImageFormat::Png)?;
    log::info!("wrote {} ({}x{})", path.display(), fb.width(), fb.height());
    Ok(())
}
