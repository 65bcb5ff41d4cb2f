use std::path::Path;

use crate::{
    foundation::core::PixelBuffer,
    foundation::error::{DisplayError, DisplayResult},
};

/// How a [`PixelBuffer`] is blown up into an RGBA image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PreviewOpts {
    /// Output pixels per LED along each axis. Must be non-zero.
    pub scale: u32,
    /// Colour of a lit LED.
    pub lit_rgba: [u8; 4],
    /// Colour of a dark LED.
    pub dark_rgba: [u8; 4],
    /// Colour between LEDs; only drawn when `scale >= 3`.
    pub gap_rgba: [u8; 4],
}

impl Default for PreviewOpts {
    fn default() -> Self {
        Self {
            scale: 8,
            lit_rgba: [255, 48, 32, 255],
            dark_rgba: [40, 12, 10, 255],
            gap_rgba: [0, 0, 0, 255],
        }
    }
}

/// RGBA8 rendering of a panel frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreviewImage {
    /// Width in image pixels.
    pub width: u32,
    /// Height in image pixels.
    pub height: u32,
    /// Row-major RGBA8 data.
    pub data: Vec<u8>,
}

/// Paint `buffer` into an RGBA8 image.
pub fn render_preview(buffer: &PixelBuffer, opts: PreviewOpts) -> DisplayResult<PreviewImage> {
    if opts.scale == 0 {
        return Err(DisplayError::validation("preview scale must be non-zero"));
    }
    let s = opts.scale;
    let width = buffer.width() * s;
    let height = buffer.height() * s;
    let mut data = Vec::with_capacity(width as usize * height as usize * 4);

    for py in 0..height {
        for px in 0..width {
            let gap = s >= 3 && (px % s == s - 1 || py % s == s - 1);
            let rgba = if gap {
                opts.gap_rgba
            } else if buffer.get(px / s, py / s) {
                opts.lit_rgba
            } else {
                opts.dark_rgba
            };
            data.extend_from_slice(&rgba);
        }
    }

    Ok(PreviewImage {
        width,
        height,
        data,
    })
}

/// Write `buffer` to `path` as a PNG.
pub fn save_png(buffer: &PixelBuffer, path: &Path, opts: PreviewOpts) -> DisplayResult<()> {
    let img = render_preview(buffer, opts)?;
    image::save_buffer_with_format(
        path,
        &img.data,
        img.width,
        img.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .map_err(|e| anyhow::anyhow!("write png '{}': {e}", path.display()))?;
    Ok(())
}
