use std::{io::Cursor, path::Path};

use anyhow::Context as _;
use image::{DynamicImage, ImageDecoder as _, ImageReader, imageops::FilterType, metadata::Orientation};

use crate::foundation::{
    error::{ShowError, ShowResult},
    math::mul_div255_u8,
};

/// Photos are downscaled so their long side is at most this many pixels.
pub const MAX_IMAGE_SIDE: u32 = 4096;

/// A decoded photo, upright, in row-major premultiplied RGBA8.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl PreparedImage {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Premultiplied pixel at `(x, y)`; callers keep coordinates in range.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = &self.pixels[i..i + 4];
        [px[0], px[1], px[2], px[3]]
    }
}

/// Decode encoded image bytes: EXIF orientation applied, oversized photos scaled down, alpha
/// premultiplied.
pub fn decode_image(bytes: &[u8]) -> ShowResult<PreparedImage> {
    let mut decoder = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .context("sniff image format")?
        .into_decoder()
        .context("open image decoder")?;
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let mut img = DynamicImage::from_decoder(decoder).context("decode image")?;
    img.apply_orientation(orientation);

    if img.width() == 0 || img.height() == 0 {
        return Err(ShowError::asset_load("decoded image has zero size"));
    }
    if img.width().max(img.height()) > MAX_IMAGE_SIDE {
        tracing::debug!(
            width = img.width(),
            height = img.height(),
            "downscaling oversized photo"
        );
        img = img.resize(MAX_IMAGE_SIDE, MAX_IMAGE_SIDE, FilterType::Triangle);
    }

    let rgba = img.into_rgba8();
    let (width, height) = rgba.dimensions();
    let mut pixels = rgba.into_raw();
    for px in pixels.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        for c in &mut px[..3] {
            *c = mul_div255_u8(u16::from(*c), a);
        }
    }
    Ok(PreparedImage {
        width,
        height,
        pixels,
    })
}

/// Read and decode one image file.
pub fn read_image(path: &Path) -> ShowResult<PreparedImage> {
    let bytes = std::fs::read(path)
        .map_err(|e| ShowError::asset_load(format!("read '{}': {e}", path.display())))?;
    decode_image(&bytes)
        .map_err(|e| ShowError::asset_load(format!("decode '{}': {e}", path.display())))
}
