use rayon::prelude::*;

use crate::{
    assets::PreparedImage,
    foundation::{
        core::Viewport,
        error::{ShowError, ShowResult},
    },
    render::{
        composite::{PremulRgba8, fill, over},
        draw::{DrawList, SlotDraw},
    },
};

#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    pub fn pixel(&self, x: u32, y: u32) -> PremulRgba8 {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }
}

#[derive(Clone, Copy, Debug)]
pub struct RenderSettings {
    /// Background behind (and instead of) the slots; opaque black unless set.
    pub clear_rgba: PremulRgba8,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            clear_rgba: [0, 0, 0, 255],
        }
    }
}

/// Software compositor for [`DrawList`]s, parallel over output rows.
#[derive(Clone, Debug, Default)]
pub struct CpuCompositor {
    settings: RenderSettings,
}

impl CpuCompositor {
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings }
    }

    pub fn render(&self, list: &DrawList) -> ShowResult<FrameRGBA> {
        let Viewport { width, height } = list.viewport;
        for slot in &list.slots {
            check_image(&slot.image)?;
        }

        let row_bytes = width as usize * 4;
        let mut data = vec![0u8; row_bytes * height as usize];
        data.par_chunks_mut(row_bytes)
            .enumerate()
            .for_each(|(y, row)| {
                fill(row, self.settings.clear_rgba);
                for slot in &list.slots {
                    draw_row(row, y as u32, slot);
                }
            });

        Ok(FrameRGBA {
            width,
            height,
            data,
            premultiplied: true,
        })
    }
}

fn check_image(image: &PreparedImage) -> ShowResult<()> {
    let expected = image.width as usize * image.height as usize * 4;
    if image.width == 0 || image.height == 0 || image.pixels.len() != expected {
        return Err(ShowError::asset_load(format!(
            "image buffer does not match {}x{}",
            image.width, image.height
        )));
    }
    Ok(())
}

/// Nearest-neighbour sample of the slot's cover rectangle into one output row.
fn draw_row(row: &mut [u8], y: u32, slot: &SlotDraw) {
    let (iw, ih) = slot.image.dimensions();
    let x0 = slot.center.x - slot.size.width / 2.0;
    let y0 = slot.center.y - slot.size.height / 2.0;

    let v = (f64::from(y) + 0.5 - y0) / slot.size.height;
    if !(0.0..1.0).contains(&v) {
        return;
    }
    let sy = ((v * f64::from(ih)) as u32).min(ih - 1);

    for (x, px) in row.chunks_exact_mut(4).enumerate() {
        let u = (x as f64 + 0.5 - x0) / slot.size.width;
        if !(0.0..1.0).contains(&u) {
            continue;
        }
        let sx = ((u * f64::from(iw)) as u32).min(iw - 1);
        let out = over(
            [px[0], px[1], px[2], px[3]],
            slot.image.pixel(sx, sy),
            slot.alpha,
        );
        px.copy_from_slice(&out);
    }
}
