use crate::foundation::math::mul_div255_u8;

pub type PremulRgba8 = [u8; 4];

/// Source-over of premultiplied `src` onto `dst`, scaled by `opacity` (0..=255).
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: u8) -> PremulRgba8 {
    if opacity == 0 || src[3] == 0 {
        return dst;
    }

    let op = u16::from(opacity);
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

pub fn fill(dst: &mut [u8], rgba: PremulRgba8) {
    for px in dst.chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}
