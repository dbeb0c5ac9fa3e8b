use crate::foundation::error::{HostError, HostResult};
use crate::foundation::math::{mul_div255_u8, opacity_u8};

pub(crate) type PremulRgba8 = [u8; 4];

/// Premultiplied source-over with an extra opacity multiplier.
pub(crate) fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = opacity_u8(opacity);
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

pub(crate) fn over_in_place(dst: &mut [u8], src: &[u8]) -> HostResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(HostError::render(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], 1.0);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Scale every destination pixel by the inverse of the mask's alpha coverage.
///
/// Full coverage leaves transparent black; partial coverage at antialiased edges keeps the
/// uncovered share of the destination.
pub(crate) fn erase_in_place(dst: &mut [u8], mask: &[u8]) -> HostResult<()> {
    if dst.len() != mask.len() || !dst.len().is_multiple_of(4) {
        return Err(HostError::render(
            "erase_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, m) in dst.chunks_exact_mut(4).zip(mask.chunks_exact(4)) {
        let keep = 255u16 - u16::from(m[3]);
        for c in d.iter_mut() {
            *c = mul_div255_u8(u16::from(*c), keep);
        }
    }
    Ok(())
}

/// Integer-offset blit of one premultiplied image over another, clipped to the destination.
pub(crate) struct Blit<'a> {
    pub(crate) src: &'a [u8],
    pub(crate) src_width: u32,
    pub(crate) src_height: u32,
    pub(crate) dx: i64,
    pub(crate) dy: i64,
    pub(crate) opacity: f32,
}

pub(crate) fn blit_over(
    dst: &mut [u8],
    dst_width: u32,
    dst_height: u32,
    blit: Blit<'_>,
) -> HostResult<()> {
    let Blit {
        src,
        src_width,
        src_height,
        dx,
        dy,
        opacity,
    } = blit;
    if src.len() != src_width as usize * src_height as usize * 4
        || dst.len() != dst_width as usize * dst_height as usize * 4
    {
        return Err(HostError::render("blit buffers do not match their sizes"));
    }

    let x0 = dx.max(0);
    let y0 = dy.max(0);
    let x1 = (dx + i64::from(src_width)).min(i64::from(dst_width));
    let y1 = (dy + i64::from(src_height)).min(i64::from(dst_height));
    if x0 >= x1 || y0 >= y1 {
        return Ok(());
    }

    for y in y0..y1 {
        let sy = (y - dy) as usize;
        for x in x0..x1 {
            let sx = (x - dx) as usize;
            let si = (sy * src_width as usize + sx) * 4;
            let di = (y as usize * dst_width as usize + x as usize) * 4;
            let s = [src[si], src[si + 1], src[si + 2], src[si + 3]];
            let d = [dst[di], dst[di + 1], dst[di + 2], dst[di + 3]];
            dst[di..di + 4].copy_from_slice(&over(d, s, opacity));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/surface/composite.rs"]
mod tests;
