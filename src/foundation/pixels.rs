use crate::foundation::error::{HostError, HostResult};

/// Byte length of a tightly packed RGBA8 image.
pub fn rgba8_len(width: u32, height: u32) -> HostResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| HostError::validation("frame buffer size overflow"))
}

/// Owned premultiplied RGBA8 pixel memory.
///
/// Rows are stored tightly packed (`stride == width * 4`). Caller memory with a wider stride is
/// copied in row by row through [`PixelBuffer::from_strided`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    stride: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Allocate a fully transparent buffer.
    pub fn new(width: u32, height: u32) -> HostResult<Self> {
        let len = rgba8_len(width, height)?;
        Ok(Self {
            width,
            height,
            stride: width as usize * 4,
            data: vec![0u8; len],
        })
    }

    /// Copy `height` rows of `width * 4` bytes out of `src`, advancing by `stride` bytes per row.
    pub fn from_strided(width: u32, height: u32, stride: usize, src: &[u8]) -> HostResult<Self> {
        let row_len = width as usize * 4;
        if stride < row_len {
            return Err(HostError::validation(format!(
                "stride {stride} is smaller than width*4 ({row_len})"
            )));
        }
        let needed = match height {
            0 => 0,
            h => stride
                .checked_mul(h as usize - 1)
                .and_then(|v| v.checked_add(row_len))
                .ok_or_else(|| HostError::validation("input buffer size overflow"))?,
        };
        if src.len() < needed {
            return Err(HostError::validation(format!(
                "input buffer holds {} bytes, {needed} required",
                src.len()
            )));
        }

        let mut out = Self::new(width, height)?;
        if row_len > 0 {
            for (dst_row, src_row) in out
                .data
                .chunks_exact_mut(row_len)
                .zip(src.chunks(stride.max(1)))
            {
                dst_row.copy_from_slice(&src_row[..row_len]);
            }
        }
        Ok(out)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row stride in bytes.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Borrow the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Mutably borrow the raw bytes.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Read one pixel as `0xRRGGBBAA` of the stored channels.
    pub fn pixel(&self, index: usize) -> Option<u32> {
        let start = index.checked_mul(4)?;
        let px = self.data.get(start..start.checked_add(4)?)?;
        Some(u32::from_be_bytes([px[0], px[1], px[2], px[3]]))
    }

    /// Write one pixel from `0xRRGGBBAA`. Returns `false` when out of range.
    pub fn set_pixel(&mut self, index: usize, packed: u32) -> bool {
        let Some(start) = index.checked_mul(4) else {
            return false;
        };
        match self.data.get_mut(start..start.saturating_add(4)) {
            Some(px) => {
                px.copy_from_slice(&packed.to_be_bytes());
                true
            }
            None => false,
        }
    }

    /// Replace every byte; `bytes` must match the buffer length exactly.
    pub fn replace_bytes(&mut self, bytes: &[u8]) -> HostResult<()> {
        if bytes.len() != self.data.len() {
            return Err(HostError::validation(format!(
                "pixel data must be {} bytes, got {}",
                self.data.len(),
                bytes.len()
            )));
        }
        self.data.copy_from_slice(bytes);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/pixels.rs"]
mod tests;
