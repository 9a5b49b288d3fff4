//! Raw frame read-back and densification.
//!
//! Surfaces handed out by the display often pad each row to an alignment
//! boundary. [`extract_frame`] converts such a plane into a dense RGBA image.
//! The padding columns stay in the output; callers see
//! `width + row_padding_pixels` columns.

use image::RgbaImage;
use snapcrop_common::error::{SnapError, SnapResult};

/// Bytes per pixel of the only layout we read back (RGBA8888).
pub const RGBA_PIXEL_STRIDE: usize = 4;

/// A raw pixel plane as delivered by a frame consumer.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    pub width: u32,
    pub height: u32,
    /// Bytes per pixel.
    pub pixel_stride: usize,
    /// Bytes per row, including padding.
    pub row_stride: usize,
    pub bytes: Vec<u8>,
}

impl FrameBuffer {
    pub fn new(
        width: u32,
        height: u32,
        pixel_stride: usize,
        row_stride: usize,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            width,
            height,
            pixel_stride,
            row_stride,
            bytes,
        }
    }

    /// Lay out `image` with each row padded up to `alignment` bytes.
    ///
    /// Padding bytes are zeroed. An alignment of 0 or 1 produces a dense plane.
    pub fn from_image_padded(image: &RgbaImage, alignment: usize) -> Self {
        let (width, height) = image.dimensions();
        let dense_row = width as usize * RGBA_PIXEL_STRIDE;
        let row_stride = if alignment > 1 {
            dense_row.div_ceil(alignment) * alignment
        } else {
            dense_row
        };

        let mut bytes = vec![0u8; row_stride * height as usize];
        for (y, row) in image.as_raw().chunks_exact(dense_row.max(1)).enumerate() {
            let start = y * row_stride;
            bytes[start..start + dense_row].copy_from_slice(row);
        }

        Self::new(width, height, RGBA_PIXEL_STRIDE, row_stride, bytes)
    }

    /// Padding columns at the end of every row. Zero for a plane whose row
    /// stride is shorter than its pixels or whose pixel stride is zero.
    pub fn row_padding_pixels(&self) -> usize {
        self.pixel_stride
            .checked_mul(self.width as usize)
            .and_then(|dense| self.row_stride.checked_sub(dense))
            .and_then(|padding| padding.checked_div(self.pixel_stride))
            .unwrap_or(0)
    }
}

/// A dense captured image.
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub pixels: RgbaImage,
    /// Width of the plane the image came from, before padding was exposed.
    pub source_width: u32,
    pub source_height: u32,
}

impl Screenshot {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }
}

/// Densify a raw plane. Output width is `width + row_padding_pixels`.
pub fn extract_frame(frame: &FrameBuffer) -> SnapResult<Screenshot> {
    if frame.width == 0 || frame.height == 0 || frame.bytes.is_empty() {
        return Err(SnapError::no_frame("frame plane is empty"));
    }
    if frame.pixel_stride != RGBA_PIXEL_STRIDE {
        return Err(SnapError::unsupported(format!(
            "pixel stride {} (only RGBA8888 is supported)",
            frame.pixel_stride
        )));
    }

    let dense_row = frame.pixel_stride * frame.width as usize;
    if frame.row_stride < dense_row {
        return Err(SnapError::invalid_frame(format!(
            "row stride {} is shorter than {} pixels",
            frame.row_stride, frame.width
        )));
    }

    let out_width = frame.width as usize + frame.row_padding_pixels();
    let out_row = out_width * frame.pixel_stride;
    let height = frame.height as usize;
    let required = frame.row_stride * (height - 1) + out_row;
    if frame.bytes.len() < required {
        return Err(SnapError::invalid_frame(format!(
            "plane holds {} bytes, {} needed",
            frame.bytes.len(),
            required
        )));
    }

    let mut dense = Vec::with_capacity(out_row * height);
    for y in 0..height {
        let start = y * frame.row_stride;
        dense.extend_from_slice(&frame.bytes[start..start + out_row]);
    }

    let pixels = RgbaImage::from_raw(out_width as u32, frame.height, dense)
        .ok_or_else(|| SnapError::invalid_frame("dense buffer size mismatch"))?;

    if out_width != frame.width as usize {
        tracing::debug!(
            width = frame.width,
            padding = out_width - frame.width as usize,
            "Frame rows carry padding columns"
        );
    }

    Ok(Screenshot {
        pixels,
        source_width: frame.width,
        source_height: frame.height,
    })
}

/// Remove the top `inset` rows (the status bar).
///
/// Applied only when `0 < inset < height`; otherwise the shot is returned as-is.
pub fn trim_status_bar(shot: Screenshot, inset: u32) -> Screenshot {
    let (width, height) = shot.pixels.dimensions();
    if inset == 0 || inset >= height {
        return shot;
    }

    let pixels =
        image::imageops::crop_imm(&shot.pixels, 0, inset, width, height - inset).to_image();
    Screenshot {
        pixels,
        source_width: shot.source_width,
        source_height: shot.source_height,
    }
}
