// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Image task.
//!
//! PNGs are re-encoded at maximum compression with adaptive filtering,
//! JPEGs at the configured quality. Anything else is copied. The original
//! bytes are kept whenever the re-encoded file would not be smaller.

use super::{read_bytes, Emitted, TaskContext};
use crate::error::{PipelineError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageEncoder, ImageFormat};
use std::path::{Path, PathBuf};

fn image_error(path: &Path, err: image::ImageError) -> PipelineError {
    PipelineError::Image {
        file: path.to_path_buf(),
        message: err.to_string(),
    }
}

fn encode_png(img: &DynamicImage) -> image::ImageResult<Vec<u8>> {
    let mut out = Vec::new();
    PngEncoder::new_with_quality(&mut out, CompressionType::Best, FilterType::Adaptive)
        .write_image(img.as_bytes(), img.width(), img.height(), img.color().into())?;
    Ok(out)
}

fn encode_jpeg(img: DynamicImage, quality: u8) -> image::ImageResult<Vec<u8>> {
    let img = match img {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => img,
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    };
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100))
        .write_image(img.as_bytes(), img.width(), img.height(), img.color().into())?;
    Ok(out)
}

/// Returns the optimized bytes for an image, or the input when nothing is gained.
pub(crate) fn optimize(path: &Path, bytes: Vec<u8>, jpeg_quality: u8) -> Result<Vec<u8>> {
    let format = match image::guess_format(&bytes) {
        Ok(format @ (ImageFormat::Png | ImageFormat::Jpeg)) => format,
        _ => {
            tracing::debug!("Copying {} unchanged", path.display());
            return Ok(bytes);
        }
    };

    let img = image::load_from_memory_with_format(&bytes, format)
        .map_err(|e| image_error(path, e))?;
    let optimized = match format {
        ImageFormat::Png => encode_png(&img),
        _ => encode_jpeg(img, jpeg_quality),
    }
    .map_err(|e| image_error(path, e))?;

    if optimized.len() < bytes.len() {
        tracing::debug!(
            "Optimized {}: {} -> {} bytes",
            path.display(),
            bytes.len(),
            optimized.len()
        );
        Ok(optimized)
    } else {
        Ok(bytes)
    }
}

pub(crate) fn build(ctx: &TaskContext<'_>, sources: &[PathBuf]) -> Result<Vec<Emitted>> {
    let mut emitted = Vec::with_capacity(sources.len());
    for source in sources {
        let bytes = optimize(source, read_bytes(source)?, ctx.options.jpeg_quality)?;
        emitted.push(Emitted::new(ctx.dest_for(source, None), bytes));
    }
    Ok(emitted)
}
