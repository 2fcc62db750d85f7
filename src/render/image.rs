//! Feature-map visualization: min-max normalized grayscale PNGs, optionally
//! upscaled so 26×26 maps are visible in a browser.

use std::io::Cursor;

use base64::Engine;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, ImageOutputFormat, Luma};

use crate::error::{PadError, PadResult};
use crate::inference::FeatureMap;

/// Converts a feature map to an 8-bit grayscale image, brightest value white.
/// A constant map renders mid-gray.
pub fn feature_map_image(map: &FeatureMap) -> PadResult<GrayImage> {
    if map.values.len() != map.width * map.height {
        return Err(PadError::FeatureMapShape {
            width: map.width,
            height: map.height,
            len: map.values.len(),
        });
    }
    let (min, max) = map.values.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    });
    let range = max - min;

    Ok(GrayImage::from_fn(map.width as u32, map.height as u32, |x, y| {
        let v = map.values[y as usize * map.width + x as usize];
        let normalized = if range > 0.0 { (v - min) / range } else { 0.5 };
        Luma([(normalized.clamp(0.0, 1.0) * 255.0).round() as u8])
    }))
}

/// PNG bytes of the map, upscaled by `scale` with nearest-neighbor sampling.
pub fn feature_map_png(map: &FeatureMap, scale: u32) -> PadResult<Vec<u8>> {
    let img = feature_map_image(map)?;
    let scale = scale.max(1);
    let img = if scale > 1 {
        imageops::resize(&img, img.width() * scale, img.height() * scale, FilterType::Nearest)
    } else {
        img
    };

    let mut bytes = Vec::new();
    DynamicImage::ImageLuma8(img).write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)?;
    Ok(bytes)
}

/// `data:` URI for inlining a PNG in an `<img>` tag.
pub fn png_data_uri(png: &[u8]) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    )
}
