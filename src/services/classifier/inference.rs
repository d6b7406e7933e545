use crate::error::AppError;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use ndarray::Array4;
use std::io::Cursor;
use std::path::Path;

/// Spatial size the classifier was trained on.
pub const INPUT_SIZE: u32 = 224;
pub const CHANNELS: usize = 3;

const SUPPORTED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

pub fn is_supported_upload(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let lower = e.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&lower.as_str())
        })
        .unwrap_or(false)
}

/// Decodes an uploaded blob. The container is sniffed from the bytes, not
/// trusted from the file name, and only PNG and JPEG are accepted.
pub fn decode_upload(bytes: &[u8]) -> Result<DynamicImage, AppError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| AppError::ImageDecode(format!("Failed to read upload: {}", e)))?;

    match reader.format() {
        Some(ImageFormat::Png) | Some(ImageFormat::Jpeg) => {}
        Some(other) => {
            return Err(AppError::ImageDecode(format!(
                "{:?} images are not supported",
                other
            )))
        }
        None => {
            return Err(AppError::ImageDecode(
                "not a recognizable PNG or JPEG image".to_string(),
            ))
        }
    }

    reader
        .decode()
        .map_err(|e| AppError::ImageDecode(format!("Failed to decode image: {}", e)))
}

/// Decode, convert to RGB, resize to 224x224 and scale to [0, 1].
///
/// Output is NHWC with a batch of one: `(1, 224, 224, 3)`.
pub fn preprocess_image(bytes: &[u8]) -> Result<Array4<f32>, AppError> {
    let img = decode_upload(bytes)?;
    image_to_tensor(&img)
}

pub fn image_to_tensor(img: &DynamicImage) -> Result<Array4<f32>, AppError> {
    // Convert before resizing so grayscale and RGBA inputs resample as RGB.
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let resized = rgb
        .resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::CatmullRom)
        .to_rgb8();

    let side = INPUT_SIZE as usize;
    let data: Vec<f32> = resized
        .into_raw()
        .into_iter()
        .map(|v| v as f32 / 255.0)
        .collect();

    // The raw RGB8 buffer is already row-major HWC, so no transpose is needed.
    Array4::from_shape_vec((1, side, side, CHANNELS), data)
        .map_err(|e| AppError::Internal(format!("Failed to create tensor: {}", e)))
}
