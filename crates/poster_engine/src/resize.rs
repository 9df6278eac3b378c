use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use engine_logging::engine_info;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader, ImageResult};
use tempfile::TempPath;

/// Longest side, in pixels, an uploaded image may have.
pub const MAX_SIDE: u32 = 1350;

const JPEG_QUALITY: u8 = 95;

/// The file to upload: the caller's own file, or a downscaled temp copy that
/// is deleted when this value is dropped.
#[derive(Debug)]
pub enum PreparedImage {
    Original(PathBuf),
    Resized {
        path: TempPath,
        width: u32,
        height: u32,
    },
}

impl PreparedImage {
    pub fn path(&self) -> &Path {
        match self {
            PreparedImage::Original(path) => path,
            PreparedImage::Resized { path, .. } => path,
        }
    }
}

/// Downscale `path` when its longest side exceeds `max_side`, keeping the
/// aspect ratio. Images already within bounds are not touched.
pub fn prepare_image(path: &Path, max_side: u32) -> ImageResult<PreparedImage> {
    let (width, height) = ImageReader::open(path)?
        .with_guessed_format()?
        .into_dimensions()?;
    let longest = width.max(height);
    if longest <= max_side {
        return Ok(PreparedImage::Original(path.to_path_buf()));
    }

    let scale = f64::from(max_side) / f64::from(longest);
    let new_width = ((f64::from(width) * scale) as u32).max(1);
    let new_height = ((f64::from(height) * scale) as u32).max(1);

    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let format = reader.format();
    let resized = reader
        .decode()?
        .resize_exact(new_width, new_height, FilterType::Lanczos3);

    let suffix = path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_else(|| ".jpg".to_string());
    let mut tmp = tempfile::Builder::new()
        .prefix("poster-resized-")
        .suffix(&suffix)
        .tempfile()?;
    write_image(&resized, format, tmp.as_file_mut())?;

    engine_info!(
        "Downscaled {:?} from {}x{} to {}x{}",
        path,
        width,
        height,
        new_width,
        new_height
    );
    Ok(PreparedImage::Resized {
        path: tmp.into_temp_path(),
        width: new_width,
        height: new_height,
    })
}

fn write_image(
    image: &DynamicImage,
    format: Option<ImageFormat>,
    file: &mut File,
) -> ImageResult<()> {
    let mut out = BufWriter::new(file);
    match format {
        Some(ImageFormat::Jpeg) | None => {
            // JPEG has no alpha channel.
            let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY))?;
        }
        Some(format) => image.write_to(&mut out, format)?,
    }
    out.flush()?;
    Ok(())
}
