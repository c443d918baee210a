/// Preview decoding for the image pane
///
/// The picture is decoded with the `image` crate and scaled down to fit the
/// configured bounds (never up), then handed to iced as RGBA pixels.

use image::{imageops::FilterType, DynamicImage};
use std::path::{Path, PathBuf};
use tokio::task;

use iced::widget::image::Handle;

/// Decoded preview ready for display
#[derive(Debug, Clone)]
pub struct Preview {
    pub path: PathBuf,
    pub handle: Handle,
    pub width: u32,
    pub height: u32,
}

/// Load a preview off the UI thread
pub async fn load_preview(
    path: PathBuf,
    max_width: u32,
    max_height: u32,
) -> (PathBuf, Result<Preview, String>) {
    let key = path.clone();
    let result = task::spawn_blocking(move || load_preview_blocking(&path, max_width, max_height))
        .await
        .map_err(|e| format!("Task join error: {}", e))
        .and_then(|r| r);
    (key, result)
}

fn load_preview_blocking(path: &Path, max_width: u32, max_height: u32) -> Result<Preview, String> {
    let img = image::open(path).map_err(|e| format!("Failed to decode {}: {}", path.display(), e))?;
    let img = fit_within(img, max_width, max_height);

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    tracing::debug!("Preview {}: {}x{}", path.display(), width, height);

    Ok(Preview {
        path: path.to_path_buf(),
        handle: Handle::from_rgba(width, height, rgba.into_raw()),
        width,
        height,
    })
}

/// Shrink `img` to fit `max_width` x `max_height`, keeping the aspect ratio
pub fn fit_within(img: DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
    if img.width() <= max_width && img.height() <= max_height {
        return img;
    }
    img.resize(max_width, max_height, FilterType::Lanczos3)
}
