// texture.rs — asynchronous panorama loading
//
// Images are fetched and decoded off the render thread; results come back over
// a channel that the engine drains between frames. Every request carries the
// liveness token of the engine instance that issued it.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;

use image::{GenericImage, Rgba, RgbaImage};

use crate::error::TextureError;
use crate::panorama::Side;

/// Shared flag flipped off when an engine instance is torn down.
#[derive(Debug, Clone)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn kill(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

pub struct TextureRequest {
    pub side: Side,
    pub locator: String,
    pub generation: u64,
    pub max_dimension: u32,
    pub liveness: Liveness,
    pub sender: Sender<TextureEvent>,
}

impl TextureRequest {
    /// Deliver a result unless the issuing instance is gone. Returns whether
    /// the event was handed over.
    pub fn complete(self, result: Result<RgbaImage, TextureError>) -> bool {
        if !self.liveness.is_alive() {
            log::debug!("dropping {} texture for disposed engine: {}", self.side, self.locator);
            return false;
        }
        self.sender
            .send(TextureEvent {
                side: self.side,
                generation: self.generation,
                locator: self.locator,
                result,
            })
            .is_ok()
    }
}

pub struct TextureEvent {
    pub side: Side,
    pub generation: u64,
    pub locator: String,
    pub result: Result<RgbaImage, TextureError>,
}

/// Something that turns a locator into pixels without blocking the caller.
pub trait TextureLoader {
    fn load(&self, request: TextureRequest);
}

/// One worker thread per request.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadedLoader;

impl TextureLoader for ThreadedLoader {
    fn load(&self, request: TextureRequest) {
        let spawned = thread::Builder::new()
            .name(format!("texture-{}", request.side))
            .spawn(move || {
                log::info!("loading {} panorama: {}", request.side, request.locator);
                let result = load_image(&request.locator)
                    .map(|img| prepare_for_gpu(img, request.max_dimension));
                if let Ok(img) = &result {
                    let (w, h) = img.dimensions();
                    log::info!("{} panorama decoded: {}x{}", request.side, w, h);
                }
                request.complete(result);
            });

        if let Err(e) = spawned {
            log::error!("failed to spawn texture loader thread: {}", e);
        }
    }
}

/// Fetch and decode the image behind `locator` (http(s) URL, file URL or path).
pub fn load_image(locator: &str) -> Result<RgbaImage, TextureError> {
    let bytes = fetch_bytes(locator)?;
    decode(&bytes)
}

fn fetch_bytes(locator: &str) -> Result<Vec<u8>, TextureError> {
    let trimmed = locator.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        let response = reqwest::blocking::Client::builder()
            .build()?
            .get(trimmed)
            .send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(TextureError::Status {
                url: trimmed.to_string(),
                status: status.as_u16(),
            });
        }
        return Ok(response.bytes()?.to_vec());
    }

    let path = local_path(trimmed);
    std::fs::read(&path).map_err(|source| TextureError::Io { path, source })
}

fn local_path(locator: &str) -> PathBuf {
    match locator.strip_prefix("file://") {
        Some(rest) => PathBuf::from(rest),
        None => Path::new(locator).to_path_buf(),
    }
}

pub fn decode(bytes: &[u8]) -> Result<RgbaImage, TextureError> {
    let mut reader = image::io::Reader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)?;
    reader.no_limits();
    let rgba = reader.decode()?.to_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(TextureError::Empty);
    }
    Ok(rgba)
}

/// Shrink to the GPU's texture limit and pad short images up to 2:1.
pub fn prepare_for_gpu(img: RgbaImage, max_dimension: u32) -> RgbaImage {
    pad_to_equirect(fit_to_limit(img, max_dimension))
}

pub fn fit_to_limit(img: RgbaImage, max_dimension: u32) -> RgbaImage {
    let (src_w, src_h) = img.dimensions();
    if max_dimension == 0 || (src_w <= max_dimension && src_h <= max_dimension) {
        return img;
    }

    let scale = max_dimension as f32 / src_w.max(src_h) as f32;
    let new_w = ((src_w as f32 * scale) as u32).clamp(1, max_dimension);
    let new_h = ((src_h as f32 * scale) as u32).clamp(1, max_dimension);
    log::warn!(
        "panorama {}x{} exceeds GPU limit {}, scaling to {}x{}",
        src_w,
        src_h,
        max_dimension,
        new_w,
        new_h
    );
    image::DynamicImage::ImageRgba8(img)
        .resize_exact(new_w, new_h, image::imageops::FilterType::Lanczos3)
        .to_rgba8()
}

/// An image shorter than `width / 2` is a partial panorama: keep it at the
/// bottom of a full 2:1 canvas and leave the sky black.
pub fn pad_to_equirect(img: RgbaImage) -> RgbaImage {
    let (src_w, src_h) = img.dimensions();
    let target_h = src_w / 2;
    if target_h == 0 || src_h >= target_h {
        return img;
    }

    let mut canvas = RgbaImage::from_pixel(src_w, target_h, Rgba([0, 0, 0, 255]));
    // y_offset keeps the copy in bounds
    let _ = canvas.copy_from(&img, 0, target_h - src_h);
    canvas
}
