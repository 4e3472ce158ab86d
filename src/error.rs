// error.rs — library error types

use std::path::PathBuf;
use thiserror::Error;

use crate::panorama::Side;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("no compatible GPU adapter found")]
    AdapterUnavailable,
    #[error("failed to request GPU device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),
    #[error("failed to create window surface: {0}")]
    SurfaceCreate(#[from] wgpu::CreateSurfaceError),
    #[error("{side} render surface could not be created: {reason}")]
    Surface { side: Side, reason: String },
    #[error("{side} sphere scene could not be created: {reason}")]
    Scene { side: Side, reason: String },
}

/// Why a panorama image never reached the GPU.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("image has zero size")]
    Empty,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
