//! Two equirectangular panoramas side by side, steered as one.
//!
//! Dragging on either side orbits both cameras together; the wheel zooms only
//! the side under the cursor. [`PanoramaEngine`] owns the lifecycle and talks
//! to the GPU through [`RenderBackend`], implemented for wgpu by
//! [`GpuRenderer`].

pub mod backend;
pub mod camera;
pub mod config;
pub mod engine;
pub mod error;
pub mod i18n;
pub mod input;
pub mod layout;
pub mod mesh;
pub mod orbit;
pub mod panorama;
pub mod render_loop;
pub mod renderer;
pub mod texture;
pub mod ui;
pub mod zoom;

pub use backend::RenderBackend;
pub use config::ViewerConfig;
pub use engine::{EngineState, PanoramaEngine, TextureStatus};
pub use error::{ConfigError, EngineError, TextureError};
pub use input::{InputEvent, InputRouter, Routed, WinitInputAdapter};
pub use panorama::{PanoramaDescriptor, PanoramaPair, Side};
pub use renderer::GpuRenderer;
pub use render_loop::Tick;
pub use texture::{TextureLoader, ThreadedLoader};
