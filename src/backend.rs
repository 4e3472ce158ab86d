// backend.rs — the GPU operations the engine needs, one trait per seam

use image::RgbaImage;

use crate::camera::CameraRig;
use crate::error::EngineError;
use crate::layout::{SurfaceRect, SurfaceSize};
use crate::panorama::Side;

/// Allocates and draws the per-side GPU resources.
///
/// `release_*` take ownership, so a resource handed back once cannot be
/// handed back again.
pub trait RenderBackend {
    /// Sphere mesh plus its material (texture binding).
    type Scene;
    /// The side's render target.
    type Surface;
    /// Per-frame recording state.
    type Frame;

    fn max_texture_dimension(&self) -> u32;

    fn create_surface(&mut self, side: Side, rect: SurfaceRect) -> Result<Self::Surface, EngineError>;
    fn resize_surface(&mut self, surface: &mut Self::Surface, rect: SurfaceRect);
    fn release_surface(&mut self, surface: Self::Surface);

    fn create_scene(&mut self, side: Side) -> Result<Self::Scene, EngineError>;
    /// Swap the scene's texture in place; the previous texture is released.
    fn bind_texture(&mut self, scene: &mut Self::Scene, image: &RgbaImage);
    fn release_scene(&mut self, scene: Self::Scene);

    fn draw(
        &mut self,
        frame: &mut Self::Frame,
        scene: &Self::Scene,
        surface: &Self::Surface,
        camera: &CameraRig,
    );
}

/// Size helper shared by backends that keep a rect per surface.
pub fn backing_size(rect: SurfaceRect) -> SurfaceSize {
    SurfaceSize::new(rect.width.max(1), rect.height.max(1))
}
