// Shared fixtures: a recording backend and a loader that completes on demand.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use glam::Vec3;
use image::{Rgba, RgbaImage};

use dual_pano::backend::{backing_size, RenderBackend};
use dual_pano::camera::CameraRig;
use dual_pano::layout::SurfaceRect;
use dual_pano::texture::{TextureLoader, TextureRequest};
use dual_pano::{EngineError, InputRouter, PanoramaDescriptor, PanoramaEngine, PanoramaPair, Side, ViewerConfig};

#[derive(Debug)]
pub struct MockScene {
    pub id: u64,
    pub side: Side,
}

#[derive(Debug)]
pub struct MockSurface {
    pub id: u64,
    pub side: Side,
    pub rect: SurfaceRect,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub side: Side,
    pub target: Vec3,
    pub fov_deg: f32,
    pub aspect: f32,
}

#[derive(Debug, Default)]
pub struct MockFrame {
    pub draws: Vec<DrawCall>,
}

#[derive(Debug, Default)]
pub struct MockBackend {
    next_id: u64,
    /// id -> number of times released
    pub surfaces: HashMap<u64, u32>,
    pub scenes: HashMap<u64, u32>,
    pub bound: Vec<(Side, u32, u32)>,
    pub resized: Vec<(Side, SurfaceRect)>,
    pub fail_scene_for: Option<Side>,
}

impl MockBackend {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn live_surfaces(&self) -> usize {
        self.surfaces.values().filter(|n| **n == 0).count()
    }

    pub fn live_scenes(&self) -> usize {
        self.scenes.values().filter(|n| **n == 0).count()
    }

    pub fn assert_released_exactly_once(&self) {
        for (id, n) in self.surfaces.iter().chain(self.scenes.iter()) {
            assert_eq!(*n, 1, "resource {id} released {n} times");
        }
    }
}

impl RenderBackend for MockBackend {
    type Scene = MockScene;
    type Surface = MockSurface;
    type Frame = MockFrame;

    fn max_texture_dimension(&self) -> u32 {
        8192
    }

    fn create_surface(&mut self, side: Side, rect: SurfaceRect) -> Result<MockSurface, EngineError> {
        let id = self.next_id();
        self.surfaces.insert(id, 0);
        Ok(MockSurface { id, side, rect })
    }

    fn resize_surface(&mut self, surface: &mut MockSurface, rect: SurfaceRect) {
        assert_eq!(self.surfaces[&surface.id], 0, "resize after release");
        let _ = backing_size(rect);
        surface.rect = rect;
        self.resized.push((surface.side, rect));
    }

    fn release_surface(&mut self, surface: MockSurface) {
        *self.surfaces.entry(surface.id).or_default() += 1;
    }

    fn create_scene(&mut self, side: Side) -> Result<MockScene, EngineError> {
        if self.fail_scene_for == Some(side) {
            return Err(EngineError::Scene {
                side,
                reason: "mock failure".to_string(),
            });
        }
        let id = self.next_id();
        self.scenes.insert(id, 0);
        Ok(MockScene { id, side })
    }

    fn bind_texture(&mut self, scene: &mut MockScene, image: &RgbaImage) {
        assert_eq!(self.scenes[&scene.id], 0, "bind after release");
        self.bound.push((scene.side, image.width(), image.height()));
    }

    fn release_scene(&mut self, scene: MockScene) {
        *self.scenes.entry(scene.id).or_default() += 1;
    }

    fn draw(&mut self, frame: &mut MockFrame, scene: &MockScene, surface: &MockSurface, camera: &CameraRig) {
        assert_eq!(scene.side, surface.side);
        assert_eq!(self.scenes[&scene.id], 0, "draw after release");
        frame.draws.push(DrawCall {
            side: scene.side,
            target: camera.target(),
            fov_deg: camera.fov_deg(),
            aspect: camera.aspect(),
        });
    }
}

/// Holds requests until the test decides how they finish.
#[derive(Clone, Default)]
pub struct ManualLoader {
    pub pending: Rc<RefCell<Vec<TextureRequest>>>,
}

impl ManualLoader {
    pub fn take(&self) -> Vec<TextureRequest> {
        std::mem::take(&mut *self.pending.borrow_mut())
    }
}

impl TextureLoader for ManualLoader {
    fn load(&self, request: TextureRequest) {
        self.pending.borrow_mut().push(request);
    }
}

pub fn panorama(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([128, 128, 128, 255]))
}

pub fn pair(left: &str, right: &str) -> PanoramaPair {
    PanoramaPair::new(PanoramaDescriptor::new(left), PanoramaDescriptor::new(right))
}

/// Engine laid out in an 802x400 window: two 400x400 sides with a 2px divider.
pub fn engine() -> (PanoramaEngine<MockBackend>, MockBackend, ManualLoader) {
    let loader = ManualLoader::default();
    let mut backend = MockBackend::default();
    let mut engine = PanoramaEngine::new(
        ViewerConfig::default(),
        InputRouter::new(),
        Box::new(loader.clone()),
    );
    engine.set_window_size(802, 400, &mut backend);
    (engine, backend, loader)
}

pub fn assert_close(a: f32, b: f32) {
    assert!((a - b).abs() < 1e-3, "{a} != {b}");
}
