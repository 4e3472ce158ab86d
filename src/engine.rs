// engine.rs — lifecycle owner for the dual panorama view
//
// Idle -> Active -> Disposing -> Idle. Any descriptor change while Active is a
// full teardown followed by a fresh build; nothing is patched in place.

use std::sync::mpsc::{channel, Receiver};

use crate::backend::RenderBackend;
use crate::camera::CameraRig;
use crate::config::ViewerConfig;
use crate::error::EngineError;
use crate::input::{InputEvent, InputRouter, Routed};
use crate::layout::{ResizeWatcher, SplitLayout, SurfaceRect};
use crate::orbit::OrbitState;
use crate::panorama::{PanoramaPair, Side};
use crate::render_loop::{RenderLoop, Tick};
use crate::texture::{Liveness, TextureEvent, TextureLoader, TextureRequest};
use crate::zoom::ZoomState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Active,
    Disposing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureStatus {
    Loading,
    Ready,
    Failed,
}

struct SideView<B: RenderBackend> {
    side: Side,
    scene: Option<B::Scene>,
    surface: Option<B::Surface>,
    camera: CameraRig,
    texture: TextureStatus,
}

struct EngineInstance<B: RenderBackend> {
    generation: u64,
    liveness: Liveness,
    orbit: OrbitState,
    zoom: [ZoomState; 2],
    sides: [SideView<B>; 2],
    render_loop: RenderLoop,
    textures: Receiver<TextureEvent>,
}

enum Lifecycle<B: RenderBackend> {
    Idle,
    Active(Box<EngineInstance<B>>),
    Disposing,
}

pub struct PanoramaEngine<B: RenderBackend> {
    config: ViewerConfig,
    router: InputRouter,
    loader: Box<dyn TextureLoader>,
    layout: SplitLayout,
    rects: [SurfaceRect; 2],
    resize: ResizeWatcher,
    descriptors: PanoramaPair,
    lifecycle: Lifecycle<B>,
    next_generation: u64,
    redraw_requested: bool,
}

impl<B: RenderBackend> PanoramaEngine<B> {
    pub fn new(config: ViewerConfig, router: InputRouter, loader: Box<dyn TextureLoader>) -> Self {
        let layout = SplitLayout::new(config.orientation, config.divider_px);
        Self {
            config,
            router,
            loader,
            layout,
            rects: [SurfaceRect::default(); 2],
            resize: ResizeWatcher::new(),
            descriptors: PanoramaPair::default(),
            lifecycle: Lifecycle::Idle,
            next_generation: 1,
            redraw_requested: false,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn state(&self) -> EngineState {
        match self.lifecycle {
            Lifecycle::Idle => EngineState::Idle,
            Lifecycle::Active(_) => EngineState::Active,
            Lifecycle::Disposing => EngineState::Disposing,
        }
    }

    pub fn descriptors(&self) -> &PanoramaPair {
        &self.descriptors
    }

    pub fn router(&self) -> &InputRouter {
        &self.router
    }

    /// Generation of the live instance; each rebuild gets a new one.
    pub fn generation(&self) -> Option<u64> {
        self.active().map(|inst| inst.generation)
    }

    pub fn orbit(&self) -> Option<OrbitState> {
        self.active().map(|inst| inst.orbit)
    }

    pub fn fov(&self, side: Side) -> Option<f32> {
        self.active().map(|inst| inst.zoom[side.index()].fov_deg)
    }

    pub fn camera(&self, side: Side) -> Option<&CameraRig> {
        self.active().map(|inst| &inst.sides[side.index()].camera)
    }

    pub fn texture_status(&self, side: Side) -> Option<TextureStatus> {
        self.active().map(|inst| inst.sides[side.index()].texture)
    }

    pub fn is_render_loop_running(&self) -> bool {
        self.active().is_some_and(|inst| inst.render_loop.is_running())
    }

    /// True once since the last call if something asked for a repaint.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    fn active(&self) -> Option<&EngineInstance<B>> {
        match &self.lifecycle {
            Lifecycle::Active(inst) => Some(inst.as_ref()),
            _ => None,
        }
    }

    /// Replace the descriptor pair. Any difference tears the current instance
    /// down before a new one is built; an identical pair is a no-op.
    pub fn set_descriptors(&mut self, pair: PanoramaPair, backend: &mut B) -> Result<(), EngineError> {
        if pair == self.descriptors && self.state() == EngineState::Active {
            return Ok(());
        }
        self.descriptors = pair;
        self.construct(backend)
    }

    /// Rebuild from the current descriptors.
    pub fn reset(&mut self, backend: &mut B) -> Result<(), EngineError> {
        log::info!("resetting panorama engine");
        self.construct(backend)
    }

    fn construct(&mut self, backend: &mut B) -> Result<(), EngineError> {
        self.dispose(backend);

        if !self.descriptors.is_complete() {
            log::debug!("panorama pair incomplete, staying idle");
            return Ok(());
        }

        let generation = self.next_generation;
        self.next_generation += 1;

        let [left, right] = Side::ALL.map(|side| self.rects[side.index()]);
        let (left_surface, left_scene) = create_side(backend, Side::Left, left)?;
        let (right_surface, right_scene) = match create_side(backend, Side::Right, right) {
            Ok(created) => created,
            Err(e) => {
                backend.release_scene(left_scene);
                backend.release_surface(left_surface);
                return Err(e);
            }
        };

        let zoom = [
            ZoomState::initial(self.descriptors.left.vertical_fov_deg, &self.config),
            ZoomState::initial(self.descriptors.right.vertical_fov_deg, &self.config),
        ];
        let camera = |side: Side, rect: SurfaceRect| {
            CameraRig::new(
                zoom[side.index()].fov_deg,
                rect.size().aspect(),
                self.config.near,
                self.config.far,
            )
        };

        let sides = [
            SideView {
                side: Side::Left,
                scene: Some(left_scene),
                surface: Some(left_surface),
                camera: camera(Side::Left, left),
                texture: TextureStatus::Loading,
            },
            SideView {
                side: Side::Right,
                scene: Some(right_scene),
                surface: Some(right_surface),
                camera: camera(Side::Right, right),
                texture: TextureStatus::Loading,
            },
        ];
        self.resize.observe(Side::Left, left);
        self.resize.observe(Side::Right, right);

        let liveness = Liveness::new();
        let (sender, textures) = channel();
        for side in Side::ALL {
            self.loader.load(TextureRequest {
                side,
                locator: self.descriptors.get(side).image_locator.clone(),
                generation,
                max_dimension: backend.max_texture_dimension(),
                liveness: liveness.clone(),
                sender: sender.clone(),
            });
        }

        let orbit = OrbitState::from_pair(&self.descriptors).clamp_lat(self.config.lat_limit);
        log::info!(
            "panorama engine generation {} active (lon {:.1}, lat {:.1}, fov {:.1}/{:.1})",
            generation,
            orbit.lon_deg,
            orbit.lat_deg,
            zoom[0].fov_deg,
            zoom[1].fov_deg
        );

        self.lifecycle = Lifecycle::Active(Box::new(EngineInstance {
            generation,
            render_loop: RenderLoop::start(liveness.clone()),
            liveness,
            orbit,
            zoom,
            sides,
            textures,
        }));
        self.router.attach();
        self.redraw_requested = true;
        Ok(())
    }

    /// Tear down the live instance. Safe to call in any state; a second call
    /// does nothing.
    pub fn dispose(&mut self, backend: &mut B) {
        let Lifecycle::Active(mut inst) = std::mem::replace(&mut self.lifecycle, Lifecycle::Disposing)
        else {
            self.lifecycle = Lifecycle::Idle;
            return;
        };

        // no frame may touch a half-released resource
        inst.render_loop.cancel();
        inst.liveness.kill();
        self.router.detach();

        for view in inst.sides.iter_mut() {
            if let Some(scene) = view.scene.take() {
                backend.release_scene(scene);
            }
            if let Some(surface) = view.surface.take() {
                backend.release_surface(surface);
            }
        }
        self.resize.forget();

        log::info!("panorama engine generation {} disposed", inst.generation);
        drop(inst);
        self.lifecycle = Lifecycle::Idle;
    }

    /// New window size in physical pixels; both sides are re-laid out.
    pub fn set_window_size(&mut self, width: u32, height: u32, backend: &mut B) {
        let rects = self.layout.rects(width, height);
        for side in Side::ALL {
            self.resize_side(side, rects[side.index()], backend);
        }
    }

    /// Move/resize one side's surface. Only that side's camera aspect changes.
    pub fn resize_side(&mut self, side: Side, rect: SurfaceRect, backend: &mut B) {
        if rect.size().is_empty() {
            log::debug!("ignoring empty {} surface {:?}", side, rect);
            return;
        }
        self.rects[side.index()] = rect;
        self.router.set_rect(side, rect);

        let Lifecycle::Active(inst) = &mut self.lifecycle else {
            return;
        };
        let Some(rect) = self.resize.observe(side, rect) else {
            return;
        };

        let view = &mut inst.sides[side.index()];
        if let Some(surface) = view.surface.as_mut() {
            backend.resize_surface(surface, rect);
        }
        view.camera.set_aspect(rect.size().aspect());
        log::debug!("{} surface now {}x{} at ({}, {})", side, rect.width, rect.height, rect.x, rect.y);
        self.redraw_requested = true;
    }

    pub fn handle_input(&mut self, event: InputEvent) -> Routed {
        let Lifecycle::Active(inst) = &mut self.lifecycle else {
            return Routed::Ignored;
        };
        let inst = &mut **inst;

        let routed = self
            .router
            .route(event, &mut inst.orbit, &mut inst.zoom, &self.config);
        if let Routed::Zoomed(side) = routed {
            let fov = inst.zoom[side.index()].fov_deg;
            inst.sides[side.index()].camera.set_fov(fov);
        }
        if routed.consumed() {
            self.redraw_requested = true;
        }
        routed
    }

    /// Apply finished texture loads. Returns how many textures were swapped in.
    pub fn poll_textures(&mut self, backend: &mut B) -> usize {
        let Lifecycle::Active(inst) = &mut self.lifecycle else {
            return 0;
        };
        let inst = &mut **inst;

        let mut applied = 0;
        while let Ok(event) = inst.textures.try_recv() {
            if event.generation != inst.generation || !inst.liveness.is_alive() {
                continue;
            }
            let view = &mut inst.sides[event.side.index()];
            match event.result {
                Ok(image) => {
                    let Some(scene) = view.scene.as_mut() else {
                        continue;
                    };
                    backend.bind_texture(scene, &image);
                    view.texture = TextureStatus::Ready;
                    applied += 1;
                    log::debug!(
                        "{} texture bound ({}x{})",
                        event.side,
                        image.width(),
                        image.height()
                    );
                }
                Err(e) => {
                    view.texture = TextureStatus::Failed;
                    log::error!("{} texture failed: {}: {}", event.side, event.locator, e);
                }
            }
        }

        if applied > 0 {
            self.redraw_requested = true;
        }
        applied
    }

    /// One tick of the render loop: aim both cameras from a single read of
    /// the orbit state and draw each side once.
    pub fn render_frame(&mut self, backend: &mut B, frame: &mut B::Frame) -> Tick {
        let Lifecycle::Active(inst) = &mut self.lifecycle else {
            return Tick::Stop;
        };
        let inst = &mut **inst;

        if inst.render_loop.tick() == Tick::Stop {
            return Tick::Stop;
        }

        let target = inst
            .orbit
            .look_target(self.config.sphere_radius, self.config.lat_limit);
        for view in inst.sides.iter_mut() {
            view.camera.look_at(target);
            view.camera.set_fov(inst.zoom[view.side.index()].fov_deg);
            if let (Some(scene), Some(surface)) = (&view.scene, &view.surface) {
                backend.draw(frame, scene, surface, &view.camera);
            }
        }
        self.redraw_requested = false;
        Tick::Render
    }
}

impl<B: RenderBackend> Drop for PanoramaEngine<B> {
    fn drop(&mut self) {
        if let Lifecycle::Active(inst) = &self.lifecycle {
            // resources go down with the instance; stop stragglers delivering
            inst.liveness.kill();
            log::warn!("panorama engine dropped without dispose");
        }
    }
}

fn create_side<B: RenderBackend>(
    backend: &mut B,
    side: Side,
    rect: SurfaceRect,
) -> Result<(B::Surface, B::Scene), EngineError> {
    let surface = backend.create_surface(side, rect)?;
    match backend.create_scene(side) {
        Ok(scene) => Ok((surface, scene)),
        Err(e) => {
            backend.release_surface(surface);
            Err(e)
        }
    }
}
