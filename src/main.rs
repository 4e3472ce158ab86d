// main.rs — window, event routing and the egui overlay around the engine

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide the console in release builds

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context as _;
use clap::Parser;
use winit::{
    dpi::LogicalSize,
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::{Fullscreen, Window, WindowBuilder},
};

use dual_pano::i18n::{self, tr};
use dual_pano::input::{DropTarget, InputEvent};
use dual_pano::ui::{self, StatusSnapshot, UiAction, UiState};
use dual_pano::{
    GpuRenderer, InputRouter, PanoramaDescriptor, PanoramaEngine, PanoramaPair, Side, ThreadedLoader,
    Tick, ViewerConfig, WinitInputAdapter,
};

/// Compare two equirectangular panoramas with a shared, synchronised view.
#[derive(Parser, Debug)]
#[command(name = "dual-pano-viewer", version, about)]
struct Cli {
    /// Left panorama: http(s) URL, file:// URL or path
    #[arg(long)]
    left: Option<String>,
    /// Right panorama: http(s) URL, file:// URL or path
    #[arg(long)]
    right: Option<String>,

    #[arg(long, allow_negative_numbers = true)]
    left_heading: Option<f32>,
    #[arg(long, allow_negative_numbers = true)]
    left_pitch: Option<f32>,
    #[arg(long, allow_negative_numbers = true)]
    left_vfov: Option<f32>,
    #[arg(long, allow_negative_numbers = true)]
    right_heading: Option<f32>,
    #[arg(long, allow_negative_numbers = true)]
    right_pitch: Option<f32>,
    #[arg(long, allow_negative_numbers = true)]
    right_vfov: Option<f32>,

    /// TOML file overriding viewer defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// UI language (en, pt-BR); falls back to DUAL_PANO_LANG
    #[arg(long)]
    lang: Option<String>,
}

impl Cli {
    fn panoramas(&self) -> PanoramaPair {
        let side = |locator: &Option<String>, heading, pitch, vfov| PanoramaDescriptor {
            image_locator: locator.clone().unwrap_or_default(),
            initial_heading_deg: heading,
            initial_pitch_deg: pitch,
            vertical_fov_deg: vfov,
        };
        PanoramaPair::new(
            side(&self.left, self.left_heading, self.left_pitch, self.left_vfov),
            side(&self.right, self.right_heading, self.right_pitch, self.right_vfov),
        )
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ViewerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ViewerConfig::default(),
    };

    i18n::init(i18n::resolve_lang(cli.lang.as_deref()));

    let event_loop = EventLoop::new();
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(tr("window.title"))
            .with_inner_size(LogicalSize::new(1600, 800))
            .build(&event_loop)
            .context("creating window")?,
    );

    let mut renderer = pollster::block_on(GpuRenderer::new(window.clone(), &config))
        .context("initialising GPU")?;
    let mut ui_state = UiState::new(i18n::current_lang(), config.vsync);
    let mut engine = PanoramaEngine::new(config, InputRouter::new(), Box::new(ThreadedLoader));
    let mut adapter = WinitInputAdapter::new();
    let mut drop_target = DropTarget::new();

    let size = window.inner_size();
    engine.set_window_size(size.width, size.height, &mut renderer);
    if let Err(e) = engine.set_descriptors(cli.panoramas(), &mut renderer) {
        log::error!("could not start panorama engine: {e}");
    }

    // FPS
    let mut last_fps_time = Instant::now();
    let mut frame_count = 0u32;
    let mut fps = 0.0f32;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::WindowEvent { event, .. } => {
                let response = renderer.egui_state.on_event(&renderer.egui_ctx, &event);
                if response.repaint {
                    window.request_redraw();
                }

                // The overlay may only swallow events that start an interaction;
                // moves and releases always reach an in-progress drag.
                if let Some(input) = adapter.translate(&event, engine.config()) {
                    let starts = matches!(input, InputEvent::PointerDown { .. } | InputEvent::Wheel { .. });
                    if !(response.consumed && starts) {
                        engine.handle_input(input);
                    }
                }
                match &event {
                    WindowEvent::HoveredFile(_) => {
                        drop_target.hover(side_under_cursor(&engine, &adapter))
                    }
                    WindowEvent::HoveredFileCancelled => drop_target.cancel(),
                    WindowEvent::CursorMoved { .. } => {
                        drop_target.track(side_under_cursor(&engine, &adapter))
                    }
                    _ => {}
                }
                if response.consumed {
                    return;
                }

                match event {
                    WindowEvent::CloseRequested => {
                        engine.dispose(&mut renderer);
                        *control_flow = ControlFlow::Exit;
                    }

                    WindowEvent::Resized(new_size) => {
                        renderer.resize(new_size);
                        engine.set_window_size(new_size.width, new_size.height, &mut renderer);
                    }

                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        let new_size = *new_inner_size;
                        renderer.resize(new_size);
                        engine.set_window_size(new_size.width, new_size.height, &mut renderer);
                    }

                    WindowEvent::KeyboardInput { input, .. } if input.state == ElementState::Pressed => {
                        match input.virtual_keycode {
                            Some(VirtualKeyCode::O) => {
                                let side = side_under_cursor(&engine, &adapter).unwrap_or(Side::Left);
                                if let Some(path) = ui::pick_panorama(side) {
                                    open_panorama(&mut engine, &mut renderer, side, &path);
                                }
                            }
                            Some(VirtualKeyCode::R) => {
                                if let Err(e) = engine.reset(&mut renderer) {
                                    log::error!("reset failed: {e}");
                                }
                            }
                            Some(VirtualKeyCode::F11) => {
                                ui_state.fullscreen = !ui_state.fullscreen;
                                set_fullscreen(&window, ui_state.fullscreen);
                            }
                            Some(VirtualKeyCode::Escape) if ui_state.fullscreen => {
                                ui_state.fullscreen = false;
                                set_fullscreen(&window, false);
                            }
                            _ => {}
                        }
                    }

                    WindowEvent::DroppedFile(path) => {
                        let side = drop_target.take(engine.descriptors());
                        if ui::is_image_path(&path) {
                            open_panorama(&mut engine, &mut renderer, side, &path);
                        } else {
                            log::warn!("ignoring dropped file {}", path.display());
                        }
                    }

                    _ => {}
                }
                window.request_redraw();
            }

            Event::RedrawRequested(_) => {
                frame_count += 1;
                let now = Instant::now();
                let elapsed = now.duration_since(last_fps_time).as_secs_f32();
                if elapsed >= 1.0 {
                    fps = frame_count as f32 / elapsed;
                    frame_count = 0;
                    last_fps_time = now;
                }

                let mut frame = match renderer.begin_frame() {
                    Ok(frame) => frame,
                    Err(wgpu::SurfaceError::Lost) => {
                        renderer.resize(renderer.size);
                        window.request_redraw();
                        return;
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("GPU out of memory, exiting");
                        engine.dispose(&mut renderer);
                        *control_flow = ControlFlow::Exit;
                        return;
                    }
                    Err(e) => {
                        log::warn!("skipping frame: {e:?}");
                        window.request_redraw();
                        return;
                    }
                };

                let tick = engine.render_frame(&mut renderer, &mut frame);
                let status = snapshot(&engine, &drop_target, fps);
                let mut actions = Vec::new();
                renderer.finish_frame(frame, &window, |ctx| {
                    actions = ui::draw_ui(ctx, &mut ui_state, &status);
                });

                for action in actions {
                    match action {
                        UiAction::Open(side, path) => {
                            open_panorama(&mut engine, &mut renderer, side, &path)
                        }
                        UiAction::Reset => {
                            if let Err(e) = engine.reset(&mut renderer) {
                                log::error!("reset failed: {e}");
                            }
                        }
                        UiAction::SetFullscreen(on) => set_fullscreen(&window, on),
                        UiAction::SetVsync(on) => renderer.set_vsync(on),
                        UiAction::SetLanguage(lang) => {
                            i18n::init(lang);
                            window.set_title(&tr("window.title"));
                        }
                        UiAction::Exit => {
                            engine.dispose(&mut renderer);
                            *control_flow = ControlFlow::Exit;
                        }
                    }
                }

                // the render loop reschedules itself only while alive
                if tick == Tick::Render {
                    window.request_redraw();
                }
            }

            Event::MainEventsCleared => {
                engine.poll_textures(&mut renderer);
                if engine.take_redraw_request() {
                    window.request_redraw();
                }
            }

            Event::LoopDestroyed => {
                engine.dispose(&mut renderer);
            }

            _ => {}
        }
    });
}

fn side_under_cursor(engine: &PanoramaEngine<GpuRenderer>, adapter: &WinitInputAdapter) -> Option<Side> {
    let (x, y) = adapter.cursor()?;
    engine.router().hit_test(x, y)
}

/// Replace one side's image; capture metadata belongs to the old image and is dropped.
fn open_panorama(engine: &mut PanoramaEngine<GpuRenderer>, renderer: &mut GpuRenderer, side: Side, path: &Path) {
    let mut pair = engine.descriptors().clone();
    *pair.get_mut(side) = PanoramaDescriptor::new(path.to_string_lossy());
    log::info!("{} panorama set to {}", side, path.display());
    if let Err(e) = engine.set_descriptors(pair, renderer) {
        log::error!("could not rebuild panorama engine: {e}");
    }
}

fn set_fullscreen(window: &Window, on: bool) {
    if on {
        window.set_fullscreen(Some(Fullscreen::Borderless(None)));
    } else {
        window.set_fullscreen(None);
    }
}

fn snapshot(engine: &PanoramaEngine<GpuRenderer>, drop_target: &DropTarget, fps: f32) -> StatusSnapshot {
    StatusSnapshot {
        drop_side: drop_target.hovered(engine.descriptors()),
        state: engine.state(),
        fov: Side::ALL.map(|side| engine.fov(side)),
        orbit: engine.orbit().map(|o| (o.lon_deg, o.lat_deg)),
        textures: Side::ALL.map(|side| engine.texture_status(side)),
        fps,
    }
}
