// ui.rs — egui menu bar and status bar drawn over both panoramas

use std::path::PathBuf;

use crate::engine::{EngineState, TextureStatus};
use crate::i18n::{self, tr, tr_with};
use crate::panorama::Side;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "webp", "tif", "tiff"];

/// Toggles owned by the host window.
#[derive(Debug, Clone)]
pub struct UiState {
    pub show_fps: bool,
    pub vsync: bool,
    pub fullscreen: bool,
    pub lang: String,
}

impl UiState {
    pub fn new(lang: String, vsync: bool) -> Self {
        Self {
            show_fps: false,
            vsync,
            fullscreen: false,
            lang,
        }
    }
}

/// Read-only view of the engine for one UI frame.
#[derive(Debug, Clone, Copy)]
pub struct StatusSnapshot {
    pub state: EngineState,
    pub fov: [Option<f32>; 2],
    pub orbit: Option<(f32, f32)>,
    pub textures: [Option<TextureStatus>; 2],
    pub fps: f32,
    /// Where a file being dragged over the window would open.
    pub drop_side: Option<Side>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    Open(Side, PathBuf),
    Reset,
    SetFullscreen(bool),
    SetVsync(bool),
    SetLanguage(String),
    Exit,
}

pub fn pick_panorama(side: Side) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title(&tr_with("dialog.open_title", &[("side", side_label(side))]))
        .add_filter(&tr("dialog.images"), IMAGE_EXTENSIONS)
        .pick_file()
}

pub fn is_image_path(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext)))
}

pub fn side_label(side: Side) -> String {
    match side {
        Side::Left => tr("side.left"),
        Side::Right => tr("side.right"),
    }
}

fn state_label(state: EngineState) -> String {
    match state {
        EngineState::Idle => tr("state.idle"),
        EngineState::Active => tr("state.active"),
        EngineState::Disposing => tr("state.disposing"),
    }
}

fn texture_label(status: Option<TextureStatus>) -> egui::RichText {
    match status {
        None => egui::RichText::new(tr("texture.none")),
        Some(TextureStatus::Loading) => {
            egui::RichText::new(tr("texture.loading")).color(egui::Color32::YELLOW)
        }
        Some(TextureStatus::Ready) => egui::RichText::new(tr("texture.ready")),
        Some(TextureStatus::Failed) => {
            egui::RichText::new(tr("texture.failed")).color(egui::Color32::LIGHT_RED)
        }
    }
}

/// Draw the overlay and collect what the user asked for this frame.
pub fn draw_ui(ctx: &egui::Context, state: &mut UiState, status: &StatusSnapshot) -> Vec<UiAction> {
    let mut actions = Vec::new();

    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            ui.menu_button(tr("menu.file"), |ui| {
                for (side, key) in [(Side::Left, "menu.open_left"), (Side::Right, "menu.open_right")] {
                    if ui.button(tr(key)).clicked() {
                        ui.close_menu();
                        if let Some(path) = pick_panorama(side) {
                            actions.push(UiAction::Open(side, path));
                        }
                    }
                }
                ui.separator();
                if ui.button(tr("menu.exit")).clicked() {
                    ui.close_menu();
                    actions.push(UiAction::Exit);
                }
            });

            ui.menu_button(tr("menu.view"), |ui| {
                if ui.button(tr("menu.reset")).clicked() {
                    ui.close_menu();
                    actions.push(UiAction::Reset);
                }
                if ui.checkbox(&mut state.fullscreen, tr("menu.fullscreen")).clicked() {
                    ui.close_menu();
                    actions.push(UiAction::SetFullscreen(state.fullscreen));
                }
                ui.separator();
                if ui.checkbox(&mut state.show_fps, tr("menu.show_fps")).clicked() {
                    ui.close_menu();
                }
                if ui.checkbox(&mut state.vsync, tr("menu.vsync")).clicked() {
                    actions.push(UiAction::SetVsync(state.vsync));
                }
            });

            ui.menu_button(tr("menu.language"), |ui| {
                for (code, name) in i18n::LANGUAGES {
                    if ui.radio_value(&mut state.lang, code.to_string(), *name).clicked() {
                        ui.close_menu();
                        actions.push(UiAction::SetLanguage(state.lang.clone()));
                    }
                }
            });
        });
    });

    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.label(tr_with("status.state", &[("state", state_label(status.state))]));

            for side in Side::ALL {
                if let Some(fov) = status.fov[side.index()] {
                    ui.label("|");
                    ui.label(tr_with(
                        "status.fov",
                        &[("side", side_label(side)), ("fov", format!("{fov:.1}"))],
                    ));
                }
            }

            if let Some((lon, lat)) = status.orbit {
                ui.label("|");
                ui.label(tr_with(
                    "status.orbit",
                    &[("lon", format!("{lon:.1}")), ("lat", format!("{lat:.1}"))],
                ));
            }

            for side in Side::ALL {
                ui.label("|");
                ui.label(format!("{}:", side_label(side)));
                ui.label(texture_label(status.textures[side.index()]));
            }

            if state.show_fps {
                ui.label("|");
                ui.label(
                    egui::RichText::new(tr_with("status.fps", &[("fps", format!("{:.1}", status.fps))]))
                        .color(egui::Color32::GREEN),
                );
            }
        });
    });

    if let Some(side) = status.drop_side {
        egui::Area::new("drop_hint")
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .interactable(false)
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new(tr_with("hint.drop", &[("side", side_label(side))]))
                        .size(22.0)
                        .color(egui::Color32::WHITE),
                );
            });
    } else if status.state == EngineState::Idle {
        egui::Area::new("idle_hint")
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .interactable(false)
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new(tr("hint.idle"))
                        .size(18.0)
                        .color(egui::Color32::GRAY),
                );
            });
    }

    actions
}
