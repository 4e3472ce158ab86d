// layout.rs — where each render surface sits in the window, and resize tracking

use serde::Deserialize;

use crate::panorama::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    SideBySide,
    Stacked,
}

/// Pixel dimensions of one render surface's backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect(&self) -> f32 {
        if self.is_empty() {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// A rectangle of the window in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl SurfaceRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.width, self.height)
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x as f32
            && py >= self.y as f32
            && px < (self.x + self.width) as f32
            && py < (self.y + self.height) as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitLayout {
    pub orientation: Orientation,
    pub divider_px: u32,
}

impl SplitLayout {
    pub fn new(orientation: Orientation, divider_px: u32) -> Self {
        Self {
            orientation,
            divider_px,
        }
    }

    /// Rectangles for `[left, right]` inside a window of the given size.
    pub fn rects(&self, window_width: u32, window_height: u32) -> [SurfaceRect; 2] {
        match self.orientation {
            Orientation::SideBySide => {
                let (first, second, offset) = split(window_width, self.divider_px);
                [
                    SurfaceRect::new(0, 0, first, window_height),
                    SurfaceRect::new(offset, 0, second, window_height),
                ]
            }
            Orientation::Stacked => {
                let (first, second, offset) = split(window_height, self.divider_px);
                [
                    SurfaceRect::new(0, 0, window_width, first),
                    SurfaceRect::new(0, offset, window_width, second),
                ]
            }
        }
    }
}

// (first length, second length, second offset)
fn split(total: u32, divider: u32) -> (u32, u32, u32) {
    let divider = divider.min(total);
    let usable = total - divider;
    let first = usable / 2;
    let second = usable - first;
    (first, second, first + divider)
}

/// Remembers the last rectangle applied to each side and reports real
/// changes.
#[derive(Debug, Clone, Default)]
pub struct ResizeWatcher {
    applied: [Option<SurfaceRect>; 2],
}

impl ResizeWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the rectangle to apply, or `None` when nothing changed or the
    /// surface is not ready (zero-sized).
    pub fn observe(&mut self, side: Side, rect: SurfaceRect) -> Option<SurfaceRect> {
        if rect.size().is_empty() {
            return None;
        }
        let slot = &mut self.applied[side.index()];
        if *slot == Some(rect) {
            return None;
        }
        *slot = Some(rect);
        Some(rect)
    }

    pub fn forget(&mut self) {
        self.applied = [None; 2];
    }
}
