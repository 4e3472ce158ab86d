// input.rs — pointer/wheel routing across both render surfaces
//
// The router listens to the whole window, not to one surface, so a drag that
// starts on one side keeps steering after the pointer crosses to the other
// side or leaves both.

use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, TouchPhase, WindowEvent};

use crate::config::ViewerConfig;
use crate::layout::SurfaceRect;
use crate::orbit::{DragSession, OrbitState, PointerId};
use crate::panorama::{PanoramaPair, Side};
use crate::zoom::ZoomState;

/// Host-neutral input, in window physical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { pointer: PointerId, x: f32, y: f32 },
    PointerMove { pointer: PointerId, x: f32, y: f32 },
    PointerUp { pointer: PointerId },
    PointerCancel { pointer: PointerId },
    /// Positive `delta_y` zooms out, as with a browser wheel event.
    Wheel { x: f32, y: f32, delta_y: f32 },
}

impl InputEvent {
    /// Release events must reach the router even if an overlay consumed them.
    pub fn is_release(&self) -> bool {
        matches!(self, InputEvent::PointerUp { .. } | InputEvent::PointerCancel { .. })
    }
}

/// What the router did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed {
    Ignored,
    DragStarted(Side),
    Orbited,
    DragEnded,
    Zoomed(Side),
}

impl Routed {
    pub fn consumed(&self) -> bool {
        !matches!(self, Routed::Ignored)
    }
}

/// Owns listener registration and the single drag-session slot.
#[derive(Debug, Default)]
pub struct InputRouter {
    attached: bool,
    rects: [SurfaceRect; 2],
    drag: Option<DragSession>,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self) {
        self.attached = true;
    }

    /// Stop listening and drop any in-progress drag.
    pub fn detach(&mut self) {
        self.attached = false;
        self.drag = None;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn drag_session(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    pub fn set_rect(&mut self, side: Side, rect: SurfaceRect) {
        self.rects[side.index()] = rect;
    }

    pub fn rect(&self, side: Side) -> SurfaceRect {
        self.rects[side.index()]
    }

    pub fn hit_test(&self, x: f32, y: f32) -> Option<Side> {
        Side::ALL
            .into_iter()
            .find(|side| self.rects[side.index()].contains(x, y))
    }

    pub fn route(
        &mut self,
        event: InputEvent,
        orbit: &mut OrbitState,
        zoom: &mut [ZoomState; 2],
        config: &ViewerConfig,
    ) -> Routed {
        if !self.attached {
            return Routed::Ignored;
        }

        match event {
            InputEvent::PointerDown { pointer, x, y } => {
                if self.drag.is_some() {
                    return Routed::Ignored;
                }
                let Some(side) = self.hit_test(x, y) else {
                    return Routed::Ignored;
                };
                self.drag = Some(DragSession::begin(pointer, x, y, orbit));
                Routed::DragStarted(side)
            }
            InputEvent::PointerMove { pointer, x, y } => match &self.drag {
                Some(drag) if drag.owns(pointer) => {
                    *orbit = drag
                        .orbit_at(x, y, config.drag_sensitivity)
                        .clamp_lat(config.lat_limit);
                    Routed::Orbited
                }
                _ => Routed::Ignored,
            },
            InputEvent::PointerUp { pointer } | InputEvent::PointerCancel { pointer } => {
                if self.drag.is_some_and(|drag| drag.owns(pointer)) {
                    self.drag = None;
                    Routed::DragEnded
                } else {
                    Routed::Ignored
                }
            }
            InputEvent::Wheel { x, y, delta_y } => {
                let Some(side) = self.hit_test(x, y) else {
                    return Routed::Ignored;
                };
                zoom[side.index()].apply_wheel(delta_y, config);
                Routed::Zoomed(side)
            }
        }
    }
}

/// Turns winit window events into [`InputEvent`]s, tracking the cursor
/// position that mouse buttons and wheels do not carry themselves.
#[derive(Debug, Default)]
pub struct WinitInputAdapter {
    cursor: Option<PhysicalPosition<f64>>,
}

impl WinitInputAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> Option<(f32, f32)> {
        self.cursor.map(|p| (p.x as f32, p.y as f32))
    }

    pub fn translate(&mut self, event: &WindowEvent<'_>, config: &ViewerConfig) -> Option<InputEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Some(*position);
                Some(InputEvent::PointerMove {
                    pointer: PointerId::Mouse,
                    x: position.x as f32,
                    y: position.y as f32,
                })
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => {
                    let (x, y) = self.cursor()?;
                    Some(InputEvent::PointerDown {
                        pointer: PointerId::Mouse,
                        x,
                        y,
                    })
                }
                ElementState::Released => Some(InputEvent::PointerUp {
                    pointer: PointerId::Mouse,
                }),
            },
            WindowEvent::Touch(touch) => {
                let pointer = PointerId::Touch(touch.id);
                let (x, y) = (touch.location.x as f32, touch.location.y as f32);
                Some(match touch.phase {
                    TouchPhase::Started => InputEvent::PointerDown { pointer, x, y },
                    TouchPhase::Moved => InputEvent::PointerMove { pointer, x, y },
                    TouchPhase::Ended => InputEvent::PointerUp { pointer },
                    TouchPhase::Cancelled => InputEvent::PointerCancel { pointer },
                })
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let (x, y) = self.cursor()?;
                Some(InputEvent::Wheel {
                    x,
                    y,
                    delta_y: wheel_delta_y(*delta, config.wheel_line_px),
                })
            }
            WindowEvent::TouchpadMagnify { delta, .. } => {
                let (x, y) = self.cursor()?;
                Some(InputEvent::Wheel {
                    x,
                    y,
                    delta_y: -(*delta as f32) * config.pinch_scale,
                })
            }
            _ => None,
        }
    }
}

/// Side an OS file drag will land on.
///
/// Many platforms stop sending cursor moves while a file is dragged over the
/// window, so the side is fixed when the drag enters and only refined by the
/// moves that do arrive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DropTarget {
    hovering: bool,
    side: Option<Side>,
}

impl DropTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// A file entered the window; `side` is the surface under the cursor, if known.
    pub fn hover(&mut self, side: Option<Side>) {
        self.hovering = true;
        if side.is_some() {
            self.side = side;
        }
    }

    pub fn track(&mut self, side: Option<Side>) {
        if self.hovering && side.is_some() {
            self.side = side;
        }
    }

    pub fn cancel(&mut self) {
        *self = Self::default();
    }

    /// The side shown to the user while a file hovers over the window.
    pub fn hovered(&self, pair: &PanoramaPair) -> Option<Side> {
        self.hovering.then(|| self.resolve(pair))
    }

    /// Side for a dropped file: the hovered side, else the first side without
    /// an image, else the left one. Ends the hover.
    pub fn take(&mut self, pair: &PanoramaPair) -> Side {
        let side = self.resolve(pair);
        self.cancel();
        side
    }

    fn resolve(&self, pair: &PanoramaPair) -> Side {
        self.side
            .or_else(|| Side::ALL.into_iter().find(|side| !pair.get(*side).has_locator()))
            .unwrap_or(Side::Left)
    }
}

/// winit reports scrolling "up" as positive; browsers report it as negative
/// deltaY, which is the convention the zoom math expects.
pub fn wheel_delta_y(delta: MouseScrollDelta, line_px: f32) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -y * line_px,
        MouseScrollDelta::PixelDelta(pos) => -(pos.y as f32),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> InputRouter {
        let mut router = InputRouter::new();
        router.set_rect(Side::Left, SurfaceRect::new(0, 0, 400, 400));
        router.set_rect(Side::Right, SurfaceRect::new(400, 0, 400, 400));
        router.attach();
        router
    }

    fn zooms() -> [ZoomState; 2] {
        [ZoomState { fov_deg: 75.0 }, ZoomState { fov_deg: 75.0 }]
    }

    #[test]
    fn detached_router_ignores_everything() {
        let mut router = router();
        router.detach();
        let mut orbit = OrbitState::default();
        let routed = router.route(
            InputEvent::PointerDown { pointer: PointerId::Mouse, x: 10.0, y: 10.0 },
            &mut orbit,
            &mut zooms(),
            &ViewerConfig::default(),
        );
        assert_eq!(routed, Routed::Ignored);
        assert!(router.drag_session().is_none());
    }

    #[test]
    fn drag_continues_outside_starting_surface() {
        let config = ViewerConfig::default();
        let mut router = router();
        let mut orbit = OrbitState::default();
        let mut zoom = zooms();

        let down = InputEvent::PointerDown { pointer: PointerId::Mouse, x: 350.0, y: 200.0 };
        assert_eq!(router.route(down, &mut orbit, &mut zoom, &config), Routed::DragStarted(Side::Left));

        // across the right surface and then out of the window entirely
        let mv = InputEvent::PointerMove { pointer: PointerId::Mouse, x: 950.0, y: 200.0 };
        assert_eq!(router.route(mv, &mut orbit, &mut zoom, &config), Routed::Orbited);
        assert!((orbit.lon_deg - -60.0).abs() < 1e-3);
    }

    #[test]
    fn second_pointer_cannot_steal_session() {
        let config = ViewerConfig::default();
        let mut router = router();
        let mut orbit = OrbitState::default();
        let mut zoom = zooms();
        let first = PointerId::Touch(1);
        let second = PointerId::Touch(2);

        router.route(InputEvent::PointerDown { pointer: first, x: 100.0, y: 100.0 }, &mut orbit, &mut zoom, &config);
        let down2 = InputEvent::PointerDown { pointer: second, x: 500.0, y: 100.0 };
        assert_eq!(router.route(down2, &mut orbit, &mut zoom, &config), Routed::Ignored);

        let mv2 = InputEvent::PointerMove { pointer: second, x: 0.0, y: 0.0 };
        assert_eq!(router.route(mv2, &mut orbit, &mut zoom, &config), Routed::Ignored);
        assert_eq!(orbit, OrbitState::default());

        let up2 = InputEvent::PointerUp { pointer: second };
        assert_eq!(router.route(up2, &mut orbit, &mut zoom, &config), Routed::Ignored);
        assert!(router.drag_session().is_some());

        let cancel1 = InputEvent::PointerCancel { pointer: first };
        assert_eq!(router.route(cancel1, &mut orbit, &mut zoom, &config), Routed::DragEnded);
        assert!(router.drag_session().is_none());
    }

    #[test]
    fn pointer_down_outside_surfaces_is_ignored() {
        let config = ViewerConfig::default();
        let mut router = router();
        let down = InputEvent::PointerDown { pointer: PointerId::Mouse, x: 900.0, y: 10.0 };
        let routed = router.route(down, &mut OrbitState::default(), &mut zooms(), &config);
        assert_eq!(routed, Routed::Ignored);
    }

    #[test]
    fn wheel_only_zooms_hovered_side() {
        let config = ViewerConfig::default();
        let mut router = router();
        let mut zoom = zooms();
        let wheel = InputEvent::Wheel { x: 100.0, y: 100.0, delta_y: 1000.0 };
        let routed = router.route(wheel, &mut OrbitState::default(), &mut zoom, &config);
        assert_eq!(routed, Routed::Zoomed(Side::Left));
        assert_eq!(zoom[0].fov_deg, 100.0);
        assert_eq!(zoom[1].fov_deg, 75.0);
    }

    #[test]
    fn drop_lands_on_side_hovered_when_drag_entered() {
        let pair = PanoramaPair::default();
        let mut target = DropTarget::new();
        assert_eq!(target.hovered(&pair), None);

        target.hover(Some(Side::Right));
        // no cursor position reported mid-drag
        target.track(None);
        assert_eq!(target.hovered(&pair), Some(Side::Right));
        assert_eq!(target.take(&pair), Side::Right);
        assert_eq!(target.hovered(&pair), None);
    }

    #[test]
    fn drop_follows_cursor_moves_that_do_arrive() {
        let pair = PanoramaPair::default();
        let mut target = DropTarget::new();
        target.track(Some(Side::Left));
        assert_eq!(target.hovered(&pair), None);

        target.hover(Some(Side::Left));
        target.track(Some(Side::Right));
        assert_eq!(target.take(&pair), Side::Right);
    }

    #[test]
    fn drop_without_position_fills_first_empty_side() {
        use crate::panorama::PanoramaDescriptor;

        let pair = PanoramaPair::new(PanoramaDescriptor::new("a.jpg"), PanoramaDescriptor::default());
        let mut target = DropTarget::new();
        target.hover(None);
        assert_eq!(target.take(&pair), Side::Right);

        let full = PanoramaPair::new(PanoramaDescriptor::new("a.jpg"), PanoramaDescriptor::new("b.jpg"));
        assert_eq!(target.take(&full), Side::Left);
    }

    #[test]
    fn cancelled_hover_forgets_side() {
        let pair = PanoramaPair::default();
        let mut target = DropTarget::new();
        target.hover(Some(Side::Right));
        target.cancel();
        assert_eq!(target.hovered(&pair), None);
        assert_eq!(target.take(&pair), Side::Left);
    }

    #[test]
    fn wheel_line_delta_is_flipped_to_browser_convention() {
        assert_eq!(wheel_delta_y(MouseScrollDelta::LineDelta(0.0, 1.0), 100.0), -100.0);
        assert_eq!(
            wheel_delta_y(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -30.0)), 100.0),
            30.0
        );
    }

    #[test]
    fn mouse_press_needs_known_cursor() {
        let config = ViewerConfig::default();
        let mut adapter = WinitInputAdapter::new();
        let device_id = unsafe { winit::event::DeviceId::dummy() };
        #[allow(deprecated)]
        let press = WindowEvent::MouseInput {
            device_id,
            state: ElementState::Pressed,
            button: MouseButton::Left,
            modifiers: Default::default(),
        };
        assert_eq!(adapter.translate(&press, &config), None);

        #[allow(deprecated)]
        let moved = WindowEvent::CursorMoved {
            device_id,
            position: PhysicalPosition::new(12.0, 34.0),
            modifiers: Default::default(),
        };
        adapter.translate(&moved, &config);
        assert_eq!(
            adapter.translate(&press, &config),
            Some(InputEvent::PointerDown { pointer: PointerId::Mouse, x: 12.0, y: 34.0 })
        );
    }
}
