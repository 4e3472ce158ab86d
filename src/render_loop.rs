// render_loop.rs — self-rescheduling per-frame task
//
// The host's frame clock (vsync'd redraw requests) drives `tick`; the loop
// only asks for the next frame while its liveness token is set.

use crate::texture::Liveness;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Draw this frame, then request the next one.
    Render,
    /// Owner is gone: draw nothing and do not reschedule.
    Stop,
}

#[derive(Debug)]
pub struct RenderLoop {
    liveness: Liveness,
    running: bool,
}

impl RenderLoop {
    pub fn start(liveness: Liveness) -> Self {
        Self {
            liveness,
            running: true,
        }
    }

    pub fn tick(&mut self) -> Tick {
        if !self.running || !self.liveness.is_alive() {
            self.running = false;
            return Tick::Stop;
        }
        Tick::Render
    }

    pub fn cancel(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running && self.liveness.is_alive()
    }
}
