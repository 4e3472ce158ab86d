// orbit.rs — shared look direction (lon/lat) and drag sessions

use glam::Vec3;

use crate::panorama::PanoramaPair;

/// Yaw/pitch in degrees shared by both cameras.
///
/// Writers keep `lat_deg` inside `±lat_limit` via [`OrbitState::clamp_lat`];
/// [`OrbitState::look_target`] clamps again so a camera never sees more.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrbitState {
    pub lon_deg: f32,
    pub lat_deg: f32,
}

impl OrbitState {
    pub fn new(lon_deg: f32, lat_deg: f32) -> Self {
        Self { lon_deg, lat_deg }
    }

    /// Start orientation for a pair. Pitch is stored negated: a positive
    /// capture pitch (camera tilted up) is a negative `lat`.
    pub fn from_pair(pair: &PanoramaPair) -> Self {
        Self {
            lon_deg: pair.initial_heading_deg().unwrap_or(0.0),
            lat_deg: -pair.initial_pitch_deg().unwrap_or(0.0),
        }
    }

    pub fn clamped_lat(&self, lat_limit: f32) -> f32 {
        self.lat_deg.clamp(-lat_limit, lat_limit)
    }

    pub fn clamp_lat(mut self, lat_limit: f32) -> Self {
        self.lat_deg = self.clamped_lat(lat_limit);
        self
    }

    /// Point on the sphere of `radius` the cameras look at.
    pub fn look_target(&self, radius: f32, lat_limit: f32) -> Vec3 {
        let phi = (90.0 - self.clamped_lat(lat_limit)).to_radians();
        let theta = self.lon_deg.to_radians();

        Vec3::new(
            radius * phi.sin() * theta.cos(),
            radius * phi.cos(),
            radius * phi.sin() * theta.sin(),
        )
    }
}

/// Identity of the input device driving a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerId {
    Mouse,
    Touch(u64),
}

/// An in-progress drag, owned by exactly one pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub pointer: PointerId,
    pub start_x: f32,
    pub start_y: f32,
    pub start_lon: f32,
    pub start_lat: f32,
}

impl DragSession {
    pub fn begin(pointer: PointerId, x: f32, y: f32, orbit: &OrbitState) -> Self {
        Self {
            pointer,
            start_x: x,
            start_y: y,
            start_lon: orbit.lon_deg,
            start_lat: orbit.lat_deg,
        }
    }

    pub fn owns(&self, pointer: PointerId) -> bool {
        self.pointer == pointer
    }

    /// Orientation for the pointer now at `(x, y)`. Dragging right turns the
    /// view left; dragging down tilts it up.
    pub fn orbit_at(&self, x: f32, y: f32, sensitivity: f32) -> OrbitState {
        OrbitState {
            lon_deg: self.start_lon - (x - self.start_x) * sensitivity,
            lat_deg: self.start_lat + (y - self.start_y) * sensitivity,
        }
    }
}
