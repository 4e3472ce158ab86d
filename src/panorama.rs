// panorama.rs — panorama descriptors and side identity

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Left, Side::Right];

    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

/// One side's input: where the image lives plus optional capture metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanoramaDescriptor {
    pub image_locator: String,
    pub initial_heading_deg: Option<f32>,
    pub initial_pitch_deg: Option<f32>,
    pub vertical_fov_deg: Option<f32>,
}

impl PanoramaDescriptor {
    pub fn new(image_locator: impl Into<String>) -> Self {
        Self {
            image_locator: image_locator.into(),
            ..Default::default()
        }
    }

    pub fn with_heading(mut self, deg: f32) -> Self {
        self.initial_heading_deg = Some(deg);
        self
    }

    pub fn with_pitch(mut self, deg: f32) -> Self {
        self.initial_pitch_deg = Some(deg);
        self
    }

    pub fn with_vfov(mut self, deg: f32) -> Self {
        self.vertical_fov_deg = Some(deg);
        self
    }

    pub fn has_locator(&self) -> bool {
        !self.image_locator.trim().is_empty()
    }
}

/// The left/right descriptor pair an engine instance is built from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanoramaPair {
    pub left: PanoramaDescriptor,
    pub right: PanoramaDescriptor,
}

impl PanoramaPair {
    pub fn new(left: PanoramaDescriptor, right: PanoramaDescriptor) -> Self {
        Self { left, right }
    }

    pub fn get(&self, side: Side) -> &PanoramaDescriptor {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut PanoramaDescriptor {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    /// Both locators present: the only condition under which an engine activates.
    pub fn is_complete(&self) -> bool {
        self.left.has_locator() && self.right.has_locator()
    }

    /// Heading supplied by the left side, else the right side. Non-finite
    /// values count as not supplied.
    pub fn initial_heading_deg(&self) -> Option<f32> {
        finite(self.left.initial_heading_deg).or(finite(self.right.initial_heading_deg))
    }

    pub fn initial_pitch_deg(&self) -> Option<f32> {
        finite(self.left.initial_pitch_deg).or(finite(self.right.initial_pitch_deg))
    }
}

fn finite(value: Option<f32>) -> Option<f32> {
    value.filter(|v| v.is_finite())
}
