// camera.rs — perspective camera placed at the sphere centre

use glam::{Mat4, Vec3};

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

#[derive(Debug, Clone)]
pub struct CameraRig {
    fov_deg: f32,
    aspect: f32,
    near: f32,
    far: f32,
    target: Vec3,
    view: Mat4,
    projection: Mat4,
}

impl CameraRig {
    pub fn new(fov_deg: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            fov_deg,
            aspect: sanitize_aspect(aspect),
            near,
            far,
            target: Vec3::X,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        };
        camera.look_at(Vec3::X);
        camera.update_projection();
        camera
    }

    pub fn fov_deg(&self) -> f32 {
        self.fov_deg
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Orient from the origin toward `target`.
    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
        self.view = Mat4::look_at_rh(Vec3::ZERO, target, Vec3::Y);
    }

    /// Returns true when the projection had to be rebuilt.
    pub fn set_fov(&mut self, fov_deg: f32) -> bool {
        if fov_deg == self.fov_deg {
            return false;
        }
        self.fov_deg = fov_deg;
        self.update_projection();
        true
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = sanitize_aspect(aspect);
        self.update_projection();
    }

    pub fn update_projection(&mut self) {
        self.projection =
            Mat4::perspective_rh(self.fov_deg.to_radians(), self.aspect, self.near, self.far);
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    pub fn uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_projection().to_cols_array_2d(),
        }
    }
}

// A collapsed surface reports 0 or NaN; fall back to square.
fn sanitize_aspect(aspect: f32) -> f32 {
    if aspect.is_finite() && aspect > 0.0 {
        aspect
    } else {
        1.0
    }
}
