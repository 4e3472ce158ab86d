// zoom.rs — per-side field of view

use crate::config::ViewerConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomState {
    pub fov_deg: f32,
}

impl ZoomState {
    /// Construction-time FOV: the captured vfov (or the default) clamped to
    /// the initial range, which is wider than what the wheel can reach.
    pub fn initial(vertical_fov_deg: Option<f32>, config: &ViewerConfig) -> Self {
        let fov = vertical_fov_deg
            .filter(|v| v.is_finite())
            .unwrap_or(config.default_fov);
        Self {
            fov_deg: fov.clamp(config.initial_fov_min, config.initial_fov_max),
        }
    }

    /// Apply a wheel/pinch delta (positive = zoom out). Returns true when the
    /// FOV changed.
    pub fn apply_wheel(&mut self, delta_y: f32, config: &ViewerConfig) -> bool {
        if !delta_y.is_finite() {
            return false;
        }
        let next = (self.fov_deg + delta_y * config.zoom_speed)
            .clamp(config.zoom_min_fov, config.zoom_max_fov);
        let changed = next != self.fov_deg;
        self.fov_deg = next;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_fov_uses_wide_range() {
        let config = ViewerConfig::default();
        assert_eq!(ZoomState::initial(Some(180.0), &config).fov_deg, 120.0);
        assert_eq!(ZoomState::initial(Some(110.0), &config).fov_deg, 110.0);
        assert_eq!(ZoomState::initial(Some(10.0), &config).fov_deg, 30.0);
        assert_eq!(ZoomState::initial(None, &config).fov_deg, 75.0);
        assert_eq!(ZoomState::initial(Some(f32::NAN), &config).fov_deg, 75.0);
    }

    #[test]
    fn big_wheel_delta_clamps_to_max() {
        let config = ViewerConfig::default();
        let mut zoom = ZoomState { fov_deg: 75.0 };
        assert!(zoom.apply_wheel(1000.0, &config));
        assert_eq!(zoom.fov_deg, 100.0);
    }

    #[test]
    fn wheel_pulls_wide_initial_fov_into_zoom_range() {
        let config = ViewerConfig::default();
        let mut zoom = ZoomState::initial(Some(120.0), &config);
        zoom.apply_wheel(1.0, &config);
        assert_eq!(zoom.fov_deg, 100.0);
    }

    #[test]
    fn wheel_sequence_stays_in_range() {
        let config = ViewerConfig::default();
        let mut zoom = ZoomState::initial(None, &config);
        let deltas = [-300.0, 53.0, 1e6, -1e6, 12.5, -0.25, 400.0, f32::INFINITY, -87.0];
        for delta in deltas {
            zoom.apply_wheel(delta, &config);
            assert!((30.0..=100.0).contains(&zoom.fov_deg), "fov {}", zoom.fov_deg);
        }
    }

    #[test]
    fn clamped_wheel_reports_no_change() {
        let config = ViewerConfig::default();
        let mut zoom = ZoomState { fov_deg: 30.0 };
        assert!(!zoom.apply_wheel(-50.0, &config));
    }
}
