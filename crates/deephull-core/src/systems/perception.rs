//! Perception - view-cone and occlusion checks against the nav surface

use super::nav::NavSurface;
use crate::components::{CreatureParams, Position, Vec3};

/// Whether a creature standing at `from` can see `target`.
/// Combines the angular view-cone test with a hull occlusion test;
/// failing either yields "not visible".
pub fn can_see(from: &Position, target: Vec3, params: &CreatureParams, surface: &NavSurface) -> bool {
    let to_target = Vec3::new(target.x - from.point.x, target.y - from.point.y, 0.0);
    if to_target.length() > 0.001 {
        let cos_to_target = from.forward().dot(&to_target.normalize());
        let half_fov = (params.fov_degrees * 0.5).to_radians();
        if cos_to_target < half_fov.cos() {
            return false;
        }
    }

    let eye = from.point + Vec3::new(0.0, 0.0, params.eye_height);
    let head = target + Vec3::new(0.0, 0.0, params.eye_height);
    surface.segment_clear(eye, head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::BoundingBox;

    fn open_surface() -> NavSurface {
        NavSurface::from_boxes(vec![BoundingBox::new(
            Vec3::new(-20.0, -20.0, 0.0),
            Vec3::new(20.0, 20.0, 3.0),
        )])
    }

    #[test]
    fn test_sees_target_ahead() {
        let surface = open_surface();
        let params = CreatureParams::default();
        let pos = Position::new(0.0, 0.0, 0.0); // facing +x

        assert!(can_see(&pos, Vec3::new(5.0, 0.0, 0.0), &params, &surface));
        assert!(can_see(&pos, Vec3::new(5.0, 2.0, 0.0), &params, &surface));
    }

    #[test]
    fn test_blind_behind() {
        let surface = open_surface();
        let params = CreatureParams::default();
        let pos = Position::new(0.0, 0.0, 0.0);

        assert!(!can_see(&pos, Vec3::new(-5.0, 0.0, 0.0), &params, &surface));
        assert!(!can_see(&pos, Vec3::new(0.0, 5.0, 0.0), &params, &surface), "90 degrees off-axis is outside a 120 degree cone");
    }

    #[test]
    fn test_occluded_by_hull() {
        // Two separated rooms with no connecting floor between them
        let surface = NavSurface::from_boxes(vec![
            BoundingBox::new(Vec3::new(-10.0, -5.0, 0.0), Vec3::new(-2.0, 5.0, 3.0)),
            BoundingBox::new(Vec3::new(2.0, -5.0, 0.0), Vec3::new(10.0, 5.0, 3.0)),
        ]);
        let params = CreatureParams::default();
        let pos = Position::new(-5.0, 0.0, 0.0); // facing +x, toward the gap

        assert!(!can_see(&pos, Vec3::new(5.0, 0.0, 0.0), &params, &surface));
    }

    #[test]
    fn test_point_blank_counts_as_visible() {
        let surface = open_surface();
        let params = CreatureParams::default();
        let pos = Position::new(0.0, 0.0, 0.0);

        assert!(can_see(&pos, Vec3::new(0.0, 0.0, 0.0), &params, &surface));
    }
}
