use super::clock::{Animator, Frame};
use super::scene::{CameraPose, CameraView, Scene};
use crate::domain::CameraMode;

const ORBIT_RADIUS: f64 = 18.0;
const ORBIT_HEIGHT: f64 = 8.0;
const ORBIT_RATE: f64 = 0.03;
const INTERIOR_EYE: [f64; 3] = [0.0, 1.7, -3.5];
const INTERIOR_TARGET: [f64; 3] = [0.0, 1.0, 2.0];

/// Camera placement for the selected `CameraMode`. Switching takes effect
/// on the next frame with no transition.
#[derive(Default)]
pub struct CameraController;

impl CameraController {
    pub fn pose(mode: CameraMode, elapsed: f64) -> CameraPose {
        match mode {
            CameraMode::Outside => {
                let a = elapsed * ORBIT_RATE;
                CameraPose {
                    view: CameraView::Orbit,
                    position: [ORBIT_RADIUS * a.sin(), ORBIT_HEIGHT, ORBIT_RADIUS * a.cos()],
                    target: [0.0, 1.0, 0.0],
                }
            }
            CameraMode::Inside => CameraPose {
                view: CameraView::Interior,
                position: [
                    INTERIOR_EYE[0],
                    INTERIOR_EYE[1] + 0.02 * (elapsed * 1.6).sin(),
                    INTERIOR_EYE[2],
                ],
                target: INTERIOR_TARGET,
            },
        }
    }
}

impl Animator for CameraController {
    fn name(&self) -> &'static str {
        "camera"
    }

    fn update(&mut self, frame: &Frame<'_>, scene: &mut Scene) {
        scene.camera = Self::pose(frame.commands.camera_mode, frame.elapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outside_orbits_at_fixed_radius() {
        for t in [0.0, 10.0, 90.0] {
            let pose = CameraController::pose(CameraMode::Outside, t);
            let r = (pose.position[0].powi(2) + pose.position[2].powi(2)).sqrt();
            assert_eq!(pose.view, CameraView::Orbit);
            assert!((r - ORBIT_RADIUS).abs() < 1e-9);
        }
    }

    #[test]
    fn test_inside_stays_near_eye_point() {
        let pose = CameraController::pose(CameraMode::Inside, 4.2);
        assert_eq!(pose.view, CameraView::Interior);
        assert!((pose.position[1] - INTERIOR_EYE[1]).abs() <= 0.02);
        assert_eq!(pose.target, INTERIOR_TARGET);
    }
}
