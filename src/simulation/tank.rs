use super::clock::{Animator, Frame};
use super::scene::{Primitive, PrimitiveKind, Scene, SlotRange, Vec3};

const TANK_BASE: Vec3 = [-5.5, 0.0, 3.0];
const TANK_HEIGHT: f64 = 2.0;

/// Water tank fluid column, a direct function of the current water level.
/// Holds no state beyond its slot; everything is recomputed each frame.
pub struct TankLevelController {
    slots: SlotRange,
    fill_fraction: f64,
}

impl TankLevelController {
    pub fn mount(scene: &mut Scene) -> Self {
        let slots = scene.allocate(1, |_| Primitive::new(PrimitiveKind::TankFluid, TANK_BASE));
        Self {
            slots,
            fill_fraction: 0.0,
        }
    }

    /// Water level (%) mapped to [0, 1].
    pub fn fill_for(water_level: f64) -> f64 {
        if water_level.is_nan() {
            return 0.0;
        }
        water_level.clamp(0.0, 100.0) / 100.0
    }

    pub fn fill_fraction(&self) -> f64 {
        self.fill_fraction
    }

    pub fn fluid_height(&self) -> f64 {
        self.fill_fraction * TANK_HEIGHT
    }

    pub fn fill_label(&self) -> String {
        format!("{:.0}%", self.fill_fraction * 100.0)
    }
}

impl Animator for TankLevelController {
    fn name(&self) -> &'static str {
        "tank"
    }

    fn update(&mut self, frame: &Frame<'_>, scene: &mut Scene) {
        self.fill_fraction = Self::fill_for(frame.sensors.water_level);
        let height = self.fluid_height();
        for prim in scene.slots_mut(&self.slots) {
            prim.position = [TANK_BASE[0], TANK_BASE[1] + height / 2.0, TANK_BASE[2]];
            prim.scale = [1.0, self.fill_fraction, 1.0];
            prim.visible = self.fill_fraction > 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CommandState, SensorSnapshot};
    use rstest::rstest;

    #[rstest]
    #[case(85.0, 0.85, "85%")]
    #[case(0.0, 0.0, "0%")]
    #[case(100.0, 1.0, "100%")]
    #[case(140.0, 1.0, "100%")]
    #[case(-10.0, 0.0, "0%")]
    fn test_fill_follows_water_level(
        #[case] level: f64,
        #[case] fraction: f64,
        #[case] label: &str,
    ) {
        let mut scene = Scene::new();
        let mut tank = TankLevelController::mount(&mut scene);
        let mut sensors = SensorSnapshot::seed(chrono::Utc::now());
        sensors.water_level = level;
        let frame = Frame {
            index: 0,
            elapsed: 0.0,
            delta: 0.0,
            sensors: &sensors,
            commands: CommandState::default(),
        };

        tank.update(&frame, &mut scene);

        assert!((tank.fill_fraction() - fraction).abs() < 1e-12);
        assert_eq!(tank.fill_label(), label);
        let fluid = scene.of_kind(PrimitiveKind::TankFluid).next().unwrap();
        assert!((fluid.scale[1] - fraction).abs() < 1e-12);
        assert!((fluid.position[1] - fraction * TANK_HEIGHT / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_nan_level_reads_empty() {
        assert_eq!(TankLevelController::fill_for(f64::NAN), 0.0);
    }
}
