//! # Water Flow
//!
//! Three closed-form effects gated by the spray command:
//!
//! - **drip**: droplets falling from the sprinkler line onto each plant
//! - **spray**: overhead mist particles on elliptical paths
//! - **moisture rings**: soil discs under the plants that pulse while wet
//!
//! Positions are pure functions of `(elapsed, slot index)`. Turning the
//! spray off hides every slot on the same frame.

use std::f64::consts::TAU;

use super::clock::{Animator, Frame};
use super::scene::{lerp, Primitive, PrimitiveKind, Scene, SlotRange, Vec3};

const EMITTER_HEIGHT: f64 = 3.2;
const PLANT_TOP: f64 = 0.9;
const FALL_PERIOD: f64 = 1.2;
const FALL_RATE: f64 = 1.0;
const DROPLET_SIZE: f64 = 0.06;
const DROPLET_OPACITY: f64 = 0.8;

const SPRAY_CENTRE: Vec3 = [0.0, 3.0, 0.0];
const SPRAY_MAX_RADIUS: f64 = 4.0;
const SPRAY_ELLIPSE: f64 = 0.6;
const SPRAY_BOB: f64 = 0.25;
const SPRAY_SIZE: f64 = 0.08;
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

const RING_HEIGHT: f64 = 0.41;

/// Fraction of the way through a droplet's fall, in [0, 1).
pub fn fall_fraction(elapsed: f64, index: usize, per_plant: usize) -> f64 {
    let offset = FALL_PERIOD / per_plant.max(1) as f64;
    let t = elapsed * FALL_RATE + index as f64 * offset;
    t.rem_euclid(FALL_PERIOD) / FALL_PERIOD
}

pub struct WaterFlowController {
    targets: Vec<Vec3>,
    droplets_per_plant: usize,
    spray_particles: usize,
    droplets: SlotRange,
    spray: SlotRange,
    rings: SlotRange,
}

impl WaterFlowController {
    /// `targets` are the soil positions of the plants being watered.
    pub fn mount(
        targets: Vec<Vec3>,
        droplets_per_plant: usize,
        spray_particles: usize,
        scene: &mut Scene,
    ) -> Self {
        let hidden = |kind| {
            let mut p = Primitive::new(kind, [0.0; 3]);
            p.hide();
            p
        };
        let droplets = scene.allocate(targets.len() * droplets_per_plant, |_| {
            hidden(PrimitiveKind::Droplet)
        });
        let spray = scene.allocate(spray_particles, |_| hidden(PrimitiveKind::SprayParticle));
        let rings = scene.allocate(targets.len(), |_| hidden(PrimitiveKind::MoistureRing));
        Self {
            targets,
            droplets_per_plant,
            spray_particles,
            droplets,
            spray,
            rings,
        }
    }

    fn update_droplets(&self, t: f64, scene: &mut Scene) {
        let per = self.droplets_per_plant.max(1);
        for (k, prim) in scene.slots_mut(&self.droplets).iter_mut().enumerate() {
            let target = self.targets[k / per];
            let f = fall_fraction(t, k, per);
            let emitter = [target[0], EMITTER_HEIGHT, target[2]];
            let landing = [target[0], PLANT_TOP, target[2]];
            prim.position = lerp(emitter, landing, f);
            prim.uniform_scale(DROPLET_SIZE);
            prim.opacity = DROPLET_OPACITY * (1.0 - f);
            prim.visible = true;
        }
    }

    fn update_spray(&self, t: f64, scene: &mut Scene) {
        let n = self.spray_particles.max(1) as f64;
        for (i, prim) in scene.slots_mut(&self.spray).iter_mut().enumerate() {
            let fi = i as f64;
            let angle = t * (0.4 + 0.05 * (i % 5) as f64) + fi * GOLDEN_ANGLE;
            let radius = 0.5 + (SPRAY_MAX_RADIUS - 0.8) * (fi / n) + 0.3 * (t * 0.7 + fi).sin();
            prim.position = [
                SPRAY_CENTRE[0] + radius * angle.cos(),
                SPRAY_CENTRE[1] + SPRAY_BOB * (t * 1.8 + fi * 0.7).sin(),
                SPRAY_CENTRE[2] + radius * angle.sin() * SPRAY_ELLIPSE,
            ];
            prim.uniform_scale(SPRAY_SIZE * (1.0 + 0.3 * (t * 2.0 + fi * 1.3).sin()));
            prim.opacity = 0.35 + 0.25 * (t * 3.0 + fi).sin();
            prim.visible = true;
        }
    }

    fn update_rings(&self, t: f64, scene: &mut Scene) {
        for (i, prim) in scene.slots_mut(&self.rings).iter_mut().enumerate() {
            let target = self.targets[i];
            let phase = i as f64 * TAU / self.targets.len().max(1) as f64;
            let breathe = 1.0 + 0.05 * (t * 0.8 + phase).sin();
            prim.position = [target[0], RING_HEIGHT, target[2]];
            prim.scale = [breathe, 1.0, breathe];
            prim.opacity = 0.35 + 0.15 * (t * 2.0 + phase).sin();
            prim.visible = true;
        }
    }

    fn hide_all(&self, scene: &mut Scene) {
        for range in [&self.droplets, &self.spray, &self.rings] {
            scene.slots_mut(range).iter_mut().for_each(Primitive::hide);
        }
    }
}

impl Animator for WaterFlowController {
    fn name(&self) -> &'static str {
        "water"
    }

    fn update(&mut self, frame: &Frame<'_>, scene: &mut Scene) {
        if !frame.commands.spray_active {
            self.hide_all(scene);
            return;
        }
        self.update_droplets(frame.elapsed, scene);
        self.update_spray(frame.elapsed, scene);
        self.update_rings(frame.elapsed, scene);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CommandState, SensorSnapshot};
    use crate::simulation::growth::plant_positions;

    fn mounted() -> (WaterFlowController, Scene) {
        let mut scene = Scene::new();
        let ctl = WaterFlowController::mount(plant_positions(2, 3), 3, 20, &mut scene);
        (ctl, scene)
    }

    fn tick(ctl: &mut WaterFlowController, scene: &mut Scene, t: f64, spray: bool) {
        let sensors = SensorSnapshot::seed(chrono::Utc::now());
        let frame = Frame {
            index: 0,
            elapsed: t,
            delta: 1.0 / 30.0,
            sensors: &sensors,
            commands: CommandState {
                spray_active: spray,
                ..Default::default()
            },
        };
        ctl.update(&frame, scene);
    }

    fn water(scene: &Scene) -> impl Iterator<Item = &Primitive> {
        scene.primitives().iter().filter(|p| {
            matches!(
                p.kind,
                PrimitiveKind::Droplet | PrimitiveKind::SprayParticle | PrimitiveKind::MoistureRing
            )
        })
    }

    #[test]
    fn test_slot_counts() {
        let (_, scene) = mounted();
        assert_eq!(scene.of_kind(PrimitiveKind::Droplet).count(), 18);
        assert_eq!(scene.of_kind(PrimitiveKind::SprayParticle).count(), 20);
        assert_eq!(scene.of_kind(PrimitiveKind::MoistureRing).count(), 6);
    }

    #[test]
    fn test_fall_fraction_is_periodic() {
        for k in 0..9 {
            let a = fall_fraction(0.37, k, 3);
            let b = fall_fraction(0.37 + FALL_PERIOD, k, 3);
            assert!((0.0..1.0).contains(&a));
            assert!((a - b).abs() < 1e-9);
        }
        assert!((fall_fraction(0.0, 1, 3) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_droplets_fall_between_emitter_and_plant() {
        let (mut ctl, mut scene) = mounted();
        tick(&mut ctl, &mut scene, 2.5, true);
        for p in scene.of_kind(PrimitiveKind::Droplet) {
            assert!(p.visible);
            assert!(p.position[1] <= EMITTER_HEIGHT && p.position[1] >= PLANT_TOP);
            assert!((0.0..=DROPLET_OPACITY).contains(&p.opacity));
        }
    }

    #[test]
    fn test_opacity_fades_toward_landing() {
        let (mut ctl, mut scene) = mounted();
        tick(&mut ctl, &mut scene, 0.0, true);
        let first: Vec<_> = scene.of_kind(PrimitiveKind::Droplet).take(3).copied().collect();
        // slot 0 starts at the emitter, slot 2 is two thirds down
        assert!(first[0].opacity > first[2].opacity);
        assert!(first[0].position[1] > first[2].position[1]);
    }

    #[test]
    fn test_active_effects_are_visible_and_bounded() {
        let (mut ctl, mut scene) = mounted();
        for i in 0..120 {
            tick(&mut ctl, &mut scene, i as f64 * 0.05, true);
            for p in water(&scene) {
                assert!(p.visible);
                assert!((0.0..=1.0).contains(&p.opacity));
                assert!(p.scale.iter().all(|s| *s > 0.0));
            }
        }
    }

    #[test]
    fn test_stop_hides_everything_next_tick() {
        let (mut ctl, mut scene) = mounted();
        for i in 0..30 {
            tick(&mut ctl, &mut scene, i as f64 / 30.0, true);
        }
        tick(&mut ctl, &mut scene, 1.0, false);
        for p in water(&scene) {
            assert!(!p.visible);
            assert_eq!(p.opacity, 0.0);
            assert_eq!(p.scale, [0.0; 3]);
        }
    }

    #[test]
    fn test_same_time_same_frame() {
        let (mut a, mut sa) = mounted();
        let (mut b, mut sb) = mounted();
        tick(&mut a, &mut sa, 3.7, true);
        tick(&mut b, &mut sb, 0.2, true);
        tick(&mut b, &mut sb, 3.7, true);
        assert_eq!(sa.primitives(), sb.primitives());
    }
}
