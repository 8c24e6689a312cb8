//! Rotating and tracking machinery plus decorative wildlife.

use rand::Rng;
use std::f64::consts::{FRAC_PI_2, TAU};

use super::clock::{Animator, Frame};
use super::scene::{lerp, Primitive, PrimitiveKind, Scene, SlotRange, Vec3};
use crate::domain::CommandState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanRole {
    Intake,
    Exhaust,
}

impl FanRole {
    fn running(self, commands: &CommandState) -> bool {
        match self {
            FanRole::Intake => commands.fan_intake,
            FanRole::Exhaust => commands.fan_exhaust,
        }
    }

    fn hub(self) -> Vec3 {
        match self {
            FanRole::Intake => [-4.5, 1.8, 0.0],
            FanRole::Exhaust => [4.5, 1.8, 0.0],
        }
    }
}

#[derive(Debug)]
struct Fan {
    role: FanRole,
    angle: f64,
    blades: SlotRange,
}

/// Wall fans. A running fan advances by a fixed angle per tick; a stopped
/// fan keeps whatever angle it had.
pub struct FanController {
    fans: [Fan; 2],
    speed: f64,
}

impl FanController {
    pub fn mount(speed: f64, blades: usize, scene: &mut Scene) -> Self {
        let mut fan = |role: FanRole| Fan {
            role,
            angle: 0.0,
            blades: scene.allocate(blades, |b| {
                let mut p = Primitive::new(PrimitiveKind::FanBlade, role.hub());
                p.rotation[0] = b as f64 * TAU / blades as f64;
                p
            }),
        };
        let fans = [fan(FanRole::Intake), fan(FanRole::Exhaust)];
        Self { fans, speed }
    }

    pub fn angle(&self, role: FanRole) -> f64 {
        self.fans
            .iter()
            .find(|f| f.role == role)
            .map(|f| f.angle)
            .unwrap_or_default()
    }
}

impl Animator for FanController {
    fn name(&self) -> &'static str {
        "fans"
    }

    fn update(&mut self, frame: &Frame<'_>, scene: &mut Scene) {
        for fan in self.fans.iter_mut() {
            if fan.role.running(&frame.commands) {
                fan.angle += self.speed;
            }
            let slots = scene.slots_mut(&fan.blades);
            let spacing = TAU / slots.len().max(1) as f64;
            for (b, prim) in slots.iter_mut().enumerate() {
                prim.rotation[0] = fan.angle + b as f64 * spacing;
            }
        }
    }
}

const PANEL_HEIGHT: f64 = 3.6;
const PANEL_SPACING: f64 = 1.4;
const TRACK_RATE: f64 = 0.05;
const TRACK_SWEEP: f64 = 0.6;
const BASE_TILT: f64 = 0.5;
const INVERTER: Vec3 = [5.5, 0.5, 3.0];
const FLOW_RATE: f64 = 0.5;

/// Roof panels that follow a simulated sun, plus an energy stream whose
/// density and brightness follow the measured solar output.
pub struct SolarTracker {
    panels: SlotRange,
    particles: SlotRange,
    anchors: Vec<Vec3>,
}

impl SolarTracker {
    pub fn mount(panels: usize, particles: usize, scene: &mut Scene) -> Self {
        let anchors: Vec<Vec3> = (0..panels)
            .map(|i| {
                let x = (i as f64 - (panels.saturating_sub(1)) as f64 / 2.0) * PANEL_SPACING;
                [x, PANEL_HEIGHT, 0.0]
            })
            .collect();
        let panel_slots = scene.allocate(panels, |i| {
            let mut p = Primitive::new(PrimitiveKind::SolarPanel, anchors[i]);
            p.rotation[0] = BASE_TILT;
            p
        });
        let particle_slots = scene.allocate(particles, |_| {
            let mut p = Primitive::new(PrimitiveKind::EnergyParticle, INVERTER);
            p.hide();
            p
        });
        Self {
            panels: panel_slots,
            particles: particle_slots,
            anchors,
        }
    }

    /// (tilt, yaw) of the array at `elapsed`.
    pub fn orientation(elapsed: f64) -> (f64, f64) {
        let sun = elapsed * TRACK_RATE;
        let yaw = TRACK_SWEEP * sun.sin();
        let tilt = BASE_TILT + 0.1 * (sun + FRAC_PI_2).sin();
        (tilt, yaw)
    }

    /// Number of energy particles drawn for a given solar output.
    pub fn visible_particles(total: usize, solar_output: f64) -> usize {
        let fraction = solar_output.clamp(0.0, 100.0) / 100.0;
        (total as f64 * fraction).round() as usize
    }
}

impl Animator for SolarTracker {
    fn name(&self) -> &'static str {
        "solar"
    }

    fn update(&mut self, frame: &Frame<'_>, scene: &mut Scene) {
        let t = frame.elapsed;
        let (tilt, yaw) = Self::orientation(t);
        for prim in scene.slots_mut(&self.panels) {
            prim.rotation = [tilt, yaw, 0.0];
        }

        let solar = frame.sensors.solar_output.clamp(0.0, 100.0);
        let brightness = 0.2 + 0.8 * solar / 100.0;
        let total = self.particles.len();
        let shown = Self::visible_particles(total, solar);
        let anchors = &self.anchors;
        for (i, prim) in scene.slots_mut(&self.particles).iter_mut().enumerate() {
            if i >= shown || anchors.is_empty() {
                prim.hide();
                continue;
            }
            let f = (t * FLOW_RATE + i as f64 / total as f64).rem_euclid(1.0);
            prim.position = lerp(anchors[i % anchors.len()], INVERTER, f);
            prim.uniform_scale(0.05 + 0.05 * brightness);
            prim.opacity = brightness * (1.0 - 0.5 * f);
            prim.visible = true;
        }
    }
}

#[derive(Debug, Clone)]
pub struct BirdPath {
    pub radius: f64,
    pub phase: f64,
    pub speed: f64,
    pub height: f64,
    pub flap_rate: f64,
}

impl BirdPath {
    fn random<R: Rng>(rng: &mut R) -> Self {
        Self {
            radius: rng.gen_range(8.0..15.0),
            phase: rng.gen_range(0.0..TAU),
            speed: rng.gen_range(0.2..0.5),
            height: rng.gen_range(9.0..13.0),
            flap_rate: rng.gen_range(6.0..10.0),
        }
    }

    pub fn position(&self, t: f64) -> Vec3 {
        let theta = t * self.speed + self.phase;
        [
            self.radius * theta.cos(),
            self.height + 0.4 * (2.0 * theta).sin(),
            self.radius * theta.sin(),
        ]
    }
}

/// Birds circling overhead. Reads neither sensors nor commands.
pub struct BirdFlock {
    paths: Vec<BirdPath>,
    slots: SlotRange,
}

impl BirdFlock {
    pub fn mount<R: Rng>(count: usize, rng: &mut R, scene: &mut Scene) -> Self {
        let paths: Vec<BirdPath> = (0..count).map(|_| BirdPath::random(rng)).collect();
        let slots = scene.allocate(count, |i| {
            let mut p = Primitive::new(PrimitiveKind::Bird, paths[i].position(0.0));
            p.uniform_scale(0.3);
            p
        });
        Self { paths, slots }
    }

    pub fn paths(&self) -> &[BirdPath] {
        &self.paths
    }
}

impl Animator for BirdFlock {
    fn name(&self) -> &'static str {
        "birds"
    }

    fn update(&mut self, frame: &Frame<'_>, scene: &mut Scene) {
        let t = frame.elapsed;
        for (path, prim) in self.paths.iter().zip(scene.slots_mut(&self.slots)) {
            let theta = t * path.speed + path.phase;
            prim.position = path.position(t);
            prim.rotation[1] = -theta;
            prim.rotation[2] = 0.6 * (t * path.flap_rate + path.phase).sin();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SensorSnapshot;
    use rand::{rngs::StdRng, SeedableRng};

    fn frame_at<'a>(
        sensors: &'a SensorSnapshot,
        t: f64,
        commands: CommandState,
    ) -> Frame<'a> {
        Frame {
            index: 0,
            elapsed: t,
            delta: 1.0 / 30.0,
            sensors,
            commands,
        }
    }

    fn fans_on(intake: bool, exhaust: bool) -> CommandState {
        CommandState {
            fan_intake: intake,
            fan_exhaust: exhaust,
            ..Default::default()
        }
    }

    #[test]
    fn test_fan_rotates_only_while_commanded() {
        let sensors = SensorSnapshot::seed(chrono::Utc::now());
        let mut scene = Scene::new();
        let mut fans = FanController::mount(0.2, 4, &mut scene);

        let mut prev = fans.angle(FanRole::Intake);
        for i in 0..20 {
            fans.update(&frame_at(&sensors, i as f64, fans_on(true, false)), &mut scene);
            let now = fans.angle(FanRole::Intake);
            assert!(now > prev);
            prev = now;
        }
        assert_eq!(fans.angle(FanRole::Exhaust), 0.0);

        for i in 20..40 {
            fans.update(&frame_at(&sensors, i as f64, fans_on(false, true)), &mut scene);
            assert_eq!(fans.angle(FanRole::Intake), prev);
        }
        assert!(fans.angle(FanRole::Exhaust) > 0.0);
    }

    #[test]
    fn test_blades_follow_fan_angle() {
        let sensors = SensorSnapshot::seed(chrono::Utc::now());
        let mut scene = Scene::new();
        let mut fans = FanController::mount(0.25, 4, &mut scene);
        fans.update(&frame_at(&sensors, 0.0, fans_on(true, true)), &mut scene);

        let blades: Vec<_> = scene.of_kind(PrimitiveKind::FanBlade).collect();
        assert_eq!(blades.len(), 8);
        assert!((blades[0].rotation[0] - 0.25).abs() < 1e-12);
        assert!((blades[1].rotation[0] - (0.25 + TAU / 4.0)).abs() < 1e-12);
    }

    #[test]
    fn test_solar_orientation_ignores_sensors() {
        let mut scene = Scene::new();
        let mut solar = SolarTracker::mount(4, 10, &mut scene);
        let mut dim = SensorSnapshot::seed(chrono::Utc::now());
        dim.solar_output = 5.0;
        let mut bright = dim.clone();
        bright.solar_output = 95.0;

        solar.update(&frame_at(&dim, 12.0, CommandState::default()), &mut scene);
        let a: Vec<Vec3> = scene.of_kind(PrimitiveKind::SolarPanel).map(|p| p.rotation).collect();
        solar.update(&frame_at(&bright, 12.0, CommandState::default()), &mut scene);
        let b: Vec<Vec3> = scene.of_kind(PrimitiveKind::SolarPanel).map(|p| p.rotation).collect();
        assert_eq!(a, b);
        let (tilt, yaw) = SolarTracker::orientation(12.0);
        assert_eq!(a[0], [tilt, yaw, 0.0]);
    }

    #[test]
    fn test_energy_stream_tracks_solar_output() {
        let mut scene = Scene::new();
        let mut solar = SolarTracker::mount(4, 20, &mut scene);
        let mut sensors = SensorSnapshot::seed(chrono::Utc::now());
        let all_off = CommandState::default();

        sensors.solar_output = 50.0;
        solar.update(&frame_at(&sensors, 1.0, all_off), &mut scene);
        let half: Vec<_> = scene.of_kind(PrimitiveKind::EnergyParticle).filter(|p| p.visible).copied().collect();
        assert_eq!(half.len(), 10);

        sensors.solar_output = 100.0;
        solar.update(&frame_at(&sensors, 1.0, all_off), &mut scene);
        let full: Vec<_> = scene.of_kind(PrimitiveKind::EnergyParticle).filter(|p| p.visible).copied().collect();
        assert_eq!(full.len(), 20);
        assert!(full[0].opacity > half[0].opacity);

        sensors.solar_output = 0.0;
        solar.update(&frame_at(&sensors, 1.0, all_off), &mut scene);
        assert_eq!(scene.of_kind(PrimitiveKind::EnergyParticle).filter(|p| p.visible).count(), 0);
    }

    #[test]
    fn test_visible_particles_clamped() {
        assert_eq!(SolarTracker::visible_particles(24, 150.0), 24);
        assert_eq!(SolarTracker::visible_particles(24, -3.0), 0);
        assert_eq!(SolarTracker::visible_particles(24, 25.0), 6);
    }

    #[test]
    fn test_birds_circle_at_fixed_radius() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut scene = Scene::new();
        let mut flock = BirdFlock::mount(5, &mut rng, &mut scene);
        let sensors = SensorSnapshot::seed(chrono::Utc::now());

        for t in [0.0, 3.3, 47.0] {
            flock.update(&frame_at(&sensors, t, CommandState::default()), &mut scene);
            for (path, bird) in flock.paths().iter().zip(scene.of_kind(PrimitiveKind::Bird)) {
                let r = (bird.position[0].powi(2) + bird.position[2].powi(2)).sqrt();
                assert!((r - path.radius).abs() < 1e-9);
                assert!((8.0..15.0).contains(&path.radius));
                assert!(bird.rotation[2].abs() <= 0.6);
            }
        }
    }
}
