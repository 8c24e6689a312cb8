//! # Greenhouse Animation
//!
//! Procedural subsystems driven once per rendered frame by `AnimationClock`.
//!
//! ## Components
//!
//! - **Growth**: plant scale grows while spraying, capped, never shrinks
//! - **Water**: drip, overhead mist and soil-moisture rings, hidden when off
//! - **Mechanical**: wall fans, sun-tracking panels with energy stream, birds
//! - **Tank**: fluid column following the reported water level
//! - **Camera**: outside orbit or interior view
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut clock = mount_greenhouse(&cfg.scene, sensors, commands);
//! clock.tick(elapsed_secs, delta_secs);
//! let frame = clock.scene();
//! ```

pub mod camera;
pub mod clock;
pub mod growth;
pub mod mechanical;
pub mod scene;
pub mod tank;
pub mod water;

use rand::{rngs::StdRng, SeedableRng};
use std::sync::Arc;
use tracing::info;

use crate::config::SceneConfig;
use crate::controller::CommandSurface;
use crate::sensor::ReconciledSensorModel;

pub use camera::CameraController;
pub use clock::{AnimationClock, Animator, Frame};
pub use growth::{GrowthController, GrowthPhase, PlantSlot};
pub use mechanical::{BirdFlock, FanController, FanRole, SolarTracker};
pub use scene::{CameraPose, CameraView, Primitive, PrimitiveKind, Scene, SlotRange};
pub use tank::TankLevelController;
pub use water::WaterFlowController;

/// Build the scene and register every animator in frame order.
pub fn mount_greenhouse(
    cfg: &SceneConfig,
    sensors: Arc<ReconciledSensorModel>,
    commands: Arc<CommandSurface>,
) -> AnimationClock {
    let mut rng = match cfg.random_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut scene = Scene::new();

    let growth = GrowthController::mount(cfg, &mut rng, &mut scene);
    let water = WaterFlowController::mount(
        growth.positions(),
        cfg.droplets_per_plant,
        cfg.spray_particles,
        &mut scene,
    );
    let fans = FanController::mount(cfg.fan_speed, cfg.fan_blades, &mut scene);
    let solar = SolarTracker::mount(cfg.solar_panels, cfg.energy_particles, &mut scene);
    let birds = BirdFlock::mount(cfg.birds, &mut rng, &mut scene);
    let tank = TankLevelController::mount(&mut scene);

    info!(primitives = scene.len(), "greenhouse scene mounted");

    let mut clock = AnimationClock::new(sensors, commands, scene);
    clock.register(growth);
    clock.register(water);
    clock.register(fans);
    clock.register(solar);
    clock.register(birds);
    clock.register(tank);
    clock.register(CameraController);
    clock
}
