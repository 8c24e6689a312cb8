//! # Plant Growth
//!
//! Each plant grows while the spray runs and holds its size when it stops.
//! Growth is a pulsed multiplicative increase capped at `max_growth_factor`
//! times the plant's baseline; nothing ever shrinks a plant.

use rand::Rng;
use std::f64::consts::TAU;

use super::clock::{Animator, Frame};
use super::scene::{Primitive, PrimitiveKind, Scene, SlotRange, Vec3};
use crate::config::SceneConfig;

const BED_SPACING: f64 = 2.5;
const SLOT_SPACING: f64 = 1.2;
const SOIL_HEIGHT: f64 = 0.4;
const SWAY_AMPLITUDE: f64 = 0.05;
const SWAY_FREQUENCY: f64 = 1.5;

/// Soil-level position of every plant, bed-major.
pub fn plant_positions(beds: usize, plants_per_bed: usize) -> Vec<Vec3> {
    let centre = |n: usize, i: usize| i as f64 - (n.saturating_sub(1)) as f64 / 2.0;
    (0..beds)
        .flat_map(|bed| {
            (0..plants_per_bed).map(move |slot| {
                [
                    centre(beds, bed) * BED_SPACING,
                    SOIL_HEIGHT,
                    centre(plants_per_bed, slot) * SLOT_SPACING,
                ]
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthPhase {
    Idle,
    Growing,
}

#[derive(Debug, Clone)]
pub struct PlantSlot {
    pub bed: usize,
    pub slot: usize,
    pub position: Vec3,
    pub baseline: f64,
    pub max_scale: f64,
    pub growth_scale: f64,
    pub phase: GrowthPhase,
    sway_phase: f64,
}

pub struct GrowthController {
    plants: Vec<PlantSlot>,
    pulse: f64,
    frequency: f64,
    slots: SlotRange,
}

impl GrowthController {
    pub fn mount<R: Rng>(cfg: &SceneConfig, rng: &mut R, scene: &mut Scene) -> Self {
        let positions = plant_positions(cfg.beds, cfg.plants_per_bed);
        let plants: Vec<PlantSlot> = positions
            .iter()
            .enumerate()
            .map(|(i, &position)| {
                let baseline = rng.gen_range(0.8..=1.2);
                PlantSlot {
                    bed: i / cfg.plants_per_bed.max(1),
                    slot: i % cfg.plants_per_bed.max(1),
                    position,
                    baseline,
                    max_scale: baseline * cfg.max_growth_factor.max(1.0),
                    growth_scale: baseline,
                    phase: GrowthPhase::Idle,
                    sway_phase: rng.gen_range(0.0..TAU),
                }
            })
            .collect();

        let slots = scene.allocate(plants.len(), |i| {
            let mut p = Primitive::new(PrimitiveKind::Plant, plants[i].position);
            p.uniform_scale(plants[i].baseline);
            p
        });

        Self {
            plants,
            pulse: cfg.growth_pulse,
            frequency: cfg.growth_frequency,
            slots,
        }
    }

    pub fn plants(&self) -> &[PlantSlot] {
        &self.plants
    }

    pub fn positions(&self) -> Vec<Vec3> {
        self.plants.iter().map(|p| p.position).collect()
    }

    pub fn scale_of(&self, bed: usize, slot: usize) -> Option<f64> {
        self.plants
            .iter()
            .find(|p| p.bed == bed && p.slot == slot)
            .map(|p| p.growth_scale)
    }

    /// Growth factor for this instant; never negative.
    fn pulse_at(&self, elapsed: f64) -> f64 {
        let pulse = self.pulse * (0.5 + 0.5 * (self.frequency * elapsed).sin());
        if pulse.is_finite() {
            pulse.max(0.0)
        } else {
            0.0
        }
    }
}

impl Animator for GrowthController {
    fn name(&self) -> &'static str {
        "growth"
    }

    fn update(&mut self, frame: &Frame<'_>, scene: &mut Scene) {
        let phase = if frame.commands.spray_active {
            GrowthPhase::Growing
        } else {
            GrowthPhase::Idle
        };
        let factor = 1.0 + self.pulse_at(frame.elapsed);
        let t = frame.elapsed;

        for (plant, prim) in self.plants.iter_mut().zip(scene.slots_mut(&self.slots)) {
            plant.phase = phase;
            if phase == GrowthPhase::Growing {
                plant.growth_scale = (plant.growth_scale * factor)
                    .min(plant.max_scale)
                    .max(plant.growth_scale);
            }
            prim.uniform_scale(plant.growth_scale);
            prim.rotation[2] = SWAY_AMPLITUDE * (t * SWAY_FREQUENCY + plant.sway_phase).sin();
        }
    }
}
