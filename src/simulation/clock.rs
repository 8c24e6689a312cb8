//! Per-frame driver fanning renderer ticks out to every animator.

use std::sync::Arc;
use tracing::trace;

use super::scene::Scene;
use crate::controller::CommandSurface;
use crate::domain::{CommandState, SensorSnapshot};
use crate::sensor::ReconciledSensorModel;

/// Inputs shared by every animator for one frame.
///
/// Built once at the top of `AnimationClock::tick`; every animator in the
/// frame sees the same snapshot and the same commands.
#[derive(Debug, Clone)]
pub struct Frame<'a> {
    pub index: u64,
    /// Seconds since the renderer started
    pub elapsed: f64,
    /// Seconds since the previous frame
    pub delta: f64,
    pub sensors: &'a SensorSnapshot,
    pub commands: CommandState,
}

/// A procedural subsystem. `update` must not block and should do work
/// proportional to the number of slots it owns.
pub trait Animator: Send {
    fn name(&self) -> &'static str;
    fn update(&mut self, frame: &Frame<'_>, scene: &mut Scene);
}

pub struct AnimationClock {
    sensors: Arc<ReconciledSensorModel>,
    commands: Arc<CommandSurface>,
    scene: Scene,
    animators: Vec<Box<dyn Animator>>,
    frames: u64,
    last_elapsed: f64,
}

impl AnimationClock {
    pub fn new(
        sensors: Arc<ReconciledSensorModel>,
        commands: Arc<CommandSurface>,
        scene: Scene,
    ) -> Self {
        Self {
            sensors,
            commands,
            scene,
            animators: Vec::new(),
            frames: 0,
            last_elapsed: 0.0,
        }
    }

    /// Animators run in registration order.
    pub fn register<A: Animator + 'static>(&mut self, animator: A) {
        self.animators.push(Box::new(animator));
    }

    pub fn tick(&mut self, elapsed: f64, delta: f64) {
        let snapshot = self.sensors.current();
        let frame = Frame {
            index: self.frames,
            elapsed,
            delta: delta.max(0.0),
            sensors: &snapshot,
            commands: self.commands.state(),
        };
        for animator in self.animators.iter_mut() {
            animator.update(&frame, &mut self.scene);
        }
        self.frames += 1;
        self.last_elapsed = elapsed;
        trace!(
            frame = frame.index,
            elapsed,
            revision = snapshot.revision,
            "frame ticked"
        );
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_elapsed(&self) -> f64 {
        self.last_elapsed
    }

    pub fn animator_names(&self) -> Vec<&'static str> {
        self.animators.iter().map(|a| a.name()).collect()
    }
}
