//! Flat arena of renderable primitives.
//!
//! Animators reserve a contiguous range of slots when they are mounted and
//! rewrite only those slots each frame. Nothing is allocated or freed after
//! mount; a droplet that "disappears" is a slot with `visible = false`.

use serde::Serialize;
use std::ops::Range;

pub type Vec3 = [f64; 3];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    Plant,
    Droplet,
    SprayParticle,
    MoistureRing,
    FanBlade,
    SolarPanel,
    EnergyParticle,
    Bird,
    TankFluid,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Primitive {
    pub kind: PrimitiveKind,
    pub position: Vec3,
    /// Euler angles in radians
    pub rotation: Vec3,
    pub scale: Vec3,
    pub opacity: f64,
    pub visible: bool,
}

impl Primitive {
    pub fn new(kind: PrimitiveKind, position: Vec3) -> Self {
        Self {
            kind,
            position,
            rotation: [0.0; 3],
            scale: [1.0; 3],
            opacity: 1.0,
            visible: true,
        }
    }

    /// Fully suppressed: zero scale, zero opacity, not drawn.
    pub fn hide(&mut self) {
        self.scale = [0.0; 3];
        self.opacity = 0.0;
        self.visible = false;
    }

    pub fn uniform_scale(&mut self, s: f64) {
        self.scale = [s; 3];
    }
}

/// Handle to an animator's slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRange(Range<usize>);

impl SlotRange {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraView {
    Orbit,
    Interior,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraPose {
    pub view: CameraView,
    pub position: Vec3,
    pub target: Vec3,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            view: CameraView::Orbit,
            position: [0.0, 8.0, 18.0],
            target: [0.0, 1.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Scene {
    pub camera: CameraPose,
    primitives: Vec<Primitive>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `count` slots initialised by `init(i)`.
    pub fn allocate<F>(&mut self, count: usize, mut init: F) -> SlotRange
    where
        F: FnMut(usize) -> Primitive,
    {
        let start = self.primitives.len();
        self.primitives.extend((0..count).map(&mut init));
        SlotRange(start..self.primitives.len())
    }

    pub fn slots(&self, range: &SlotRange) -> &[Primitive] {
        &self.primitives[range.0.clone()]
    }

    pub fn slots_mut(&mut self, range: &SlotRange) -> &mut [Primitive] {
        &mut self.primitives[range.0.clone()]
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn of_kind(&self, kind: PrimitiveKind) -> impl Iterator<Item = &Primitive> + '_ {
        self.primitives.iter().filter(move |p| p.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}

pub fn lerp(a: Vec3, b: Vec3, t: f64) -> Vec3 {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}
