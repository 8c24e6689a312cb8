use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Where the viewer's camera sits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CameraMode {
    #[default]
    Outside,
    Inside,
}

impl CameraMode {
    pub fn switched(self) -> Self {
        match self {
            CameraMode::Outside => CameraMode::Inside,
            CameraMode::Inside => CameraMode::Outside,
        }
    }
}

/// Parameterless user intent. Each flips exactly one field of `CommandState`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Command {
    SprayToggle,
    FanIntakeToggle,
    FanExhaustToggle,
    CameraModeSwitch,
}

/// Operator-controlled switches read by the animators every frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandState {
    pub spray_active: bool,
    pub fan_intake: bool,
    pub fan_exhaust: bool,
    pub camera_mode: CameraMode,
}

impl CommandState {
    /// Successor state after `command`; all other fields are carried over.
    pub fn apply(self, command: Command) -> CommandState {
        match command {
            Command::SprayToggle => CommandState {
                spray_active: !self.spray_active,
                ..self
            },
            Command::FanIntakeToggle => CommandState {
                fan_intake: !self.fan_intake,
                ..self
            },
            Command::FanExhaustToggle => CommandState {
                fan_exhaust: !self.fan_exhaust,
                ..self
            },
            Command::CameraModeSwitch => CommandState {
                camera_mode: self.camera_mode.switched(),
                ..self
            },
        }
    }
}
