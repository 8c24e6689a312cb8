use parking_lot::RwLock;
use tracing::info;

use crate::domain::{Command, CommandState};

/// Entry point for operator intents.
///
/// `toggle` swaps in a new `CommandState` and does nothing else; animators
/// pick the change up on their next frame.
#[derive(Debug, Default)]
pub struct CommandSurface {
    state: RwLock<CommandState>,
}

impl CommandSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CommandState {
        *self.state.read()
    }

    /// Apply `command` and return the resulting state.
    pub fn toggle(&self, command: Command) -> CommandState {
        let mut slot = self.state.write();
        let next = slot.apply(command);
        *slot = next;
        info!(%command, spray_active = next.spray_active, fan_intake = next.fan_intake,
            fan_exhaust = next.fan_exhaust, camera_mode = %next.camera_mode, "command applied");
        next
    }
}
