use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Left,
    Right,
    Accel,
    Nitro,
}

/// InputState is the snapshot of the driver controls that is read once per simulated frame. It is
/// written by a single party (keyboard handling in the GUI thread or the autopilot) and handed
/// over as a whole, so a frame never sees a partially updated set of controls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub accel: bool,
    pub nitro: bool,
}

impl InputState {
    pub fn set(&mut self, control: Control, pressed: bool) {
        match control {
            Control::Left => self.left = pressed,
            Control::Right => self.right = pressed,
            Control::Accel => self.accel = pressed,
            Control::Nitro => self.nitro = pressed,
        }
    }

    /// Steering direction: 1.0 steers left, -1.0 steers right, both or none cancel out.
    pub fn steer(&self) -> f64 {
        (self.left as i8 - self.right as i8) as f64
    }
}
