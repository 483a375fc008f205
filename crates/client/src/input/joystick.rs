pub const MAX_JOYSTICK_AXES: usize = 16;

/// Axes the movement pipeline consumes. Devices may report more; the rest are
/// stored but ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum JoystickAxis {
    Side = 0,
    Forward = 1,
    Up = 2,
    Roll = 3,
    Yaw = 4,
    Pitch = 5,
}

/// Joystick values stay set until changed; there is no per-frame decay.
#[derive(Debug)]
pub struct JoystickState {
    axes: [i32; MAX_JOYSTICK_AXES],
}

impl Default for JoystickState {
    fn default() -> Self {
        Self::new()
    }
}

impl JoystickState {
    pub fn new() -> Self {
        Self {
            axes: [0; MAX_JOYSTICK_AXES],
        }
    }

    pub fn set_axis(&mut self, axis: usize, value: i32) {
        if axis >= MAX_JOYSTICK_AXES {
            log::warn!("joystick axis {axis} out of range, ignoring");
            return;
        }
        self.axes[axis] = value;
    }

    pub fn axis(&self, axis: JoystickAxis) -> i32 {
        self.axes[axis as usize]
    }
}
