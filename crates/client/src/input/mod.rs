pub mod builder;
pub mod buttons;
pub mod double_tap;
pub mod joystick;
pub mod mouse;

pub use builder::FrameContext;
pub use buttons::{BINDINGS, ButtonId, ButtonTable, Edge, SourceKey, parse_binding};
pub use double_tap::DoubleTapDetector;
pub use joystick::{JoystickAxis, JoystickState, MAX_JOYSTICK_AXES};
pub use mouse::MouseAccum;
