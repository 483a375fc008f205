//! Continuous button tracking. Two different sources (say, mouse button 1 and
//! a keyboard key) can hold the same logical button; it only releases when
//! both are up. Events carry the device timestamp so partial-frame holds are
//! weighted correctly even when a press and release land in the same frame.

/// Physical origin of a press: a device key code, or a console-typed hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKey {
    Key(u32),
    Console,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Down,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum ButtonId {
    Up,
    Down,
    Left,
    Right,
    Forward,
    Back,
    LookUp,
    LookDown,
    MoveLeft,
    MoveRight,
    Speed,
    Strafe,
    MouseLook,
    Attack,
    UseItem,
    Salute,
    Sprint,
    Activate,
    Attack2,
    Zoom,
    Reload,
    LeanLeft,
    LeanRight,
    Prone,
}

impl ButtonId {
    pub const COUNT: usize = 24;
}

/// Command verbs accepted with a `+` (press) or `-` (release) prefix.
pub const BINDINGS: &[(&str, ButtonId)] = &[
    ("activate", ButtonId::Activate),
    ("attack", ButtonId::Attack),
    ("attack2", ButtonId::Attack2),
    ("back", ButtonId::Back),
    ("forward", ButtonId::Forward),
    ("leanleft", ButtonId::LeanLeft),
    ("leanright", ButtonId::LeanRight),
    ("left", ButtonId::Left),
    ("lookdown", ButtonId::LookDown),
    ("lookup", ButtonId::LookUp),
    ("mlook", ButtonId::MouseLook),
    ("movedown", ButtonId::Down),
    ("moveleft", ButtonId::MoveLeft),
    ("moveright", ButtonId::MoveRight),
    ("moveup", ButtonId::Up),
    ("prone", ButtonId::Prone),
    ("reload", ButtonId::Reload),
    ("right", ButtonId::Right),
    ("salute", ButtonId::Salute),
    ("speed", ButtonId::Speed),
    ("sprint", ButtonId::Sprint),
    ("strafe", ButtonId::Strafe),
    ("useitem", ButtonId::UseItem),
    ("zoom", ButtonId::Zoom),
];

pub fn parse_binding(command: &str) -> Option<(ButtonId, Edge)> {
    let (edge, verb) = if let Some(verb) = command.strip_prefix('+') {
        (Edge::Down, verb)
    } else if let Some(verb) = command.strip_prefix('-') {
        (Edge::Up, verb)
    } else {
        return None;
    };
    BINDINGS
        .iter()
        .find(|(name, _)| *name == verb)
        .map(|(_, id)| (*id, edge))
}

#[derive(Debug, Clone, Copy, Default)]
struct ButtonState {
    sources: [Option<SourceKey>; 2],
    down_time_ms: u32,
    accum_ms: u32,
    held: bool,
    was_pressed: bool,
}

#[derive(Debug)]
pub struct ButtonTable {
    states: [ButtonState; ButtonId::COUNT],
}

impl Default for ButtonTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ButtonTable {
    pub fn new() -> Self {
        Self {
            states: [ButtonState::default(); ButtonId::COUNT],
        }
    }

    /// Records a press edge. A repeat from a source already holding the button
    /// is ignored; a third concurrent source is rejected.
    pub fn press(&mut self, id: ButtonId, source: SourceKey, timestamp_ms: Option<u32>) {
        let state = &mut self.states[id as usize];

        if state.sources.contains(&Some(source)) {
            return; // repeating key
        }

        if let Some(slot) = state.sources.iter_mut().find(|s| s.is_none()) {
            *slot = Some(source);
        } else {
            log::warn!("three sources down for {:?}", id);
            return;
        }

        if state.held {
            return; // still down from the other source
        }

        state.down_time_ms = timestamp_ms.unwrap_or(0);
        state.held = true;
        state.was_pressed = true;
    }

    /// Records a release edge. `source = None` is the console unstick path and
    /// clears the button no matter which sources hold it. A release without a
    /// timestamp is credited half the current frame.
    pub fn release(
        &mut self,
        id: ButtonId,
        source: Option<SourceKey>,
        timestamp_ms: Option<u32>,
        frame_msec: u32,
    ) {
        let state = &mut self.states[id as usize];

        let Some(source) = source else {
            state.sources = [None, None];
            state.held = false;
            return;
        };

        match state.sources.iter_mut().find(|s| **s == Some(source)) {
            Some(slot) => *slot = None,
            None => return, // release without a matching press (menu pass-through)
        }
        if state.sources.iter().any(|s| s.is_some()) {
            return; // some other source is still holding it down
        }

        state.held = false;
        state.accum_ms += match timestamp_ms {
            Some(t) => t.saturating_sub(state.down_time_ms),
            None => frame_msec / 2,
        };
    }

    /// Returns the fraction of the frame the button was down and resets the
    /// accumulator. A button still held has its hold-start refreshed to `now`.
    pub fn sample_fraction(&mut self, id: ButtonId, now_ms: u32, frame_msec: u32) -> f32 {
        let state = &mut self.states[id as usize];

        let mut msec = state.accum_ms;
        state.accum_ms = 0;

        if state.held {
            if state.down_time_ms == 0 {
                msec = now_ms;
            } else {
                msec += now_ms.saturating_sub(state.down_time_ms);
            }
            state.down_time_ms = now_ms;
        }

        (msec as f32 / frame_msec.max(1) as f32).clamp(0.0, 1.0)
    }

    pub fn is_held(&self, id: ButtonId) -> bool {
        self.states[id as usize].held
    }

    /// Held now, or pressed at some point since the sticky flag was last
    /// cleared. This is what keeps sub-frame taps from vanishing.
    pub fn held_or_pressed(&self, id: ButtonId) -> bool {
        let state = &self.states[id as usize];
        state.held || state.was_pressed
    }

    pub fn clear_sticky(&mut self, id: ButtonId) {
        self.states[id as usize].was_pressed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_A: SourceKey = SourceKey::Key(30);
    const KEY_B: SourceKey = SourceKey::Key(48);
    const KEY_C: SourceKey = SourceKey::Key(46);

    #[test]
    fn test_held_iff_any_source_down() {
        let mut table = ButtonTable::new();
        let id = ButtonId::Forward;

        table.press(id, KEY_A, Some(10));
        assert!(table.is_held(id));
        table.press(id, KEY_B, Some(20));
        assert!(table.is_held(id));

        table.release(id, Some(KEY_A), Some(30), 16);
        assert!(table.is_held(id), "other source still holds it");
        table.release(id, Some(KEY_B), Some(40), 16);
        assert!(!table.is_held(id));
    }

    #[test]
    fn test_third_source_rejected_without_corruption() {
        let mut table = ButtonTable::new();
        let id = ButtonId::Attack;

        table.press(id, KEY_A, Some(0));
        table.press(id, KEY_B, Some(0));
        table.press(id, KEY_C, Some(0));
        assert!(table.is_held(id));

        // the rejected source never occupied a slot, so releasing it is a no-op
        table.release(id, Some(KEY_C), Some(5), 16);
        assert!(table.is_held(id));

        table.release(id, Some(KEY_A), Some(5), 16);
        table.release(id, Some(KEY_B), Some(5), 16);
        assert!(!table.is_held(id));
    }

    #[test]
    fn test_repeat_press_is_ignored() {
        let mut table = ButtonTable::new();
        let id = ButtonId::Back;

        table.press(id, KEY_A, Some(100));
        table.press(id, KEY_A, Some(150));
        table.release(id, Some(KEY_A), Some(200), 16);
        assert!(!table.is_held(id));
    }

    #[test]
    fn test_sample_fraction_partial_frame() {
        let mut table = ButtonTable::new();
        let id = ButtonId::MoveLeft;

        // held for 25ms of a 100ms frame, released mid-frame
        table.press(id, KEY_A, Some(1000));
        table.release(id, Some(KEY_A), Some(1025), 100);
        let fraction = table.sample_fraction(id, 1100, 100);
        assert!((fraction - 0.25).abs() < f32::EPSILON);

        // accumulator was consumed
        assert_eq!(table.sample_fraction(id, 1100, 100), 0.0);
    }

    #[test]
    fn test_sample_fraction_still_held_is_clamped() {
        let mut table = ButtonTable::new();
        let id = ButtonId::MoveRight;

        table.press(id, KEY_A, Some(0));
        // held for five full frames without sampling
        let fraction = table.sample_fraction(id, 500, 100);
        assert_eq!(fraction, 1.0);

        // hold-start was refreshed, next frame counts only its own span
        let fraction = table.sample_fraction(id, 550, 100);
        assert!((fraction - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_release_without_timestamp_credits_half_frame() {
        let mut table = ButtonTable::new();
        let id = ButtonId::Up;

        table.press(id, KEY_A, Some(1000));
        table.release(id, Some(KEY_A), None, 50);
        let fraction = table.sample_fraction(id, 1050, 50);
        assert!((fraction - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_console_unstick_clears_everything() {
        let mut table = ButtonTable::new();
        let id = ButtonId::Sprint;

        table.press(id, KEY_A, Some(0));
        table.press(id, SourceKey::Console, None);
        table.release(id, None, None, 16);
        assert!(!table.is_held(id));

        // both slots are free again
        table.press(id, KEY_B, Some(10));
        table.press(id, KEY_C, Some(10));
        assert!(table.is_held(id));
    }

    #[test]
    fn test_sticky_flag_survives_release() {
        let mut table = ButtonTable::new();
        let id = ButtonId::Attack;

        table.press(id, KEY_A, Some(10));
        table.release(id, Some(KEY_A), Some(12), 16);
        assert!(!table.is_held(id));
        assert!(table.held_or_pressed(id));

        table.clear_sticky(id);
        assert!(!table.held_or_pressed(id));
    }

    #[test]
    fn test_parse_binding() {
        assert_eq!(
            parse_binding("+forward"),
            Some((ButtonId::Forward, Edge::Down))
        );
        assert_eq!(
            parse_binding("-leanright"),
            Some((ButtonId::LeanRight, Edge::Up))
        );
        assert_eq!(parse_binding("forward"), None);
        assert_eq!(parse_binding("+warp"), None);
        assert_eq!(parse_binding(""), None);
    }
}
