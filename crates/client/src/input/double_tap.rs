use frontline::DoubleTapKind;

use super::buttons::{ButtonId, ButtonTable};

/// Extra settle time after a confirmed tap before any channel may fire again.
const TAP_GUARD_MS: u32 = 150;

/// Channels scanned each frame, in confirmation priority order.
const CHANNELS: &[(DoubleTapKind, ButtonId)] = &[
    (DoubleTapKind::MoveLeft, ButtonId::MoveLeft),
    (DoubleTapKind::MoveRight, ButtonId::MoveRight),
    (DoubleTapKind::Forward, ButtonId::Forward),
    (DoubleTapKind::Back, ButtonId::Back),
    (DoubleTapKind::LeanLeft, ButtonId::LeanLeft),
    (DoubleTapKind::LeanRight, ButtonId::LeanRight),
    (DoubleTapKind::Up, ButtonId::Up),
];

#[derive(Debug, Clone, Copy, Default)]
struct TapChannel {
    pressed_ms: u32,
    released_ms: u32,
}

/// Recognizes press-release-press on a tracked direction within the
/// configured window. Disabled entirely when the window is zero.
#[derive(Debug, Default)]
pub struct DoubleTapDetector {
    channels: [TapChannel; CHANNELS.len()],
    last_tap_ms: u32,
}

impl DoubleTapDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one frame of detection and returns at most one confirmed tap.
    /// Uses held-or-sticky as the key-down state so sub-frame taps count.
    /// The caller clears the sticky flags afterwards.
    pub fn detect(
        &mut self,
        buttons: &ButtonTable,
        now_ms: u32,
        frame_msec: u32,
        window_ms: u32,
    ) -> DoubleTapKind {
        if window_ms == 0 {
            return DoubleTapKind::None;
        }
        // global cooldown across all channels; frame duration is added so
        // low framerates cannot eat the guard
        if now_ms.wrapping_sub(self.last_tap_ms) <= window_ms + TAP_GUARD_MS + frame_msec {
            return DoubleTapKind::None;
        }

        let within = |t: u32| now_ms.wrapping_sub(t) < window_ms + frame_msec;
        let mut tag = DoubleTapKind::None;

        for (channel, &(kind, button)) in self.channels.iter_mut().zip(CHANNELS) {
            let key_down = buttons.held_or_pressed(button);

            if key_down && channel.pressed_ms == 0 {
                channel.pressed_ms = now_ms;
            } else if !key_down && channel.released_ms == 0 && within(channel.pressed_ms) {
                channel.released_ms = now_ms;
            } else if key_down && within(channel.pressed_ms) && within(channel.released_ms) {
                if tag == DoubleTapKind::None {
                    channel.pressed_ms = 0;
                    channel.released_ms = 0;
                    tag = kind;
                    self.last_tap_ms = now_ms;
                }
            } else if !key_down && (channel.pressed_ms != 0 || channel.released_ms != 0) {
                // stale half-tap
                if !within(channel.pressed_ms) {
                    channel.pressed_ms = 0;
                    channel.released_ms = 0;
                }
            }
        }

        tag
    }

    /// Buttons whose sticky flags belong to the detector rather than the
    /// button mask pass.
    pub fn tracked_buttons() -> impl Iterator<Item = ButtonId> {
        CHANNELS.iter().map(|&(_, button)| button)
    }
}
