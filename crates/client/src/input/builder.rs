use frontline::{
    AuxButtons, Buttons, MoveCommand, PITCH, YAW, angles_to_wire, clamp_move,
};

use crate::config::DebugMove;
use crate::session::InputSession;

use super::buttons::ButtonId;
use super::double_tap::DoubleTapDetector;
use super::joystick::JoystickAxis;
use super::mouse;

const RUN_MOVE_SPEED: f32 = 127.0;
const WALK_MOVE_SPEED: f32 = 64.0;

/// Pitch may not change by more than this between two consecutive commands,
/// whatever the devices ask for.
const PITCH_WRAP_LIMIT_DEG: f32 = 90.0;

/// Recoil is only applied while the resulting pitch stays under this bound.
const RECOIL_PITCH_LIMIT_DEG: f32 = 40.0;

/// Mouse-driven movement is normalized to a 125fps reference so strafe feel
/// does not depend on frame rate.
const MOUSE_MOVE_SCALE: f32 = 0.008;

const BUTTON_MASKS: &[(ButtonId, Buttons)] = &[
    (ButtonId::Attack, Buttons::ATTACK),
    (ButtonId::UseItem, Buttons::USE_ITEM),
    (ButtonId::Salute, Buttons::GESTURE),
    (ButtonId::Sprint, Buttons::SPRINT),
    (ButtonId::Activate, Buttons::ACTIVATE),
];

const AUX_MASKS: &[(ButtonId, AuxButtons)] = &[
    (ButtonId::Attack2, AuxButtons::ATTACK2),
    (ButtonId::Zoom, AuxButtons::ZOOM),
    (ButtonId::Reload, AuxButtons::RELOAD),
    (ButtonId::LeanLeft, AuxButtons::LEAN_LEFT),
    (ButtonId::LeanRight, AuxButtons::LEAN_RIGHT),
    (ButtonId::Prone, AuxButtons::PRONE),
];

/// Per-frame values the game layer feeds into command building.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext {
    pub server_time: i32,
    pub weapon: u8,
    pub flags: u8,
    pub ident_client: u8,
    /// Sensitivity multiplier for the current FOV/zoom.
    pub zoom_sensitivity: f32,
    /// A mounted heavy weapon is in use; aim gain is damped.
    pub heavy_weapon: bool,
}

impl Default for FrameContext {
    fn default() -> Self {
        Self {
            server_time: 0,
            weapon: 0,
            flags: 0,
            ident_client: 0,
            zoom_sensitivity: 1.0,
            heavy_weapon: false,
        }
    }
}

impl InputSession {
    /// Folds this frame's device state into one immutable command.
    pub(crate) fn build_command(&mut self, ctx: &FrameContext) -> MoveCommand {
        let old_angles = self.view_angles;

        self.adjust_angles();

        let mut cmd = MoveCommand::default();
        self.cmd_buttons(&mut cmd);
        self.key_move(&mut cmd);
        self.mouse_move(&mut cmd, ctx);
        self.joystick_move(&mut cmd);

        cmd.double_tap = self.double_tap.detect(
            &self.buttons,
            self.frame_time_ms,
            self.frame_msec,
            self.config.double_tap_delay_ms,
        );
        for id in DoubleTapDetector::tracked_buttons() {
            self.buttons.clear_sticky(id);
        }

        // keep the pitch from wrapping through a singularity in one frame
        if self.view_angles[PITCH] - old_angles[PITCH] > PITCH_WRAP_LIMIT_DEG {
            self.view_angles[PITCH] = old_angles[PITCH] + PITCH_WRAP_LIMIT_DEG;
        } else if old_angles[PITCH] - self.view_angles[PITCH] > PITCH_WRAP_LIMIT_DEG {
            self.view_angles[PITCH] = old_angles[PITCH] - PITCH_WRAP_LIMIT_DEG;
        }

        // recoil kick affects aim once, applied or not
        let recoil = self.pending_recoil_pitch;
        self.pending_recoil_pitch = 0.0;
        if (self.view_angles[PITCH] + recoil).abs() < RECOIL_PITCH_LIMIT_DEG {
            self.view_angles[PITCH] += recoil;
        }

        self.finish_move(&mut cmd, ctx);

        match self.config.debug_move {
            DebugMove::Off => {}
            DebugMove::Yaw => {
                self.debug_graph
                    .record((self.view_angles[YAW] - old_angles[YAW]).abs());
            }
            DebugMove::Pitch => {
                self.debug_graph
                    .record((self.view_angles[PITCH] - old_angles[PITCH]).abs());
            }
        }

        cmd
    }

    /// Keyboard turning. The speed key trades walk speed for turn speed.
    fn adjust_angles(&mut self) {
        let mut speed = 0.001 * self.frame_msec as f32;
        if self.buttons.is_held(ButtonId::Speed) {
            speed *= self.config.anglespeed_key;
        }

        let now = self.frame_time_ms;
        let frame = self.frame_msec;

        if !self.buttons.is_held(ButtonId::Strafe) {
            let right = self.buttons.sample_fraction(ButtonId::Right, now, frame);
            let left = self.buttons.sample_fraction(ButtonId::Left, now, frame);
            self.view_angles[YAW] -= speed * self.config.yaw_speed * right;
            self.view_angles[YAW] += speed * self.config.yaw_speed * left;
        }

        let up = self.buttons.sample_fraction(ButtonId::LookUp, now, frame);
        let down = self.buttons.sample_fraction(ButtonId::LookDown, now, frame);
        self.view_angles[PITCH] -= speed * self.config.pitch_speed * up;
        self.view_angles[PITCH] += speed * self.config.pitch_speed * down;
    }

    /// Button bits go out even for a press-and-release inside one frame.
    fn cmd_buttons(&mut self, cmd: &mut MoveCommand) {
        for &(id, bit) in BUTTON_MASKS {
            if self.buttons.held_or_pressed(id) {
                cmd.buttons |= bit;
            }
            self.buttons.clear_sticky(id);
        }
        for &(id, bit) in AUX_MASKS {
            if self.buttons.held_or_pressed(id) {
                cmd.aux_buttons |= bit;
            }
            self.buttons.clear_sticky(id);
        }

        if !self.catcher.is_empty() && !self.config.bypass_mouse {
            cmd.buttons |= Buttons::TALK;
        }

        // the game can tell whether any key at all is down, bound or not
        if self.any_keys_down > 0 && (self.catcher.is_empty() || self.config.bypass_mouse) {
            cmd.buttons |= Buttons::ANY;
        }
    }

    fn key_move(&mut self, cmd: &mut MoveCommand) {
        // the walking flag keeps animations consistent through acceleration
        let movespeed = if self.buttons.is_held(ButtonId::Speed) ^ self.config.run {
            cmd.buttons.remove(Buttons::WALKING);
            RUN_MOVE_SPEED
        } else {
            cmd.buttons.insert(Buttons::WALKING);
            WALK_MOVE_SPEED
        };

        let now = self.frame_time_ms;
        let frame = self.frame_msec;
        let mut forward = 0.0;
        let mut side = 0.0;
        let mut up = 0.0;

        if self.buttons.is_held(ButtonId::Strafe) {
            side += movespeed * self.buttons.sample_fraction(ButtonId::Right, now, frame);
            side -= movespeed * self.buttons.sample_fraction(ButtonId::Left, now, frame);
        }
        side += movespeed * self.buttons.sample_fraction(ButtonId::MoveRight, now, frame);
        side -= movespeed * self.buttons.sample_fraction(ButtonId::MoveLeft, now, frame);

        // sidestep becomes a lean while the activate button is held
        if cmd.buttons.contains(Buttons::ACTIVATE) {
            if side > 0.0 {
                cmd.aux_buttons |= AuxButtons::LEAN_RIGHT;
            } else if side < 0.0 {
                cmd.aux_buttons |= AuxButtons::LEAN_LEFT;
            }
            side = 0.0;
        }

        up += movespeed * self.buttons.sample_fraction(ButtonId::Up, now, frame);
        up -= movespeed * self.buttons.sample_fraction(ButtonId::Down, now, frame);

        forward += movespeed * self.buttons.sample_fraction(ButtonId::Forward, now, frame);
        forward -= movespeed * self.buttons.sample_fraction(ButtonId::Back, now, frame);

        cmd.forward = clamp_move(forward as i32);
        cmd.right = clamp_move(side as i32);
        cmd.up = clamp_move(up as i32);
    }

    fn mouse_move(&mut self, cmd: &mut MoveCommand, ctx: &FrameContext) {
        let (mut mx, mut my) = self.mouse.take_frame_delta(self.config.mouse_filter);
        if mx == 0.0 && my == 0.0 {
            return;
        }

        (mx, my) = mouse::accelerate(mx, my, self.frame_msec, &self.config, ctx.heavy_weapon);

        // ingame FOV
        mx *= ctx.zoom_sensitivity;
        my *= ctx.zoom_sensitivity;

        let move_scale = MOUSE_MOVE_SCALE * (1000.0 / self.frame_msec as f32);
        let strafing = self.buttons.is_held(ButtonId::Strafe);

        if strafing {
            cmd.right = clamp_move(
                cmd.right as i32 + (self.config.mouse_side * move_scale * mx) as i32,
            );
        } else {
            self.view_angles[YAW] -= self.config.mouse_yaw * mx;
        }

        if (self.buttons.is_held(ButtonId::MouseLook) || self.config.freelook) && !strafing {
            self.view_angles[PITCH] += self.config.mouse_pitch * my;
        } else {
            cmd.forward = clamp_move(
                cmd.forward as i32 - (self.config.mouse_forward * move_scale * my) as i32,
            );
        }
    }

    fn joystick_move(&mut self, cmd: &mut MoveCommand) {
        if !(self.buttons.is_held(ButtonId::Speed) ^ self.config.run) {
            cmd.buttons.insert(Buttons::WALKING);
        }

        let mut anglespeed = 0.001 * self.frame_msec as f32;
        if self.buttons.is_held(ButtonId::Speed) {
            anglespeed *= self.config.anglespeed_key;
        }

        let side = self.joystick.axis(JoystickAxis::Side);
        if !self.buttons.is_held(ButtonId::Strafe) {
            self.view_angles[YAW] += anglespeed * self.config.yaw_speed * side as f32;
        } else {
            cmd.right = clamp_move(cmd.right as i32 + side);
        }

        let forward = self.joystick.axis(JoystickAxis::Forward);
        if self.buttons.is_held(ButtonId::MouseLook) {
            self.view_angles[PITCH] += anglespeed * self.config.pitch_speed * forward as f32;
        } else {
            cmd.forward = clamp_move(cmd.forward as i32 + forward);
        }

        cmd.up = clamp_move(cmd.up as i32 + self.joystick.axis(JoystickAxis::Up));
    }

    fn finish_move(&mut self, cmd: &mut MoveCommand, ctx: &FrameContext) {
        cmd.weapon = ctx.weapon;
        cmd.flags = ctx.flags;
        cmd.ident_client = ctx.ident_client;

        // the server measures movement from this instead of trusting a
        // client-side clock
        cmd.server_time = ctx.server_time;

        cmd.angles = angles_to_wire(self.view_angles);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::input::buttons::SourceKey;
    use crate::session::Catcher;
    use frontline::wire_to_angle;
    use glam::Vec3;

    const KEY: SourceKey = SourceKey::Key(17);
    const FRAME: u32 = 10;

    fn session() -> InputSession {
        let mut s = InputSession::new(ClientConfig::default());
        s.frame_time_ms = 10_000;
        s.frame_msec = FRAME;
        s
    }

    fn step(s: &mut InputSession, ctx: &FrameContext) -> MoveCommand {
        s.frame_time_ms += FRAME;
        s.build_command(ctx)
    }

    #[test]
    fn test_forward_hold_saturates_at_run_speed() {
        let mut s = session();
        s.buttons.press(ButtonId::Forward, KEY, Some(s.frame_time_ms));
        let cmd = step(&mut s, &FrameContext::default());
        assert_eq!(cmd.forward, 127);
        assert!(!cmd.buttons.contains(Buttons::WALKING));
    }

    #[test]
    fn test_walk_speed_when_run_disabled() {
        let mut s = session();
        s.config.run = false;
        s.buttons.press(ButtonId::Forward, KEY, Some(s.frame_time_ms));
        let cmd = step(&mut s, &FrameContext::default());
        assert_eq!(cmd.forward, 64);
        assert!(cmd.buttons.contains(Buttons::WALKING));
    }

    #[test]
    fn test_opposed_keys_cancel() {
        let mut s = session();
        s.buttons.press(ButtonId::MoveRight, KEY, Some(s.frame_time_ms));
        s.buttons
            .press(ButtonId::MoveLeft, SourceKey::Key(18), Some(s.frame_time_ms));
        let cmd = step(&mut s, &FrameContext::default());
        assert_eq!(cmd.right, 0);
    }

    #[test]
    fn test_sub_frame_attack_still_sent() {
        let mut s = session();
        let t = s.frame_time_ms;
        s.buttons.press(ButtonId::Attack, KEY, Some(t + 2));
        s.buttons
            .release(ButtonId::Attack, Some(KEY), Some(t + 4), FRAME);

        let cmd = step(&mut s, &FrameContext::default());
        assert!(cmd.buttons.contains(Buttons::ATTACK));

        // the sticky flag was consumed
        let cmd = step(&mut s, &FrameContext::default());
        assert!(!cmd.buttons.contains(Buttons::ATTACK));
    }

    #[test]
    fn test_mouse_yaw_turns_view() {
        let mut s = session();
        s.mouse.motion(100.0, 0.0);
        let before = s.view_angles[YAW];
        step(&mut s, &FrameContext::default());
        assert!(s.view_angles[YAW] < before);
    }

    #[test]
    fn test_strafe_modifier_redirects_mouse() {
        let mut s = session();
        s.buttons.press(ButtonId::Strafe, KEY, Some(s.frame_time_ms));
        s.mouse.motion(100.0, 0.0);
        let before = s.view_angles[YAW];
        let cmd = step(&mut s, &FrameContext::default());
        assert_eq!(s.view_angles[YAW], before);
        assert!(cmd.right > 0);
    }

    #[test]
    fn test_mouse_forward_when_not_freelook() {
        let mut s = session();
        s.config.freelook = false;
        s.mouse.motion(0.0, -200.0);
        let cmd = step(&mut s, &FrameContext::default());
        // pulling the mouse back runs forward
        assert!(cmd.forward > 0);
        assert_eq!(s.view_angles[PITCH], 0.0);
    }

    #[test]
    fn test_pitch_change_clamped_to_90_per_frame() {
        let mut s = session();
        // an absurd spike in one frame
        s.mouse.motion(0.0, 1_000_000.0);
        step(&mut s, &FrameContext::default());
        assert!(s.view_angles[PITCH] <= 90.0 + f32::EPSILON);

        let mut s = session();
        s.mouse.motion(0.0, -1_000_000.0);
        step(&mut s, &FrameContext::default());
        assert!(s.view_angles[PITCH] >= -90.0 - f32::EPSILON);
    }

    #[test]
    fn test_recoil_is_one_shot() {
        let mut s = session();
        s.set_recoil_pitch(-2.5);
        step(&mut s, &FrameContext::default());
        assert!((s.view_angles[PITCH] + 2.5).abs() < 1e-4);

        // consumed: the next frame gets no second kick
        step(&mut s, &FrameContext::default());
        assert!((s.view_angles[PITCH] + 2.5).abs() < 1e-4);
    }

    #[test]
    fn test_recoil_blocked_near_pitch_limit_is_still_consumed() {
        let mut s = session();
        s.view_angles = Vec3::new(-39.0, 0.0, 0.0);
        s.set_recoil_pitch(-5.0);
        step(&mut s, &FrameContext::default());
        // -44 would pass the bound, so the kick is skipped
        assert_eq!(s.view_angles[PITCH], -39.0);

        // and it does not fire later either
        step(&mut s, &FrameContext::default());
        assert_eq!(s.view_angles[PITCH], -39.0);
    }

    #[test]
    fn test_activate_converts_sidestep_to_lean() {
        let mut s = session();
        s.buttons.press(ButtonId::Activate, KEY, Some(s.frame_time_ms));
        s.buttons
            .press(ButtonId::MoveRight, SourceKey::Key(18), Some(s.frame_time_ms));
        let cmd = step(&mut s, &FrameContext::default());
        assert_eq!(cmd.right, 0);
        assert!(cmd.aux_buttons.contains(AuxButtons::LEAN_RIGHT));
    }

    #[test]
    fn test_talk_flag_follows_catcher() {
        let mut s = session();
        s.catcher = Catcher::UI;
        let cmd = step(&mut s, &FrameContext::default());
        assert!(cmd.buttons.contains(Buttons::TALK));

        s.catcher = Catcher::empty();
        let cmd = step(&mut s, &FrameContext::default());
        assert!(!cmd.buttons.contains(Buttons::TALK));
    }

    #[test]
    fn test_any_key_flag() {
        let mut s = session();
        s.key_count(true);
        let cmd = step(&mut s, &FrameContext::default());
        assert!(cmd.buttons.contains(Buttons::ANY));

        s.key_count(false);
        let cmd = step(&mut s, &FrameContext::default());
        assert!(!cmd.buttons.contains(Buttons::ANY));
    }

    #[test]
    fn test_joystick_feeds_movement() {
        let mut s = session();
        s.joystick.set_axis(JoystickAxis::Forward as usize, 200);
        s.joystick.set_axis(JoystickAxis::Up as usize, -30);
        let cmd = step(&mut s, &FrameContext::default());
        assert_eq!(cmd.forward, 127);
        assert_eq!(cmd.up, -30);
    }

    #[test]
    fn test_context_is_stamped() {
        let mut s = session();
        s.view_angles = Vec3::new(-10.0, 45.0, 0.0);
        let ctx = FrameContext {
            server_time: 7777,
            weapon: 12,
            flags: 3,
            ident_client: 2,
            ..Default::default()
        };
        let cmd = step(&mut s, &ctx);
        assert_eq!(cmd.server_time, 7777);
        assert_eq!(cmd.weapon, 12);
        assert_eq!(cmd.flags, 3);
        assert_eq!(cmd.ident_client, 2);
        assert!((wire_to_angle(cmd.angles[YAW]) - 45.0).abs() < 0.01);
    }

    #[test]
    fn test_double_tap_tag_reaches_command() {
        let mut s = session();
        s.config.double_tap_delay_ms = 200;
        let ctx = FrameContext::default();

        let t0 = s.frame_time_ms + FRAME;
        s.buttons.press(ButtonId::MoveLeft, KEY, Some(t0));
        step(&mut s, &ctx);

        s.buttons
            .release(ButtonId::MoveLeft, Some(KEY), Some(t0 + 40), FRAME);
        step(&mut s, &ctx);

        s.buttons.press(ButtonId::MoveLeft, KEY, Some(t0 + 80));
        let mut tagged = false;
        for _ in 0..8 {
            let cmd = step(&mut s, &ctx);
            if cmd.double_tap == frontline::DoubleTapKind::MoveLeft {
                tagged = true;
                break;
            }
        }
        assert!(tagged);
    }
}
