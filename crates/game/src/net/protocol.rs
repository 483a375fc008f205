use bitflags::bitflags;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Generated commands kept client-side for redundant sends and reconciliation.
pub const COMMAND_BACKUP: u32 = 64;
pub const COMMAND_MASK: u32 = COMMAND_BACKUP - 1;

/// Outgoing packet records kept for redundancy windowing.
pub const PACKET_BACKUP: u32 = 32;
pub const PACKET_MASK: u32 = PACKET_BACKUP - 1;

/// Hard cap on movement commands carried by a single packet.
pub const MAX_PACKET_COMMANDS: u32 = 32;

pub const MAX_RELIABLE_COMMANDS: i32 = 64;

const SEQUENCE_WRAP_THRESHOLD: u32 = u32::MAX / 2;

pub const PITCH: usize = 0;
pub const YAW: usize = 1;
pub const ROLL: usize = 2;

#[inline]
pub fn sequence_greater_than(s1: u32, s2: u32) -> bool {
    ((s1 > s2) && (s1 - s2 <= SEQUENCE_WRAP_THRESHOLD))
        || ((s1 < s2) && (s2 - s1 > SEQUENCE_WRAP_THRESHOLD))
}

/// Degrees to the 16-bit fixed-point wire representation (65536 units per turn).
#[inline]
pub fn angle_to_wire(deg: f32) -> i16 {
    (((deg * (65536.0 / 360.0)) as i32) & 0xffff) as u16 as i16
}

#[inline]
pub fn wire_to_angle(wire: i16) -> f32 {
    wire as u16 as f32 * (360.0 / 65536.0)
}

pub fn angles_to_wire(angles: Vec3) -> [i16; 3] {
    [
        angle_to_wire(angles[PITCH]),
        angle_to_wire(angles[YAW]),
        angle_to_wire(angles[ROLL]),
    ]
}

/// Saturates a movement axis into the signed 8-bit wire range. -128 is
/// reserved so the full range stays symmetric.
#[inline]
pub fn clamp_move(value: i32) -> i8 {
    value.clamp(-127, 127) as i8
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Buttons: u8 {
        const ATTACK   = 1 << 0;
        const TALK     = 1 << 1;
        const USE_ITEM = 1 << 2;
        const GESTURE  = 1 << 3;
        const WALKING  = 1 << 4;
        const SPRINT   = 1 << 5;
        const ACTIVATE = 1 << 6;
        const ANY      = 1 << 7;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AuxButtons: u8 {
        const ATTACK2    = 1 << 0;
        const ZOOM       = 1 << 1;
        const RELOAD     = 1 << 3;
        const LEAN_LEFT  = 1 << 4;
        const LEAN_RIGHT = 1 << 5;
        const DROP       = 1 << 6;
        const PRONE      = 1 << 7;
    }
}

/// Direction a double-tap was recognized on, at most one per command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DoubleTapKind {
    #[default]
    None,
    MoveLeft,
    MoveRight,
    Forward,
    Back,
    LeanLeft,
    LeanRight,
    Up,
}

impl DoubleTapKind {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::MoveLeft),
            2 => Some(Self::MoveRight),
            3 => Some(Self::Forward),
            4 => Some(Self::Back),
            5 => Some(Self::LeanLeft),
            6 => Some(Self::LeanRight),
            7 => Some(Self::Up),
            _ => None,
        }
    }
}

/// One frame's worth of player intent, quantized for the wire. Immutable once
/// stored in the client's command history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveCommand {
    pub server_time: i32,
    pub sequence: u32,
    pub angles: [i16; 3],
    pub forward: i8,
    pub right: i8,
    pub up: i8,
    pub buttons: Buttons,
    pub aux_buttons: AuxButtons,
    pub weapon: u8,
    pub flags: u8,
    pub ident_client: u8,
    pub double_tap: DoubleTapKind,
}

impl MoveCommand {
    pub fn view_angles(&self) -> Vec3 {
        Vec3::new(
            wire_to_angle(self.angles[PITCH]),
            wire_to_angle(self.angles[YAW]),
            wire_to_angle(self.angles[ROLL]),
        )
    }
}
