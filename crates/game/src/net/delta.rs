use super::protocol::{AuxButtons, Buttons, DoubleTapKind, MoveCommand};
use super::wire::{PacketReader, PacketWriter, WireError};

// server-time prefix
const TIME_FULL: u8 = 0;
const TIME_DELTA: u8 = 1;

// change-mask bits
const CH_ANGLE0: u16 = 1 << 0;
const CH_ANGLE1: u16 = 1 << 1;
const CH_ANGLE2: u16 = 1 << 2;
const CH_FORWARD: u16 = 1 << 3;
const CH_RIGHT: u16 = 1 << 4;
const CH_UP: u16 = 1 << 5;
const CH_BUTTONS: u16 = 1 << 6;
const CH_AUX_BUTTONS: u16 = 1 << 7;
const CH_WEAPON: u16 = 1 << 8;
const CH_FLAGS: u16 = 1 << 9;
const CH_IDENT: u16 = 1 << 10;
const CH_DOUBLE_TAP: u16 = 1 << 11;

#[inline]
fn fold8(k: u32) -> u8 {
    (k ^ (k >> 8) ^ (k >> 16) ^ (k >> 24)) as u8
}

#[inline]
fn fold16(k: u32) -> u16 {
    (k ^ (k >> 16)) as u16
}

fn change_mask(from: &MoveCommand, to: &MoveCommand) -> u16 {
    let mut mask = 0;
    if to.angles[0] != from.angles[0] {
        mask |= CH_ANGLE0;
    }
    if to.angles[1] != from.angles[1] {
        mask |= CH_ANGLE1;
    }
    if to.angles[2] != from.angles[2] {
        mask |= CH_ANGLE2;
    }
    if to.forward != from.forward {
        mask |= CH_FORWARD;
    }
    if to.right != from.right {
        mask |= CH_RIGHT;
    }
    if to.up != from.up {
        mask |= CH_UP;
    }
    if to.buttons != from.buttons {
        mask |= CH_BUTTONS;
    }
    if to.aux_buttons != from.aux_buttons {
        mask |= CH_AUX_BUTTONS;
    }
    if to.weapon != from.weapon {
        mask |= CH_WEAPON;
    }
    if to.flags != from.flags {
        mask |= CH_FLAGS;
    }
    if to.ident_client != from.ident_client {
        mask |= CH_IDENT;
    }
    if to.double_tap != from.double_tap {
        mask |= CH_DOUBLE_TAP;
    }
    mask
}

/// Writes `to` as a delta against `from`. Only the server time and the fields
/// that actually changed go on the wire; changed fields are obfuscated with
/// `key` mixed with the command's own server time. An unchanged command costs
/// a single flag byte after the time prefix.
pub fn write_delta_move(w: &mut PacketWriter, key: u32, from: &MoveCommand, to: &MoveCommand) {
    let dt = to.server_time.wrapping_sub(from.server_time);
    if (0..256).contains(&dt) {
        w.write_u8(TIME_DELTA);
        w.write_u8(dt as u8);
    } else {
        w.write_u8(TIME_FULL);
        w.write_i32(to.server_time);
    }

    let mask = change_mask(from, to);
    if mask == 0 {
        w.write_u8(0);
        return;
    }
    w.write_u8(1);

    let k = key ^ to.server_time as u32;
    let kb = fold8(k);
    let kw = fold16(k);

    w.write_u16(mask);
    if mask & CH_ANGLE0 != 0 {
        w.write_u16(to.angles[0] as u16 ^ kw);
    }
    if mask & CH_ANGLE1 != 0 {
        w.write_u16(to.angles[1] as u16 ^ kw);
    }
    if mask & CH_ANGLE2 != 0 {
        w.write_u16(to.angles[2] as u16 ^ kw);
    }
    if mask & CH_FORWARD != 0 {
        w.write_u8(to.forward as u8 ^ kb);
    }
    if mask & CH_RIGHT != 0 {
        w.write_u8(to.right as u8 ^ kb);
    }
    if mask & CH_UP != 0 {
        w.write_u8(to.up as u8 ^ kb);
    }
    if mask & CH_BUTTONS != 0 {
        w.write_u8(to.buttons.bits() ^ kb);
    }
    if mask & CH_AUX_BUTTONS != 0 {
        w.write_u8(to.aux_buttons.bits() ^ kb);
    }
    if mask & CH_WEAPON != 0 {
        w.write_u8(to.weapon ^ kb);
    }
    if mask & CH_FLAGS != 0 {
        w.write_u8(to.flags ^ kb);
    }
    if mask & CH_IDENT != 0 {
        w.write_u8(to.ident_client ^ kb);
    }
    if mask & CH_DOUBLE_TAP != 0 {
        w.write_u8(to.double_tap.as_u8() ^ kb);
    }
}

/// Inverse of [`write_delta_move`]. The sequence number is not transmitted;
/// commands are implicitly consecutive within a packet.
pub fn read_delta_move(
    r: &mut PacketReader<'_>,
    key: u32,
    from: &MoveCommand,
) -> Result<MoveCommand, WireError> {
    let mut cmd = *from;
    cmd.sequence = from.sequence.wrapping_add(1);

    match r.read_u8()? {
        TIME_DELTA => {
            cmd.server_time = from.server_time.wrapping_add(r.read_u8()? as i32);
        }
        TIME_FULL => {
            cmd.server_time = r.read_i32()?;
        }
        _ => return Err(WireError::Malformed),
    }

    match r.read_u8()? {
        0 => return Ok(cmd),
        1 => {}
        _ => return Err(WireError::Malformed),
    }

    let k = key ^ cmd.server_time as u32;
    let kb = fold8(k);
    let kw = fold16(k);

    let mask = r.read_u16()?;
    if mask & CH_ANGLE0 != 0 {
        cmd.angles[0] = (r.read_u16()? ^ kw) as i16;
    }
    if mask & CH_ANGLE1 != 0 {
        cmd.angles[1] = (r.read_u16()? ^ kw) as i16;
    }
    if mask & CH_ANGLE2 != 0 {
        cmd.angles[2] = (r.read_u16()? ^ kw) as i16;
    }
    if mask & CH_FORWARD != 0 {
        cmd.forward = (r.read_u8()? ^ kb) as i8;
    }
    if mask & CH_RIGHT != 0 {
        cmd.right = (r.read_u8()? ^ kb) as i8;
    }
    if mask & CH_UP != 0 {
        cmd.up = (r.read_u8()? ^ kb) as i8;
    }
    if mask & CH_BUTTONS != 0 {
        cmd.buttons = Buttons::from_bits_retain(r.read_u8()? ^ kb);
    }
    if mask & CH_AUX_BUTTONS != 0 {
        cmd.aux_buttons = AuxButtons::from_bits_retain(r.read_u8()? ^ kb);
    }
    if mask & CH_WEAPON != 0 {
        cmd.weapon = r.read_u8()? ^ kb;
    }
    if mask & CH_FLAGS != 0 {
        cmd.flags = r.read_u8()? ^ kb;
    }
    if mask & CH_IDENT != 0 {
        cmd.ident_client = r.read_u8()? ^ kb;
    }
    if mask & CH_DOUBLE_TAP != 0 {
        cmd.double_tap =
            DoubleTapKind::from_u8(r.read_u8()? ^ kb).ok_or(WireError::Malformed)?;
    }

    Ok(cmd)
}

/// Folds a reliable-command string into the obfuscation key. High-bit and
/// '%' characters hash as '.' so the value survives lossy text paths.
pub fn hash_reliable(command: &str) -> i32 {
    let mut hash: i32 = 0;
    for (i, &b) in command.as_bytes().iter().take(32).enumerate() {
        let ch = if b & 0x80 != 0 || b == b'%' { b'.' } else { b };
        hash = hash.wrapping_add((ch as i32).wrapping_mul(119 + i as i32));
    }
    hash ^ (hash >> 10) ^ (hash >> 20)
}
