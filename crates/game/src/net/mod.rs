mod delta;
mod protocol;
mod wire;

pub use delta::{hash_reliable, read_delta_move, write_delta_move};
pub use protocol::{
    AuxButtons, Buttons, COMMAND_BACKUP, COMMAND_MASK, DoubleTapKind, MAX_PACKET_COMMANDS,
    MAX_RELIABLE_COMMANDS, MoveCommand, PACKET_BACKUP, PACKET_MASK, PITCH, ROLL, YAW,
    angle_to_wire, angles_to_wire, clamp_move, sequence_greater_than, wire_to_angle,
};
pub use wire::{PacketReader, PacketWriter, WireError};
