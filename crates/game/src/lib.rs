pub mod net;

pub use net::{
    AuxButtons, Buttons, COMMAND_BACKUP, COMMAND_MASK, DoubleTapKind, MAX_PACKET_COMMANDS,
    MAX_RELIABLE_COMMANDS, MoveCommand, PACKET_BACKUP, PACKET_MASK, PITCH, PacketReader,
    PacketWriter, ROLL, WireError, YAW, angle_to_wire, angles_to_wire, clamp_move, hash_reliable,
    read_delta_move, sequence_greater_than, wire_to_angle, write_delta_move,
};
