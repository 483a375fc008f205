use frontline::{
    MAX_PACKET_COMMANDS, MoveCommand, PacketWriter, hash_reliable, write_delta_move,
};

use crate::config::ClientConfig;

use super::history::{CommandHistory, PacketHistory, PacketRecord};
use super::link::{LinkState, ServerLink};

/// Message operations understood by the server parser.
pub const OP_MOVE: u8 = 2;
pub const OP_MOVE_NO_DELTA: u8 = 3;
pub const OP_RELIABLE_COMMAND: u8 = 4;

/// Builds the outgoing datagram: reliable backlog first, then a window of
/// recent movement commands delta-encoded against each other. Every command
/// generated since the packet `packet_dup` + 1 sends ago is included, so a
/// few dropped packets in a row cost nothing.
///
/// During normal gameplay the buffer looks like:
///
/// ```text
/// 4   server id
/// 4   acknowledged server message sequence
/// 4   acknowledged reliable command sequence
/// <unacknowledged reliable commands>
/// 1   move operation (delta / no-delta)
/// 1   command count
/// <count delta-encoded commands>
/// ```
pub fn write_packet(
    config: &ClientConfig,
    history: &CommandHistory,
    packets: &mut PacketHistory,
    link: &mut ServerLink,
    real_time_ms: u32,
) -> Option<Vec<u8>> {
    if link.demo_playback || link.state == LinkState::Cinematic {
        return None;
    }

    let mut w = PacketWriter::new();

    // the server id tells the server whether this client is still on the
    // current gamestate; the message sequence drives its delta bookkeeping
    w.write_i32(link.server_id);
    w.write_i32(link.server_message_sequence);
    w.write_i32(link.server_command_sequence);

    // re-send every reliable command the server has not acknowledged yet
    let unacked = link.reliable_sequence.wrapping_sub(link.reliable_acknowledge).max(0);
    for i in 0..unacked {
        let index = link.reliable_acknowledge.wrapping_add(1 + i);
        w.write_u8(OP_RELIABLE_COMMAND);
        w.write_i32(index);
        w.write_string(link.reliable_command(index));
    }

    // commands generated since the reference packet; redundancy against loss
    let reference = link
        .outgoing_sequence
        .wrapping_sub(1)
        .wrapping_sub(config.packet_dup);
    let mut count = history
        .command_number()
        .wrapping_sub(packets.get(reference).command_number);
    if count > MAX_PACKET_COMMANDS {
        count = MAX_PACKET_COMMANDS;
        log::warn!("too many commands for one packet, dropping the oldest");
    }

    let mut newest_server_time = 0;
    if count >= 1 {
        if config.show_send {
            log::debug!("({count}) commands");
        }

        let no_delta = config.no_delta
            || !link.snapshot_valid
            || link.demo_waiting
            || link.server_message_sequence != link.snapshot_message_number;
        w.write_u8(if no_delta { OP_MOVE_NO_DELTA } else { OP_MOVE });
        w.write_u8(count as u8);

        let key = link.checksum_feed
            ^ link.server_message_sequence
            ^ hash_reliable(link.server_command(link.server_command_sequence));

        let mut prev = MoveCommand::default();
        for i in 0..count {
            let number = history
                .command_number()
                .wrapping_sub(count)
                .wrapping_add(i + 1);
            if let Some(cmd) = history.get(number) {
                write_delta_move(&mut w, key as u32, &prev, cmd);
                prev = *cmd;
            }
        }
        newest_server_time = prev.server_time;
    }

    packets.record(
        link.outgoing_sequence,
        PacketRecord {
            real_time_ms,
            server_time: newest_server_time,
            command_number: history.command_number(),
        },
    );
    link.outgoing_sequence = link.outgoing_sequence.wrapping_add(1);
    link.last_packet_time_ms = real_time_ms;

    if config.show_send {
        log::debug!("{} bytes", w.len());
    }

    Some(w.into_bytes())
}
