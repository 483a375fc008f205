use crate::config::ClientConfig;

use super::history::PacketHistory;
use super::link::{LinkState, RemoteKind, ServerLink};

/// Floor between packets while a file transfer is running.
const TRANSFER_PACKET_GAP_MS: u32 = 50;
/// Floor between packets before a gamestate has arrived.
const SETUP_PACKET_GAP_MS: u32 = 1000;

/// Decides whether this frame may flush a packet. Suppressed frames lose
/// nothing: the accumulated commands ride the next packet, which also buys
/// more delta compression.
pub fn ready_to_send(
    link: &ServerLink,
    config: &ClientConfig,
    packets: &PacketHistory,
    real_time_ms: u32,
) -> bool {
    // nothing goes out while playing back a recording or in a cutscene
    if link.demo_playback || link.state == LinkState::Cinematic {
        return false;
    }

    let since_last = real_time_ms.wrapping_sub(link.last_packet_time_ms);

    if link.transfer_active && since_last < TRANSFER_PACKET_GAP_MS {
        return false;
    }

    if !matches!(link.state, LinkState::Primed | LinkState::Active)
        && !link.transfer_active
        && since_last < SETUP_PACKET_GAP_MS
    {
        return false;
    }

    // loopback and (opted-in) LAN peers send every frame
    if link.remote == RemoteKind::Loopback {
        return true;
    }
    if config.lan_force_packets && link.remote == RemoteKind::Lan {
        return true;
    }

    let previous = packets.get(link.outgoing_sequence.wrapping_sub(1));
    if real_time_ms.wrapping_sub(previous.real_time_ms) < 1000 / config.max_packets {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::history::PacketRecord;

    fn internet_link() -> ServerLink {
        let mut link = ServerLink::new(RemoteKind::Internet);
        link.state = LinkState::Active;
        link
    }

    fn after_send(link: &mut ServerLink, packets: &mut PacketHistory, at_ms: u32) {
        packets.record(
            link.outgoing_sequence,
            PacketRecord {
                real_time_ms: at_ms,
                server_time: 0,
                command_number: 0,
            },
        );
        link.outgoing_sequence += 1;
        link.last_packet_time_ms = at_ms;
    }

    #[test]
    fn test_rate_gate_suppresses_fast_attempts() {
        let mut link = internet_link();
        let mut packets = PacketHistory::new();
        let config = ClientConfig::default(); // 125 packets/sec -> 8ms

        assert!(ready_to_send(&link, &config, &packets, 10_000));
        after_send(&mut link, &mut packets, 10_000);

        // second attempt lands inside the 8ms window
        assert!(!ready_to_send(&link, &config, &packets, 10_005));
        assert!(ready_to_send(&link, &config, &packets, 10_008));
    }

    #[test]
    fn test_loopback_always_sends() {
        let mut link = ServerLink::loopback(1);
        let mut packets = PacketHistory::new();
        let config = ClientConfig::default();

        after_send(&mut link, &mut packets, 10_000);
        assert!(ready_to_send(&link, &config, &packets, 10_000));
        assert!(ready_to_send(&link, &config, &packets, 10_001));
    }

    #[test]
    fn test_lan_bypass_is_opt_in() {
        let mut link = internet_link();
        link.remote = RemoteKind::Lan;
        let mut packets = PacketHistory::new();
        let mut config = ClientConfig::default();

        after_send(&mut link, &mut packets, 10_000);
        assert!(!ready_to_send(&link, &config, &packets, 10_002));

        config.lan_force_packets = true;
        assert!(ready_to_send(&link, &config, &packets, 10_002));
    }

    #[test]
    fn test_demo_playback_and_cinematic_mute() {
        let mut link = internet_link();
        let packets = PacketHistory::new();
        let config = ClientConfig::default();

        link.demo_playback = true;
        assert!(!ready_to_send(&link, &config, &packets, 10_000));

        link.demo_playback = false;
        link.state = LinkState::Cinematic;
        assert!(!ready_to_send(&link, &config, &packets, 10_000));
    }

    #[test]
    fn test_unprimed_connection_trickles() {
        let mut link = internet_link();
        link.state = LinkState::Connected;
        link.last_packet_time_ms = 10_000;
        let packets = PacketHistory::new();
        let config = ClientConfig::default();

        assert!(!ready_to_send(&link, &config, &packets, 10_500));
        assert!(ready_to_send(&link, &config, &packets, 11_000));
    }

    #[test]
    fn test_transfer_floor() {
        let mut link = internet_link();
        link.state = LinkState::Connected;
        link.transfer_active = true;
        link.last_packet_time_ms = 10_000;
        let packets = PacketHistory::new();
        let config = ClientConfig::default();

        assert!(!ready_to_send(&link, &config, &packets, 10_020));
        // a transfer is exempt from the 1000ms setup floor
        assert!(ready_to_send(&link, &config, &packets, 10_050));
    }
}
