use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AccelStyle {
    /// Flat speed boost proportional to pointer rate.
    #[default]
    Legacy,
    /// Power-curve acceleration, near-linear at low rates.
    Power,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DebugMove {
    #[default]
    Off,
    Yaw,
    Pitch,
}

/// Every input/network option the pipeline recognizes. Values are clamped by
/// [`ClientConfig::sanitize`], which callers run after applying overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub sensitivity: f32,
    pub mouse_accel: f32,
    pub mouse_accel_style: AccelStyle,
    pub mouse_accel_offset: f32,
    pub mouse_filter: bool,
    pub mouse_pitch: f32,
    pub mouse_yaw: f32,
    pub mouse_forward: f32,
    pub mouse_side: f32,
    pub freelook: bool,
    pub run: bool,
    pub yaw_speed: f32,
    pub pitch_speed: f32,
    pub anglespeed_key: f32,
    pub max_packets: u32,
    pub packet_dup: u32,
    pub no_delta: bool,
    pub double_tap_delay_ms: u32,
    pub debug_move: DebugMove,
    pub show_send: bool,
    pub show_mouse_rate: bool,
    pub lan_force_packets: bool,
    pub bypass_mouse: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            sensitivity: 5.0,
            mouse_accel: 0.0,
            mouse_accel_style: AccelStyle::Legacy,
            mouse_accel_offset: 5.0,
            mouse_filter: false,
            mouse_pitch: 0.022,
            mouse_yaw: 0.022,
            mouse_forward: 0.25,
            mouse_side: 0.25,
            freelook: true,
            run: true,
            yaw_speed: 140.0,
            pitch_speed: 140.0,
            anglespeed_key: 1.5,
            max_packets: 125,
            packet_dup: 1,
            no_delta: false,
            double_tap_delay_ms: 0,
            debug_move: DebugMove::Off,
            show_send: false,
            show_mouse_rate: false,
            lan_force_packets: false,
            bypass_mouse: false,
        }
    }
}

impl ClientConfig {
    pub const MIN_PACKETS_PER_SECOND: u32 = 15;
    pub const MAX_PACKETS_PER_SECOND: u32 = 125;
    pub const MAX_PACKET_DUP: u32 = 5;
    pub const MIN_ACCEL_OFFSET: f32 = 0.001;

    pub fn sanitize(&mut self) {
        self.max_packets = self
            .max_packets
            .clamp(Self::MIN_PACKETS_PER_SECOND, Self::MAX_PACKETS_PER_SECOND);
        self.packet_dup = self.packet_dup.min(Self::MAX_PACKET_DUP);
        if self.mouse_accel_offset < Self::MIN_ACCEL_OFFSET {
            self.mouse_accel_offset = Self::MIN_ACCEL_OFFSET;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_clamps_ranges() {
        let mut config = ClientConfig {
            max_packets: 1000,
            packet_dup: 9,
            mouse_accel_offset: 0.0,
            ..Default::default()
        };
        config.sanitize();
        assert_eq!(config.max_packets, 125);
        assert_eq!(config.packet_dup, 5);
        assert_eq!(config.mouse_accel_offset, ClientConfig::MIN_ACCEL_OFFSET);

        let mut config = ClientConfig {
            max_packets: 1,
            ..Default::default()
        };
        config.sanitize();
        assert_eq!(config.max_packets, 15);
    }
}
