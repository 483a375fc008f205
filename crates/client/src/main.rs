mod config;
mod input;
mod net;
mod session;

use anyhow::Result;
use clap::Parser;
use glam::Vec3;

use config::{AccelStyle, ClientConfig, DebugMove};
use input::{ButtonId, FrameContext, SourceKey};
use net::ServerLink;
use session::InputSession;

#[derive(Parser)]
#[command(name = "frontline")]
#[command(about = "Frontline input pipeline driver (loopback)")]
struct Args {
    #[arg(long, default_value_t = 500, help = "Frames to simulate")]
    frames: u32,

    #[arg(long, default_value_t = 125, help = "Simulated frame rate")]
    fps: u32,

    #[arg(long, default_value_t = 125)]
    max_packets: u32,

    #[arg(long, default_value_t = 1, help = "Redundancy window in packets")]
    packet_dup: u32,

    #[arg(long, default_value_t = 5.0)]
    sensitivity: f32,

    #[arg(long, default_value_t = 0.0, help = "Mouse acceleration factor")]
    mouse_accel: f32,

    #[arg(long, help = "Use the power-curve acceleration model")]
    accel_power: bool,

    #[arg(long, default_value_t = 0, help = "Double-tap window in ms (0 = off)")]
    double_tap: u32,

    #[arg(long, help = "Disable delta-compressed move blocks")]
    no_delta: bool,

    #[arg(long, help = "Print per-packet send information")]
    show_send: bool,

    #[arg(long, help = "Graph per-frame yaw deltas")]
    debug_yaw: bool,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = ClientConfig {
        max_packets: args.max_packets,
        packet_dup: args.packet_dup,
        sensitivity: args.sensitivity,
        mouse_accel: args.mouse_accel,
        mouse_accel_style: if args.accel_power {
            AccelStyle::Power
        } else {
            AccelStyle::Legacy
        },
        double_tap_delay_ms: args.double_tap,
        no_delta: args.no_delta,
        show_send: args.show_send,
        debug_move: if args.debug_yaw {
            DebugMove::Yaw
        } else {
            DebugMove::Off
        },
        ..Default::default()
    };

    let mut session = InputSession::new(config);
    session.set_view_angles(Vec3::new(0.0, 90.0, 0.0));
    let mut link = ServerLink::loopback(1);
    link.checksum_feed = 0x00c0_ffee;
    link.add_reliable_command("userinfo \"name\\grunt\"");

    let frame_ms = (1000 / args.fps.max(1)).max(1);
    let key = SourceKey::Key(17);
    let mut packets_sent = 0u32;
    let mut bytes_sent = 0usize;

    log::info!(
        "driving {} frames at {} fps over loopback",
        args.frames,
        args.fps
    );

    for frame in 0..args.frames {
        let now = 1000 + frame * frame_ms;

        // scripted input: run forward with a mouse sweep, tap out a
        // double-tap on move-left partway through, fire near the end
        match frame {
            10 => {
                session.key_count(true);
                session.buttons.press(ButtonId::Forward, key, Some(now));
            }
            40 => session
                .buttons
                .press(ButtonId::MoveLeft, SourceKey::Key(30), Some(now)),
            44 => session.buttons.release(
                ButtonId::MoveLeft,
                Some(SourceKey::Key(30)),
                Some(now),
                frame_ms,
            ),
            48 => session
                .buttons
                .press(ButtonId::MoveLeft, SourceKey::Key(30), Some(now)),
            60 => session.buttons.release(
                ButtonId::MoveLeft,
                Some(SourceKey::Key(30)),
                Some(now),
                frame_ms,
            ),
            80 => session.buttons.press(ButtonId::Attack, key, Some(now)),
            90 => {
                session.key_count(false);
                session
                    .buttons
                    .release(ButtonId::Attack, Some(key), Some(now), frame_ms);
                session.set_recoil_pitch(-1.5);
            }
            100 => session.command("+sprint", Some(SourceKey::Key(42)), Some(now)),
            140 => session.command("-sprint", Some(SourceKey::Key(42)), Some(now)),
            150 => session.joystick_event(1, 48),
            200 => session.joystick_event(1, 0),
            _ => {}
        }
        if frame > 20 && frame < 120 {
            let sweep = (frame as f32 * 0.2).sin();
            session.mouse_event(sweep * 8.0, sweep * 2.0);
        }

        let ctx = FrameContext {
            server_time: now as i32,
            ..Default::default()
        };

        if let Some(datagram) = session.send_frame(&mut link, &ctx, now, now) {
            packets_sent += 1;
            bytes_sent += datagram.len();
            if datagram.len() > 12 {
                // reliable backlog acknowledged on the loopback echo
                link.reliable_acknowledge = link.reliable_sequence;
            }
        }
    }

    let commands = session.history().command_number();
    log::info!(
        "built {} commands, sent {} packets, {} bytes ({:.1} bytes/packet)",
        commands,
        packets_sent,
        bytes_sent,
        bytes_sent as f32 / packets_sent.max(1) as f32
    );
    log::info!(
        "final view angles: {:?}, newest command seq {}",
        session.view_angles(),
        session.history().latest().map(|c| c.sequence).unwrap_or(0)
    );
    if args.debug_yaw {
        log::info!("last yaw delta: {:.3}", session.debug_graph().latest());
    }

    Ok(())
}
