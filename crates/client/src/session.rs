use bitflags::bitflags;
use glam::Vec3;

use crate::config::ClientConfig;
use crate::input::builder::FrameContext;
use crate::input::buttons::{ButtonTable, Edge, SourceKey, parse_binding};
use crate::input::double_tap::DoubleTapDetector;
use crate::input::joystick::JoystickState;
use crate::input::mouse::MouseAccum;
use crate::net::history::{CommandHistory, PacketHistory};
use crate::net::link::ServerLink;
use crate::net::{assembler, pacing};

bitflags! {
    /// Which layer is currently eating input.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Catcher: u8 {
        const CONSOLE = 1 << 0;
        const UI      = 1 << 1;
        const HUD     = 1 << 2;
    }
}

/// Where a motion event ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseRouting {
    Game,
    Ui,
}

/// Rolling samples of per-frame view-angle change, for turn tuning.
#[derive(Debug)]
pub struct DebugGraph {
    samples: [f32; 64],
    head: usize,
}

impl Default for DebugGraph {
    fn default() -> Self {
        Self {
            samples: [0.0; 64],
            head: 0,
        }
    }
}

impl DebugGraph {
    pub fn record(&mut self, value: f32) {
        self.samples[self.head & 63] = value;
        self.head = self.head.wrapping_add(1);
        log::debug!("angle delta: {value}");
    }

    pub fn latest(&self) -> f32 {
        self.samples[self.head.wrapping_sub(1) & 63]
    }
}

/// All mutable input state, owned by the frame-tick driver. Device callbacks
/// and the per-frame build run on the same tick; nothing here is shared
/// across threads.
pub struct InputSession {
    pub config: ClientConfig,
    pub buttons: ButtonTable,
    pub catcher: Catcher,
    pub(crate) double_tap: DoubleTapDetector,
    pub(crate) mouse: MouseAccum,
    pub(crate) joystick: JoystickState,
    pub(crate) view_angles: Vec3,
    pub(crate) pending_recoil_pitch: f32,
    pub(crate) any_keys_down: u32,
    pub(crate) debug_graph: DebugGraph,
    pub(crate) history: CommandHistory,
    pub(crate) packets: PacketHistory,
    pub(crate) frame_time_ms: u32,
    pub(crate) frame_msec: u32,
    old_frame_time_ms: u32,
}

impl InputSession {
    pub fn new(mut config: ClientConfig) -> Self {
        config.sanitize();
        Self {
            config,
            buttons: ButtonTable::new(),
            catcher: Catcher::empty(),
            double_tap: DoubleTapDetector::new(),
            mouse: MouseAccum::new(),
            joystick: JoystickState::new(),
            view_angles: Vec3::ZERO,
            pending_recoil_pitch: 0.0,
            any_keys_down: 0,
            debug_graph: DebugGraph::default(),
            history: CommandHistory::new(),
            packets: PacketHistory::new(),
            frame_time_ms: 0,
            frame_msec: 1,
            old_frame_time_ms: 0,
        }
    }

    /// Handles a `+verb`/`-verb` button command from a bind or the console.
    /// Unknown verbs are ignored so binds to other subsystems pass through.
    pub fn command(&mut self, text: &str, source: Option<SourceKey>, timestamp_ms: Option<u32>) {
        let Some((id, edge)) = parse_binding(text) else {
            return;
        };
        match edge {
            Edge::Down => {
                self.buttons
                    .press(id, source.unwrap_or(SourceKey::Console), timestamp_ms);
            }
            Edge::Up => {
                self.buttons.release(id, source, timestamp_ms, self.frame_msec);
            }
        }
    }

    /// Raw pointer motion. Returns where the delta went so the caller can
    /// forward UI-bound motion to its menu layer.
    pub fn mouse_event(&mut self, dx: f32, dy: f32) -> MouseRouting {
        if self
            .catcher
            .intersects(Catcher::UI | Catcher::HUD)
            && !self.config.bypass_mouse
        {
            return MouseRouting::Ui;
        }
        self.mouse.motion(dx, dy);
        MouseRouting::Game
    }

    pub fn joystick_event(&mut self, axis: usize, value: i32) {
        self.joystick.set_axis(axis, value);
    }

    /// Tracks whether any device key at all is down, bound or not.
    pub fn key_count(&mut self, pressed: bool) {
        if pressed {
            self.any_keys_down += 1;
        } else {
            self.any_keys_down = self.any_keys_down.saturating_sub(1);
        }
    }

    /// One-shot pitch kick from weapon fire; consumed by the next command.
    pub fn set_recoil_pitch(&mut self, degrees: f32) {
        self.pending_recoil_pitch = degrees;
    }

    pub fn view_angles(&self) -> Vec3 {
        self.view_angles
    }

    pub fn set_view_angles(&mut self, angles: Vec3) {
        self.view_angles = angles;
    }

    /// Command history, readable by the transport layer for reconciliation.
    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn debug_graph(&self) -> &DebugGraph {
        &self.debug_graph
    }

    /// Runs one frame tick: builds this frame's command (commands are built
    /// even during demo playback, so local state stays consistent), then
    /// flushes a packet if the pacing gate allows one.
    pub fn send_frame(
        &mut self,
        link: &mut ServerLink,
        ctx: &FrameContext,
        real_time_ms: u32,
        frame_time_ms: u32,
    ) -> Option<Vec<u8>> {
        if !link.state.is_connected() {
            return None;
        }

        self.create_new_command(link, ctx, frame_time_ms);

        if !pacing::ready_to_send(link, &self.config, &self.packets, real_time_ms) {
            if self.config.show_send {
                log::debug!("packet suppressed");
            }
            return None;
        }

        assembler::write_packet(&self.config, &self.history, &mut self.packets, link, real_time_ms)
    }

    /// No commands until a gamestate has arrived; after that, exactly one per
    /// frame, whatever the frame rate does.
    fn create_new_command(&mut self, link: &ServerLink, ctx: &FrameContext, frame_time_ms: u32) {
        if !link.state.is_primed() {
            return;
        }

        // a sub-millisecond frame counts as 1ms; a hitch is truncated so one
        // stall cannot produce a huge move
        self.frame_msec = frame_time_ms
            .wrapping_sub(self.old_frame_time_ms)
            .clamp(1, 200);
        self.old_frame_time_ms = frame_time_ms;
        self.frame_time_ms = frame_time_ms;

        let cmd = self.build_command(ctx);
        self.history.push(cmd);
    }
}
