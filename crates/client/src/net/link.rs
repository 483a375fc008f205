use frontline::MAX_RELIABLE_COMMANDS;

/// Connection ladder. Ordering matters: everything from `Connected` up may
/// send packets, everything from `Primed` up generates commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LinkState {
    Disconnected,
    Connecting,
    Connected,
    Loading,
    Primed,
    Active,
    Cinematic,
}

impl LinkState {
    pub fn is_connected(self) -> bool {
        self >= LinkState::Connected
    }

    /// A gamestate has arrived; movement commands are meaningful.
    pub fn is_primed(self) -> bool {
        self >= LinkState::Primed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteKind {
    Loopback,
    Lan,
    Internet,
}

/// Client-side view of the transport/session state the pipeline consumes and
/// updates. The channel itself (framing, sequencing, sockets) lives below
/// this boundary.
#[derive(Debug)]
pub struct ServerLink {
    pub state: LinkState,
    pub remote: RemoteKind,
    pub demo_playback: bool,
    /// A demo recording is waiting for a non-delta message to start from.
    pub demo_waiting: bool,
    pub transfer_active: bool,
    pub server_id: i32,
    /// Sequence of the last server message we processed.
    pub server_message_sequence: i32,
    /// Sequence of the last reliable command we received from the server.
    pub server_command_sequence: i32,
    server_commands: [String; MAX_RELIABLE_COMMANDS as usize],
    /// Sequence of the last reliable command we generated.
    pub reliable_sequence: i32,
    /// Highest of our reliable commands the server has acknowledged.
    pub reliable_acknowledge: i32,
    reliable_commands: [String; MAX_RELIABLE_COMMANDS as usize],
    pub checksum_feed: i32,
    pub outgoing_sequence: u32,
    pub last_packet_time_ms: u32,
    pub snapshot_valid: bool,
    /// Server message the current snapshot was parsed from.
    pub snapshot_message_number: i32,
}

impl ServerLink {
    pub fn new(remote: RemoteKind) -> Self {
        Self {
            state: LinkState::Disconnected,
            remote,
            demo_playback: false,
            demo_waiting: false,
            transfer_active: false,
            server_id: 0,
            server_message_sequence: 0,
            server_command_sequence: 0,
            server_commands: std::array::from_fn(|_| String::new()),
            reliable_sequence: 0,
            reliable_acknowledge: 0,
            reliable_commands: std::array::from_fn(|_| String::new()),
            checksum_feed: 0,
            outgoing_sequence: 1,
            last_packet_time_ms: 0,
            snapshot_valid: false,
            snapshot_message_number: 0,
        }
    }

    /// A fully primed local connection, as used by the loopback driver.
    pub fn loopback(server_id: i32) -> Self {
        Self {
            state: LinkState::Active,
            server_id,
            snapshot_valid: true,
            ..Self::new(RemoteKind::Loopback)
        }
    }

    /// Queues an ordered, guaranteed command. It is re-sent in every packet
    /// until acknowledged. On overflow the command is dropped rather than
    /// taking the session down; the server will drop us anyway if it matters.
    pub fn add_reliable_command(&mut self, command: &str) {
        if self.reliable_sequence.wrapping_sub(self.reliable_acknowledge) >= MAX_RELIABLE_COMMANDS {
            log::error!("reliable command overflow, dropping: {command}");
            return;
        }
        self.reliable_sequence = self.reliable_sequence.wrapping_add(1);
        let index = (self.reliable_sequence & (MAX_RELIABLE_COMMANDS - 1)) as usize;
        self.reliable_commands[index] = command.to_owned();
    }

    pub fn reliable_command(&self, sequence: i32) -> &str {
        &self.reliable_commands[(sequence & (MAX_RELIABLE_COMMANDS - 1)) as usize]
    }

    /// Stores a reliable command received from the server; its text feeds the
    /// move-block obfuscation key.
    pub fn record_server_command(&mut self, sequence: i32, command: &str) {
        self.server_command_sequence = sequence;
        let index = (sequence & (MAX_RELIABLE_COMMANDS - 1)) as usize;
        self.server_commands[index] = command.to_owned();
    }

    pub fn server_command(&self, sequence: i32) -> &str {
        &self.server_commands[(sequence & (MAX_RELIABLE_COMMANDS - 1)) as usize]
    }
}
