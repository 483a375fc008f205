pub mod assembler;
pub mod history;
pub mod link;
pub mod pacing;

pub use history::{CommandHistory, PacketHistory, PacketRecord};
pub use link::{LinkState, RemoteKind, ServerLink};
