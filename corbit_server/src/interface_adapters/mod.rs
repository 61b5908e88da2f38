// Interface adapters: snapshot documents, wire framing and network handling.

pub mod http;
pub mod net;
pub mod snapshot;
pub mod state;
