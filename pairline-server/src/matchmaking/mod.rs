mod memory_store;
mod pairing_store;
mod router;
mod router_actor;
mod router_command;

pub use memory_store::*;
pub use pairing_store::*;
pub use router::*;
pub use router_actor::*;
pub use router_command::*;
