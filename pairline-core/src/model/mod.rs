mod connection;
mod envelope;
mod frame;

pub use connection::ConnectionId;
pub use envelope::Envelope;
pub use frame::Frame;
