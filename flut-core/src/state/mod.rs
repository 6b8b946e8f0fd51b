pub mod connection;
pub mod poll;

pub use connection::ConnectionPhase;
pub use poll::{DEFAULT_UPDATE_FREQUENCY, PollScheduler};
