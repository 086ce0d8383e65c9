pub mod driver;
pub mod rng;
pub mod time;
pub mod units;

pub(crate) mod config;
pub(crate) mod ident;
pub(crate) mod link;
pub(crate) mod loss;
pub(crate) mod packet;
pub(crate) mod queue;

pub use config::Config;
pub use ident::PacketId;
pub use link::SimulatedLink;
pub use packet::{PacketDelivery, PacketInFlight};
