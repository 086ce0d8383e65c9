use crate::{ident::PacketId, time::Timestamp, units::Bytes};

/// An outbound packet handed to the simulator.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, derive_new::new, serde::Serialize, serde::Deserialize,
)]
pub struct PacketInFlight {
    /// Payload size; `packet_overhead` is added on top for serialization
    /// accounting.
    pub size: Bytes,
    /// When the caller put the packet on the wire.
    pub send_time: Timestamp,
    /// Caller-assigned identifier, opaque to the simulator.
    pub id: PacketId,
}

/// A packet the simulator has released to the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_new::new)]
pub struct PacketDelivery {
    pub id: PacketId,
    pub receive_time: Timestamp,
}

/// A packet resident in one of the two link stages.
///
/// `arrival_time` is stage-relative: in the capacity queue it is the time
/// the packet's last bit clears the link; in the delay queue it is the time
/// the packet reaches the receiver.
#[derive(Debug, Clone, Copy, derive_new::new)]
pub(crate) struct TimedPacket {
    pub(crate) packet: PacketInFlight,
    pub(crate) arrival_time: Timestamp,
}
