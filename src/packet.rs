use crate::util::time::Timestamp;
use std::fmt;

/// ECN marking of an IP packet as reported by the receiver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Ecn {
    /// Non ECN-capable transport.
    #[default]
    NonEct, // 00
    /// ECN-capable transport, ECT(1).
    Ect1, // 01
    /// ECN-capable transport, ECT(0).
    Ect0, // 10
    /// Congestion experienced.
    Ce, // 11
}

/// Send and receive information about a single packet, decoded from a
/// transport-wide or RFC 8888 congestion control feedback report.
#[derive(Clone, Copy, Debug)]
pub struct Ack {
    /// Transport-wide sequence number. Unique over all streams, increasing by
    /// one for every outgoing packet.
    pub seq: u64,
    /// Size of the packet in bytes.
    pub size: usize,
    /// Whether the packet arrived at the receiver. `false` does not
    /// necessarily mean the packet was lost, it might still be in transit.
    pub arrived: bool,
    /// Departure time taken at the sender, measured at the latest possible
    /// moment before sending.
    pub departure: Timestamp,
    /// Arrival time at the receiver. Departure and arrival come from
    /// unsynchronized clocks and cannot be compared directly.
    pub arrival: Timestamp,
    /// ECN marking of the packet when it arrived.
    pub ecn: Ecn,
}

impl fmt::Display for Ack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "seq={}, departure={:?}, arrival={:?}",
            self.seq, self.departure, self.arrival
        )
    }
}
