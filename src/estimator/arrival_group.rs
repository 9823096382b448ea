use crate::util::time::{TimeDelta, Timestamp};

const BURST_INTERVAL: TimeDelta = TimeDelta::from_millis(5);
const MAX_BURST_DURATION: TimeDelta = TimeDelta::from_millis(100);

/// One acknowledged packet as seen by the grouping stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct ArrivalGroupItem {
    pub seq: u64,
    pub size: usize,
    pub departure: Timestamp,
    pub arrival: Timestamp,
}

/// A maximal run of packets attributed to the same transmission burst.
///
/// Groups are only handed out by the accumulator and are never empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(super) struct ArrivalGroup {
    items: Vec<ArrivalGroupItem>,
}

impl ArrivalGroup {
    pub fn first_departure(&self) -> Timestamp {
        self.items[0].departure
    }

    pub fn last_arrival(&self) -> Timestamp {
        self.items[self.items.len() - 1].arrival
    }

    /// Inter-group delay variation relative to the previous group. Positive
    /// values suggest queue buildup along the path.
    pub fn inter_group_delay(&self, prev: &ArrivalGroup) -> TimeDelta {
        (self.last_arrival() - prev.last_arrival())
            - (self.first_departure() - prev.first_departure())
    }

    #[cfg(test)]
    fn from_items(items: Vec<ArrivalGroupItem>) -> ArrivalGroup {
        ArrivalGroup { items }
    }
}

/// Buckets consecutive acks into arrival groups by send-time proximity and
/// burst rules. Groups complete on departure-time progress only: the
/// accumulator returns the finished group once the first packet of the next
/// one arrives.
#[derive(Debug)]
pub(super) struct ArrivalGroupAccumulator {
    next: Vec<ArrivalGroupItem>,
}

impl ArrivalGroupAccumulator {
    pub fn new() -> ArrivalGroupAccumulator {
        ArrivalGroupAccumulator { next: Vec::new() }
    }

    /// Returns the completed previous group when the acked packet starts a
    /// new one.
    pub fn on_packet_acked(
        &mut self,
        seq: u64,
        size: usize,
        departure: Timestamp,
        arrival: Timestamp,
    ) -> Option<ArrivalGroup> {
        let item = ArrivalGroupItem {
            seq,
            size,
            departure,
            arrival,
        };

        if self.next.is_empty() {
            self.next.push(item);
            return None;
        }

        let send_delta = departure - self.next[0].departure;
        if send_delta < BURST_INTERVAL {
            self.next.push(item);
            return None;
        }

        let arrival_delta_last = arrival - self.next[self.next.len() - 1].arrival;
        let arrival_delta_first = arrival - self.next[0].arrival;
        let propagation_delta = arrival_delta_first - send_delta;

        // Packets received closely together are still attributed to the same
        // burst even when their send times are further apart; this also
        // absorbs reordered arrivals.
        if propagation_delta.is_negative()
            && arrival_delta_last <= BURST_INTERVAL
            && arrival_delta_first < MAX_BURST_DURATION
        {
            self.next.push(item);
            return None;
        }

        log::trace!(
            "closing arrival group: send_delta={:?}, propagation_delta={:?}, arrival_delta_last={:?}, arrival_delta_first={:?}",
            send_delta,
            propagation_delta,
            arrival_delta_last,
            arrival_delta_first
        );

        Some(ArrivalGroup {
            items: std::mem::replace(&mut self.next, vec![item]),
        })
    }
}
