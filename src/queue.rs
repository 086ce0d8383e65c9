use std::collections::{vec_deque, VecDeque};

use smallvec::SmallVec;

use crate::{packet::TimedPacket, time::Timestamp};

// Most calls mature only a handful of packets
pub(crate) type ReadyBatch = SmallVec<[TimedPacket; 4]>;

/// First link stage: strict FIFO, models serialization at the link rate.
#[derive(Debug, Default, derive_new::new)]
pub(crate) struct CapacityQueue {
    #[new(default)]
    inner: VecDeque<TimedPacket>,
}

impl CapacityQueue {
    delegate::delegate! {
        to self.inner {
            #[call(push_back)]
            pub(crate) fn enqueue(&mut self, pkt: TimedPacket);

            #[call(pop_front)]
            pub(crate) fn dequeue(&mut self) -> Option<TimedPacket>;

            #[call(front)]
            pub(crate) fn head(&self) -> Option<&TimedPacket>;

            pub(crate) fn len(&self) -> usize;
        }
    }

    /// Head-to-tail scan used to re-clock exit times after reconfiguration.
    pub(crate) fn iter_mut(&mut self) -> vec_deque::IterMut<'_, TimedPacket> {
        self.inner.iter_mut()
    }
}

/// Second link stage: propagation delay and jitter.
///
/// Packets here have already left the link and no longer consume capacity.
/// Insertion order is preserved; it matches arrival order only while
/// reordering is disallowed, so minimum and maximum lookups scan.
#[derive(Debug, Default, derive_new::new)]
pub(crate) struct DelayQueue {
    #[new(default)]
    inner: VecDeque<TimedPacket>,
}

impl DelayQueue {
    delegate::delegate! {
        to self.inner {
            #[call(push_back)]
            pub(crate) fn push(&mut self, pkt: TimedPacket);

            pub(crate) fn is_empty(&self) -> bool;
        }
    }

    /// Earliest delivery time currently queued.
    pub(crate) fn min_arrival(&self) -> Option<Timestamp> {
        self.inner.iter().map(|pkt| pkt.arrival_time).min()
    }

    /// Latest delivery time currently queued, the FIFO clamp target.
    pub(crate) fn max_arrival(&self) -> Option<Timestamp> {
        self.inner.iter().map(|pkt| pkt.arrival_time).max()
    }

    /// Remove and return every packet due at or before `now`, ordered by
    /// delivery time with ties in insertion order.
    pub(crate) fn pop_ready(&mut self, now: Timestamp) -> ReadyBatch {
        let mut ready = ReadyBatch::new();
        let mut waiting = VecDeque::with_capacity(self.inner.len());
        for pkt in self.inner.drain(..) {
            if pkt.arrival_time <= now {
                ready.push(pkt);
            } else {
                waiting.push_back(pkt);
            }
        }
        self.inner = waiting;
        // Stable, so same-time packets keep their insertion order
        ready.sort_by_key(|pkt| pkt.arrival_time);
        ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ident::PacketId, packet::PacketInFlight, units::Bytes};

    fn pkt(id: u64, arrival: i64) -> TimedPacket {
        TimedPacket::new(
            PacketInFlight::new(Bytes::new(100), Timestamp::ZERO, PacketId::new(id)),
            Timestamp::new(arrival),
        )
    }

    #[test]
    fn capacity_queue_is_fifo() {
        let mut q = CapacityQueue::new();
        q.enqueue(pkt(1, 10));
        q.enqueue(pkt(2, 20));
        assert_eq!(q.len(), 2);
        assert_eq!(q.head().unwrap().packet.id, PacketId::new(1));
        assert_eq!(q.dequeue().unwrap().packet.id, PacketId::new(1));
        assert_eq!(q.dequeue().unwrap().packet.id, PacketId::new(2));
        assert!(q.dequeue().is_none());
    }

    #[test]
    fn delay_queue_scans_for_extremes() {
        let mut q = DelayQueue::new();
        q.push(pkt(1, 30));
        q.push(pkt(2, 10));
        q.push(pkt(3, 20));
        assert_eq!(q.min_arrival(), Some(Timestamp::new(10)));
        assert_eq!(q.max_arrival(), Some(Timestamp::new(30)));
    }

    #[test]
    fn pop_ready_sorts_by_arrival_and_keeps_ties_stable() {
        let mut q = DelayQueue::new();
        q.push(pkt(1, 30));
        q.push(pkt(2, 10));
        q.push(pkt(3, 10));
        q.push(pkt(4, 40));

        let ready = q.pop_ready(Timestamp::new(30));
        let ids: Vec<_> = ready.iter().map(|p| p.packet.id.into_u64()).collect();
        assert_eq!(ids, vec![2, 3, 1]);

        assert!(!q.is_empty());
        assert_eq!(q.min_arrival(), Some(Timestamp::new(40)));
    }
}
