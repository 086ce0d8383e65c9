use tracing::{debug, trace};

use crate::{
    config::{Config, ConfigState},
    loss::LossModel,
    packet::{PacketDelivery, PacketInFlight, TimedPacket},
    queue::{CapacityQueue, DelayQueue},
    rng::Prng,
    time::{Delta, Timestamp},
    units::Kbps,
};

/// A simulated network link.
///
/// Packets pass through two stages: a capacity queue that holds them while
/// their bits are clocked out at the link rate, and a delay queue that
/// holds survivors of the loss model until propagation delay and jitter
/// have elapsed. The caller supplies all timestamps; the simulator performs
/// no I/O and never reads a clock.
///
/// Drives an enclosing event scheduler through [`next_delivery_time`]
/// (when is the next packet due?) and [`dequeue_deliverable`] (release
/// everything due by `now`).
///
/// [`next_delivery_time`]: SimulatedLink::next_delivery_time
/// [`dequeue_deliverable`]: SimulatedLink::dequeue_deliverable
#[derive(Debug)]
pub struct SimulatedLink {
    capacity_link: CapacityQueue,
    delay_link: DelayQueue,
    /// Earliest event time across both queues, kept current after every
    /// public call; `None` iff both queues are empty.
    next_process_time: Option<Timestamp>,

    config_state: ConfigState,
    prng: Prng,
    loss: LossModel,

    /// Send time of the last enqueued packet; send times must be monotone
    /// non-decreasing across calls.
    last_enqueue_time: Timestamp,
    /// When the link last went idle; the next packet cannot start
    /// serializing before this.
    last_capacity_exit_time: Timestamp,
}

impl SimulatedLink {
    /// Create a link with the default seed of 1.
    pub fn new(config: Config) -> Self {
        Self::with_seed(config, 1)
    }

    /// Create a link with an explicit seed for the pseudo-random source.
    ///
    /// Panics on a zero seed (see [`Prng::new`]).
    pub fn with_seed(config: Config, seed: u64) -> Self {
        Self {
            capacity_link: CapacityQueue::new(),
            delay_link: DelayQueue::new(),
            next_process_time: None,
            config_state: ConfigState::derive(config, Timestamp::MIN),
            prng: Prng::new(seed),
            loss: LossModel::default(),
            last_enqueue_time: Timestamp::MIN,
            last_capacity_exit_time: Timestamp::MIN,
        }
    }

    /// Install a new configuration.
    ///
    /// Packets still in the capacity stage are re-clocked under the new
    /// rate, overhead and pause; packets already in the delay stage keep
    /// their delivery times.
    pub fn set_config(&mut self, config: Config) {
        debug!(?config, "link reconfigured");
        self.config_state =
            ConfigState::derive(config, self.config_state.pause_transmission_until);
        self.reclock_capacity_link();
    }

    /// Modify the current configuration in place, then install it.
    pub fn update_config(&mut self, modifier: impl FnOnce(&mut Config)) {
        let mut config = self.config_state.config;
        modifier(&mut config);
        self.set_config(config);
    }

    /// Silence the link until `until`: nothing starts serializing before
    /// that time. Packets already in the capacity stage are re-clocked.
    pub fn pause_transmission_until(&mut self, until: Timestamp) {
        debug!(%until, "transmission paused");
        self.config_state.pause_transmission_until = until;
        self.reclock_capacity_link();
    }

    /// Offer a packet to the link at its send time.
    ///
    /// Returns `false` when the capacity queue is full; the packet is then
    /// discarded. Send times must be monotone non-decreasing across calls.
    #[must_use]
    pub fn enqueue(&mut self, packet: PacketInFlight) -> bool {
        assert!(
            packet.send_time >= self.last_enqueue_time,
            "send times must be monotone non-decreasing"
        );
        self.last_enqueue_time = packet.send_time;

        // Flush everything already serialized so the bound below sees a
        // current queue.
        self.update_capacity_queue(packet.send_time);

        let state = self.config_state;
        let bound = state.config.queue_length_packets;
        let admitted = bound == 0 || self.capacity_link.len() < bound;
        if admitted {
            let exit = exit_time(&state, self.last_capacity_exit_time, &packet);
            self.capacity_link.enqueue(TimedPacket::new(packet, exit));
            self.last_capacity_exit_time = exit;
        } else {
            trace!(id = %packet.id, "capacity queue full, packet discarded");
        }
        self.recompute_next_process_time();
        admitted
    }

    /// Release every packet due at or before `now`, ordered by delivery
    /// time with ties in send order.
    ///
    /// Capacity exits up to `now` are processed first, so a packet can
    /// serialize, clear the loss model and be delivered in one call.
    pub fn dequeue_deliverable(&mut self, now: Timestamp) -> Vec<PacketDelivery> {
        self.update_capacity_queue(now);
        let deliveries = self
            .delay_link
            .pop_ready(now)
            .into_iter()
            .map(|pkt| PacketDelivery::new(pkt.packet.id, pkt.arrival_time))
            .collect();
        self.recompute_next_process_time();
        deliveries
    }

    /// Earliest simulated time at which the link has something to do, or
    /// `None` when both stages are empty.
    ///
    /// Absent further `enqueue` or configuration calls, a
    /// [`dequeue_deliverable`](Self::dequeue_deliverable) at this time
    /// observes the head packet leave the capacity stage (it may still be
    /// lost there) or picks up a matured delivery.
    pub fn next_delivery_time(&self) -> Option<Timestamp> {
        self.next_process_time
    }

    /// Promote every capacity head due by `now` into the delay stage,
    /// applying loss and jitter at the moment of exit.
    fn update_capacity_queue(&mut self, now: Timestamp) {
        let state = self.config_state;
        while self
            .capacity_link
            .head()
            .is_some_and(|pkt| pkt.arrival_time <= now)
        {
            let pkt = self.capacity_link.dequeue().expect("checked head");

            if self.loss.should_drop(&state, &mut self.prng) {
                trace!(id = %pkt.packet.id, "packet lost");
                continue;
            }

            let mut arrival = pkt.arrival_time + self.extra_delay(&state);
            if !state.config.allow_reordering {
                // Never undercut a packet already promoted ahead of us
                if let Some(last) = self.delay_link.max_arrival() {
                    arrival = arrival.max(last);
                }
            }
            self.delay_link.push(TimedPacket::new(pkt.packet, arrival));
        }
    }

    /// One jitter sample, in whole milliseconds scaled to microseconds and
    /// clamped at zero.
    fn extra_delay(&mut self, state: &ConfigState) -> Delta {
        let config = &state.config;
        let millis = self.prng.gaussian(
            config.queue_delay_ms as f64,
            config.delay_standard_deviation_ms as f64,
        );
        Delta::new((millis.round() as i64 * 1_000).max(0))
    }

    /// Recompute every capacity-stage exit time under the current
    /// configuration, head to tail.
    fn reclock_capacity_link(&mut self) {
        let state = self.config_state;
        let mut prev_exit = Timestamp::MIN;
        for pkt in self.capacity_link.iter_mut() {
            pkt.arrival_time = exit_time(&state, prev_exit, &pkt.packet);
            prev_exit = pkt.arrival_time;
        }
        if prev_exit > Timestamp::MIN {
            self.last_capacity_exit_time = prev_exit;
        }
        self.recompute_next_process_time();
    }

    fn recompute_next_process_time(&mut self) {
        let capacity = self.capacity_link.head().map(|pkt| pkt.arrival_time);
        let delay = self.delay_link.min_arrival();
        self.next_process_time = match (capacity, delay) {
            (Some(c), Some(d)) => Some(c.min(d)),
            (c, d) => c.or(d),
        };
    }
}

/// When a packet's last bit clears the link: serialization starts at the
/// latest of its send time, the link going idle and any transmission pause,
/// and takes size-plus-overhead at the configured rate.
fn exit_time(state: &ConfigState, prev_exit: Timestamp, packet: &PacketInFlight) -> Timestamp {
    let start = packet
        .send_time
        .max(prev_exit)
        .max(state.pause_transmission_until);
    let capacity = state.config.link_capacity_kbps;
    if capacity == Kbps::ZERO {
        return start;
    }
    let wire_size = (packet.size + state.config.packet_overhead).into_bits();
    start + capacity.transmission_delay(wire_size)
}
