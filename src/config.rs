use crate::{
    time::Timestamp,
    units::{Bytes, Kbps},
};

/// Static link configuration.
///
/// Every field can be changed independently at runtime through
/// [`SimulatedLink::set_config`](crate::SimulatedLink::set_config) or
/// [`SimulatedLink::update_config`](crate::SimulatedLink::update_config).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    typed_builder::TypedBuilder,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(default)]
pub struct Config {
    /// Capacity-queue bound in packets. Zero means unbounded.
    #[builder(default)]
    pub queue_length_packets: usize,
    /// Mean extra delay applied after the capacity stage.
    #[builder(default)]
    pub queue_delay_ms: i64,
    /// Standard deviation of the extra delay.
    #[builder(default)]
    pub delay_standard_deviation_ms: i64,
    /// Serialization rate. Zero means infinite capacity.
    #[builder(default)]
    pub link_capacity_kbps: Kbps,
    /// Steady-state packet loss, in whole percent (0..=100).
    #[builder(default)]
    pub loss_percent: i64,
    /// Whether jitter may deliver packets out of order.
    #[builder(default)]
    pub allow_reordering: bool,
    /// Mean length of a burst of lost packets (>= 1); the sentinel -1
    /// selects independent (Bernoulli) loss instead.
    #[builder(default = -1)]
    pub avg_burst_loss_length: i64,
    /// Bytes added to each packet's size for serialization accounting.
    #[builder(default)]
    pub packet_overhead: Bytes,
}

impl Default for Config {
    fn default() -> Self {
        Config::builder().build()
    }
}

/// A frozen [Config] plus everything derived from it.
///
/// Rebuilt on every reconfiguration so the hot paths never re-derive the
/// loss-model probabilities.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ConfigState {
    pub(crate) config: Config,
    /// Probability that a delivering link starts a loss burst.
    pub(crate) prob_start_bursting: f64,
    /// Probability that a bursting link keeps dropping.
    pub(crate) prob_loss_bursting: f64,
    /// The link is silent until this time.
    pub(crate) pause_transmission_until: Timestamp,
}

impl ConfigState {
    /// Freeze `config` and derive the two-state Markov loss probabilities.
    ///
    /// With loss rate `L` and mean burst length `B`, a burst ends on the
    /// first non-drop while bursting, so `prob_loss_bursting = 1 - 1/B`
    /// gives geometric bursts of mean length `B`; balancing the stationary
    /// distribution then requires `prob_start_bursting = L / (1-L) / B` to
    /// land the steady-state loss rate on `L`. Both are clamped to [0, 1]
    /// for extreme `L`/`B` combinations.
    pub(crate) fn derive(config: Config, pause_transmission_until: Timestamp) -> Self {
        assert!(
            (0..=100).contains(&config.loss_percent),
            "loss_percent must be within 0..=100"
        );
        let loss = config.loss_percent as f64 / 100.0;
        let (prob_start_bursting, prob_loss_bursting) = if config.avg_burst_loss_length == -1 {
            // Independent loss: one Bernoulli trial per capacity exit.
            (loss, loss)
        } else {
            assert!(
                config.avg_burst_loss_length >= 1,
                "avg_burst_loss_length must be >= 1 or the sentinel -1"
            );
            let burst_length = config.avg_burst_loss_length as f64;
            (
                (loss / (1.0 - loss) / burst_length).clamp(0.0, 1.0),
                (1.0 - 1.0 / burst_length).clamp(0.0, 1.0),
            )
        };
        Self {
            config,
            prob_start_bursting,
            prob_loss_bursting,
            pause_transmission_until,
        }
    }
}
