use std::path::Path;

use rustc_hash::FxHashMap;

use crate::{
    config::Config,
    ident::PacketId,
    link::SimulatedLink,
    packet::PacketInFlight,
    time::Timestamp,
    units::Bytes,
};

/// A scripted run of one simulated link.
#[derive(Debug, Clone, typed_builder::TypedBuilder, serde::Serialize, serde::Deserialize)]
pub struct Scenario {
    /// The link configuration.
    #[builder(default)]
    #[serde(default)]
    pub link: Config,
    /// Seed for the link's pseudo-random source.
    #[builder(default = 1)]
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// The outbound packets.
    pub packets: Vec<PacketInFlight>,
}

fn default_seed() -> u64 {
    1
}

/// What became of one packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Reached the receiver at the given time.
    Delivered(Timestamp),
    /// Discarded by the loss model.
    Lost,
    /// Refused at enqueue because the capacity queue was full.
    Rejected,
}

/// Per-packet result of a scenario run.
#[derive(Debug, Clone, Copy)]
pub struct Record {
    pub id: PacketId,
    pub size: Bytes,
    pub send_time: Timestamp,
    pub outcome: Outcome,
}

/// Runs the scenario to completion and returns one record per packet.
///
/// Packets enter the link in send-time order; between sends, deliveries
/// due by the next send time are drained at the times the link's oracle
/// announces. The run ends when the link reports nothing left to do, so a
/// packet with no delivery by then was lost inside the link.
pub fn run(scenario: Scenario) -> Vec<Record> {
    let mut packets = scenario.packets;
    packets.sort_by_key(|pkt| pkt.send_time);

    let mut link = SimulatedLink::with_seed(scenario.link, scenario.seed);
    let mut records = packets
        .iter()
        .map(|pkt| Record {
            id: pkt.id,
            size: pkt.size,
            send_time: pkt.send_time,
            outcome: Outcome::Lost,
        })
        .collect::<Vec<_>>();
    let slots = records
        .iter()
        .enumerate()
        .map(|(slot, record)| (record.id, slot))
        .collect::<FxHashMap<_, _>>();

    for packet in packets {
        while let Some(due) = link.next_delivery_time() {
            if due > packet.send_time {
                break;
            }
            for delivery in link.dequeue_deliverable(due) {
                records[slots[&delivery.id]].outcome = Outcome::Delivered(delivery.receive_time);
            }
        }
        if !link.enqueue(packet) {
            records[slots[&packet.id]].outcome = Outcome::Rejected;
        }
    }
    while let Some(due) = link.next_delivery_time() {
        for delivery in link.dequeue_deliverable(due) {
            records[slots[&delivery.id]].outcome = Outcome::Delivered(delivery.receive_time);
        }
    }
    records
}

/// Reads a [Scenario] from a JSON file at `path`.
pub fn read_scenario(path: impl AsRef<Path>) -> Result<Scenario, ReadScenarioError> {
    let s = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&s)?)
}

/// The error type returned by [read_scenario].
#[derive(Debug, thiserror::Error)]
pub enum ReadScenarioError {
    /// Serialization/deserialization error.
    #[error("serde error")]
    Serde(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::Kbps;

    fn pkt(id: u64, size: u64, send_time: i64) -> PacketInFlight {
        PacketInFlight::new(
            Bytes::new(size),
            Timestamp::new(send_time),
            PacketId::new(id),
        )
    }

    #[test]
    fn perfect_link_delivers_everything() {
        let scenario = Scenario::builder()
            .link(Config::builder().link_capacity_kbps(Kbps::new(500)).build())
            .packets(vec![pkt(1, 1_000, 0), pkt(2, 1_000, 0)])
            .build();
        let records = run(scenario);
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].outcome,
            Outcome::Delivered(Timestamp::new(16_000))
        );
        assert_eq!(
            records[1].outcome,
            Outcome::Delivered(Timestamp::new(32_000))
        );
    }

    #[test]
    fn full_loss_marks_packets_lost() {
        let scenario = Scenario::builder()
            .link(Config::builder().loss_percent(100).build())
            .packets(vec![pkt(1, 1_000, 0), pkt(2, 1_000, 10)])
            .build();
        for record in run(scenario) {
            assert_eq!(record.outcome, Outcome::Lost);
        }
    }

    #[test]
    fn overflow_marks_packets_rejected() {
        let scenario = Scenario::builder()
            .link(
                Config::builder()
                    .link_capacity_kbps(Kbps::new(100))
                    .queue_length_packets(1)
                    .build(),
            )
            .packets(vec![pkt(1, 1_000, 0), pkt(2, 1_000, 0)])
            .build();
        let records = run(scenario);
        assert!(matches!(records[0].outcome, Outcome::Delivered(_)));
        assert_eq!(records[1].outcome, Outcome::Rejected);
    }

    #[test]
    fn scenario_parses_with_defaults() {
        let scenario: Scenario = serde_json::from_str(
            r#"{
                "link": { "link_capacity_kbps": 500, "queue_length_packets": 50 },
                "packets": [{ "size": 1000, "send_time": 0, "id": 1 }]
            }"#,
        )
        .unwrap();
        assert_eq!(scenario.seed, 1);
        assert_eq!(scenario.link.avg_burst_loss_length, -1);
        let records = run(scenario);
        assert_eq!(
            records[0].outcome,
            Outcome::Delivered(Timestamp::new(16_000))
        );
    }
}
