//! Node behaviour over the in-process bus

use bytes::Bytes;
use contracts::{BinarySnappyMsg, Header, InboundMessage, InputMode};
use ingestion::{SubscriptionState, Transition};
use node::BatchOutcome;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::support::{node, packet, raw_msg, settings, snappy_msg, FRAME};

/// 10 m return on laser 0
const TEN_METRES: u16 = 1_000;

mod batching {
    use super::*;

    #[tokio::test]
    async fn test_every_cloud_holds_exactly_n_packets() {
        let (mut node, _bus, publisher) = node(settings(3, InputMode::DataPacket));
        let mut rx = publisher.subscribe();

        let outcomes: Vec<_> = (0..7)
            .map(|i| node.on_message(&raw_msg(&packet(i * 100, &[TEN_METRES]))))
            .collect();

        let published = outcomes.iter().flatten().count();
        assert_eq!(published, 2);
        assert_eq!(outcomes[2], Some(BatchOutcome::Published { points: 3 }));
        assert_eq!(outcomes[5], Some(BatchOutcome::Published { points: 3 }));
        assert_eq!(node.pending_packets(), 1);

        // stamps are the midpoints of packets 0..3 and 3..6
        assert_eq!(rx.recv().await.unwrap().header.stamp, 100);
        assert_eq!(rx.recv().await.unwrap().header.stamp, 400);
    }

    #[test]
    fn test_single_packet_batches() {
        let (mut node, _bus, publisher) = node(settings(1, InputMode::BinarySnappy));
        let _rx = publisher.subscribe();

        for i in 0..4 {
            let outcome = node.on_message(&snappy_msg(&packet(i, &[TEN_METRES, TEN_METRES])));
            assert_eq!(outcome, Some(BatchOutcome::Published { points: 2 }));
        }
        assert_eq!(node.stats().batches_completed, 4);
    }
}

mod filtering {
    use super::*;

    #[tokio::test]
    async fn test_range_filter_is_inclusive() {
        let (mut node, _bus, publisher) = node(settings(1, InputMode::DataPacket));
        let mut rx = publisher.subscribe();

        // centimetres: 0.5 m, 0.9 m, 1 m, 60 m, 120 m, 150 m
        let distances = [50, 90, 100, 6_000, 12_000, 15_000];
        node.on_message(&raw_msg(&packet(0, &distances)));

        let cloud = rx.recv().await.unwrap();
        let ranges: Vec<f32> = cloud.points.iter().map(|p| p.x).collect();
        assert_eq!(ranges, vec![0.9, 1.0, 60.0, 120.0]);

        // intensity channel stays index-aligned with the kept points
        assert_eq!(cloud.intensity().unwrap(), &[11.0, 12.0, 13.0, 14.0]);
    }

    #[tokio::test]
    async fn test_empty_returns_never_become_points() {
        let (mut node, _bus, publisher) = node(settings(2, InputMode::DataPacket));
        let mut rx = publisher.subscribe();

        node.on_message(&raw_msg(&packet(0, &[])));
        node.on_message(&raw_msg(&packet(10, &[0, 0, 0])));

        let cloud = rx.recv().await.unwrap();
        assert!(cloud.is_empty());
        assert_eq!(cloud.header.stamp, 5);
    }
}

mod stamping {
    use super::*;

    #[tokio::test]
    async fn test_cloud_stamp_is_batch_midpoint() {
        let (mut node, _bus, publisher) = node(settings(3, InputMode::BinarySnappy));
        let mut rx = publisher.subscribe();

        for stamp in [1_000, 1_500, 3_000] {
            node.on_message(&snappy_msg(&packet(stamp, &[TEN_METRES])));
        }

        let cloud = rx.recv().await.unwrap();
        assert_eq!(cloud.header.stamp, 2_000);
        assert_eq!(cloud.header.frame_id, FRAME);
    }

    #[tokio::test]
    async fn test_header_stamp_wins_over_payload_timestamp() {
        let (mut node, _bus, publisher) = node(settings(2, InputMode::BinarySnappy));
        let mut rx = publisher.subscribe();

        for (header_stamp, payload_stamp) in [(1_000, 7), (3_000, 9)] {
            let InboundMessage::BinarySnappy(mut msg) =
                snappy_msg(&packet(payload_stamp, &[TEN_METRES]))
            else {
                unreachable!()
            };
            msg.header.stamp = header_stamp;
            node.on_message(&msg.into());
        }

        assert_eq!(rx.recv().await.unwrap().header.stamp, 2_000);
    }
}

mod demand {
    use super::*;

    #[tokio::test]
    async fn test_batches_without_consumers_are_discarded() {
        let (mut node, _bus, publisher) = node(settings(2, InputMode::DataPacket));

        for stamp in 0..4 {
            node.on_message(&raw_msg(&packet(stamp, &[TEN_METRES])));
        }
        assert_eq!(node.stats().clouds_suppressed, 2);
        assert_eq!(node.stats().clouds_published, 0);
        assert_eq!(publisher.published(), 0);

        // a late consumer only ever sees batches completed after it arrived
        let mut rx = publisher.subscribe();
        node.on_message(&raw_msg(&packet(100, &[TEN_METRES])));
        let outcome = node.on_message(&raw_msg(&packet(300, &[TEN_METRES])));
        assert_eq!(outcome, Some(BatchOutcome::Published { points: 2 }));

        let cloud = rx.recv().await.unwrap();
        assert_eq!(cloud.header.stamp, 200);
        assert_eq!(cloud.len(), 2);
        assert_eq!(node.stats().clouds_published, 1);
    }

    #[test]
    fn test_demand_checked_when_batch_completes() {
        let (mut node, _bus, publisher) = node(settings(2, InputMode::DataPacket));

        let rx = publisher.subscribe();
        node.on_message(&raw_msg(&packet(0, &[TEN_METRES])));
        drop(rx);

        let outcome = node.on_message(&raw_msg(&packet(1, &[TEN_METRES])));
        assert_eq!(outcome, Some(BatchOutcome::Suppressed));
    }
}

mod decode_resilience {
    use super::*;

    fn corrupted(stamp: i64, data: Bytes) -> InboundMessage {
        BinarySnappyMsg {
            header: Header {
                stamp,
                frame_id: FRAME.into(),
            },
            data,
        }
        .into()
    }

    #[tokio::test]
    async fn test_corrupted_message_mid_batch_is_skipped() {
        let (mut node, _bus, publisher) = node(settings(3, InputMode::BinarySnappy));
        let mut rx = publisher.subscribe();

        node.on_message(&snappy_msg(&packet(1_000, &[TEN_METRES])));
        assert_eq!(
            node.on_message(&corrupted(1_100, Bytes::from_static(b"not snappy at all"))),
            None
        );
        assert_eq!(node.pending_packets(), 1);

        node.on_message(&snappy_msg(&packet(2_000, &[TEN_METRES])));
        node.on_message(&snappy_msg(&packet(3_000, &[TEN_METRES])));

        let cloud = rx.recv().await.unwrap();
        assert_eq!(cloud.header.stamp, 2_000);
        assert_eq!(cloud.len(), 3);
        assert_eq!(node.stats().decode_errors, 1);
        assert_eq!(node.metrics().snapshot().decode_errors, 1);
    }

    #[test]
    fn test_truncated_payloads_never_reach_the_batch() {
        let (mut node, _bus, publisher) = node(settings(4, InputMode::BinarySnappy));
        let _rx = publisher.subscribe();
        let mut rng = StdRng::seed_from_u64(7);

        let mut good = 0u64;
        let mut bad = 0u64;
        for stamp in 0..200 {
            let msg = snappy_msg(&packet(stamp, &[TEN_METRES]));
            if rng.random_bool(0.3) {
                let InboundMessage::BinarySnappy(msg) = msg else {
                    unreachable!()
                };
                let cut = rng.random_range(0..msg.data.len());
                node.on_message(&corrupted(stamp, msg.data.slice(..cut)));
                bad += 1;
            } else {
                node.on_message(&msg);
                good += 1;
            }
        }

        let stats = node.stats();
        assert_eq!(stats.decode_errors, bad);
        assert_eq!(stats.packets_ingested, good);
        assert_eq!(stats.clouds_published, good / 4);
        assert_eq!(node.pending_packets() as u64, good % 4);
    }

    #[test]
    fn test_wrong_chunk_count_is_rejected() {
        let (mut node, _bus, _publisher) = node(settings(2, InputMode::DataPacket));

        let InboundMessage::DataPacket(mut msg) = raw_msg(&packet(0, &[TEN_METRES])) else {
            unreachable!()
        };
        msg.data_chunks.pop();
        assert_eq!(node.on_message(&msg.clone().into()), None);

        msg.data_chunks.push(Default::default());
        assert_eq!(node.on_message(&msg.into()), None);

        assert_eq!(node.stats().decode_errors, 2);
        assert_eq!(node.pending_packets(), 0);
    }

    #[test]
    fn test_message_of_other_input_is_rejected() {
        let (mut node, _bus, _publisher) = node(settings(2, InputMode::DataPacket));
        node.on_message(&snappy_msg(&packet(0, &[TEN_METRES])));
        assert_eq!(node.stats().decode_errors, 1);
    }
}

mod lifecycle {
    use super::*;

    #[test]
    fn test_subscription_follows_demand_sequence() {
        let settings = settings(2, InputMode::BinarySnappy);
        let topic = settings.input_topic().to_string();
        let (mut node, bus, publisher) = node(settings);

        let mut consumer = None;
        let mut transitions = Vec::new();
        for demand in [0, 0, 1, 1, 0] {
            consumer = match (demand, consumer.take()) {
                (0, _) => None,
                (_, Some(rx)) => Some(rx),
                (_, None) => Some(publisher.subscribe()),
            };
            transitions.push(node.tick());
            assert_eq!(bus.subscriber_count(&topic), demand);
        }

        assert_eq!(
            transitions,
            vec![
                None,
                None,
                Some(Transition::Activated),
                None,
                Some(Transition::Deactivated)
            ]
        );
        assert_eq!(node.subscription_state(), SubscriptionState::Inactive);
    }

    #[test]
    fn test_nothing_arrives_while_inactive() {
        let settings = settings(2, InputMode::BinarySnappy);
        let topic = settings.input_topic().to_string();
        let (mut node, bus, _publisher) = node(settings);

        node.tick();
        let delivered = bus.publish(&topic, snappy_msg(&packet(0, &[TEN_METRES])));
        assert_eq!(delivered, 0);
        assert_eq!(node.subscription_state(), SubscriptionState::Inactive);
    }

    #[test]
    fn test_partial_batch_survives_deactivation() {
        let (mut node, _bus, publisher) = node(settings(3, InputMode::DataPacket));

        let rx = publisher.subscribe();
        node.tick();
        node.on_message(&raw_msg(&packet(0, &[TEN_METRES])));
        drop(rx);
        assert_eq!(node.tick(), Some(Transition::Deactivated));

        assert_eq!(node.pending_packets(), 1);
    }
}
