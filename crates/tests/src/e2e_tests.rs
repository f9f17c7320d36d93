//! End-to-end: MockPacketSource -> MemoryBus -> PostNode -> CloudPublisher -> sinks

use std::sync::Arc;
use std::time::Duration;

use contracts::{DeviceModel, InputMode};
use dispatcher::{CloudPublisher, CollectSink, Dispatcher, LogSink};
use ingestion::{MemoryBus, MockPacketSource, MockSourceConfig};
use node::PostNode;
use tokio::sync::oneshot;

use crate::support::settings;

async fn run_mock_pipeline(input: InputMode) {
    let settings = settings(20, input);
    let topic = settings.input_topic().to_string();

    let bus = Arc::new(MemoryBus::new());
    let publisher = Arc::new(CloudPublisher::new(settings.point_cloud_topic.clone(), 8));

    let collect = CollectSink::new("collect");
    let mut dispatcher = Dispatcher::new(publisher.clone());
    dispatcher.attach(collect.clone());
    dispatcher.attach(LogSink::new("log"));

    let node = PostNode::new(settings, bus.clone(), publisher.clone(), None).unwrap();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let node_task = tokio::spawn(node.run(async move {
        let _ = stop_rx.await;
    }));

    let source = MockPacketSource::new(MockSourceConfig {
        topic: topic.clone(),
        input,
        device: DeviceModel::Hdl32e,
        packet_rate_hz: 2_000.0,
        ..Default::default()
    });
    let source_task = source.start(bus.clone());

    let waited = tokio::time::timeout(Duration::from_secs(10), async {
        while collect.len() < 3 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;

    source.stop();
    source_task.await.unwrap();
    stop_tx.send(()).unwrap();
    let stats = node_task.await.unwrap();
    dispatcher.shutdown().await.unwrap();

    assert!(waited.is_ok(), "pipeline timed out");
    assert_eq!(stats.decode_errors, 0);
    assert_eq!(stats.activations, 1);
    assert_eq!(stats.deactivations, 1);
    assert!(stats.clouds_published >= 3);
    assert_eq!(bus.subscriber_count(&topic), 0);

    let clouds = collect.clouds();
    for cloud in &clouds {
        assert_eq!(cloud.header.frame_id, "velodyne");
        assert!(!cloud.is_empty());
        assert_eq!(cloud.intensity().map(<[f32]>::len), Some(cloud.len()));
        for p in &cloud.points {
            let range = (p.x * p.x + p.y * p.y + p.z * p.z).sqrt();
            assert!((0.9..=120.0 + 1e-3).contains(&range), "range {range} out of bounds");
        }
    }
    for pair in clouds.windows(2) {
        assert!(pair[0].header.stamp < pair[1].header.stamp);
    }
}

#[tokio::test]
async fn test_e2e_binary_snappy() {
    run_mock_pipeline(InputMode::BinarySnappy).await;
}

#[tokio::test]
async fn test_e2e_data_packet() {
    run_mock_pipeline(InputMode::DataPacket).await;
}

/// No sink attached: the node never subscribes upstream
#[tokio::test]
async fn test_idle_without_consumers() {
    let settings = settings(20, InputMode::BinarySnappy);
    let topic = settings.input_topic().to_string();
    let bus = Arc::new(MemoryBus::new());
    let publisher = Arc::new(CloudPublisher::new(settings.point_cloud_topic.clone(), 8));

    let node = PostNode::new(settings, bus.clone(), publisher.clone(), None).unwrap();
    let source = MockPacketSource::new(MockSourceConfig {
        topic: topic.clone(),
        packet_rate_hz: 2_000.0,
        ..Default::default()
    });
    let source_task = source.start(bus.clone());

    let stats = node
        .run(tokio::time::sleep(Duration::from_millis(100)))
        .await;
    source.stop();
    source_task.await.unwrap();

    assert!(source.sent() > 0);
    assert_eq!(stats.messages_received, 0);
    assert_eq!(stats.activations, 0);
    assert_eq!(publisher.published(), 0);
}
