//! Shared fixtures

use std::sync::Arc;
use std::time::Duration;

use cloud::{CalibratedReturn, CalibrationModel, Point, ReturnProjector};
use config_loader::resolve;
use contracts::{
    BinarySnappyMsg, DataPacket, Header, InboundMessage, InputMode, NodeSettings, PostConfig,
    RawLaserReturn, UPPER_BLOCK,
};
use dispatcher::CloudPublisher;
use ingestion::{compress_packet, packet_to_msg, MemoryBus};
use node::PostNode;

pub const FRAME: &str = "velodyne";

/// Default settings with a fixed batch size and a fast updater
pub fn settings(num_data_packets: usize, input: InputMode) -> NodeSettings {
    let mut config = PostConfig::default();
    config.transport.num_data_packets = Some(num_data_packets);
    config.transport.use_binary_snappy = input == InputMode::BinarySnappy;
    config.transport.queue_depth = 64;

    let mut settings = resolve(&config).settings;
    settings.calibration_file = None;
    settings.updater_period = Duration::from_millis(5);
    settings
}

/// Packet whose first chunk holds `distances` (raw ticks) on consecutive lasers
pub fn packet(stamp: i64, distances: &[u16]) -> DataPacket {
    let mut packet = DataPacket {
        timestamp: stamp,
        ..Default::default()
    };
    packet.chunks[0].header_info = UPPER_BLOCK;
    for (laser, &distance) in distances.iter().enumerate() {
        packet.chunks[0].lasers[laser] = RawLaserReturn {
            distance,
            intensity: 10 + laser as u8,
        };
    }
    packet
}

pub fn snappy_msg(packet: &DataPacket) -> InboundMessage {
    BinarySnappyMsg {
        header: Header {
            stamp: packet.timestamp,
            frame_id: FRAME.into(),
        },
        data: compress_packet(packet).unwrap(),
    }
    .into()
}

pub fn raw_msg(packet: &DataPacket) -> InboundMessage {
    packet_to_msg(packet, FRAME.into()).into()
}

/// Raw distance read as centimetres, no geometry
pub struct CentimetreProjector;

impl ReturnProjector for CentimetreProjector {
    fn project(
        &self,
        _laser: usize,
        _rotational_info: u16,
        ret: RawLaserReturn,
        _calibration: Option<&CalibrationModel>,
    ) -> Option<CalibratedReturn> {
        if ret.distance == 0 {
            return None;
        }
        let range = ret.distance as f64 / 100.0;
        Some(CalibratedReturn {
            range,
            point: Point {
                x: range as f32,
                y: 0.0,
                z: 0.0,
                intensity: ret.intensity as f32,
            },
        })
    }
}

pub type TestNode = PostNode<MemoryBus, CloudPublisher, CentimetreProjector>;

/// Node over a fresh bus and publisher, projecting in centimetres
pub fn node(settings: NodeSettings) -> (TestNode, Arc<MemoryBus>, Arc<CloudPublisher>) {
    let bus = Arc::new(MemoryBus::new());
    let publisher = Arc::new(CloudPublisher::new(settings.point_cloud_topic.clone(), 16));
    let node = PostNode::with_projector(
        settings,
        bus.clone(),
        publisher.clone(),
        None,
        CentimetreProjector,
    )
    .unwrap();
    (node, bus, publisher)
}
