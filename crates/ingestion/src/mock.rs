//! Mock packet source
//!
//! Publishes a synthetic spinning sensor on a [`MemoryBus`] so the node can run
//! without hardware.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use contracts::{
    BinarySnappyMsg, DataPacket, DeviceModel, FrameId, Header, InboundMessage, InputMode,
    CHUNKS_PER_PACKET, LOWER_BLOCK, UPPER_BLOCK,
};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::bus::MemoryBus;
use crate::compression::compress_packet;
use crate::decoder::packet_to_msg;

/// Highest packet rate the mock source will emit
pub const MAX_PACKET_RATE_HZ: f64 = 100_000.0;

/// Mock source configuration
#[derive(Debug, Clone)]
pub struct MockSourceConfig {
    /// Topic to publish on
    pub topic: String,

    /// Frame written into every header
    pub frame_id: FrameId,

    /// Message shape to produce
    pub input: InputMode,

    /// Emulated device
    pub device: DeviceModel,

    /// Packets per second
    pub packet_rate_hz: f64,
}

impl Default for MockSourceConfig {
    fn default() -> Self {
        Self {
            topic: "/velodyne/binary_snappy".to_string(),
            frame_id: FrameId::from("velodyne"),
            input: InputMode::BinarySnappy,
            device: DeviceModel::Hdl32e,
            packet_rate_hz: 1740.0,
        }
    }
}

/// Synthetic packet producer
pub struct MockPacketSource {
    config: MockSourceConfig,
    running: Arc<AtomicBool>,
    sent: Arc<AtomicU64>,
}

impl MockPacketSource {
    pub fn new(config: MockSourceConfig) -> Self {
        Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
            sent: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn config(&self) -> &MockSourceConfig {
        &self.config
    }

    /// Start publishing on `bus`
    pub fn start(&self, bus: Arc<MemoryBus>) -> JoinHandle<()> {
        let config = self.config.clone();
        let running = self.running.clone();
        let sent = self.sent.clone();
        running.store(true, Ordering::SeqCst);

        tokio::spawn(async move {
            let period = tick_period(config.packet_rate_hz);
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            let mut seq: u64 = 0;

            debug!(
                topic = %config.topic,
                input = ?config.input,
                rate_hz = config.packet_rate_hz,
                "mock packet source started"
            );

            while running.load(Ordering::Relaxed) {
                interval.tick().await;

                let data_packet = packet(&config.device, seq, now_ns());
                let Some(msg) = to_message(&config, &data_packet) else {
                    continue;
                };
                let delivered = bus.publish(&config.topic, msg);
                sent.fetch_add(1, Ordering::Relaxed);
                trace!(seq, delivered, "mock packet published");
                seq += 1;
            }

            debug!(topic = %config.topic, packets = seq, "mock packet source stopped");
        })
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Packets published so far
    pub fn sent(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }
}

fn now_ns() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as i64)
        .unwrap_or_default()
}

/// Wrap a packet in the configured message shape
pub fn to_message(config: &MockSourceConfig, packet: &DataPacket) -> Option<InboundMessage> {
    match config.input {
        InputMode::DataPacket => Some(packet_to_msg(packet, config.frame_id.clone()).into()),
        InputMode::BinarySnappy => match compress_packet(packet) {
            Ok(data) => Some(
                BinarySnappyMsg {
                    header: Header {
                        stamp: packet.timestamp,
                        frame_id: config.frame_id.clone(),
                    },
                    data,
                }
                .into(),
            ),
            Err(e) => {
                warn!(error = %e, "mock packet compression failed");
                None
            }
        },
    }
}

/// Interval between packets for a requested rate
///
/// The rate is clamped to `1..=MAX_PACKET_RATE_HZ`; NaN falls back to 1 Hz.
pub fn tick_period(rate_hz: f64) -> Duration {
    let rate = if rate_hz.is_nan() {
        1.0
    } else {
        rate_hz.clamp(1.0, MAX_PACKET_RATE_HZ)
    };
    Duration::from_secs_f64(1.0 / rate)
}

/// Deterministic packet number `seq` of a spinning `device`
///
/// Azimuth advances evenly over one revolution; 64-laser devices alternate
/// upper and lower blocks.
pub fn packet(device: &DeviceModel, seq: u64, timestamp: i64) -> DataPacket {
    let per_rev = device.default_num_data_packets() as u64;
    let slots = per_rev * CHUNKS_PER_PACKET as u64;
    let dual_block = device.num_lasers() > 32;

    let mut packet = DataPacket {
        timestamp,
        spin_count: (seq / per_rev) as u16,
        ..Default::default()
    };
    for (i, chunk) in packet.chunks.iter_mut().enumerate() {
        let slot = (seq % per_rev) * CHUNKS_PER_PACKET as u64 + i as u64;
        chunk.header_info = if dual_block && i % 2 == 1 {
            LOWER_BLOCK
        } else {
            UPPER_BLOCK
        };
        chunk.rotational_info = (slot * 36_000 / slots) as u16;
        for (j, ret) in chunk.lasers.iter_mut().enumerate() {
            // 4 m .. ~36 m walls, every 16th return empty
            ret.distance = if (j + i) % 16 == 15 {
                0
            } else {
                2_000 + (j as u16) * 500 + (slot % 50) as u16 * 10
            };
            ret.intensity = (j * 8) as u8;
        }
    }
    packet
}
