//! Revolution batching

use std::mem;

use contracts::DataPacket;

/// Collects decoded packets until a full revolution is available
///
/// Arrival order is preserved. A completed batch is handed out whole and the
/// accumulator starts over empty.
#[derive(Debug)]
pub struct BatchAccumulator {
    capacity: usize,
    packets: Vec<DataPacket>,
}

impl BatchAccumulator {
    /// `capacity` packets form one batch; must be positive
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            packets: Vec::with_capacity(capacity),
        }
    }

    /// Append a packet
    pub fn push(&mut self, packet: DataPacket) {
        self.packets.push(packet);
    }

    /// Take the batch if it is complete
    pub fn try_complete(&mut self) -> Option<Vec<DataPacket>> {
        if self.capacity == 0 || self.packets.len() < self.capacity {
            return None;
        }
        Some(mem::replace(
            &mut self.packets,
            Vec::with_capacity(self.capacity),
        ))
    }

    /// Push and complete in one step
    pub fn push_and_take(&mut self, packet: DataPacket) -> Option<Vec<DataPacket>> {
        self.push(packet);
        self.try_complete()
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop any partial batch
    pub fn clear(&mut self) {
        self.packets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packet(ts: i64) -> DataPacket {
        DataPacket {
            timestamp: ts,
            ..Default::default()
        }
    }

    #[test]
    fn test_completes_every_n_packets() {
        let mut acc = BatchAccumulator::with_capacity(3);
        let mut batches = Vec::new();
        for ts in 0..7 {
            if let Some(batch) = acc.push_and_take(packet(ts)) {
                batches.push(batch);
            }
        }

        assert_eq!(batches.len(), 2);
        let stamps: Vec<i64> = batches[1].iter().map(|p| p.timestamp).collect();
        assert_eq!(stamps, vec![3, 4, 5]);
        assert_eq!(acc.len(), 1);
    }

    #[test]
    fn test_partial_batch_is_kept() {
        let mut acc = BatchAccumulator::with_capacity(4);
        acc.push(packet(1));
        acc.push(packet(2));
        assert!(acc.try_complete().is_none());
        assert_eq!(acc.len(), 2);

        acc.clear();
        assert!(acc.is_empty());
    }
}
