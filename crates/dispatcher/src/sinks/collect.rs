//! CollectSink - keeps received clouds in memory

use std::sync::{Arc, Mutex};

use contracts::{CloudSink, ContractError, PointCloudMsg};

/// Sink that appends every cloud to a shared buffer
///
/// Handy for embedding the node in another program or in tests.
#[derive(Clone, Default)]
pub struct CollectSink {
    name: String,
    clouds: Arc<Mutex<Vec<PointCloudMsg>>>,
}

impl CollectSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            clouds: Arc::default(),
        }
    }

    /// Clouds received so far
    pub fn clouds(&self) -> Vec<PointCloudMsg> {
        self.clouds
            .lock()
            .map(|c| c.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn len(&self) -> usize {
        self.clouds
            .lock()
            .map(|c| c.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CloudSink for CollectSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write(&mut self, cloud: &PointCloudMsg) -> Result<(), ContractError> {
        self.clouds
            .lock()
            .map_err(|_| ContractError::sink_write(&self.name, "buffer poisoned"))?
            .push(cloud.clone());
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        Ok(())
    }
}
