// [libs/infra/polling/src/sink.rs]
//! Output sink abstraction:
//! the poller doesn't know or care whether a reading lands on the
//! message bus, a metrics registry, or both — it hands the reading to
//! whatever `ReadingSink`s the service was configured with.

use async_trait::async_trait;
use fabric_domain_models::device::EnergyReading;
use fabric_shared_errors::FabricError;

#[async_trait]
pub trait ReadingSink: Send + Sync {
    async fn publish_reading(&self, reading: &EnergyReading) -> Result<(), FabricError>;
}

/// A sink that only logs — useful as a default/test sink and as a
/// secondary sink alongside a real bus-backed one.
pub struct TracingSink;

#[async_trait]
impl ReadingSink for TracingSink {
    async fn publish_reading(&self, reading: &EnergyReading) -> Result<(), FabricError> {
        tracing::debug!(
            device_id = %reading.device_id,
            power_w = reading.power_w,
            energy_wh = reading.energy_wh,
            "energy reading"
        );
        Ok(())
    }
}
