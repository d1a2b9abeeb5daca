use std::sync::Arc;

use dashmap::{DashMap, Entry};
use tracing::debug;

pub use self::device_ref::DeviceRef;
use self::error::DeviceError;
pub use crate::device::DeviceId;
use crate::device_context::DeviceContext;
use crate::simulator::VirtualLiquidHandler;

mod device_ref;
pub mod error;

/// Simulated devices keyed by [`DeviceId`], one per protocol being replayed.
///
/// Devices are handed out as [`DeviceRef`]s that can be driven from separate threads. Each device
/// is locked on its own, so protocols run side by side without seeing each other's state.
#[derive(Debug, Default)]
pub struct DeviceMap {
    devices: DashMap<DeviceId, Arc<DeviceContext>, ahash::RandomState>,
}

impl DeviceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `simulator` under `device_id` and return a handle to drive it.
    pub fn register(
        &self,
        device_id: DeviceId,
        simulator: VirtualLiquidHandler,
    ) -> Result<DeviceRef, DeviceError> {
        match self.devices.entry(device_id) {
            Entry::Occupied(entry) => Err(DeviceError::AlreadyPresent {
                device_id: entry.key().clone(),
            }),

            Entry::Vacant(slot) => {
                let device_id = slot.key().clone();
                let context = slot.insert(Arc::new(DeviceContext::new(simulator)));
                debug!(device = %device_id, "device registered");
                Ok(DeviceRef::new(device_id, Arc::downgrade(&context)))
            }
        }
    }

    pub fn device(&self, device_id: &DeviceId) -> Result<DeviceRef, DeviceError> {
        self.devices
            .view(device_id, |id, context| {
                DeviceRef::new(id.clone(), Arc::downgrade(context))
            })
            .ok_or_else(|| DeviceError::NotFound {
                device_id: device_id.clone(),
            })
    }

    pub fn contains(&self, device_id: &DeviceId) -> bool {
        self.devices.contains_key(device_id)
    }

    /// Remove a device and hand back its final state.
    ///
    /// Fails with [`DeviceError::InUse`] while a handle is driving or inspecting it; the device
    /// then stays registered.
    pub fn retire(&self, device_id: &DeviceId) -> Result<VirtualLiquidHandler, DeviceError> {
        let (device_id, context) =
            self.devices
                .remove(device_id)
                .ok_or_else(|| DeviceError::NotFound {
                    device_id: device_id.clone(),
                })?;

        match Arc::try_unwrap(context) {
            Ok(context) => {
                debug!(device = %device_id, "device retired");
                Ok(context.into_simulator())
            }
            Err(context) => {
                self.devices.insert(device_id.clone(), context);
                Err(DeviceError::InUse { device_id })
            }
        }
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
