use std::fmt;
use std::sync::{Arc, Weak};

use super::error::DeviceError;
use crate::device::DeviceId;
use crate::device_context::DeviceContext;
use crate::diagnostic::Diagnostic;
use crate::instruction::Instruction;
use crate::simulator::VirtualLiquidHandler;

/// A handle on one registered device.
///
/// The handle does not keep the device alive: once the map retires it, every call fails with
/// [`DeviceError::Retired`].
#[derive(Clone)]
pub struct DeviceRef {
    device_id: DeviceId,
    context: Weak<DeviceContext>,
}

impl DeviceRef {
    pub(super) fn new(device_id: DeviceId, context: Weak<DeviceContext>) -> Self {
        Self { device_id, context }
    }

    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    fn context(&self) -> Result<Arc<DeviceContext>, DeviceError> {
        self.context.upgrade().ok_or_else(|| DeviceError::Retired {
            device_id: self.device_id.clone(),
        })
    }

    /// Feed `instructions` to the device, returning how many diagnostics they raised.
    pub fn run(
        &self,
        instructions: impl IntoIterator<Item = Instruction>,
    ) -> Result<usize, DeviceError> {
        Ok(self.context()?.run(instructions))
    }

    pub fn process(&self, instruction: Instruction) -> Result<(), DeviceError> {
        self.context()?.process(instruction);
        Ok(())
    }

    /// Every diagnostic not yet handed out by this or another handle.
    pub fn drain_diagnostics(&self) -> Result<Vec<Diagnostic>, DeviceError> {
        Ok(self.context()?.drain_diagnostics())
    }

    pub fn inspect<R>(&self, f: impl FnOnce(&VirtualLiquidHandler) -> R) -> Result<R, DeviceError> {
        Ok(self.context()?.with_state(f))
    }
}

impl fmt::Debug for DeviceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceRef")
            .field("device_id", &self.device_id)
            .field("live", &(self.context.strong_count() > 0))
            .finish()
    }
}

impl PartialEq<DeviceId> for DeviceRef {
    fn eq(&self, other: &DeviceId) -> bool {
        self.device_id == *other
    }
}
