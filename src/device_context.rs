use std::sync::Mutex;

use crate::diagnostic::Diagnostic;
use crate::instruction::Instruction;
use crate::simulator::VirtualLiquidHandler;
use crate::state_machine::StateMachine;

/// Shared handle around one simulated device.
///
/// The simulator is a pure [`StateMachine`]; this context owns the lock so it can be driven and
/// inspected through a [`DeviceRef`](crate::device_map::DeviceRef).
pub struct DeviceContext {
    simulator: Mutex<VirtualLiquidHandler>,
}

impl std::fmt::Debug for DeviceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceContext")
            .field("simulator", &"<VirtualLiquidHandler>")
            .finish()
    }
}

impl DeviceContext {
    pub fn new(simulator: VirtualLiquidHandler) -> Self {
        Self {
            simulator: Mutex::new(simulator),
        }
    }

    /// Run `instructions` under one lock, returning how many diagnostics they raised.
    pub fn run(&self, instructions: impl IntoIterator<Item = Instruction>) -> usize {
        let mut simulator = self.simulator.lock().expect("simulator lock poisoned");
        simulator.run(instructions).len()
    }

    pub fn process(&self, instruction: Instruction) {
        let mut simulator = self.simulator.lock().expect("simulator lock poisoned");
        simulator.process_input(instruction);
    }

    pub fn poll_diagnostic(&self) -> Option<Diagnostic> {
        let mut simulator = self.simulator.lock().expect("simulator lock poisoned");
        simulator.poll_output()
    }

    /// Drain every diagnostic not yet polled.
    pub fn drain_diagnostics(&self) -> Vec<Diagnostic> {
        let mut simulator = self.simulator.lock().expect("simulator lock poisoned");
        std::iter::from_fn(|| simulator.poll_output()).collect()
    }

    pub fn into_simulator(self) -> VirtualLiquidHandler {
        self.simulator.into_inner().expect("simulator lock poisoned")
    }

    /// Inspect the simulator state under the lock.
    pub fn with_state<R>(&self, f: impl FnOnce(&VirtualLiquidHandler) -> R) -> R {
        let simulator = self.simulator.lock().expect("simulator lock poisoned");
        f(&simulator)
    }
}
