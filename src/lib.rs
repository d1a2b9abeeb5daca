//! A virtual liquid handler: replays low-level robot instructions against a model of the deck,
//! heads, tips and wells, and reports every instruction that would fail or misbehave on the
//! real device.

pub mod adaptor;
pub mod config;
pub mod deck;
pub mod device;
pub mod device_context;
pub mod device_map;
pub mod diagnostic;
pub mod instruction;
pub mod labware;
pub mod liquid;
pub mod properties;
pub mod protocol;
pub mod simulator;
pub mod state_machine;
pub mod units;

pub use crate::config::SimulatorConfig;
pub use crate::diagnostic::{Diagnostic, Severity};
pub use crate::instruction::Instruction;
pub use crate::properties::DeviceProperties;
pub use crate::simulator::{Lifecycle, VirtualLiquidHandler};
