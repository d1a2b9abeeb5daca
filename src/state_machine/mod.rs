/// The [`StateMachine`] trait provides calling semantics for a deterministic model that consumes
/// a stream of inputs and yields a stream of outputs.
///
/// # Functionality
/// A state machine groups the kinds of data it accepts into a single [`Input`](StateMachine::Input)
/// type and the kinds of data it produces into a single [`Output`](StateMachine::Output) type.
/// Either is usually an enum, or a plain struct when there is only one kind.
///
/// Dispatch from the grouped types to the inherent methods of the implementor is defined by
/// [`process_input`](StateMachine::process_input) and [`poll_output`](StateMachine::poll_output).
/// This keeps the inherent impl focused on the model itself.
///
/// For the [`VirtualLiquidHandler`](crate::simulator::VirtualLiquidHandler) the input is an
/// [`Instruction`](crate::instruction::Instruction) and the output is a
/// [`Diagnostic`](crate::diagnostic::Diagnostic). Diagnostics are queued as instructions are
/// processed and drained in order by polling.
///
/// # Invariants
/// Given the same sequence of inputs, a [`StateMachine`] must produce the same sequence of outputs
/// and end in the same state. Implementors *must* uphold the following.
///
/// ## No Interior Mutability
/// State changes only through `&mut self`. Containers such as [`std::cell::RefCell`] or
/// [`std::sync::Mutex`] are not used inside the machine. Reference counted values are allowed only
/// when the value they share is immutable, such as interned names.
///
/// Synchronization belongs to the container that owns the machine, see
/// [`DeviceContext`](crate::device_context::DeviceContext).
///
/// ## No IO
/// The machine never reads files, sockets or the environment. Protocol files, device properties
/// and configuration are parsed by the caller and handed in fully formed.
///
/// ### No System Time or Entropy
/// Reading the clock or seeding from system entropy makes two otherwise identical runs diverge.
/// Anything time or randomness dependent must arrive through [`Input`](StateMachine::Input).
///
/// ## No Concurrency
/// No threads and no async. Execution order inside the machine is fully defined by the order of
/// calls made on it.
///
/// # Side Effects
/// Logging through `tracing` is permitted because nothing in the machine depends on its outcome.
///
/// # Example
/// ```ignore
/// let mut vlh = VirtualLiquidHandler::new(DeviceProperties::standard(), SimulatorConfig::default())?;
/// vlh.process_input(Instruction::Initialize);
/// vlh.process_input(Instruction::Initialize);
///
/// while let Some(diagnostic) = vlh.poll_output() {
///     println!("{diagnostic}"); // (err) Initialize: Device is already initialized
/// }
/// ```
pub trait StateMachine {
    /// The type of input that is [processed](StateMachine::process_input) by the state machine.
    type Input;
    /// The type of output that is [polled](StateMachine::poll_output) from the state machine.
    type Output;

    /// Process the provided `input` into the state machine.
    fn process_input(&mut self, input: Self::Input);

    /// Poll the state machine for output, returning the oldest pending output if present.
    fn poll_output(&mut self) -> Option<Self::Output>;
}
