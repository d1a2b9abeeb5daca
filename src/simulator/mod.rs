//! The virtual liquid handler: a deck, heads and wells driven by an instruction stream.
//!
//! Every instruction is validated in full before anything is changed. If validation produced
//! an error the instruction has no effect; warnings are recorded and the instruction applies.

use tracing::{debug, info, warn};

use crate::adaptor::{Channel, Head};
use crate::config::SimulatorConfig;
use crate::deck::Deck;
use crate::diagnostic::{Diagnostic, DiagnosticLog, Report, channel_list};
use crate::instruction::{AddPlateTo, Instruction};
use crate::labware::{Labware, Plate, Tipbox, Tipwaste, Well, WellCoords};
use crate::properties::DeviceProperties;
use crate::properties::error::PropertiesError;
use crate::state_machine::StateMachine;

mod liquids;
mod movement;
mod tips;

#[cfg(test)]
mod tests;

/// Position of the simulator in its linear lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Initialized,
    Running,
    Finalized,
}

/// A labware well resolved from a location name and a well address.
#[derive(Debug, Clone)]
pub(crate) struct Target {
    pub location: String,
    pub well: WellCoords,
}

pub struct VirtualLiquidHandler {
    properties: DeviceProperties,
    config: SimulatorConfig,
    lifecycle: Lifecycle,
    deck: Deck,
    heads: Vec<Head>,
    log: DiagnosticLog,
}

impl std::fmt::Debug for VirtualLiquidHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualLiquidHandler")
            .field("model", &self.properties.model)
            .field("lifecycle", &self.lifecycle)
            .field("diagnostics", &self.log.len())
            .finish()
    }
}

impl VirtualLiquidHandler {
    /// Build a simulator for `properties`.
    ///
    /// Structural problems are returned as an error. Problems with the location preferences are
    /// recorded as `NewVirtualLiquidHandler` warnings in the diagnostic log.
    pub fn new(
        properties: DeviceProperties,
        config: SimulatorConfig,
    ) -> Result<Self, PropertiesError> {
        let issues = properties.validate()?;

        let mut report = Report::new("NewVirtualLiquidHandler");
        for issue in issues {
            report.warn_bare(issue);
        }

        let mut log = DiagnosticLog::new();
        log.extend(report.finish());

        let deck = Deck::new(properties.slots.iter().cloned());
        let heads = properties.heads.iter().cloned().map(Head::new).collect();

        info!(
            model = %properties.model,
            slots = properties.slots.len(),
            heads = properties.heads.len(),
            "virtual liquid handler created"
        );

        Ok(Self {
            properties,
            config,
            lifecycle: Lifecycle::Uninitialized,
            deck,
            heads,
            log,
        })
    }

    /// Interpret one instruction, returning the diagnostics it produced.
    pub fn process(&mut self, instruction: Instruction) -> &[Diagnostic] {
        let mark = self.log.len();
        let name = instruction.name();
        let mut report = Report::new(name);

        debug!(instruction = name, "processing instruction");

        if self.admit(&instruction, &mut report) {
            match instruction {
                Instruction::Initialize => self.initialize(),
                Instruction::AddPlateTo(add) => self.add_plate_to(add, &mut report),
                Instruction::Move(mv) => self.move_head(&mv, &mut report),
                Instruction::LoadTips(load) => self.load_tips(&load, &mut report),
                Instruction::UnloadTips(unload) => self.unload_tips(&unload, &mut report),
                Instruction::Aspirate(transfer) => self.aspirate(&transfer, &mut report),
                Instruction::Dispense(transfer) => self.dispense(&transfer, &mut report),
                Instruction::Mix(mix) => self.mix(&mix, &mut report),
                Instruction::Finalize => self.finalize(&mut report),
            }
        }

        for diagnostic in report.finish() {
            if diagnostic.is_err() {
                warn!(instruction = name, message = %diagnostic.message, "instruction rejected");
            } else {
                debug!(instruction = name, message = %diagnostic.message, "instruction warning");
            }
            self.log.push(diagnostic);
        }

        self.log.since(mark)
    }

    /// Interpret a whole stream in order.
    pub fn run(&mut self, instructions: impl IntoIterator<Item = Instruction>) -> &[Diagnostic] {
        let mark = self.log.len();
        for instruction in instructions {
            self.process(instruction);
        }
        self.log.since(mark)
    }

    /// Enforce the lifecycle, returning whether the instruction may proceed.
    fn admit(&mut self, instruction: &Instruction, report: &mut Report) -> bool {
        match (self.lifecycle, instruction) {
            (Lifecycle::Finalized, _) => {
                report.err_bare("Instruction issued after Finalize");
                false
            }
            (Lifecycle::Uninitialized, Instruction::Initialize) => true,
            (Lifecycle::Uninitialized, _) => {
                report.err_bare("Instruction issued before Initialize");
                false
            }
            (_, Instruction::Initialize) => {
                report.err_bare("Device is already initialized");
                false
            }
            (Lifecycle::Initialized, _) => {
                self.lifecycle = Lifecycle::Running;
                true
            }
            (Lifecycle::Running, _) => true,
        }
    }

    fn initialize(&mut self) {
        self.lifecycle = Lifecycle::Initialized;
        info!(model = %self.properties.model, "device initialized");
    }

    fn add_plate_to(&mut self, add: AddPlateTo, report: &mut Report) {
        let AddPlateTo { location, labware } = add;
        let name = labware.name().to_string();
        match self.deck.place(&location, labware) {
            Ok(()) => debug!(location = %location, labware = %name, "labware placed"),
            Err(err) => report.err_bare(err),
        }
    }

    fn finalize(&mut self, report: &mut Report) {
        for (h, head) in self.heads.iter().enumerate() {
            let tipped = head.tipped();
            if !tipped.is_empty() {
                report.warn_bare(format!(
                    "Head {h} {} still {} loaded",
                    channel_list(&tipped),
                    if tipped.len() == 1 { "has a tip" } else { "have tips" }
                ));
            }
        }
        self.lifecycle = Lifecycle::Finalized;
        info!(diagnostics = self.log.len(), "device finalized");
    }

    /// Report the head if it does not exist.
    fn check_head(&self, head: usize, report: &mut Report) -> bool {
        if head >= self.heads.len() {
            report.err_bare(format!("Unknown head {head}"));
            return false;
        }
        true
    }

    /// Resolve `location`/`well` to a well of the labware found there, reporting any problem.
    fn resolve(&self, location: &str, well: &str, report: &mut Report) -> Option<Target> {
        let Some(slot) = self.deck.slot(location) else {
            report.err_once(format!("Unknown location \"{location}\""));
            return None;
        };
        let Some(labware) = slot.occupant.as_ref() else {
            report.err_once(format!("No labware found at location \"{location}\""));
            return None;
        };
        let wc = match WellCoords::parse(well) {
            Ok(wc) => wc,
            Err(err) => {
                report.err_bare(err);
                return None;
            }
        };
        if !labware.grid().contains(wc) {
            report.err_bare(format!(
                "Request for well {wc} in object \"{}\" at \"{location}\" which is of size {}",
                labware.name(),
                labware.grid().size_label()
            ));
            return None;
        }
        Some(Target {
            location: location.to_string(),
            well: wc,
        })
    }

    /// Warn when the labware at `location` is not of the expected type.
    fn check_labware_type(&self, location: &str, expected: &str, report: &mut Report) {
        let Some(labware) = self.deck.lookup(location) else {
            return;
        };
        if !expected.is_empty() && labware.type_name() != expected {
            report.warn_bare(format!(
                "Object found at {location} was type \"{}\" not type \"{expected}\" as expected",
                labware.type_name()
            ));
        }
    }

    /// Report channel indices beyond the head and return whether all were valid.
    fn check_channels(&self, head: usize, channels: &[usize], report: &mut Report) -> bool {
        let len = self.heads.get(head).map_or(0, Head::len);
        let mut ok = true;
        for &ch in channels.iter().filter(|&&ch| ch >= len) {
            report.err_bare(format!("Unknown channel \"{ch}\""));
            ok = false;
        }
        ok
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn properties(&self) -> &DeviceProperties {
        &self.properties
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn lookup(&self, location: &str) -> Option<&Labware> {
        self.deck.lookup(location)
    }

    pub fn plate(&self, location: &str) -> Option<&Plate> {
        self.lookup(location).and_then(Labware::as_plate)
    }

    pub fn tipbox(&self, location: &str) -> Option<&Tipbox> {
        self.lookup(location).and_then(Labware::as_tipbox)
    }

    pub fn tipwaste(&self, location: &str) -> Option<&Tipwaste> {
        self.lookup(location).and_then(Labware::as_tipwaste)
    }

    /// The well at `well` (any supported notation) of the plate at `location`.
    pub fn well(&self, location: &str, well: &str) -> Option<&Well> {
        let wc = WellCoords::parse(well).ok()?;
        self.plate(location)?.well(wc)
    }

    pub fn heads(&self) -> &[Head] {
        &self.heads
    }

    pub fn head(&self, head: usize) -> Option<&Head> {
        self.heads.get(head)
    }

    pub fn channel(&self, head: usize, channel: usize) -> Option<&Channel> {
        self.head(head)?.channel(channel)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.log.entries()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.log.errors()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.log.warnings()
    }

    pub fn has_errors(&self) -> bool {
        self.log.has_errors()
    }

    /// Total number of tips in tipboxes, on channels and in tipwastes.
    pub fn tip_census(&self) -> usize {
        let on_deck: usize = self
            .deck
            .slots()
            .iter()
            .filter_map(|s| s.occupant.as_ref())
            .map(|labware| match labware {
                Labware::Tipbox(tb) => tb.tip_count(),
                Labware::Tipwaste(w) => w.count(),
                Labware::Plate(_) => 0,
            })
            .sum();
        let on_heads: usize = self.heads.iter().map(|h| h.tipped().len()).sum();
        on_deck + on_heads
    }

    /// `A1@plate1` style label for a resolved target.
    fn well_label(&self, target: &Target) -> String {
        let name = self.deck.lookup(&target.location).map_or("", Labware::name);
        format!("{}@{name}", target.well)
    }
}

impl StateMachine for VirtualLiquidHandler {
    type Input = Instruction;
    type Output = Diagnostic;

    fn process_input(&mut self, input: Self::Input) {
        self.process(input);
    }

    fn poll_output(&mut self) -> Option<Self::Output> {
        self.log.poll()
    }
}
