use std::collections::BTreeMap;

use tracing::info;

use super::{Target, VirtualLiquidHandler};
use crate::adaptor::Channel;
use crate::diagnostic::{Report, channel_list, join};
use crate::instruction::{LoadTips, UnloadTips};
use crate::labware::{Labware, Tip, WellCoords};
use crate::units::{GEOMETRY_EPSILON, whole_mm};

/// Direction of a tip operation, used to phrase diagnostics.
#[derive(Clone, Copy)]
enum TipOp {
    Load,
    Unload,
}

impl VirtualLiquidHandler {
    /// Checks shared by loading and unloading. Returns `false` if the call cannot be evaluated
    /// any further.
    fn check_tip_call(
        &self,
        op: TipOp,
        head: usize,
        multi: usize,
        channels: &[usize],
        addresses: usize,
        report: &mut Report,
    ) -> bool {
        if !self.check_head(head, report) {
            return false;
        }
        let mut ok = self.check_channels(head, channels, report);

        let mut seen = Vec::with_capacity(channels.len());
        let mut repeated = Vec::new();
        for &ch in channels {
            if seen.contains(&ch) && !repeated.contains(&ch) {
                repeated.push(ch);
            }
            seen.push(ch);
        }
        for ch in repeated {
            report.err_bare(format!("channel {ch} appears more than once"));
            ok = false;
        }

        let (verb, prep, noun) = match op {
            TipOp::Load => ("loading", "to", "sources"),
            TipOp::Unload => ("unloading", "from", "destinations"),
        };
        if multi != channels.len() {
            let tips = if channels.len() == 1 { "tip" } else { "tips" };
            report.err_bare(format!(
                "While {verb} {tips} {prep} {}, multi should equal {}, not {multi}",
                channel_list(channels),
                channels.len()
            ));
            ok = false;
        }
        if addresses != channels.len() {
            report.err_bare(format!("{addresses} {noun} given for {} channels", channels.len()));
            ok = false;
        }

        if !ok {
            return false;
        }

        for &ch in channels {
            if self.channel(head, ch).and_then(|c| c.position).is_none() {
                report.err_bare(format!("Channel {ch} has not been moved to a position"));
                ok = false;
            }
        }
        ok
    }

    /// Report channels whose position does not sit over their tip slot, batched into one message.
    fn check_alignment(&self, head: usize, plan: &[(usize, Target)], report: &mut Report) {
        let tolerance = self.config.alignment_tolerance_mm + GEOMETRY_EPSILON;
        let misaligned: Vec<(usize, WellCoords, f64)> = plan
            .iter()
            .filter_map(|(ch, target)| {
                let position = self.channel(head, *ch)?.position?;
                let centre = self.deck.well_bottom(&target.location, target.well)?;
                let offset = position.planar_distance(centre);
                (offset > tolerance).then_some((*ch, target.well, offset))
            })
            .collect();

        match misaligned.as_slice() {
            [] => {}
            [(ch, wc, offset)] => report.err_bare(format!(
                "Channel {ch} is misaligned with tip at {wc} by {}mm",
                whole_mm(*offset)
            )),
            many => report.err_bare(format!(
                "Channels {} are misaligned with tips at {} by {} mm respectively",
                join(many.iter().map(|(ch, _, _)| ch)),
                join(many.iter().map(|(_, wc, _)| wc)),
                join(many.iter().map(|(_, _, offset)| whole_mm(*offset)))
            )),
        }
    }

    /// Pick up tips from a tipbox.
    pub(super) fn load_tips(&mut self, load: &LoadTips, report: &mut Report) {
        let sources = load.sources.len();
        if !self.check_tip_call(TipOp::Load, load.head, load.multi, &load.channels, sources, report)
        {
            return;
        }
        let head = &self.heads[load.head];

        let loaded: Vec<usize> = load
            .channels
            .iter()
            .copied()
            .filter(|&ch| head.channel(ch).is_some_and(Channel::has_tip))
            .collect();
        if !loaded.is_empty() {
            let (verb, tips) = if loaded.len() == 1 {
                ("has", "a tip")
            } else {
                ("have", "tips")
            };
            report.err_bare(format!(
                "Cannot load tips to Head{} when {} already {verb} {tips} loaded",
                load.head,
                channel_list(&loaded)
            ));
        }

        let mut plan: Vec<(usize, Target)> = Vec::new();
        for (&ch, source) in load.channels.iter().zip(&load.sources) {
            let Some(target) = self.resolve(&source.location, &source.well, report) else {
                continue;
            };
            self.check_labware_type(&source.location, &source.labware_type, report);

            let tipbox = match self.deck.lookup(&target.location) {
                Some(Labware::Tipbox(tipbox)) => tipbox,
                Some(other) => {
                    report.err_bare(format!(
                        "Cannot load tips from {} \"{}\" at location {}",
                        other.kind(),
                        other.name(),
                        target.location
                    ));
                    continue;
                }
                None => continue,
            };

            let already_taken = plan
                .iter()
                .any(|(_, t)| t.location == target.location && t.well == target.well);
            if already_taken || !tipbox.has_tip(target.well) {
                report.err_bare(format!(
                    "Cannot load to channel {ch} as no tip at {} in tipbox \"{}\"",
                    target.well, tipbox.name
                ));
                continue;
            }
            plan.push((ch, target));
        }

        if !head.is_independent() {
            let wells = join(plan.iter().map(|(_, t)| t.well));
            let loading = join(plan.iter().map(|(ch, _)| ch));
            for (j, channel) in head.channels().iter().enumerate() {
                if load.channels.contains(&j) {
                    continue;
                }
                let Some(position) = channel.position else {
                    continue;
                };
                let Some(probe) = self.deck.probe(position, self.config.well_tolerance_mm) else {
                    continue;
                };
                if let Labware::Tipbox(tipbox) = probe.labware {
                    if tipbox.has_tip(probe.well) {
                        report.err_bare(format!(
                            "Cannot load {wells}->channel{loading}, channel {j} collides with tip \"{}@{}\" (Head{} not independent)",
                            probe.well, tipbox.name, load.head
                        ));
                    }
                }
            }
        }

        self.check_alignment(load.head, &plan, report);

        if report.has_errors() {
            return;
        }

        let loaded = plan.len();
        for (ch, target) in plan {
            let Some(channel) = self.heads[load.head].channel_mut(ch) else {
                continue;
            };
            channel.tip = self
                .deck
                .lookup_mut(&target.location)
                .and_then(Labware::as_tipbox_mut)
                .and_then(|tipbox| tipbox.take_tip(target.well))
                .map(|tip| Tip::new(tip.spec));
        }
        info!(head = load.head, tips = loaded, "tips loaded");
    }

    /// Drop tips into a tipwaste or return them to empty tipbox slots.
    pub(super) fn unload_tips(&mut self, unload: &UnloadTips, report: &mut Report) {
        let destinations = unload.destinations.len();
        if !self.check_tip_call(
            TipOp::Unload,
            unload.head,
            unload.multi,
            &unload.channels,
            destinations,
            report,
        ) {
            return;
        }
        let head = &self.heads[unload.head];

        for &ch in &unload.channels {
            if !head.channel(ch).is_some_and(Channel::has_tip) {
                report.err_bare(format!("Cannot unload tip from channel {ch} as no tip is loaded"));
            }
        }

        if !head.is_independent() {
            let missing: Vec<usize> = head
                .tipped()
                .into_iter()
                .filter(|ch| !unload.channels.contains(ch))
                .collect();
            if !missing.is_empty() {
                let mut unloading = unload.channels.clone();
                unloading.sort_unstable();
                report.err_bare(format!(
                    "Cannot unload tips from head{} {} without unloading tips from {} (head isn't independent)",
                    unload.head,
                    channel_list(&unloading),
                    channel_list(&missing)
                ));
            }
        }

        let mut plan: Vec<(usize, Target)> = Vec::new();
        let mut returns: Vec<(usize, Target)> = Vec::new();
        let mut waste_demand: BTreeMap<&str, usize> = BTreeMap::new();

        for (&ch, dest) in unload.channels.iter().zip(&unload.destinations) {
            let Some(slot) = self.deck.slot(&dest.location) else {
                report.err_once(format!("Unknown location \"{}\"", dest.location));
                continue;
            };
            let Some(labware) = slot.occupant.as_ref() else {
                report.err_once(format!("No labware found at location \"{}\"", dest.location));
                continue;
            };
            self.check_labware_type(&dest.location, &dest.labware_type, report);

            if let Labware::Plate(plate) = labware {
                report.err_bare(format!(
                    "Cannot unload tips to plate \"{}\" at location {}",
                    plate.name, dest.location
                ));
                continue;
            }

            let wc = match WellCoords::parse(&dest.well) {
                Ok(wc) => wc,
                Err(err) => {
                    report.err_bare(err);
                    continue;
                }
            };
            if !labware.grid().contains(wc) {
                report.err_bare(format!(
                    "Cannot unload to address {wc} in {} \"{}\" size {}",
                    labware.kind(),
                    labware.name(),
                    labware.grid().size_label()
                ));
                continue;
            }

            let target = Target {
                location: dest.location.clone(),
                well: wc,
            };
            let tip = head.channel(ch).and_then(|c| c.tip.as_ref());

            match labware {
                Labware::Tipwaste(waste) => {
                    let over_waste = head
                        .channel(ch)
                        .and_then(|c| c.position)
                        .and_then(|p| self.deck.probe(p, self.config.well_tolerance_mm))
                        .is_some_and(|probe| probe.location == dest.location);
                    if !over_waste {
                        report.err_bare(format!(
                            "Channel {ch} is not above tipwaste \"{}\" at location {}",
                            waste.name, dest.location
                        ));
                    }
                    *waste_demand.entry(dest.location.as_str()).or_default() += 1;
                }
                Labware::Tipbox(tipbox) => {
                    let claimed = returns
                        .iter()
                        .any(|(_, t)| t.location == target.location && t.well == wc);
                    if claimed || tipbox.has_tip(wc) {
                        report.err_bare(format!(
                            "Cannot unload tip from channel {ch} to {wc} in tipbox \"{}\" which already holds a tip",
                            tipbox.name
                        ));
                        continue;
                    }
                    if let Some(tip) = tip.filter(|t| !t.contents.is_empty()) {
                        report.warn_bare(format!(
                            "Returning tip holding {} of {} on channel {ch} to tipbox \"{}\"",
                            tip.volume(),
                            tip.contents.composition,
                            tipbox.name
                        ));
                    }
                    returns.push((ch, target.clone()));
                }
                Labware::Plate(_) => continue,
            }
            plan.push((ch, target));
        }

        for (location, demand) in &waste_demand {
            if let Some(waste) = self.deck.lookup(location).and_then(Labware::as_tipwaste) {
                if *demand > waste.remaining() {
                    report.err_bare(format!(
                        "Cannot unload {demand} tips to tipwaste \"{}\" which has room for {} more",
                        waste.name,
                        waste.remaining()
                    ));
                }
            }
        }

        self.check_alignment(unload.head, &returns, report);

        if report.has_errors() {
            return;
        }

        let unloaded = plan.len();
        for (ch, target) in plan {
            let Some(channel) = self.heads[unload.head].channel_mut(ch) else {
                continue;
            };
            let Some(tip) = channel.tip.take() else {
                continue;
            };
            let placed = match self.deck.lookup_mut(&target.location) {
                Some(Labware::Tipwaste(waste)) => waste.discard(tip),
                Some(Labware::Tipbox(tipbox)) => tipbox.put_tip(target.well, tip),
                _ => Err(tip),
            };
            if let Err(tip) = placed {
                channel.tip = Some(tip);
            }
        }
        info!(head = unload.head, tips = unloaded, "tips unloaded");
    }
}
