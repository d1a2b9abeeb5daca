use tracing::info;

use super::{Target, VirtualLiquidHandler};
use crate::adaptor::Channel;
use crate::diagnostic::{Report, channel_list, plural, summarize, volume_summary};
use crate::instruction::{Mix, Transfer, active};
use crate::labware::{Labware, Plate, Well};
use crate::liquid::Composition;
use crate::units::{Volume, format_decimal};

/// Where a dispense ends up.
enum Sink {
    Well(Target),
    Tipwaste,
}

fn all_equal<T>(values: &[T], same: impl Fn(&T, &T) -> bool) -> bool {
    values
        .split_first()
        .is_none_or(|(first, rest)| rest.iter().all(|v| same(first, v)))
}

impl VirtualLiquidHandler {
    /// The plate well the channel's tip is in, allowing `tolerance` mm above the well top.
    fn plate_well_under(&self, channel: &Channel, tolerance: f64) -> Option<Target> {
        let probe = self.deck.probe(channel.position?, tolerance)?;
        matches!(probe.labware, Labware::Plate(_)).then(|| Target {
            location: probe.location.to_string(),
            well: probe.well,
        })
    }

    fn target_plate(&self, target: &Target) -> Option<&Plate> {
        self.deck.lookup(&target.location).and_then(Labware::as_plate)
    }

    fn target_well(&self, target: &Target) -> Option<&Well> {
        self.target_plate(target)?.well(target.well)
    }

    fn target_well_mut(&mut self, target: &Target) -> Option<&mut Well> {
        self.deck
            .lookup_mut(&target.location)
            .and_then(Labware::as_plate_mut)?
            .well_mut(target.well)
    }

    fn check_multi(&self, multi: usize, active: usize, report: &mut Report) {
        if multi != active {
            report.err(format!("multi should equal {active}, not {multi}"));
        }
    }

    /// Draw liquid from the wells under the addressed channels into their tips.
    pub(super) fn aspirate(&mut self, transfer: &Transfer, report: &mut Report) {
        if !self.check_head(transfer.head, report) {
            return;
        }
        let requests: Vec<_> = active(&transfer.channels).collect();
        let channels: Vec<usize> = requests.iter().map(|(ch, _)| *ch).collect();
        let volumes: Vec<Volume> = requests.iter().map(|(_, r)| r.volume).collect();
        let liquids: Vec<String> = requests.iter().map(|(_, r)| r.liquid.label()).collect();

        report.set_prefix(format!(
            "While aspirating {} of {} to head {} {} - ",
            volume_summary(&volumes),
            summarize(&liquids, |a, b| a == b),
            transfer.head,
            channel_list(&channels)
        ));

        if !self.check_channels(transfer.head, &channels, report) {
            return;
        }
        self.check_multi(transfer.multi, channels.len(), report);

        let tolerance = self.config.well_tolerance_mm;
        let head = &self.heads[transfer.head];

        let mut plan = Vec::new();
        for &(ch, request) in &requests {
            let Some(channel) = head.channel(ch) else {
                continue;
            };
            if request.volume.is_negative() {
                report.err(format!(
                    "channel {ch} cannot aspirate negative volume {}",
                    request.volume
                ));
                continue;
            }
            if !channel.has_tip() {
                report.err(format!("missing tip on channel {ch}"));
                continue;
            }
            let Some(target) = self.plate_well_under(channel, tolerance) else {
                report.err(format!("tip on channel {ch} not in a well"));
                continue;
            };
            plan.push((ch, request, target));
        }

        if !head.is_independent() && !all_equal(&volumes, |a, b| a.approx_eq(*b)) {
            report.err("channels cannot aspirate different volumes in non-independent head");
        }

        let mut demand: Vec<(Target, Volume)> = Vec::new();
        for (ch, request, target) in &plan {
            if let Some(tip) = head.channel(*ch).and_then(|c| c.tip.as_ref()) {
                let after = tip.volume() + request.volume;
                if after.exceeds(tip.max_volume()) {
                    report.err(format!(
                        "channel {ch} contains {}, command exceeds maximum volume {}",
                        tip.volume(),
                        tip.max_volume()
                    ));
                } else if tip.min_volume().exceeds(after) {
                    report.warn(format!(
                        "minimum tip volume on channel {ch} is {}",
                        tip.min_volume()
                    ));
                }
            }

            if let Some(well) = self.target_well(target) {
                let held = well.composition();
                if !request.liquid.is_empty() && !held.is_empty() && *held != request.liquid {
                    report.warn(format!(
                        "well {} contains {held}, not {}",
                        self.well_label(target),
                        request.liquid
                    ));
                }
            }

            match demand
                .iter_mut()
                .find(|(t, _)| t.location == target.location && t.well == target.well)
            {
                Some((_, total)) => *total += request.volume,
                None => demand.push((target.clone(), request.volume)),
            }
        }

        for (target, total) in &demand {
            let Some(working) = self
                .target_plate(target)
                .and_then(|p| p.working_volume(target.well))
            else {
                continue;
            };
            if total.exceeds(working) {
                report.err(format!(
                    "well {} only contains {working} working volume",
                    self.well_label(target)
                ));
            }
        }

        if !head.is_independent() {
            for (j, channel) in head.channels().iter().enumerate() {
                if channels.contains(&j) || !channel.has_tip() {
                    continue;
                }
                let Some(target) = self.plate_well_under(channel, 0.0) else {
                    continue;
                };
                if let Some(well) = self.target_well(&target).filter(|w| !w.volume().is_zero()) {
                    report.err(format!(
                        "channel {j} will inadvertently aspirate {} from well {} as head is not independent",
                        well.composition(),
                        self.well_label(&target)
                    ));
                }
            }
        }

        if report.has_errors() {
            return;
        }

        let plan: Vec<(usize, Volume, Target)> = plan
            .into_iter()
            .map(|(ch, request, target)| (ch, request.volume, target))
            .collect();
        for (ch, volume, target) in plan {
            let Some(drawn) = self.target_well_mut(&target).map(|w| w.contents.take(volume)) else {
                continue;
            };
            if let Some(tip) = self.heads[transfer.head]
                .channel_mut(ch)
                .and_then(|c| c.tip.as_mut())
            {
                tip.contents.add(drawn.volume, &drawn.composition);
            }
        }
        info!(head = transfer.head, channels = channels.len(), "aspirated");
    }

    /// Expel liquid from the addressed tips into the wells (or tipwaste) beneath them.
    pub(super) fn dispense(&mut self, transfer: &Transfer, report: &mut Report) {
        if !self.check_head(transfer.head, report) {
            return;
        }
        let requests: Vec<_> = active(&transfer.channels).collect();
        let channels: Vec<usize> = requests.iter().map(|(ch, _)| *ch).collect();
        let volumes: Vec<Volume> = requests.iter().map(|(_, r)| r.volume).collect();
        let volume_text = volume_summary(&volumes);

        report.set_prefix(format!(
            "While dispensing {volume_text} from head {} {} - ",
            transfer.head,
            channel_list(&channels)
        ));

        if !self.check_channels(transfer.head, &channels, report) {
            return;
        }
        self.check_multi(transfer.multi, channels.len(), report);

        let tolerance = self.config.well_tolerance_mm;
        let head = &self.heads[transfer.head];

        let mut plan = Vec::new();
        for &(ch, request) in &requests {
            let Some(channel) = head.channel(ch) else {
                continue;
            };
            if request.volume.is_negative() {
                report.err(format!(
                    "channel {ch} cannot dispense negative volume {}",
                    request.volume
                ));
                continue;
            }
            if !channel.has_tip() {
                report.err(format!("no tip loaded on channel {ch}"));
                continue;
            }
            let probe = channel
                .position
                .and_then(|p| self.deck.probe(p, tolerance));
            let sink = match probe {
                Some(probe) => match probe.labware {
                    Labware::Plate(_) => Some(Sink::Well(Target {
                        location: probe.location.to_string(),
                        well: probe.well,
                    })),
                    Labware::Tipwaste(_) => Some(Sink::Tipwaste),
                    Labware::Tipbox(_) => None,
                },
                None => None,
            };
            let Some(sink) = sink else {
                report.err(format!(
                    "no well within {}mm below tip on channel {ch}",
                    format_decimal(tolerance, 2)
                ));
                continue;
            };
            plan.push((ch, request, sink));
        }

        if !head.is_independent() && !all_equal(&volumes, |a, b| a.approx_eq(*b)) {
            report.err("channels cannot dispense different volumes in non-independent head");
        }

        let mut pending: Vec<(Target, Volume)> = Vec::new();
        for (ch, request, sink) in &plan {
            if let Some(tip) = head.channel(*ch).and_then(|c| c.tip.as_ref()) {
                if request.volume.exceeds(tip.volume()) {
                    report.err(format!(
                        "tip on channel {ch} contains only {} working volume",
                        tip.volume()
                    ));
                }
            }

            let Sink::Well(target) = sink else {
                continue;
            };
            let Some((plate, well)) = self
                .target_plate(target)
                .and_then(|p| Some((p, p.well(target.well)?)))
            else {
                continue;
            };

            let already = pending
                .iter()
                .filter(|(t, _)| t.location == target.location && t.well == target.well)
                .fold(Volume::ZERO, |acc, (_, v)| acc + *v);
            if (well.volume() + already + request.volume).exceeds(plate.max_volume) {
                report.err(format!(
                    "well {} under channel {ch} contains {}, command would exceed maximum volume {}",
                    self.well_label(target),
                    well.volume() + already,
                    plate.max_volume
                ));
            }
            pending.push((target.clone(), request.volume));
        }

        if plan.iter().any(|(_, _, sink)| matches!(sink, Sink::Tipwaste)) {
            report.warn("dispensing to tipwaste");
        }

        if !head.is_independent() {
            let coupled: Vec<usize> = head
                .channels()
                .iter()
                .enumerate()
                .filter(|(j, c)| {
                    !channels.contains(j)
                        && c.tip.as_ref().is_some_and(|t| !t.contents.is_empty())
                })
                .map(|(j, _)| j)
                .collect();
            if !coupled.is_empty() {
                report.err(format!(
                    "must also dispense {volume_text} from {} as head is not independent",
                    channel_list(&coupled)
                ));
            }
        }

        if report.has_errors() {
            return;
        }

        let plan: Vec<(usize, Volume, Composition, Sink)> = plan
            .into_iter()
            .map(|(ch, request, sink)| (ch, request.volume, request.liquid.clone(), sink))
            .collect();
        for (ch, volume, requested, sink) in plan {
            let Some(tip) = self.heads[transfer.head]
                .channel_mut(ch)
                .and_then(|c| c.tip.as_mut())
            else {
                continue;
            };
            let mut expelled = tip.contents.take(volume);
            if expelled.composition.is_empty() {
                expelled.composition = requested;
            }
            if let Sink::Well(target) = sink {
                if let Some(well) = self.target_well_mut(&target) {
                    well.contents.add(expelled.volume, &expelled.composition);
                }
            }
        }
        info!(head = transfer.head, channels = channels.len(), "dispensed");
    }

    /// Draw up and expel liquid in place. Volumes are unchanged; the tip picks up the well's
    /// composition as residue.
    pub(super) fn mix(&mut self, mix: &Mix, report: &mut Report) {
        if !self.check_head(mix.head, report) {
            return;
        }
        let requests: Vec<_> = active(&mix.channels).collect();
        let channels: Vec<usize> = requests.iter().map(|(ch, _)| *ch).collect();
        let volumes: Vec<Volume> = requests.iter().map(|(_, r)| r.volume).collect();
        let cycles: Vec<u32> = requests.iter().map(|(_, r)| r.cycles).collect();

        if !self.check_channels(mix.head, &channels, report) {
            return;
        }
        self.check_multi(mix.multi, channels.len(), report);

        let tolerance = self.config.well_tolerance_mm;
        let head = &self.heads[mix.head];

        let mut plan = Vec::new();
        for &(ch, request) in &requests {
            let Some(channel) = head.channel(ch) else {
                continue;
            };
            if request.volume.is_negative() {
                report.err(format!(
                    "channel {ch} cannot mix negative volume {}",
                    request.volume
                ));
            }
            if !channel.has_tip() {
                report.err(format!("missing tip on channel {ch}"));
                continue;
            }
            let Some(target) = self.plate_well_under(channel, tolerance) else {
                report.err(format!("tip on channel {ch} not in a well"));
                continue;
            };
            plan.push((ch, request, target));
        }

        let wells: Vec<_> = plan.iter().map(|(_, _, t)| t.well).collect();
        let plate_name = plan
            .first()
            .and_then(|(_, _, t)| self.target_plate(t))
            .map_or("", |p| p.name.as_str());
        report.set_prefix(format!(
            "While mixing {} {} times in {} of plate \"{plate_name}\" - ",
            volume_summary(&volumes),
            summarize(&cycles, |a, b| a == b),
            plural("well", &wells)
        ));

        if !head.is_independent() {
            if !all_equal(&volumes, |a, b| a.approx_eq(*b)) {
                report.err("cannot manipulate different volumes with non-independent head");
            }
            if !all_equal(&cycles, |a, b| a == b) {
                report.err("cannot vary number of mix cycles with non-independent head");
            }
        }

        for (ch, request, target) in &plan {
            let Some(plate) = self.target_plate(target) else {
                continue;
            };
            if !request.labware_type.is_empty() && request.labware_type != plate.type_name {
                report.warn(format!(
                    "plate \"{}\" is of type \"{}\", not \"{}\"",
                    plate.name, plate.type_name, request.labware_type
                ));
            }

            if let Some(tip) = head.channel(*ch).and_then(|c| c.tip.as_ref()) {
                if request.volume.exceeds(tip.max_volume()) {
                    report.err(format!(
                        "channel {ch} cannot mix {} as tip maximum is {}",
                        request.volume,
                        tip.max_volume()
                    ));
                }
            }

            if let Some(working) = plate.working_volume(target.well) {
                if request.volume.exceeds(working) {
                    report.warn(format!(
                        "well {} only contains {working} working volume",
                        self.well_label(target)
                    ));
                }
            }
        }

        if report.has_errors() {
            return;
        }

        let plan: Vec<(usize, Target)> = plan.into_iter().map(|(ch, _, t)| (ch, t)).collect();
        for (ch, target) in plan {
            let Some(composition) = self.target_well(&target).map(|w| w.composition().clone())
            else {
                continue;
            };
            if let Some(tip) = self.heads[mix.head]
                .channel_mut(ch)
                .and_then(|c| c.tip.as_mut())
            {
                tip.contents.composition.union(&composition);
            }
        }
        info!(head = mix.head, channels = channels.len(), "mixed");
    }
}
