use tracing::debug;

use super::{Target, VirtualLiquidHandler};
use crate::diagnostic::{Report, join};
use crate::instruction::{Move, Reference, active};
use crate::labware::{Labware, WellCoords};
use crate::units::{Coordinates, GEOMETRY_EPSILON, whole_mm};

impl VirtualLiquidHandler {
    /// Position the channels of a head over wells.
    ///
    /// An independent head moves only the addressed channels. A non-independent head moves as a
    /// rigid body, so the addressed positions must agree on a single head origin.
    pub(super) fn move_head(&mut self, mv: &Move, report: &mut Report) {
        if !self.check_head(mv.head, report) {
            return;
        }
        let addressed: Vec<usize> = active(&mv.targets).map(|(ch, _)| ch).collect();
        if !self.check_channels(mv.head, &addressed, report) {
            return;
        }

        let mut positions: Vec<(usize, Coordinates, WellCoords)> = Vec::new();
        for (ch, target) in active(&mv.targets) {
            let Some(resolved) = self.resolve(&target.location, &target.well, report) else {
                continue;
            };
            self.check_labware_type(&target.location, &target.labware_type, report);
            if let Some(anchor) = self.anchor(&resolved, target.reference) {
                positions.push((ch, anchor + target.offset, resolved.well));
            }
        }

        if report.has_errors() {
            return;
        }

        let head = &self.heads[mv.head];
        if head.is_independent() {
            let head = &mut self.heads[mv.head];
            for &(ch, position, _) in &positions {
                if let Some(channel) = head.channel_mut(ch) {
                    channel.position = Some(position);
                }
            }
            debug!(head = mv.head, channels = %join(&addressed), "independent head moved");
            return;
        }

        let Some(&(first, first_position, _)) = positions.first() else {
            return;
        };
        let origin = head.implied_origin(first_position, first);
        let deviations: Vec<(usize, f64)> = positions
            .iter()
            .map(|&(ch, p, _)| (ch, head.implied_origin(p, ch).distance(origin)))
            .filter(|&(_, d)| d > self.config.layout_tolerance_mm + GEOMETRY_EPSILON)
            .collect();

        if !deviations.is_empty() {
            let labware_type = active(&mv.targets)
                .map(|(_, t)| t.labware_type.as_str())
                .find(|t| !t.is_empty())
                .or_else(|| {
                    active(&mv.targets)
                        .next()
                        .and_then(|(_, t)| self.deck.lookup(&t.location))
                        .map(Labware::type_name)
                })
                .unwrap_or_default();

            report.err_bare(format!(
                "Non-independent head {} can't move adaptors to \"{labware_type}\" positions {}, layout mismatch: channels {} deviate by {} mm",
                mv.head,
                join(positions.iter().map(|(_, _, wc)| wc)),
                join(deviations.iter().map(|(ch, _)| ch)),
                join(deviations.iter().map(|(_, d)| whole_mm(*d))),
            ));
            return;
        }

        self.heads[mv.head].move_rigid(origin);
        debug!(head = mv.head, origin = %origin, "non-independent head moved");
    }

    /// Absolute position of the `reference` point of a resolved well.
    pub(super) fn anchor(&self, target: &Target, reference: Reference) -> Option<Coordinates> {
        let slot = self.deck.slot(&target.location)?;
        let labware = slot.occupant.as_ref()?;
        let grid = labware.grid();
        let bottom = slot.spec.origin + grid.well_bottom(target.well);
        let depth = grid.well_size.z;

        let rise = match reference {
            Reference::Bottom => 0.0,
            Reference::Top => depth,
            Reference::LiquidLevel => match labware {
                Labware::Plate(plate) if plate.max_volume.as_ul() > 0.0 => {
                    let volume = plate.well(target.well).map_or(0.0, |w| w.volume().as_ul());
                    depth * (volume / plate.max_volume.as_ul()).clamp(0.0, 1.0)
                }
                _ => 0.0,
            },
        };

        Some(bottom + Coordinates::new(0.0, 0.0, rise))
    }
}
