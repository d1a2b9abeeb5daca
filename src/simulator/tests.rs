use super::*;
use crate::adaptor::HeadSpec;
use crate::instruction::{
    ChannelMix, ChannelTransfer, LoadTips, Mix, Move, MoveTarget, Reference, TipLocation,
    Transfer, UnloadTips,
};
use crate::labware::{LabwareCatalog, Tip};
use crate::liquid::{Composition, Liquid};
use crate::units::{Coordinates, Volume};

const CHANNELS: usize = 8;

fn render(diagnostics: &[Diagnostic]) -> Vec<String> {
    diagnostics.iter().map(ToString::to_string).collect()
}

fn run(vlh: &mut VirtualLiquidHandler, instructions: Vec<Instruction>) -> Vec<String> {
    render(vlh.run(instructions))
}

fn add(location: &str, type_name: &str, name: &str) -> Instruction {
    let labware = LabwareCatalog::standard()
        .instantiate(type_name, name)
        .unwrap();
    Instruction::AddPlateTo(AddPlateTo {
        location: location.to_string(),
        labware,
    })
}

/// An initialized standard device with tipboxes, plates and a tipwaste in place.
fn test_layout() -> VirtualLiquidHandler {
    let mut vlh =
        VirtualLiquidHandler::new(DeviceProperties::standard(), SimulatorConfig::default())
            .unwrap();
    let errors = run(
        &mut vlh,
        vec![
            Instruction::Initialize,
            add("tipbox_1", "tipbox", "tipbox1"),
            add("tipbox_2", "tipbox", "tipbox2"),
            add("input_1", "plate", "plate1"),
            add("input_2", "plate", "plate2"),
            add("output_1", "plate", "plate3"),
            add("tipwaste", "tipwaste", "tipwaste"),
        ],
    );
    assert!(errors.is_empty(), "{errors:?}");
    vlh
}

/// Put fresh tips straight onto channels, optionally holding liquid.
fn preload_tips(vlh: &mut VirtualLiquidHandler, channels: &[usize], contents: Option<(&str, f64)>) {
    let spec = vlh.tipbox("tipbox_1").unwrap().tip.clone();
    for &ch in channels {
        let mut tip = Tip::new(spec.clone());
        if let Some((liquid, volume)) = contents {
            tip.contents = Liquid::new(Volume::ul(volume), liquid);
        }
        vlh.heads[0].channel_mut(ch).unwrap().tip = Some(tip);
    }
}

fn prefill(vlh: &mut VirtualLiquidHandler, location: &str, wells: &[&str], liquid: &str, volume: f64) {
    let plate = vlh
        .deck
        .lookup_mut(location)
        .and_then(Labware::as_plate_mut)
        .unwrap();
    for well in wells {
        plate
            .fill(
                WellCoords::parse(well).unwrap(),
                &Liquid::new(Volume::ul(volume), liquid),
            )
            .unwrap();
    }
}

fn remove_tips_except(vlh: &mut VirtualLiquidHandler, location: &str, keep: &[&str]) {
    let keep: Vec<WellCoords> = keep.iter().map(|w| WellCoords::parse(w).unwrap()).collect();
    vlh.deck
        .lookup_mut(location)
        .and_then(Labware::as_tipbox_mut)
        .unwrap()
        .clear_except(&keep);
}

fn labware_type(location: &str) -> &'static str {
    if location.starts_with("tipbox") {
        "tipbox"
    } else if location == "tipwaste" {
        "tipwaste"
    } else {
        "plate"
    }
}

fn target(location: &str, well: &str, reference: Reference, offset: Coordinates) -> MoveTarget {
    MoveTarget {
        location: location.to_string(),
        well: well.to_string(),
        reference,
        offset,
        labware_type: labware_type(location).to_string(),
    }
}

/// Move head 0 so that channel `i` goes to `wells[i]`; empty strings leave a channel out.
fn move_to(location: &str, wells: &[&str], reference: Reference, z: f64) -> Instruction {
    let targets = wells
        .iter()
        .map(|w| {
            (!w.is_empty()).then(|| target(location, w, reference, Coordinates::new(0.0, 0.0, z)))
        })
        .collect();
    Instruction::Move(Move { head: 0, targets })
}

/// Move every channel of head 0 over the tipwaste.
fn move_to_tipwaste() -> Instruction {
    let targets = (0..CHANNELS)
        .map(|i| {
            let y = -31.5 + 9.0 * i as f64;
            Some(target("tipwaste", "A1", Reference::Top, Coordinates::new(0.0, y, 5.0)))
        })
        .collect();
    Instruction::Move(Move { head: 0, targets })
}

fn tip_locations(location: &str, wells: &[&str]) -> Vec<TipLocation> {
    wells
        .iter()
        .map(|w| TipLocation {
            location: location.to_string(),
            well: w.to_string(),
            labware_type: labware_type(location).to_string(),
        })
        .collect()
}

fn load(channels: &[usize], location: &str, wells: &[&str]) -> Instruction {
    Instruction::LoadTips(LoadTips {
        head: 0,
        multi: channels.len(),
        channels: channels.to_vec(),
        sources: tip_locations(location, wells),
    })
}

fn unload(channels: &[usize], location: &str, wells: &[&str]) -> Instruction {
    Instruction::UnloadTips(UnloadTips {
        head: 0,
        multi: channels.len(),
        channels: channels.to_vec(),
        destinations: tip_locations(location, wells),
    })
}

/// Per-channel volumes for head 0; a zero volume leaves the channel out.
fn transfer(volumes: &[f64], liquid: &str) -> Transfer {
    let channels: Vec<_> = volumes
        .iter()
        .map(|&v| {
            (v != 0.0).then(|| ChannelTransfer {
                volume: Volume::ul(v),
                liquid: Composition::parse(liquid),
                labware_type: "plate".to_string(),
                overstroke: false,
                blowout: false,
                llf: false,
            })
        })
        .collect();
    Transfer {
        head: 0,
        multi: channels.iter().flatten().count(),
        channels,
    }
}

fn mix(volumes: &[f64], cycles: &[u32], plate_type: &str) -> Instruction {
    let channels: Vec<_> = volumes
        .iter()
        .zip(cycles)
        .map(|(&v, &c)| {
            (v != 0.0).then(|| ChannelMix {
                volume: Volume::ul(v),
                cycles: c,
                labware_type: plate_type.to_string(),
                liquid: Composition::of("water"),
                blowout: false,
            })
        })
        .collect();
    Instruction::Mix(Mix {
        head: 0,
        multi: channels.iter().flatten().count(),
        channels,
    })
}

const COLUMN_1: [&str; 8] = ["A1", "B1", "C1", "D1", "E1", "F1", "G1", "H1"];

fn single(well: &'static str) -> [&'static str; 8] {
    [well, "", "", "", "", "", "", ""]
}

fn well_volume(vlh: &VirtualLiquidHandler, location: &str, well: &str) -> Volume {
    vlh.well(location, well).unwrap().volume()
}

fn tip(vlh: &VirtualLiquidHandler, ch: usize) -> &Tip {
    vlh.channel(0, ch).unwrap().tip.as_ref().unwrap()
}

// Lifecycle ##########################################################################

#[test]
fn test_construction_warnings() {
    let mut props = DeviceProperties::standard();
    props.preferences.tips.push("undefined_tip_pref".to_string());
    props.preferences.waste.clear();

    let vlh = VirtualLiquidHandler::new(props, SimulatorConfig::default()).unwrap();
    assert_eq!(
        render(vlh.diagnostics()),
        vec![
            "(warn) NewVirtualLiquidHandler: Undefined location \"undefined_tip_pref\" referenced in tip preferences",
            "(warn) NewVirtualLiquidHandler: No waste preferences specified",
        ]
    );
}

#[test]
fn test_construction_rejects_headless_device() {
    let mut props = DeviceProperties::standard();
    props.heads.clear();
    assert!(matches!(
        VirtualLiquidHandler::new(props, SimulatorConfig::default()),
        Err(PropertiesError::NoHeads)
    ));
}

#[test]
fn test_lifecycle_is_linear() {
    let mut vlh =
        VirtualLiquidHandler::new(DeviceProperties::standard(), SimulatorConfig::default())
            .unwrap();
    assert_eq!(vlh.lifecycle(), Lifecycle::Uninitialized);

    assert_eq!(
        run(&mut vlh, vec![move_to("input_1", &single("A1"), Reference::Bottom, 1.0)]),
        vec!["(err) Move: Instruction issued before Initialize"]
    );

    assert!(run(&mut vlh, vec![Instruction::Initialize]).is_empty());
    assert_eq!(vlh.lifecycle(), Lifecycle::Initialized);
    assert_eq!(
        run(&mut vlh, vec![Instruction::Initialize]),
        vec!["(err) Initialize: Device is already initialized"]
    );

    assert!(run(&mut vlh, vec![add("input_1", "plate", "plate1")]).is_empty());
    assert_eq!(vlh.lifecycle(), Lifecycle::Running);

    assert!(run(&mut vlh, vec![Instruction::Finalize]).is_empty());
    assert_eq!(vlh.lifecycle(), Lifecycle::Finalized);
    assert_eq!(
        run(&mut vlh, vec![Instruction::Finalize, add("input_2", "plate", "plate2")]),
        vec![
            "(err) Finalize: Instruction issued after Finalize",
            "(err) AddPlateTo: Instruction issued after Finalize",
        ]
    );
    assert!(vlh.lookup("input_2").is_none());
}

#[test]
fn test_finalize_warns_about_loaded_tips() {
    let mut vlh = test_layout();
    preload_tips(&mut vlh, &[0], None);
    assert_eq!(
        run(&mut vlh, vec![Instruction::Finalize]),
        vec!["(warn) Finalize: Head 0 channel 0 still has a tip loaded"]
    );
}

#[test]
fn test_state_machine_polling() {
    let mut vlh =
        VirtualLiquidHandler::new(DeviceProperties::standard(), SimulatorConfig::default())
            .unwrap();
    vlh.process_input(Instruction::Finalize);
    vlh.process_input(Instruction::Initialize);
    vlh.process_input(Instruction::Initialize);

    let polled: Vec<String> = std::iter::from_fn(|| vlh.poll_output())
        .map(|d| d.to_string())
        .collect();
    assert_eq!(
        polled,
        vec![
            "(err) Finalize: Instruction issued before Initialize",
            "(err) Initialize: Device is already initialized",
        ]
    );
    assert!(vlh.poll_output().is_none());
}

// AddPlateTo #########################################################################

#[test]
fn test_add_plate_errors() {
    let mut vlh = test_layout();
    assert_eq!(
        run(
            &mut vlh,
            vec![
                add("ruritania", "tipbox", "aTipbox"),
                add("tipbox_1", "tipbox", "p1"),
                add("tipwaste", "tipbox", "tipbox"),
                add("input_2", "tipwaste", "tipwaste2"),
            ]
        ),
        vec![
            "(err) AddPlateTo: Cannot put tipbox \"aTipbox\" at unknown slot \"ruritania\"",
            "(err) AddPlateTo: Couldn't add tipbox \"p1\" to location \"tipbox_1\" which already contains tipbox \"tipbox1\"",
            "(err) AddPlateTo: Slot \"tipwaste\" can't accept tipbox \"tipbox\", only tipwaste allowed",
            "(err) AddPlateTo: Slot \"input_2\" can't accept tipwaste \"tipwaste2\", only plate allowed",
        ]
    );
}

// Move ###############################################################################

#[test]
fn test_move_positions_rigid_head() {
    let mut vlh = test_layout();
    assert!(run(&mut vlh, vec![move_to("input_1", &single("A1"), Reference::Bottom, 1.0)]).is_empty());

    let a1 = vlh.deck.well_bottom("input_1", WellCoords::parse("A1").unwrap()).unwrap();
    let h1 = vlh.deck.well_bottom("input_1", WellCoords::parse("H1").unwrap()).unwrap();
    let ch0 = vlh.channel(0, 0).unwrap().position.unwrap();
    let ch7 = vlh.channel(0, 7).unwrap().position.unwrap();

    assert!(ch0.distance(a1 + Coordinates::new(0.0, 0.0, 1.0)) < 1e-9);
    assert!(ch7.distance(h1 + Coordinates::new(0.0, 0.0, 1.0)) < 1e-9);
}

#[test]
fn test_move_independent_head_moves_only_addressed_channels() {
    let mut props = DeviceProperties::standard();
    props.heads = vec![HeadSpec::new(8, true)];
    let mut vlh = VirtualLiquidHandler::new(props, SimulatorConfig::default()).unwrap();
    run(&mut vlh, vec![Instruction::Initialize, add("input_1", "plate", "plate1")]);

    let wells = ["A1", "", "", "C5", "", "", "", ""];
    assert!(run(&mut vlh, vec![move_to("input_1", &wells, Reference::Top, 0.0)]).is_empty());

    let positioned: Vec<usize> = (0..8)
        .filter(|&ch| vlh.channel(0, ch).unwrap().position.is_some())
        .collect();
    assert_eq!(positioned, vec![0, 3]);
}

#[test]
fn test_move_lookup_errors() {
    let mut vlh = test_layout();
    let everywhere = |location: &str| move_to(location, &COLUMN_1, Reference::Top, 0.0);

    let mut wrong_type = target("tipbox_1", "A1", Reference::Top, Coordinates::ORIGIN);
    wrong_type.labware_type = "tipwaste".to_string();
    let mut wells = COLUMN_1.map(|w| Some(target("tipbox_1", w, Reference::Top, Coordinates::ORIGIN)));
    wells[0] = Some(wrong_type);

    assert_eq!(
        run(
            &mut vlh,
            vec![
                everywhere("tipbox7"),
                Instruction::Move(Move {
                    head: 1,
                    targets: vec![None; 8]
                }),
                Instruction::Move(Move {
                    head: 0,
                    targets: wells.to_vec()
                }),
                move_to("tipbox_1", &single("I1"), Reference::Top, 0.0),
                move_to("tipbox_1", &single("not_a_well"), Reference::Top, 0.0),
            ]
        ),
        vec![
            "(err) Move: Unknown location \"tipbox7\"",
            "(err) Move: Unknown head 1",
            "(warn) Move: Object found at tipbox_1 was type \"tipbox\" not type \"tipwaste\" as expected",
            "(err) Move: Request for well I1 in object \"tipbox1\" at \"tipbox_1\" which is of size [8x12]",
            "(err) Move: Couldn't parse well \"not_a_well\"",
        ]
    );
}

#[test]
fn test_move_layout_mismatch() {
    let mut vlh = test_layout();
    let staggered = ["A1", "B2", "C1", "D2", "E1", "F2", "G1", "H2"];
    assert_eq!(
        run(&mut vlh, vec![move_to("tipbox_1", &staggered, Reference::Top, 0.0)]),
        vec![
            "(err) Move: Non-independent head 0 can't move adaptors to \"tipbox\" positions A1,B2,C1,D2,E1,F2,G1,H2, layout mismatch: channels 1,3,5,7 deviate by 9,9,9,9 mm"
        ]
    );
    assert!(vlh.channel(0, 0).unwrap().position.is_none());
}

#[test]
fn test_move_inconsistent_references() {
    let mut vlh = test_layout();
    let targets = COLUMN_1
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let reference = if i < 4 { Reference::Bottom } else { Reference::Top };
            Some(target("input_1", w, reference, Coordinates::new(0.0, 0.0, -5.0)))
        })
        .collect();

    assert_eq!(
        run(&mut vlh, vec![Instruction::Move(Move { head: 0, targets })]),
        vec![
            "(err) Move: Non-independent head 0 can't move adaptors to \"plate\" positions A1,B1,C1,D1,E1,F1,G1,H1, layout mismatch: channels 4,5,6,7 deviate by 11,11,11,11 mm"
        ]
    );
}

#[test]
fn test_move_to_liquid_level() {
    let mut vlh = test_layout();
    prefill(&mut vlh, "input_1", &["A1"], "water", 100.0);
    run(&mut vlh, vec![move_to("input_1", &single("A1"), Reference::LiquidLevel, 0.0)]);

    let z = vlh.channel(0, 0).unwrap().position.unwrap().z;
    assert!((z - (1.0 + 11.0 * 0.5)).abs() < 1e-9);
}

// LoadTips ###########################################################################

#[test]
fn test_load_single_tip() {
    let mut vlh = test_layout();
    let diagnostics = run(
        &mut vlh,
        vec![
            move_to("tipbox_1", &single("H12"), Reference::Top, 5.0),
            load(&[0], "tipbox_1", &["H12"]),
        ],
    );
    assert!(diagnostics.is_empty(), "{diagnostics:?}");

    let tipbox = vlh.tipbox("tipbox_1").unwrap();
    assert!(!tipbox.has_tip(WellCoords::parse("H12").unwrap()));
    assert_eq!(tipbox.tip_count(), 95);
    assert!(tip(&vlh, 0).volume().is_zero());
    assert!(!vlh.channel(0, 1).unwrap().has_tip());
}

#[test]
fn test_load_eight_tips() {
    let mut vlh = test_layout();
    let diagnostics = run(
        &mut vlh,
        vec![
            move_to("tipbox_1", &COLUMN_1, Reference::Top, 5.0),
            load(&[0, 1, 2, 3, 4, 5, 6, 7], "tipbox_1", &COLUMN_1),
        ],
    );
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    assert_eq!(vlh.head(0).unwrap().tipped(), vec![0, 1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(vlh.tipbox("tipbox_1").unwrap().tip_count(), 88);
}

#[test]
fn test_load_structural_errors() {
    let mut vlh = test_layout();
    let bad_head = LoadTips {
        head: 1,
        multi: 1,
        channels: vec![0],
        sources: tip_locations("tipbox_1", &["H12"]),
    };
    let bad_multi = LoadTips {
        head: 0,
        multi: 4,
        ..bad_head.clone()
    };

    assert_eq!(
        run(
            &mut vlh,
            vec![
                load(&[8], "tipbox_1", &["H12"]),
                load(&[3, 3], "tipbox_1", &["G12", "H12"]),
                Instruction::LoadTips(bad_head),
                Instruction::LoadTips(bad_multi),
                load(&[0], "tipbox_1", &["H12"]),
            ]
        ),
        vec![
            "(err) LoadTips: Unknown channel \"8\"",
            "(err) LoadTips: channel 3 appears more than once",
            "(err) LoadTips: Unknown head 1",
            "(err) LoadTips: While loading tip to channel 0, multi should equal 1, not 4",
            "(err) LoadTips: Channel 0 has not been moved to a position",
        ]
    );
}

#[test]
fn test_load_onto_tipped_channel() {
    let mut vlh = test_layout();
    preload_tips(&mut vlh, &[0], None);
    assert_eq!(
        run(
            &mut vlh,
            vec![
                move_to("tipbox_1", &single("H12"), Reference::Top, 5.0),
                load(&[0], "tipbox_1", &["H12"]),
            ]
        ),
        vec!["(err) LoadTips: Cannot load tips to Head0 when channel 0 already has a tip loaded"]
    );
    assert_eq!(vlh.tipbox("tipbox_1").unwrap().tip_count(), 96);
}

#[test]
fn test_load_missing_tip() {
    let mut vlh = test_layout();
    remove_tips_except(&mut vlh, "tipbox_1", &[]);
    assert_eq!(
        run(
            &mut vlh,
            vec![
                move_to("tipbox_1", &single("H12"), Reference::Top, 5.0),
                load(&[0], "tipbox_1", &["H12"]),
            ]
        ),
        vec!["(err) LoadTips: Cannot load to channel 0 as no tip at H12 in tipbox \"tipbox1\""]
    );
}

#[test]
fn test_load_collision_on_rigid_head() {
    let mut vlh = test_layout();
    assert_eq!(
        run(
            &mut vlh,
            vec![
                move_to("tipbox_1", &single("G12"), Reference::Top, 5.0),
                load(&[0], "tipbox_1", &["G12"]),
            ]
        ),
        vec![
            "(err) LoadTips: Cannot load G12->channel0, channel 1 collides with tip \"H12@tipbox1\" (Head0 not independent)"
        ]
    );
    assert!(!vlh.channel(0, 0).unwrap().has_tip());
}

#[test]
fn test_load_misaligned_single() {
    let mut vlh = test_layout();
    remove_tips_except(&mut vlh, "tipbox_1", &["E12"]);
    assert_eq!(
        run(
            &mut vlh,
            vec![
                move_to("tipbox_1", &single("F12"), Reference::Top, 5.0),
                load(&[0], "tipbox_1", &["E12"]),
            ]
        ),
        vec!["(err) LoadTips: Channel 0 is misaligned with tip at E12 by 9mm"]
    );
}

#[test]
fn test_load_misaligned_batched() {
    let mut vlh = test_layout();
    remove_tips_except(&mut vlh, "tipbox_1", &["F12", "G12", "H12"]);
    let shifted = Instruction::Move(Move {
        head: 0,
        targets: vec![Some(target(
            "tipbox_1",
            "F12",
            Reference::Top,
            Coordinates::new(0.0, 2.0, 5.0),
        ))],
    });
    assert_eq!(
        run(
            &mut vlh,
            vec![shifted, load(&[0, 1, 2], "tipbox_1", &["F12", "G12", "H12"])]
        ),
        vec![
            "(err) LoadTips: Channels 0,1,2 are misaligned with tips at F12,G12,H12 by 2,2,2 mm respectively"
        ]
    );
    assert_eq!(vlh.tipbox("tipbox_1").unwrap().tip_count(), 3);
}

// UnloadTips #########################################################################

#[test]
fn test_unload_to_tipwaste() {
    let mut vlh = test_layout();
    preload_tips(&mut vlh, &[0, 1, 2, 3, 4, 5, 6, 7], None);
    let diagnostics = run(
        &mut vlh,
        vec![
            move_to_tipwaste(),
            unload(&[0, 1, 2, 3, 4, 5, 6, 7], "tipwaste", &["A1"; 8]),
        ],
    );
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    assert_eq!(vlh.tipwaste("tipwaste").unwrap().count(), 8);
    assert!(vlh.head(0).unwrap().tipped().is_empty());
}

#[test]
fn test_unload_partial_rigid_head() {
    let mut vlh = test_layout();
    preload_tips(&mut vlh, &[0, 1, 2, 3, 4, 5, 6, 7], None);
    assert_eq!(
        run(
            &mut vlh,
            vec![move_to_tipwaste(), unload(&[0, 2, 4, 6], "tipwaste", &["A1"; 4])]
        ),
        vec![
            "(err) UnloadTips: Cannot unload tips from head0 channels 0,2,4,6 without unloading tips from channels 1,3,5,7 (head isn't independent)"
        ]
    );
    assert_eq!(vlh.tipwaste("tipwaste").unwrap().count(), 0);
}

#[test]
fn test_unload_to_wrong_places() {
    let mut vlh = test_layout();
    preload_tips(&mut vlh, &[0], None);
    run(&mut vlh, vec![move_to("input_1", &single("A1"), Reference::Top, 5.0)]);
    assert_eq!(
        run(
            &mut vlh,
            vec![
                unload(&[0], "input_1", &["A1"]),
                unload(&[0], "tipwaste", &["B1"]),
            ]
        ),
        vec![
            "(err) UnloadTips: Cannot unload tips to plate \"plate1\" at location input_1",
            "(err) UnloadTips: Cannot unload to address B1 in tipwaste \"tipwaste\" size [1x1]",
        ]
    );
    assert!(vlh.channel(0, 0).unwrap().has_tip());
}

#[test]
fn test_return_tip_with_contents_warns() {
    let mut vlh = test_layout();
    remove_tips_except(&mut vlh, "tipbox_1", &[]);
    preload_tips(&mut vlh, &[0], Some(("water", 20.0)));
    assert_eq!(
        run(
            &mut vlh,
            vec![
                move_to("tipbox_1", &single("H12"), Reference::Top, 5.0),
                unload(&[0], "tipbox_1", &["H12"]),
            ]
        ),
        vec![
            "(warn) UnloadTips: Returning tip holding 20ul of water on channel 0 to tipbox \"tipbox1\""
        ]
    );
    assert_eq!(vlh.tipbox("tipbox_1").unwrap().tip_count(), 1);
}

#[test]
fn test_reloaded_tip_starts_empty() {
    let mut vlh = test_layout();
    remove_tips_except(&mut vlh, "tipbox_1", &[]);
    preload_tips(&mut vlh, &[0], Some(("water", 100.0)));
    assert_eq!(
        run(
            &mut vlh,
            vec![
                move_to("tipbox_1", &single("H12"), Reference::Top, 5.0),
                unload(&[0], "tipbox_1", &["H12"]),
                load(&[0], "tipbox_1", &["H12"]),
            ]
        ),
        vec![
            "(warn) UnloadTips: Returning tip holding 100ul of water on channel 0 to tipbox \"tipbox1\""
        ]
    );
    assert!(tip(&vlh, 0).volume().is_zero());
    assert!(tip(&vlh, 0).contents.composition.is_empty());
    assert_eq!(vlh.tipbox("tipbox_1").unwrap().tip_count(), 0);
}

#[test]
fn test_tip_conservation() {
    let mut vlh = test_layout();
    let census = vlh.tip_census();
    assert_eq!(census, 192);

    let diagnostics = run(
        &mut vlh,
        vec![
            move_to("tipbox_1", &COLUMN_1, Reference::Top, 5.0),
            load(&[0, 1, 2, 3, 4, 5, 6, 7], "tipbox_1", &COLUMN_1),
            move_to_tipwaste(),
            unload(&[0, 1, 2, 3, 4, 5, 6, 7], "tipwaste", &["A1"; 8]),
            move_to("tipbox_1", &single("H12"), Reference::Top, 5.0),
            load(&[0], "tipbox_1", &["H12"]),
            move_to("tipbox_1", &single("A1"), Reference::Top, 5.0),
            unload(&[0], "tipbox_1", &["A1"]),
        ],
    );
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    assert_eq!(vlh.tip_census(), census);
    assert_eq!(vlh.tipwaste("tipwaste").unwrap().count(), 8);
    assert_eq!(vlh.tipbox("tipbox_1").unwrap().tip_count(), 88);
    assert!(vlh.tipbox("tipbox_1").unwrap().has_tip(WellCoords::new(0, 0)));
}

// Aspirate ###########################################################################

#[test]
fn test_aspirate_single_channel() {
    let mut vlh = test_layout();
    preload_tips(&mut vlh, &[0], None);
    prefill(&mut vlh, "input_1", &["A1"], "water", 200.0);

    let diagnostics = run(
        &mut vlh,
        vec![
            move_to("input_1", &single("A1"), Reference::Bottom, 1.0),
            Instruction::Aspirate(transfer(&[100.0], "water")),
        ],
    );
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    assert_eq!(well_volume(&vlh, "input_1", "A1"), Volume::ul(100.0));
    assert_eq!(tip(&vlh, 0).volume(), Volume::ul(100.0));
    assert_eq!(tip(&vlh, 0).contents.composition.label(), "water");
}

#[test]
fn test_aspirate_channel_faults() {
    let mut vlh = test_layout();
    preload_tips(&mut vlh, &[0], None);
    prefill(&mut vlh, "input_1", &["A1", "B1"], "water", 200.0);

    assert_eq!(
        run(
            &mut vlh,
            vec![
                move_to("input_1", &single("A1"), Reference::Bottom, 1.0),
                Instruction::Aspirate(transfer(&[100.0, 100.0], "water")),
                move_to("input_1", &single("A1"), Reference::Top, 10.0),
                Instruction::Aspirate(transfer(&[100.0], "water")),
            ]
        ),
        vec![
            "(err) Aspirate: While aspirating 100ul of water to head 0 channels 0,1 - missing tip on channel 1",
            "(err) Aspirate: While aspirating 100ul of water to head 0 channel 0 - tip on channel 0 not in a well",
        ]
    );
    assert_eq!(well_volume(&vlh, "input_1", "A1"), Volume::ul(200.0));
}

#[test]
fn test_aspirate_volume_limits() {
    let mut vlh = test_layout();
    preload_tips(&mut vlh, &[0], Some(("water", 875.0)));
    prefill(&mut vlh, "input_1", &["A1"], "water", 200.0);

    assert_eq!(
        run(
            &mut vlh,
            vec![
                move_to("input_1", &single("A1"), Reference::Bottom, 1.0),
                Instruction::Aspirate(transfer(&[175.0], "water")),
            ]
        ),
        vec![
            "(err) Aspirate: While aspirating 175ul of water to head 0 channel 0 - channel 0 contains 875ul, command exceeds maximum volume 1000ul"
        ]
    );

    let mut vlh = test_layout();
    preload_tips(&mut vlh, &[0], None);
    prefill(&mut vlh, "input_1", &["A1"], "water", 200.0);
    assert_eq!(
        run(
            &mut vlh,
            vec![
                move_to("input_1", &single("A1"), Reference::Bottom, 1.0),
                Instruction::Aspirate(transfer(&[535.12135], "water")),
            ]
        ),
        vec![
            "(err) Aspirate: While aspirating 535.121ul of water to head 0 channel 0 - well A1@plate1 only contains 195ul working volume"
        ]
    );
    assert_eq!(well_volume(&vlh, "input_1", "A1"), Volume::ul(200.0));
}

#[test]
fn test_aspirate_below_minimum_still_applies() {
    let mut vlh = test_layout();
    preload_tips(&mut vlh, &[0], None);
    prefill(&mut vlh, "input_1", &["A1"], "water", 200.0);

    assert_eq!(
        run(
            &mut vlh,
            vec![
                move_to("input_1", &single("A1"), Reference::Bottom, 1.0),
                Instruction::Aspirate(transfer(&[20.0], "water")),
            ]
        ),
        vec![
            "(warn) Aspirate: While aspirating 20ul of water to head 0 channel 0 - minimum tip volume on channel 0 is 50ul"
        ]
    );
    assert_eq!(well_volume(&vlh, "input_1", "A1"), Volume::ul(180.0));
    assert_eq!(tip(&vlh, 0).volume(), Volume::ul(20.0));
}

#[test]
fn test_aspirate_wrong_liquid_warns() {
    let mut vlh = test_layout();
    preload_tips(&mut vlh, &[0], None);
    prefill(&mut vlh, "input_1", &["A1"], "water", 200.0);

    assert_eq!(
        run(
            &mut vlh,
            vec![
                move_to("input_1", &single("A1"), Reference::Bottom, 1.0),
                Instruction::Aspirate(transfer(&[102.1], "ethanol")),
            ]
        ),
        vec![
            "(warn) Aspirate: While aspirating 102.1ul of ethanol to head 0 channel 0 - well A1@plate1 contains water, not ethanol"
        ]
    );
    assert!(tip(&vlh, 0).volume().approx_eq(Volume::ul(102.1)));
    assert_eq!(tip(&vlh, 0).contents.composition.label(), "water");
}

#[test]
fn test_aspirate_unequal_volumes_on_rigid_head() {
    let mut vlh = test_layout();
    preload_tips(&mut vlh, &[0, 1, 2, 3, 4, 5, 6, 7], None);
    prefill(&mut vlh, "input_1", &COLUMN_1, "water", 200.0);

    assert_eq!(
        run(
            &mut vlh,
            vec![
                move_to("input_1", &COLUMN_1, Reference::Bottom, 1.0),
                Instruction::Aspirate(transfer(
                    &[50.0, 60.0, 50.0, 50.0, 50.0, 50.0, 50.0, 50.0],
                    "water"
                )),
            ]
        ),
        vec![
            "(err) Aspirate: While aspirating {50,60,50,50,50,50,50,50}ul of water to head 0 channels 0,1,2,3,4,5,6,7 - channels cannot aspirate different volumes in non-independent head"
        ]
    );
    for well in COLUMN_1 {
        assert_eq!(well_volume(&vlh, "input_1", well), Volume::ul(200.0));
    }
    assert!(tip(&vlh, 1).volume().is_zero());
}

#[test]
fn test_aspirate_inadvertently_from_neighbour() {
    let mut vlh = test_layout();
    preload_tips(&mut vlh, &[0, 1], None);
    prefill(&mut vlh, "input_1", &["A1", "B1"], "water", 200.0);

    assert_eq!(
        run(
            &mut vlh,
            vec![
                move_to("input_1", &single("A1"), Reference::Bottom, 1.0),
                Instruction::Aspirate(transfer(&[98.6], "water")),
            ]
        ),
        vec![
            "(err) Aspirate: While aspirating 98.6ul of water to head 0 channel 0 - channel 1 will inadvertently aspirate water from well B1@plate1 as head is not independent"
        ]
    );
    assert_eq!(well_volume(&vlh, "input_1", "A1"), Volume::ul(200.0));
}

#[test]
fn test_aspirate_negative_volume() {
    let mut vlh = test_layout();
    preload_tips(&mut vlh, &[0], None);
    prefill(&mut vlh, "input_1", &["A1"], "water", 100.0);

    assert_eq!(
        run(
            &mut vlh,
            vec![
                move_to("input_1", &single("A1"), Reference::Bottom, 1.0),
                Instruction::Aspirate(transfer(&[-50.0], "water")),
            ]
        ),
        vec![
            "(err) Aspirate: While aspirating -50ul of water to head 0 channel 0 - channel 0 cannot aspirate negative volume -50ul"
        ]
    );
    assert_eq!(well_volume(&vlh, "input_1", "A1"), Volume::ul(100.0));
    assert!(tip(&vlh, 0).volume().is_zero());
}

// Dispense ###########################################################################

#[test]
fn test_dispense_more_than_tip_holds() {
    let mut vlh = test_layout();
    preload_tips(&mut vlh, &[0], Some(("water", 100.0)));

    assert_eq!(
        run(
            &mut vlh,
            vec![
                move_to("input_1", &single("A1"), Reference::Bottom, 1.0),
                Instruction::Dispense(transfer(&[150.0], "water")),
            ]
        ),
        vec![
            "(err) Dispense: While dispensing 150ul from head 0 channel 0 - tip on channel 0 contains only 100ul working volume"
        ]
    );
    assert!(well_volume(&vlh, "input_1", "A1").is_zero());
    assert_eq!(tip(&vlh, 0).volume(), Volume::ul(100.0));
}

#[test]
fn test_dispense_mixes_labels() {
    let mut vlh = test_layout();
    preload_tips(&mut vlh, &[0], Some(("water", 100.0)));
    prefill(&mut vlh, "input_1", &["A1"], "green", 50.0);
    prefill(&mut vlh, "input_1", &["C1"], "water", 50.0);

    let diagnostics = run(
        &mut vlh,
        vec![
            move_to("input_1", &single("A1"), Reference::Bottom, 1.0),
            Instruction::Dispense(transfer(&[50.0], "water")),
            move_to("input_1", &single("C1"), Reference::Bottom, 1.0),
            Instruction::Dispense(transfer(&[50.0], "water")),
        ],
    );
    assert!(diagnostics.is_empty(), "{diagnostics:?}");

    let a1 = vlh.well("input_1", "A1").unwrap();
    assert_eq!(a1.volume(), Volume::ul(100.0));
    assert_eq!(a1.composition().label(), "green+water");

    let c1 = vlh.well("input_1", "C1").unwrap();
    assert_eq!(c1.volume(), Volume::ul(100.0));
    assert_eq!(c1.composition().label(), "water");
    assert!(tip(&vlh, 0).volume().is_zero());
}

#[test]
fn test_dispense_faults() {
    let mut vlh = test_layout();
    preload_tips(&mut vlh, &[1], Some(("water", 500.0)));

    assert_eq!(
        run(
            &mut vlh,
            vec![
                move_to("input_1", &single("A1"), Reference::Bottom, 1.0),
                Instruction::Dispense(transfer(&[50.0], "water")),
                move_to("input_1", &single("A1"), Reference::Top, 10.0),
                Instruction::Dispense(transfer(&[0.0, 50.0], "water")),
                move_to("input_1", &single("A1"), Reference::Bottom, 1.0),
                Instruction::Dispense(transfer(&[0.0, 500.0], "water")),
            ]
        ),
        vec![
            "(err) Dispense: While dispensing 50ul from head 0 channel 0 - no tip loaded on channel 0",
            "(err) Dispense: While dispensing 50ul from head 0 channel 0 - must also dispense 50ul from channel 1 as head is not independent",
            "(err) Dispense: While dispensing 50ul from head 0 channel 1 - no well within 5mm below tip on channel 1",
            "(err) Dispense: While dispensing 500ul from head 0 channel 1 - well B1@plate1 under channel 1 contains 0ul, command would exceed maximum volume 200ul",
        ]
    );
    assert_eq!(tip(&vlh, 1).volume(), Volume::ul(500.0));
}

#[test]
fn test_dispense_must_include_coupled_channels() {
    let mut vlh = test_layout();
    preload_tips(&mut vlh, &[0, 1, 2, 3, 4, 5, 6, 7], Some(("water", 100.0)));

    assert_eq!(
        run(
            &mut vlh,
            vec![
                move_to("input_1", &COLUMN_1, Reference::Bottom, 1.0),
                Instruction::Dispense(transfer(&[50.0], "water")),
                Instruction::Dispense(transfer(
                    &[50.0, 60.0, 50.0, 50.0, 50.0, 50.0, 50.0, 50.0],
                    "water"
                )),
            ]
        ),
        vec![
            "(err) Dispense: While dispensing 50ul from head 0 channel 0 - must also dispense 50ul from channels 1,2,3,4,5,6,7 as head is not independent",
            "(err) Dispense: While dispensing {50,60,50,50,50,50,50,50}ul from head 0 channels 0,1,2,3,4,5,6,7 - channels cannot dispense different volumes in non-independent head",
        ]
    );
    assert!(well_volume(&vlh, "input_1", "A1").is_zero());
}

#[test]
fn test_dispense_to_tipwaste_warns() {
    let mut vlh = test_layout();
    preload_tips(&mut vlh, &[0], Some(("water", 100.0)));

    assert_eq!(
        run(
            &mut vlh,
            vec![
                move_to_tipwaste(),
                Instruction::Dispense(transfer(&[50.0], "water")),
            ]
        ),
        vec!["(warn) Dispense: While dispensing 50ul from head 0 channel 0 - dispensing to tipwaste"]
    );
    assert_eq!(tip(&vlh, 0).volume(), Volume::ul(50.0));
}

#[test]
fn test_volume_conservation() {
    let mut vlh = test_layout();
    preload_tips(&mut vlh, &[0], None);
    prefill(&mut vlh, "input_1", &["A1"], "water", 150.0);

    let diagnostics = run(
        &mut vlh,
        vec![
            move_to("input_1", &single("A1"), Reference::Bottom, 1.0),
            Instruction::Aspirate(transfer(&[60.0], "water")),
            move_to("input_1", &single("B1"), Reference::Bottom, 1.0),
            Instruction::Dispense(transfer(&[60.0], "water")),
        ],
    );
    assert!(diagnostics.is_empty(), "{diagnostics:?}");

    let total = vlh.plate("input_1").unwrap().total_volume() + tip(&vlh, 0).volume();
    assert!(total.approx_eq(Volume::ul(150.0)));
    assert_eq!(well_volume(&vlh, "input_1", "A1"), Volume::ul(90.0));
    assert_eq!(well_volume(&vlh, "input_1", "B1"), Volume::ul(60.0));
    assert_eq!(vlh.well("input_1", "B1").unwrap().composition().label(), "water");
}

#[test]
fn test_dispense_negative_volume() {
    let mut vlh = test_layout();
    preload_tips(&mut vlh, &[0], Some(("water", 100.0)));

    assert_eq!(
        run(
            &mut vlh,
            vec![
                move_to("input_1", &single("A1"), Reference::Bottom, 1.0),
                Instruction::Dispense(transfer(&[-50.0], "water")),
            ]
        ),
        vec![
            "(err) Dispense: While dispensing -50ul from head 0 channel 0 - channel 0 cannot dispense negative volume -50ul"
        ]
    );
    assert!(well_volume(&vlh, "input_1", "A1").is_zero());
    assert_eq!(tip(&vlh, 0).volume(), Volume::ul(100.0));
}

// Mix ################################################################################

#[test]
fn test_mix_leaves_volumes_and_labels_tip() {
    let mut vlh = test_layout();
    preload_tips(&mut vlh, &[0], None);
    prefill(&mut vlh, "input_1", &["A1"], "water", 200.0);

    let diagnostics = run(
        &mut vlh,
        vec![
            move_to("input_1", &single("A1"), Reference::Bottom, 1.0),
            mix(&[50.0], &[5], "plate"),
        ],
    );
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    assert_eq!(well_volume(&vlh, "input_1", "A1"), Volume::ul(200.0));
    assert!(tip(&vlh, 0).volume().is_zero());
    assert_eq!(tip(&vlh, 0).contents.composition.label(), "water");
}

#[test]
fn test_mix_independence_problems() {
    let mut vlh = test_layout();
    preload_tips(&mut vlh, &[0, 1, 2, 3, 4, 5, 6, 7], None);
    prefill(&mut vlh, "input_1", &COLUMN_1, "water", 200.0);

    let prefix = "While mixing {50,60,50,50,50,50,50,50}ul {5,5,5,5,5,2,2,2} times in wells A1,B1,C1,D1,E1,F1,G1,H1 of plate \"plate1\" - ";
    assert_eq!(
        run(
            &mut vlh,
            vec![
                move_to("input_1", &COLUMN_1, Reference::Bottom, 1.0),
                mix(
                    &[50.0, 60.0, 50.0, 50.0, 50.0, 50.0, 50.0, 50.0],
                    &[5, 5, 5, 5, 5, 2, 2, 2],
                    "plate"
                ),
            ]
        ),
        vec![
            format!("(err) Mix: {prefix}cannot manipulate different volumes with non-independent head"),
            format!("(err) Mix: {prefix}cannot vary number of mix cycles with non-independent head"),
        ]
    );
    assert!(tip(&vlh, 0).contents.composition.is_empty());
}

#[test]
fn test_mix_wrong_plate_type_warns() {
    let mut vlh = test_layout();
    preload_tips(&mut vlh, &[0], None);
    prefill(&mut vlh, "input_1", &["A1"], "water", 200.0);

    assert_eq!(
        run(
            &mut vlh,
            vec![
                move_to("input_1", &single("A1"), Reference::Bottom, 1.0),
                mix(&[50.0], &[5], "notaplate"),
            ]
        ),
        vec![
            "(warn) Mix: While mixing 50ul 5 times in well A1 of plate \"plate1\" - plate \"plate1\" is of type \"plate\", not \"notaplate\""
        ]
    );
    assert_eq!(tip(&vlh, 0).contents.composition.label(), "water");
}

#[test]
fn test_mix_negative_volume() {
    let mut vlh = test_layout();
    preload_tips(&mut vlh, &[0], None);
    prefill(&mut vlh, "input_1", &["A1"], "water", 200.0);

    assert_eq!(
        run(
            &mut vlh,
            vec![
                move_to("input_1", &single("A1"), Reference::Bottom, 1.0),
                mix(&[-50.0], &[5], "plate"),
            ]
        ),
        vec![
            "(err) Mix: While mixing -50ul 5 times in well A1 of plate \"plate1\" - channel 0 cannot mix negative volume -50ul"
        ]
    );
    assert!(tip(&vlh, 0).contents.composition.is_empty());
}

// Workflow ###########################################################################

const ROWS: [&str; 8] = ["A", "B", "C", "D", "E", "F", "G", "H"];

fn column(col: usize) -> Vec<String> {
    ROWS.iter().map(|row| format!("{row}{col}")).collect()
}

fn as_strs(wells: &[String]) -> Vec<&str> {
    wells.iter().map(String::as_str).collect()
}

/// One volume on every channel that names a liquid; empty names leave the channel out.
fn transfer_each(volume: f64, liquids: &[&str]) -> Transfer {
    let channels: Vec<_> = liquids
        .iter()
        .map(|liquid| {
            (!liquid.is_empty()).then(|| ChannelTransfer {
                volume: Volume::ul(volume),
                liquid: Composition::parse(liquid),
                labware_type: "plate".to_string(),
                overstroke: false,
                blowout: false,
                llf: false,
            })
        })
        .collect();
    Transfer {
        head: 0,
        multi: channels.iter().flatten().count(),
        channels,
    }
}

/// Aspirate from `from` near the well bottoms and dispense just above the `to` wells.
fn pipette(
    from: (&str, &[&str]),
    to: (&str, &[&str]),
    volume: f64,
    liquids: &[&str],
) -> Vec<Instruction> {
    vec![
        move_to(from.0, from.1, Reference::Bottom, 0.5),
        Instruction::Aspirate(transfer_each(volume, liquids)),
        move_to(to.0, to.1, Reference::Top, 1.0),
        Instruction::Dispense(transfer_each(volume, liquids)),
    ]
}

fn pick_up(wells: &[&str]) -> Vec<Instruction> {
    let channels: Vec<usize> = (0..wells.len()).collect();
    vec![
        move_to("tipbox_1", wells, Reference::Top, 5.0),
        load(&channels, "tipbox_1", wells),
    ]
}

fn drop_tips(channels: &[usize]) -> Vec<Instruction> {
    vec![
        move_to_tipwaste(),
        unload(channels, "tipwaste", &vec!["A1"; channels.len()]),
    ]
}

#[test]
fn test_gradient_workflow() {
    let mut vlh = test_layout();
    for (col, liquid) in [(1, "water"), (2, "red"), (3, "green"), (4, "water")] {
        prefill(&mut vlh, "input_1", &as_strs(&column(col)), liquid, 200.0);
    }
    let green: Vec<f64> = (0..8).map(|y: i32| f64::from(7 - y) / 7.0).collect();
    let red: Vec<f64> = (0..12).map(|x: i32| f64::from(11 - x) / 11.0).collect();
    let all: Vec<usize> = (0..CHANNELS).collect();
    let mut stream = Vec::new();

    // Green and water gradients down column 5, one channel at a time.
    stream.extend(pick_up(&["H12"]));
    for (y, &g) in green.iter().enumerate() {
        if g == 0.0 {
            continue;
        }
        let from = format!("{}3", ROWS[y]);
        let to = format!("{}5", ROWS[y]);
        stream.extend(pipette(
            ("input_1", &[from.as_str()]),
            ("input_1", &[to.as_str()]),
            195.0 * g,
            &["green"],
        ));
    }
    stream.extend(drop_tips(&[0]));
    stream.extend(pick_up(&["G12"]));
    for (y, &g) in green.iter().enumerate() {
        if 1.0 - g == 0.0 {
            continue;
        }
        let from = format!("{}4", ROWS[y]);
        let to = format!("{}5", ROWS[y]);
        stream.extend(pipette(
            ("input_1", &[from.as_str()]),
            ("input_1", &[to.as_str()]),
            195.0 * (1.0 - g),
            &["water"],
        ));
    }
    stream.extend(drop_tips(&[0]));

    // Red gradient across the output plate.
    stream.extend(pick_up(&as_strs(&column(11))));
    for (x, &r) in red.iter().enumerate() {
        if r == 0.0 {
            continue;
        }
        stream.extend(pipette(
            ("input_1", &as_strs(&column(2))),
            ("output_1", &as_strs(&column(x + 1))),
            5.0 * r,
            &["red"; 8],
        ));
    }
    stream.extend(drop_tips(&all));

    // Green gradient into every output column.
    let mixed = [
        "green",
        "green+water",
        "green+water",
        "green+water",
        "green+water",
        "green+water",
        "green+water",
        "water",
    ];
    stream.extend(pick_up(&as_strs(&column(10))));
    for x in 0..12 {
        stream.extend(pipette(
            ("input_1", &as_strs(&column(5))),
            ("output_1", &as_strs(&column(x + 1))),
            5.0,
            &mixed,
        ));
    }
    stream.extend(drop_tips(&all));

    // Water up to 20ul.
    stream.extend(pick_up(&as_strs(&column(9))));
    for (x, &r) in red.iter().enumerate() {
        stream.extend(pipette(
            ("input_1", &as_strs(&column(1))),
            ("output_1", &as_strs(&column(x + 1))),
            10.0 + 5.0 * (1.0 - r),
            &["water"; 8],
        ));
    }
    stream.extend(drop_tips(&all));
    stream.push(Instruction::Finalize);

    vlh.run(stream);
    let errors: Vec<String> = vlh.errors().map(ToString::to_string).collect();
    assert!(errors.is_empty(), "{errors:?}");

    assert_eq!(vlh.tipwaste("tipwaste").unwrap().count(), 26);
    assert!(vlh.head(0).unwrap().tipped().is_empty());
    let tipbox = vlh.tipbox("tipbox_1").unwrap();
    assert_eq!(tipbox.tip_count(), 70);
    let used: Vec<String> = ["H12".to_string(), "G12".to_string()]
        .into_iter()
        .chain(column(11))
        .chain(column(10))
        .chain(column(9))
        .collect();
    for well in &used {
        assert!(!tipbox.has_tip(WellCoords::parse(well).unwrap()), "tip left at {well}");
    }

    let check = |location: &str, well: &str, label: &str, volume: f64| {
        let w = vlh.well(location, well).unwrap();
        assert!(
            w.volume().approx_eq(Volume::ul(volume)),
            "{well}@{location} holds {}, expected {volume}ul",
            w.volume()
        );
        assert_eq!(w.composition().label(), label, "{well}@{location}");
    };

    for (y, row) in ROWS.iter().enumerate() {
        let g = green[y];
        check("input_1", &format!("{row}1"), "water", 50.0);
        check("input_1", &format!("{row}2"), "red", 170.0);
        check("input_1", &format!("{row}3"), "green", 200.0 - 195.0 * g);
        check("input_1", &format!("{row}4"), "water", 200.0 - 195.0 * (1.0 - g));
        check("input_1", &format!("{row}5"), mixed[y], 135.0);

        for col in 1..=12 {
            let label = match (col, y) {
                (12, 7) => "water",
                (12, _) => "green+water",
                (_, 7) => "red+water",
                _ => "red+green+water",
            };
            check("output_1", &format!("{row}{col}"), label, 20.0);
        }
    }
}
