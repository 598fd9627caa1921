mod common;

use std::fs;

use common::{sandbox, write};
use hdlgrade::hdl::{ChipState, VisibilityError, VisibilityGate};

fn gate(root: &std::path::Path) -> VisibilityGate {
    VisibilityGate::new(root, "hdl", ["Bit", "PC", "RAM8"])
}

#[test]
fn hiding_is_idempotent() {
    let root = sandbox("hide");
    write(&root, "Bit.hdl", "CHIP Bit {}");
    write(&root, "PC.hdl", "CHIP PC {}");
    let gate = gate(&root);

    gate.hide_all().expect("hide");
    gate.hide_all().expect("hide again");

    assert_eq!(gate.state("Bit"), ChipState::Hidden);
    assert_eq!(gate.state("PC"), ChipState::Hidden);
    assert_eq!(gate.state("RAM8"), ChipState::Absent);
    assert!(gate.visible_chips().is_empty());

    let _ = fs::remove_dir_all(root);
}

#[test]
fn revealing_an_absent_chip_is_file_missing() {
    let root = sandbox("absent");
    let gate = gate(&root);
    assert!(matches!(
        gate.reveal("RAM8"),
        Err(VisibilityError::FileMissing(chip)) if chip == "RAM8"
    ));
    let _ = fs::remove_dir_all(root);
}

#[test]
fn dropping_the_guard_hides_the_chip() {
    let root = sandbox("guard");
    write(&root, "Bit.hdl", "CHIP Bit {}");
    let gate = gate(&root);
    gate.hide_all().expect("hide");

    {
        let revealed = gate.reveal("Bit").expect("reveal");
        assert_eq!(revealed.chip(), "Bit");
        assert!(revealed.path().is_file());
        assert_eq!(gate.visible_chips(), vec!["Bit"]);
    }
    assert_eq!(gate.state("Bit"), ChipState::Hidden);

    gate.reveal("Bit").expect("reveal").conceal().expect("conceal");
    gate.conceal("Bit").expect("conceal hidden chip");
    gate.conceal("RAM8").expect("conceal absent chip");
    assert_eq!(gate.state("Bit"), ChipState::Hidden);

    let _ = fs::remove_dir_all(root);
}

#[test]
fn only_one_chip_can_be_visible() {
    let root = sandbox("one");
    write(&root, "Bit.hdl", "CHIP Bit {}");
    write(&root, "PC.hdl", "CHIP PC {}");
    let gate = gate(&root);
    gate.hide_all().expect("hide");

    let revealed = gate.reveal("Bit").expect("reveal");
    match gate.reveal("PC") {
        Err(VisibilityError::AlreadyVisible { chip, visible }) => {
            assert_eq!(chip, "PC");
            assert_eq!(visible, "Bit");
        }
        other => panic!("expected AlreadyVisible, got {other:?}"),
    }
    drop(revealed);

    let revealed = gate.reveal("PC").expect("reveal after Bit was hidden");
    assert_eq!(gate.visible_chips(), vec!["PC"]);
    drop(revealed);

    let _ = fs::remove_dir_all(root);
}

#[test]
fn chips_outside_the_roster_are_only_revealed_from_hidden_form() {
    let root = sandbox("offroster");
    write(&root, "Helper.hdl", "CHIP Helper {}");
    let gate = gate(&root);
    gate.hide_all().expect("hide");

    assert!(matches!(
        gate.reveal("Helper"),
        Err(VisibilityError::FileMissing(chip)) if chip == "Helper"
    ));
    assert!(root.join("Helper.hdl").is_file());

    let _ = fs::remove_dir_all(root);
}
