mod common;

use std::fs;

use common::{sandbox, write};
use hdlgrade::hdl::{NormalizeIssue, find_containing_folder, flatten};

const ROSTER: &[&str] = &["Bit", "PC", "RAM8"];

#[test]
fn nested_sources_end_up_in_the_root_with_canonical_names() {
    let root = sandbox("flatten");
    write(&root, "sub/dir/ram8.HDL", "CHIP RAM8 {}");
    write(&root, "pc.hdl", "CHIP PC {}");
    write(&root, "Helper.Hdl", "CHIP Helper {}");
    write(&root, "sub/readme.txt", "not a chip");

    let report = flatten(&root, "hdl", ROSTER);

    assert!(report.issues().is_empty());
    assert_eq!(report.placed(), &[
        root.join("Helper.hdl"),
        root.join("PC.hdl"),
        root.join("RAM8.hdl"),
    ]);
    assert_eq!(fs::read_to_string(root.join("RAM8.hdl")).expect("read"), "CHIP RAM8 {}");
    assert!(!root.join("sub/dir/ram8.HDL").exists());
    assert!(!root.join("pc.hdl").exists());
    assert!(root.join("sub/readme.txt").is_file());

    let _ = fs::remove_dir_all(root);
}

#[test]
fn flattening_twice_changes_nothing() {
    let root = sandbox("idempotent");
    write(&root, "deep/Bit.hdl", "CHIP Bit {}");

    let first = flatten(&root, "hdl", ROSTER);
    let second = flatten(&root, "hdl", ROSTER);
    assert_eq!(first.placed(), second.placed());
    assert_eq!(second.placed(), &[root.join("Bit.hdl")]);

    let _ = fs::remove_dir_all(root);
}

#[test]
fn missing_root_is_reported_not_fatal() {
    let parent = sandbox("noroot");
    let report = flatten(&parent.join("absent"), "hdl", ROSTER);
    assert!(report.placed().is_empty());
    assert!(matches!(report.issues(), [NormalizeIssue::Scan(_)]));
    let _ = fs::remove_dir_all(parent);
}

#[test]
fn containing_folder_falls_back_to_root() {
    let root = sandbox("folder");
    write(&root, "a/b/RAM8.hdl", "CHIP RAM8 {}");

    assert_eq!(find_containing_folder(&root, "ram8.HDL"), root.join("a/b"));
    assert_eq!(find_containing_folder(&root, "PC.hdl"), root);

    let _ = fs::remove_dir_all(root);
}

#[test]
fn a_failed_move_does_not_stop_the_others() {
    let root = sandbox("blocked");
    fs::create_dir_all(root.join("Bit.hdl")).expect("blocking directory");
    write(&root, "a/bit.hdl", "CHIP Bit {}");
    write(&root, "b/pc.hdl", "CHIP PC {}");

    let report = flatten(&root, "hdl", ROSTER);

    assert!(matches!(report.issues(), [NormalizeIssue::Move { .. }]));
    assert_eq!(report.placed(), &[root.join("PC.hdl")]);
    assert!(root.join("a/bit.hdl").is_file());
    assert_eq!(fs::read_to_string(root.join("PC.hdl")).expect("read"), "CHIP PC {}");

    let _ = fs::remove_dir_all(root);
}
