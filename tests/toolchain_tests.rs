#![cfg(unix)]

mod common;

use std::{fs, os::unix::fs::PermissionsExt, path::Path, time::Duration};

use common::{sandbox, write};
use hdlgrade::hdl::{NandToolchain, Toolchain};

/// Installs `body` as the hardware simulator launcher in `tools`.
fn install_simulator(tools: &Path, body: &str) {
    let script = write(tools, "HardwareSimulator.sh", format!("#!/bin/sh\n{body}\n"));
    let mut perms = fs::metadata(&script).expect("metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&script, perms).expect("chmod");
}

// Scripts are rewritten between runs, so the scenarios share one test to
// avoid executing a file another thread is still writing.
#[tokio::test]
async fn launcher_output_is_turned_into_feedback() {
    let root = sandbox("launcher");
    let tools = root.join("tools");
    let workspace = root.join("workspace");
    write(&workspace, "Bit.tst", "load Bit.hdl;\n");
    write(&workspace, "Bit.cmp", "|time|in|load|out|\n|0+|0|0|0|\n|1|1|1|0|\n");
    let toolchain = NandToolchain::new(Some(tools.clone()), Duration::from_secs(10));

    install_simulator(&tools, "echo 'End of script - Comparison ended successfully'");
    let diff = toolchain.simulate(&workspace, "Bit").await.expect("run");
    assert!(diff.is_empty(), "unexpected diff: {diff}");

    install_simulator(
        &tools,
        "printf '|time|in|load|out|\\n|0+|0|0|0|\\n|1|1|1|1|\\n' > Bit.out\n\
         echo 'Comparison failure at line 3' >&2\n\
         exit 1",
    );
    let diff = toolchain.simulate(&workspace, "Bit").await.expect("run");
    assert!(diff.starts_with("Comparison failure at line 3"), "got: {diff}");
    assert!(diff.contains("-|1|1|1|0|"));
    assert!(diff.contains("+|1|1|1|1|"));

    install_simulator(
        &tools,
        "echo 'In HDL file /tmp/Bit.hdl, Line 7, out(0) has no source pin: load Bit.hdl'\n\
         exit 1",
    );
    let diff = toolchain.simulate(&workspace, "Bit").await.expect("run");
    assert!(diff.starts_with("Bit.hdl, line 7: out(0) has no source pin"), "got: {diff}");

    install_simulator(&tools, "sleep 5");
    let impatient = NandToolchain::new(Some(tools.clone()), Duration::from_millis(200));
    assert!(impatient.simulate(&workspace, "Bit").await.is_err());

    // The simulator proper runs as a grandchild of the launcher script.
    install_simulator(&tools, "(sleep 1; touch late-write.out)");
    assert!(impatient.simulate(&workspace, "Bit").await.is_err());
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(
        !workspace.join("late-write.out").exists(),
        "a process started by the launcher outlived the deadline"
    );

    assert!(toolchain.simulate(&workspace, "PC").await.is_err(), "PC.tst does not exist");

    let _ = fs::remove_dir_all(root);
}
