#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Extension of chip-definition sources submitted by students.
pub const HDL_EXTENSION: &str = "hdl";

/// Extension a chip source is renamed to while it must stay invisible to the
/// simulator.
pub const HIDDEN_EXTENSION: &str = "hidden";

/// Extension of simulator test scripts supplied by the fixture store.
pub const TEST_SCRIPT_EXTENSION: &str = "tst";

/// Extension of expected-output comparison files supplied by the fixture
/// store.
pub const COMPARE_EXTENSION: &str = "cmp";

/// Extension of the output file the simulator writes next to a test script.
pub const OUTPUT_EXTENSION: &str = "out";

/// Token (matched case-insensitively) that marks a chip as delegating to the
/// simulator's built-in implementation.
pub const BUILTIN_MARKER: &str = "builtin";

/// Prefix of every workspace directory created under the temp root.
pub const WORKSPACE_PREFIX: &str = "temp-";

/// Name of the directory inside a workspace holding the staged submission.
pub const SUBMISSION_DIR: &str = "src";

/// Feedback text reported when no test produced an entry.
pub const PASS_MESSAGE: &str = "Congratulations! all tests passed successfully!";

/// Default location of per-request workspaces, relative to the invocation
/// directory.
pub const DEFAULT_TEMP_ROOT: &str = "grader/temp";

/// Default location of the fixture store, relative to the invocation
/// directory.
pub const DEFAULT_FIXTURE_ROOT: &str = "grader/tests";

/// Default wall-clock limit for a single simulator run, in seconds.
pub const DEFAULT_SIMULATOR_TIMEOUT_SECS: u64 = 60;

/// Chips expected for each hardware project, in roster order.
pub const PROJECT_ROSTERS: &[(u8, &[&str])] = &[
    (
        1,
        &[
            "Not", "And", "Or", "Xor", "Mux", "DMux", "Not16", "And16", "Or16", "Mux16", "Or8Way",
            "Mux4Way16", "Mux8Way16", "DMux4Way", "DMux8Way",
        ],
    ),
    (2, &["HalfAdder", "FullAdder", "Add16", "Inc16", "ALU"]),
    (3, &["Bit", "PC", "RAM64", "RAM8", "Register", "RAM16K", "RAM4K", "RAM512"]),
    (5, &["Memory", "CPU", "Computer"]),
];
