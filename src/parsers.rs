#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::fmt::Display;

use serde::Serialize;

/// A problem the simulator reported while loading an HDL file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HdlDiagnostic {
    /// Path of the HDL file as printed by the simulator.
    pub file:    String,
    /// Line the problem was reported on.
    pub line:    u32,
    /// The simulator's message.
    pub message: String,
}

impl Display for HdlDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = std::path::Path::new(&self.file)
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.file.clone());
        write!(f, "{name}, line {}: {}", self.line, self.message)
    }
}

/// What a simulator run's console output says about the chip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulatorVerdict {
    /// The script ran to the end and every comparison matched.
    Passed,
    /// Output diverged from the comparison file at the given line.
    ComparisonFailure {
        /// Line of the comparison file that did not match.
        line: u32,
    },
    /// The chip could not be loaded.
    HdlError(HdlDiagnostic),
    /// None of the known messages were found.
    Unrecognized,
}

peg::parser! {
    /// grammars for the console output of the nand2tetris simulators.
    pub grammar parser() for str {
        /// matches any sequence of 1 or more numbers
        rule number() -> u32
            = n:$(['0'..='9']+) {? n.parse().or(Err("u32")) }

        /// matches any number of whitespace characters
        rule whitespace() = quiet!{[' ' | '\n' | '\t' | '\r']+}

        /// matches the message printed when a script compares cleanly
        pub rule comparison_success()
            = whitespace()? "End of script - Comparison ended successfully" whitespace()?

        /// parses the line number out of a comparison failure
        pub rule comparison_failure() -> u32
            = whitespace()? "Comparison failure at line " l:number() whitespace()? { l }

        /// matches everything up to (not including) the next comma
        rule until_comma() -> &'input str
            = $((!"," [_])+)

        /// parses an error raised while loading an HDL file
        pub rule hdl_error() -> HdlDiagnostic
            = whitespace()? "In HDL file " f:until_comma() ", Line " l:number() ", " m:$([_]*)
            {
                HdlDiagnostic {
                    file: f.trim().to_string(),
                    line: l,
                    message: m.trim().to_string(),
                }
            }
    }
}

/// Reads a simulator's console output and decides what it reported.
///
/// A comparison failure wins over everything else, then load errors, then
/// the success message.
pub fn simulator_verdict(output: &str) -> SimulatorVerdict {
    let mut passed = false;
    let mut diagnostic = None;

    for line in output.lines() {
        if let Ok(line) = parser::comparison_failure(line) {
            return SimulatorVerdict::ComparisonFailure { line };
        }
        if diagnostic.is_none()
            && let Ok(diag) = parser::hdl_error(line)
        {
            diagnostic = Some(diag);
        }
        if parser::comparison_success(line).is_ok() {
            passed = true;
        }
    }

    match (diagnostic, passed) {
        (Some(diag), _) => SimulatorVerdict::HdlError(diag),
        (None, true) => SimulatorVerdict::Passed,
        (None, false) => SimulatorVerdict::Unrecognized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_message_is_a_pass() {
        let out = "End of script - Comparison ended successfully\n";
        assert_eq!(simulator_verdict(out), SimulatorVerdict::Passed);
    }

    #[test]
    fn comparison_failure_reports_line() {
        let out = "Loading...\nComparison failure at line 7\r\n";
        assert_eq!(simulator_verdict(out), SimulatorVerdict::ComparisonFailure { line: 7 });
    }

    #[test]
    fn hdl_errors_are_parsed() {
        let out = "In HDL file /tmp/ws/Bit.hdl, Line 12, Mux: sub-chip not found, load failed";
        let SimulatorVerdict::HdlError(diag) = simulator_verdict(out) else {
            panic!("expected an HDL error");
        };
        assert_eq!(diag.file, "/tmp/ws/Bit.hdl");
        assert_eq!(diag.line, 12);
        assert_eq!(diag.message, "Mux: sub-chip not found, load failed");
        assert_eq!(diag.to_string(), "Bit.hdl, line 12: Mux: sub-chip not found, load failed");
    }

    #[test]
    fn unknown_output_is_unrecognized() {
        assert_eq!(simulator_verdict(""), SimulatorVerdict::Unrecognized);
        assert_eq!(simulator_verdict("Segmentation fault"), SimulatorVerdict::Unrecognized);
    }
}
