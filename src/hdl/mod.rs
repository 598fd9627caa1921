#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Flattening and case correction of submitted sources.
pub mod normalize;
/// Project catalog: which chips each project expects.
pub mod project;
/// Simulator seam and the nand2tetris implementation of it.
pub mod toolchain;
/// Rename-backed control over which chips the simulator can see.
pub mod visibility;

pub use normalize::{NormalizeIssue, NormalizeReport, find_containing_folder, flatten};
pub use project::HdlProject;
pub use toolchain::{NandToolchain, Tool, Toolchain};
pub use visibility::{ChipState, Revealed, VisibilityError, VisibilityGate};
