pub mod force_directed;
pub mod instruction;

pub use force_directed::{solve, ForceConfig, Layout, Simulation};
pub use instruction::{interpret, layout_with_instruction, LayoutInstruction};
