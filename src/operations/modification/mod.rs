mod conform;
mod lattice;
mod split;

pub use conform::ConformToVertex;
pub use split::{SplitCase, SplitCuboid, SplitOutcome};
