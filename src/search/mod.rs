pub mod index;
pub mod vector;

pub use index::{build_index, retrieve, RepoIndexEntry};
pub use vector::{FlatL2Index, Neighbor};
