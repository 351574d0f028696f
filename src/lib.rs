pub mod avltree;
pub mod builder;
pub mod harness;
pub mod key;
pub mod set;
pub mod util;

pub use avltree::AVLTree;
pub use builder::{build_parallel, build_partition, BuildError};
pub use harness::{run_trial, sweep, Measurement, SweepConfig};
pub use key::Key;
pub use set::PersistentSet;
