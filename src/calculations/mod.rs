pub mod capacity;
pub mod forward_pass;

pub use capacity::{Allocation, CapacityDay, CapacityLedger};
pub use forward_pass::{ForwardPass, ForwardPassOutput, Resolution};
