pub mod dense;
pub mod initialization;

pub use dense::{forward_sequential, DenseLayer};
pub use initialization::WeightInit;
