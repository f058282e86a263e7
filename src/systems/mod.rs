//! Systems module - crystal cell and the LiH geometry placed in it.

pub mod crystal;
mod lithium_hydride;

pub use crystal::{Grid, LatticeVector};
pub use lithium_hydride::{LithiumHydride, Nucleus, Species, FORMULA_UNITS};
