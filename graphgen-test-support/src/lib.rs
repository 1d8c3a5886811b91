//! Test helpers shared by the graphgen crates.

pub mod capture;
pub mod pbt;
