//! Structure model of known parameters and its two sources

pub mod catalog;
pub mod chart;
pub mod structure;
pub mod value;

pub use structure::{NodeId, StructureModel};
