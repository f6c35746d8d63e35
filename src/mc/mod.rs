// src/mc/mod.rs
pub mod engine;

pub use engine::{McEstimate, SimulationSpec};
