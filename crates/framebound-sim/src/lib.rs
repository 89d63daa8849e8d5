//! Headless simulation for FRAMEBOUND vessels.
//!
//! Owns the grid assembly, the per-weapon fire control and the per-frame
//! weapon scheduler. Advances via `SimulationEngine::tick`; with a fixed
//! seed every run is reproducible.

pub mod assembly;
pub mod builder;
pub mod engine;
pub mod fire_control;
pub mod geometry;
pub mod systems;

pub use engine::SimulationEngine;
pub use framebound_core as core;
