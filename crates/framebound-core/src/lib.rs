//! Core types and definitions for the FRAMEBOUND simulation.
//!
//! This crate defines the vocabulary shared across the workspace:
//! grid and rotation types, the part catalog, commands, emitted events,
//! blueprints, and tuning constants. It has no simulation state.

pub mod blueprint;
pub mod catalog;
pub mod commands;
pub mod constants;
pub mod enums;
pub mod events;
pub mod types;
