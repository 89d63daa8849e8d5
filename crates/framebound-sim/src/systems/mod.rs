//! Systems that advance the assembly each frame.
//!
//! Systems are free functions (or a small scheduler) that take the assembly
//! by reference. Per-part runtime state lives on the mounted instances.

pub mod shields;
pub mod weapons;
