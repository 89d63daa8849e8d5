//! Commands sent from the host to the simulation.
//!
//! Commands are queued and applied at the next tick boundary, before any
//! weapon is dispatched, so the live assembly never changes mid-frame.

use serde::{Deserialize, Serialize};

use crate::blueprint::Blueprint;
use crate::types::Rotation;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ShipCommand {
    /// Mount a part with its top-left corner at (x, y).
    PlacePart {
        x: i32,
        y: i32,
        part_id: String,
        #[serde(default)]
        rotation: Rotation,
    },
    /// Remove whatever part covers (x, y). The core is never removed.
    RemovePart { x: i32, y: i32 },
    /// Replace the live assembly with a rebuilt one.
    LoadBlueprint { blueprint: Blueprint },
    /// Change the campaign level used for fire-rate and regen bonuses.
    SetCampaignLevel { level: u32 },
}
