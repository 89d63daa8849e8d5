//! Persisted assembly layout: an ordered list of placement tuples.
//!
//! Runtime firing state is deliberately absent; loading a blueprint
//! replays placements and every weapon starts idle.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::PartCatalog;
use crate::constants::BLUEPRINT_VERSION;
use crate::types::{Cell, Footprint, Rotation};

/// One placement: origin cell, part id and orientation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedPart {
    pub x: i32,
    pub y: i32,
    pub part_id: String,
    #[serde(default)]
    pub rotation: Rotation,
}

impl PlacedPart {
    pub fn new(x: i32, y: i32, part_id: &str, rotation: Rotation) -> Self {
        Self {
            x,
            y,
            part_id: part_id.to_string(),
            rotation,
        }
    }

    pub fn origin(&self) -> Cell {
        Cell::new(self.x, self.y)
    }
}

#[derive(Debug, Error)]
pub enum BlueprintError {
    #[error("failed to parse blueprint: {0}")]
    Json(#[from] serde_json::Error),
    #[error("blueprint version {found} is not supported (expected {expected})")]
    VersionMismatch { found: u32, expected: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blueprint {
    pub version: u32,
    pub parts: Vec<PlacedPart>,
}

impl Default for Blueprint {
    fn default() -> Self {
        Self {
            version: BLUEPRINT_VERSION,
            parts: Vec::new(),
        }
    }
}

impl Blueprint {
    pub fn new(parts: Vec<PlacedPart>) -> Self {
        Self {
            version: BLUEPRINT_VERSION,
            parts,
        }
    }

    pub fn to_json(&self) -> Result<String, BlueprintError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, BlueprintError> {
        let blueprint: Blueprint = serde_json::from_str(json)?;
        if blueprint.version != BLUEPRINT_VERSION {
            return Err(BlueprintError::VersionMismatch {
                found: blueprint.version,
                expected: BLUEPRINT_VERSION,
            });
        }
        Ok(blueprint)
    }

    /// Shift every part so the bounding box of the rotated footprints is
    /// centred on the origin. Unknown parts count as a single cell.
    pub fn centered(&self, catalog: &PartCatalog) -> Blueprint {
        if self.parts.is_empty() {
            return self.clone();
        }

        let (mut min_x, mut min_y) = (i32::MAX, i32::MAX);
        let (mut max_x, mut max_y) = (i32::MIN, i32::MIN);
        for part in &self.parts {
            let footprint = catalog
                .get(&part.part_id)
                .map(|def| def.footprint())
                .unwrap_or(Footprint::UNIT)
                .rotated(part.rotation);
            min_x = min_x.min(part.x);
            min_y = min_y.min(part.y);
            max_x = max_x.max(part.x + footprint.width as i32);
            max_y = max_y.max(part.y + footprint.height as i32);
        }

        // Halves round toward positive infinity.
        let center_x = ((min_x + max_x) as f64 / 2.0 + 0.5).floor() as i32;
        let center_y = ((min_y + max_y) as f64 / 2.0 + 0.5).floor() as i32;

        Blueprint {
            version: self.version,
            parts: self
                .parts
                .iter()
                .map(|p| PlacedPart {
                    x: p.x - center_x,
                    y: p.y - center_y,
                    ..p.clone()
                })
                .collect(),
        }
    }
}
