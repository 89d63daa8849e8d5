//! Grid-to-world transforms for mounted parts.
//!
//! Pure functions over plain data. Headings are radians measured from +x
//! toward +y, matching `atan2(dy, dx)`.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use framebound_core::constants::*;
use framebound_core::types::{Cell, Footprint, Rotation};

/// World pose of the parent vessel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub position: DVec2,
    pub heading: f64,
}

impl Frame {
    pub fn new(position: DVec2, heading: f64) -> Self {
        Self { position, heading }
    }

    /// Local (grid-space) point to world space.
    pub fn to_world(&self, local: DVec2) -> DVec2 {
        self.position + rotate(local, self.heading)
    }

    /// World point to local (grid-space) coordinates.
    pub fn to_local(&self, world: DVec2) -> DVec2 {
        rotate(world - self.position, -self.heading)
    }
}

/// Where weapons point this frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AimTarget {
    /// Aim each weapon at a world point.
    Point(DVec2),
    /// Fire every weapon along a fixed world heading.
    Angle(f64),
}

impl Default for AimTarget {
    fn default() -> Self {
        Self::Angle(0.0)
    }
}

/// Resolved firing geometry of one weapon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MountPose {
    /// World position of the footprint centre.
    pub anchor: DVec2,
    /// World firing heading.
    pub heading: f64,
    /// World position projectiles leave from.
    pub muzzle: DVec2,
}

pub fn rotate(v: DVec2, angle: f64) -> DVec2 {
    let (sin, cos) = angle.sin_cos();
    DVec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

pub fn unit(angle: f64) -> DVec2 {
    let (sin, cos) = angle.sin_cos();
    DVec2::new(cos, sin)
}

/// Centre of a rotated footprint in grid space (world units, unrotated frame).
pub fn local_anchor(origin: Cell, footprint: Footprint) -> DVec2 {
    DVec2::new(
        (origin.x as f64 + (footprint.width as f64 - 1.0) / 2.0) * CELL_SIZE,
        (origin.y as f64 + (footprint.height as f64 - 1.0) / 2.0) * CELL_SIZE,
    )
}

/// Grid cell containing a local-space point.
pub fn cell_at_local(local: DVec2) -> Cell {
    Cell::new(
        (local.x / CELL_SIZE).round() as i32,
        (local.y / CELL_SIZE).round() as i32,
    )
}

/// Facing of a mounted part: the frame heading plus its quarter turns.
pub fn mount_facing(frame_heading: f64, rotation: Rotation) -> f64 {
    frame_heading + rotation.radians()
}

pub fn aim_heading(from: DVec2, aim: AimTarget) -> f64 {
    match aim {
        AimTarget::Point(target) => {
            let d = target - from;
            d.y.atan2(d.x)
        }
        AimTarget::Angle(angle) => angle,
    }
}

/// Barrel length in world units: tall mounts get the long barrel.
pub fn barrel_length(footprint: Footprint, muzzle_offset: f64) -> f64 {
    let cells = if footprint.height as f64 > LONG_BARREL_MIN_HEIGHT {
        LONG_BARREL_CELLS
    } else {
        SHORT_BARREL_CELLS
    };
    cells * CELL_SIZE + muzzle_offset
}

pub fn muzzle_pose(
    frame: &Frame,
    origin: Cell,
    footprint: Footprint,
    muzzle_offset: f64,
    aim: AimTarget,
) -> MountPose {
    let anchor = frame.to_world(local_anchor(origin, footprint));
    let heading = aim_heading(anchor, aim);
    let muzzle = anchor + unit(heading) * barrel_length(footprint, muzzle_offset);
    MountPose {
        anchor,
        heading,
        muzzle,
    }
}

/// Lateral offset of pellet `index` for multi-barrel weapons, centred on the muzzle.
pub fn barrel_offset(heading: f64, index: u32, count: u32, spacing: f64) -> DVec2 {
    if count <= 1 || spacing == 0.0 {
        return DVec2::ZERO;
    }
    let lateral = (index as f64 - (count as f64 - 1.0) / 2.0) * spacing;
    unit(heading + std::f64::consts::FRAC_PI_2) * lateral
}
