//! Hangar edit session.
//!
//! Edits happen on an independent clone of the live assembly. The engine
//! swaps the edited clone in between frames when the session is committed.

use std::collections::HashMap;

use framebound_core::types::{Cell, InstanceId, Rotation};

use crate::assembly::{GridAssembly, PlacementRejection};

/// Parts the player may still place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inventory {
    /// Sandbox: every catalog part is always available.
    Unlimited,
    Counted(HashMap<String, u32>),
}

impl Default for Inventory {
    fn default() -> Self {
        Self::Counted(HashMap::new())
    }
}

impl Inventory {
    pub fn counted(items: impl IntoIterator<Item = (String, u32)>) -> Self {
        Self::Counted(items.into_iter().collect())
    }

    pub fn available(&self, part_id: &str) -> u32 {
        match self {
            Self::Unlimited => u32::MAX,
            Self::Counted(counts) => counts.get(part_id).copied().unwrap_or(0),
        }
    }

    /// Take one unit. Returns false if none are left.
    pub fn take(&mut self, part_id: &str) -> bool {
        match self {
            Self::Unlimited => true,
            Self::Counted(counts) => match counts.get_mut(part_id) {
                Some(n) if *n > 0 => {
                    *n -= 1;
                    true
                }
                _ => false,
            },
        }
    }

    pub fn give(&mut self, part_id: &str) {
        if let Self::Counted(counts) = self {
            *counts.entry(part_id.to_string()).or_insert(0) += 1;
        }
    }
}

/// Why an edit-session placement failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error(transparent)]
    Rejected(#[from] PlacementRejection),
    #[error("no `{0}` left in the inventory")]
    OutOfStock(String),
}

/// A draft assembly plus cursor rotation and inventory.
#[derive(Debug, Clone)]
pub struct EditSession {
    draft: GridAssembly,
    inventory: Inventory,
    rotation: Rotation,
}

impl EditSession {
    /// Start editing a clone of `live`.
    pub fn open(live: &GridAssembly, inventory: Inventory) -> Self {
        Self {
            draft: live.clone(),
            inventory,
            rotation: Rotation::R0,
        }
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Advance the cursor rotation by one quarter turn.
    pub fn rotate(&mut self) -> Rotation {
        self.rotation = self.rotation.rotated_cw();
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    pub fn can_place(&self, origin: Cell, part_id: &str) -> bool {
        self.inventory.available(part_id) > 0 && self.draft.can_place(origin, part_id, self.rotation)
    }

    /// Place one unit of `part_id` at the cursor rotation.
    pub fn place(&mut self, origin: Cell, part_id: &str) -> Result<InstanceId, EditError> {
        if self.inventory.available(part_id) == 0 {
            return Err(EditError::OutOfStock(part_id.to_string()));
        }
        let id = self.draft.try_add_part(origin, part_id, self.rotation)?;
        self.inventory.take(part_id);
        Ok(id)
    }

    /// Remove the part on `cell` and return it to the inventory.
    pub fn remove(&mut self, cell: Cell) -> bool {
        let Some(part_id) = self.draft.part_at(cell).map(|i| i.part_id.clone()) else {
            return false;
        };
        if !self.draft.remove_part(cell) {
            return false;
        }
        self.inventory.give(&part_id);
        true
    }

    pub fn draft(&self) -> &GridAssembly {
        &self.draft
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Finish editing.
    pub fn into_parts(self) -> (GridAssembly, Inventory) {
        (self.draft, self.inventory)
    }
}
