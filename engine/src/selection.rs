//! Selection Context.
//!
//! A single value so that a drone and an officer can never be selected at the same time.
//!

use crate::EntityKind;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Selection {
    #[default]
    None,
    Drone(String),
    Officer(String),
}

impl Selection {
    /// Select `id`, replacing whatever was selected before.  Returns the kind that got
    /// implicitly deselected, if any.
    ///
    pub fn select(&mut self, kind: EntityKind, id: &str) -> Option<EntityKind> {
        let previous = self.kind().filter(|k| *k != kind);
        *self = match kind {
            EntityKind::Drone => Selection::Drone(id.to_string()),
            EntityKind::Officer => Selection::Officer(id.to_string()),
        };
        previous
    }

    /// Clear the selection if it is of `kind`.  Returns whether something was cleared.
    ///
    pub fn deselect(&mut self, kind: EntityKind) -> bool {
        if self.kind() == Some(kind) {
            *self = Selection::None;
            true
        } else {
            false
        }
    }

    pub fn kind(&self) -> Option<EntityKind> {
        match self {
            Selection::None => None,
            Selection::Drone(_) => Some(EntityKind::Drone),
            Selection::Officer(_) => Some(EntityKind::Officer),
        }
    }

    pub fn drone(&self) -> Option<&str> {
        match self {
            Selection::Drone(id) => Some(id),
            _ => None,
        }
    }

    pub fn officer(&self) -> Option<&str> {
        match self {
            Selection::Officer(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_selected(&self, kind: EntityKind, id: &str) -> bool {
        match kind {
            EntityKind::Drone => self.drone() == Some(id),
            EntityKind::Officer => self.officer() == Some(id),
        }
    }
}
