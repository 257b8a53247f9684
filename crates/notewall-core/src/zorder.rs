//! Stacking order. Items and frames are independent z-spaces.

use crate::board::{Frame, Item, timestamp_millis};
use std::cmp::Ordering;
use uuid::Uuid;

/// An entity with a position in its class's stacking order.
pub trait Stacked {
    fn stack_id(&self) -> Uuid;
    fn z(&self) -> f64;
    fn set_z(&mut self, z: f64);
}

impl Stacked for Item {
    fn stack_id(&self) -> Uuid {
        self.id
    }

    fn z(&self) -> f64 {
        self.z
    }

    fn set_z(&mut self, z: f64) {
        self.z = z;
    }
}

impl Stacked for Frame {
    fn stack_id(&self) -> Uuid {
        self.id
    }

    fn z(&self) -> f64 {
        self.z
    }

    fn set_z(&mut self, z: f64) {
        self.z = z;
    }
}

/// Default z for a new entity: its creation timestamp.
pub fn seed_z() -> f64 {
    timestamp_millis()
}

/// Make `id` the topmost entity of its class.
///
/// Returns the new z when it changed, `None` when the entity was already
/// strictly on top (or does not exist). Sharing the top z with another entity
/// is not "on top", so ties are broken by bumping.
pub fn bring_to_front<T: Stacked>(id: Uuid, collection: &mut [T]) -> Option<f64> {
    let current = collection.iter().find(|e| e.stack_id() == id)?.z();
    let top_other = collection
        .iter()
        .filter(|e| e.stack_id() != id)
        .map(|e| e.z())
        .reduce(f64::max);

    match top_other {
        Some(other) if current <= other => {
            let next = other + 1.0;
            if let Some(entity) = collection.iter_mut().find(|e| e.stack_id() == id) {
                entity.set_z(next);
            }
            Some(next)
        }
        _ => None,
    }
}

/// Entities in paint order: ascending z, insertion order for ties.
pub fn render_order<T: Stacked>(collection: &[T]) -> Vec<&T> {
    let mut ordered: Vec<&T> = collection.iter().collect();
    ordered.sort_by(|a, b| a.z().partial_cmp(&b.z()).unwrap_or(Ordering::Equal));
    ordered
}
