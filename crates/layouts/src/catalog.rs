use std::collections::HashMap;

use tracing::debug;

use crate::math::{Transform, Vec3};
use crate::types::{ItemId, ItemSize, LayoutKind};

/// Build-time description of a segment shape: door geometry and anchor slot
/// positions, all in segment-local space. `next_offsets[i]` is where the
/// segment chained through door `i` attaches; the first offset doubles as
/// the nav-link point handed to the successor.
#[derive(Debug, Clone)]
pub struct LayoutPrototype {
    pub kind: LayoutKind,
    pub door_rotations: Vec<Vec3>,
    pub next_offsets: Vec<Vec3>,
    pub next_rotations: Vec<Vec3>,
    pub small_anchors: Vec<Vec3>,
    pub medium_anchors: Vec<Vec3>,
    pub large_anchors: Vec<Vec3>,
}

impl LayoutPrototype {
    pub fn door_count(&self) -> usize {
        self.door_rotations.len()
    }
}

/// Build-time description of a placeable item. `compatible_kinds` and
/// `enable` are authoring metadata; the runtime does not enforce them.
#[derive(Debug, Clone)]
pub struct ItemPrototype {
    pub id: ItemId,
    pub enable: bool,
    pub size: ItemSize,
    pub transform: Transform,
    pub random_rot_x: bool,
    pub random_rot_y: bool,
    pub random_rot_z: bool,
    pub compatible_kinds: Vec<LayoutKind>,
}

/// Immutable registry of layout prototypes, at most one per kind. The first
/// prototype registered for a kind wins; later duplicates are ignored.
#[derive(Debug, Default)]
pub struct LayoutCatalog {
    prototypes: HashMap<LayoutKind, LayoutPrototype>,
}

impl LayoutCatalog {
    pub fn from_prototypes(prototypes: Vec<LayoutPrototype>) -> Self {
        let mut by_kind = HashMap::new();
        for prototype in prototypes {
            if by_kind.contains_key(&prototype.kind) {
                debug!(kind = ?prototype.kind, "duplicate layout prototype ignored");
                continue;
            }
            by_kind.insert(prototype.kind, prototype);
        }
        Self {
            prototypes: by_kind,
        }
    }

    pub fn get(&self, kind: LayoutKind) -> Option<&LayoutPrototype> {
        self.prototypes.get(&kind)
    }

    pub fn len(&self) -> usize {
        self.prototypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prototypes.is_empty()
    }
}

/// Immutable registry of item prototypes keyed by id, first one wins.
#[derive(Debug, Default)]
pub struct ItemCatalog {
    prototypes: HashMap<ItemId, ItemPrototype>,
}

impl ItemCatalog {
    pub fn from_prototypes(prototypes: Vec<ItemPrototype>) -> Self {
        let mut by_id = HashMap::new();
        for prototype in prototypes {
            if by_id.contains_key(&prototype.id) {
                debug!(id = %prototype.id, "duplicate item prototype ignored");
                continue;
            }
            by_id.insert(prototype.id, prototype);
        }
        Self { prototypes: by_id }
    }

    pub fn get(&self, id: ItemId) -> Option<&ItemPrototype> {
        self.prototypes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.prototypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prototypes.is_empty()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{item_prototype, layout_prototype};
    use super::*;

    #[test]
    fn first_layout_prototype_per_kind_wins() {
        let mut first = layout_prototype(LayoutKind::StudyModern, 1);
        first.large_anchors = vec![Vec3::ZERO; 5];
        let second = layout_prototype(LayoutKind::StudyModern, 3);

        let catalog = LayoutCatalog::from_prototypes(vec![first, second]);
        assert_eq!(catalog.len(), 1);
        let kept = catalog.get(LayoutKind::StudyModern).expect("kept prototype");
        assert_eq!(kept.door_count(), 1);
        assert_eq!(kept.large_anchors.len(), 5);
    }

    #[test]
    fn missing_kind_yields_none() {
        let catalog = LayoutCatalog::from_prototypes(vec![layout_prototype(
            LayoutKind::MainHall,
            1,
        )]);
        assert!(catalog.get(LayoutKind::ShedDerelict).is_none());
    }

    #[test]
    fn first_item_prototype_per_id_wins() {
        let first = item_prototype(9, ItemSize::Small);
        let second = item_prototype(9, ItemSize::Large);
        let catalog = ItemCatalog::from_prototypes(vec![first, second]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.get(ItemId(9)).expect("kept prototype").size,
            ItemSize::Small
        );
    }
}
