use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::catalog::ItemCatalog;
use crate::error::AssemblyError;
use crate::math::{Transform, Vec3};
use crate::segment::AnchorRef;
use crate::types::{AnchorTier, ItemId, ItemSize, SegmentId};
use crate::world::LevelWorld;

/// Where an item instance currently lives: parked in the shared pool, or
/// hosted by one anchor slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemContainer {
    PoolRoot,
    Anchor(AnchorRef),
}

/// A live copy of an item prototype. Created lazily on first demand for an
/// id, then reused forever; deactivation parks it back under the pool root.
#[derive(Debug, Clone)]
pub struct ItemInstance {
    id: ItemId,
    size: ItemSize,
    in_use: bool,
    container: ItemContainer,
    local_transform: Transform,
}

impl ItemInstance {
    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn size(&self) -> ItemSize {
        self.size
    }

    pub fn in_use(&self) -> bool {
        self.in_use
    }

    pub fn container(&self) -> ItemContainer {
        self.container
    }

    pub fn local_transform(&self) -> Transform {
        self.local_transform
    }
}

/// Per-call outcome of `fill_items`, for logs and assertions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillStats {
    pub placed: u32,
    pub omitted_unknown: u32,
    pub omitted_busy: u32,
    pub halted_by_large_exhaustion: bool,
}

/// Owns every item instance and drives placement and reclamation. The RNG
/// is seeded by the orchestrator so placement is reproducible.
#[derive(Debug)]
pub struct ItemPool {
    catalog: ItemCatalog,
    instances: BTreeMap<ItemId, ItemInstance>,
    rng: StdRng,
}

impl ItemPool {
    pub fn new(catalog: ItemCatalog, rng_seed: u64) -> Self {
        Self {
            catalog,
            instances: BTreeMap::new(),
            rng: StdRng::seed_from_u64(rng_seed),
        }
    }

    pub fn instance(&self, id: ItemId) -> Option<&ItemInstance> {
        self.instances.get(&id)
    }

    pub fn live_instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Places the segment's assigned item list into its anchors, largest
    /// size class first. Medium items may backfill large anchors and small
    /// items may backfill both, but no tier places anything once the free
    /// large-anchor count reaches zero.
    pub fn fill_items(&mut self, world: &mut LevelWorld, segment_id: SegmentId) -> FillStats {
        let mut stats = FillStats::default();
        let Some(segment) = world.segment(segment_id) else {
            return stats;
        };
        let references = segment.item_list().to_vec();
        if references.is_empty() {
            return stats;
        }
        let anchors = segment.anchors();

        let mut queue = Vec::with_capacity(references.len());
        for id in references {
            match self.known_size(id) {
                Some(size) => queue.push((id, size)),
                None => {
                    debug!(item = %id, "item id not found, omitted");
                    stats.omitted_unknown = stats.omitted_unknown.saturating_add(1);
                }
            }
        }

        let tiers: [(ItemSize, Vec<AnchorRef>); 3] = [
            (ItemSize::Large, anchors.large.clone()),
            (
                ItemSize::Medium,
                [anchors.large.clone(), anchors.medium.clone()].concat(),
            ),
            (
                ItemSize::Small,
                [anchors.large, anchors.medium, anchors.small].concat(),
            ),
        ];

        for (tier_size, candidates) in tiers {
            for &(id, size) in queue.iter().filter(|(_, size)| *size == tier_size) {
                if free_large_anchor_count(world, segment_id) == 0 {
                    stats.halted_by_large_exhaustion = true;
                    break;
                }
                match self.checkout(id) {
                    Ok(()) => {}
                    Err(AssemblyError::ItemBusy { id }) => {
                        debug!(item = %id, "item already in use, omitted");
                        stats.omitted_busy = stats.omitted_busy.saturating_add(1);
                        continue;
                    }
                    Err(error) => {
                        debug!(item = %id, %error, "item checkout failed, omitted");
                        stats.omitted_unknown = stats.omitted_unknown.saturating_add(1);
                        continue;
                    }
                }
                if let Err(error) = self.try_place(world, id, size, candidates.clone()) {
                    debug!(item = %id, %error, "placement tier stopped");
                    break;
                }
                stats.placed = stats.placed.saturating_add(1);
            }
        }

        stats
    }

    /// Returns every occupant of the segment's anchors to the pool root
    /// with an identity local transform. A no-op on segments with no
    /// occupied anchors.
    pub fn remove_from(&mut self, world: &mut LevelWorld, segment_id: SegmentId) -> usize {
        let Some(segment) = world.segment(segment_id) else {
            return 0;
        };
        let anchors = segment.anchors();
        let mut reclaimed = 0usize;

        for anchor in anchors
            .small
            .into_iter()
            .chain(anchors.medium)
            .chain(anchors.large)
        {
            let Some(occupant) = world.anchor_occupant(anchor) else {
                continue;
            };
            world.set_anchor_occupant(anchor, None);
            if let Some(instance) = self.instances.get_mut(&occupant) {
                instance.in_use = false;
                instance.container = ItemContainer::PoolRoot;
                instance.local_transform = Transform::IDENTITY;
            }
            reclaimed += 1;
        }

        reclaimed
    }

    fn known_size(&self, id: ItemId) -> Option<ItemSize> {
        if let Some(instance) = self.instances.get(&id) {
            return Some(instance.size);
        }
        self.catalog.get(id).map(|prototype| prototype.size)
    }

    /// Ensures a free instance exists for the id: reuses the pooled one or
    /// creates it from the catalog on first sight.
    fn checkout(&mut self, id: ItemId) -> Result<(), AssemblyError> {
        if let Some(instance) = self.instances.get(&id) {
            if instance.in_use {
                return Err(AssemblyError::ItemBusy { id });
            }
            return Ok(());
        }

        let prototype = self
            .catalog
            .get(id)
            .ok_or(AssemblyError::ItemNotFound { id })?;
        self.instances.insert(
            id,
            ItemInstance {
                id,
                size: prototype.size,
                in_use: false,
                container: ItemContainer::PoolRoot,
                local_transform: Transform::IDENTITY,
            },
        );
        Ok(())
    }

    /// Draws anchors uniformly at random without replacement until an
    /// unoccupied one turns up. `AnchorsExhausted` means the candidate pool
    /// ran dry and the calling tier must stop.
    fn try_place(
        &mut self,
        world: &mut LevelWorld,
        id: ItemId,
        size: ItemSize,
        mut candidates: Vec<AnchorRef>,
    ) -> Result<(), AssemblyError> {
        let selected = loop {
            if candidates.is_empty() {
                break None;
            }
            let drawn = self.rng.gen_range(0..candidates.len());
            let anchor = candidates.swap_remove(drawn);
            if world.anchor_occupant(anchor).is_none() {
                break Some(anchor);
            }
        };
        let Some(anchor) = selected else {
            return Err(AssemblyError::AnchorsExhausted {
                tier: size.anchor_tier(),
            });
        };

        let Some(prototype) = self.catalog.get(id) else {
            return Err(AssemblyError::ItemNotFound { id });
        };
        let mut rotation = prototype.transform.rotation_euler_degrees;
        let (random_x, random_y, random_z) = (
            prototype.random_rot_x,
            prototype.random_rot_y,
            prototype.random_rot_z,
        );
        let prototype_position = prototype.transform.position;
        let prototype_scale = prototype.transform.scale;
        if random_x {
            rotation.x = self.rng.gen_range(0.0..360.0);
        }
        if random_y {
            rotation.y = self.rng.gen_range(0.0..360.0);
        }
        if random_z {
            rotation.z = self.rng.gen_range(0.0..360.0);
        }

        let Some(instance) = self.instances.get_mut(&id) else {
            return Err(AssemblyError::ItemNotFound { id });
        };
        let scale = if prototype_scale == Vec3::ZERO {
            instance.local_transform.scale
        } else {
            prototype_scale
        };
        instance.in_use = true;
        instance.container = ItemContainer::Anchor(anchor);
        instance.local_transform = Transform {
            position: prototype_position,
            rotation_euler_degrees: rotation,
            scale,
        };
        world.set_anchor_occupant(anchor, Some(id));
        Ok(())
    }
}

fn free_large_anchor_count(world: &LevelWorld, segment_id: SegmentId) -> usize {
    world
        .segment(segment_id)
        .map(|segment| segment.free_anchor_count(AnchorTier::Large))
        .unwrap_or(0)
}
