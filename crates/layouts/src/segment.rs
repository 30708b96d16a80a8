use crate::catalog::LayoutPrototype;
use crate::math::{Vec3, WorldPose};
use crate::nav::{NavLinkData, NavLinkId, NavLinkRegistry};
use crate::types::{AnchorTier, ItemId, LayoutKind, SegmentId};

const NAV_LINK_START_NUDGE_X: f32 = 0.5;
const NAV_LINK_END_NUDGE_X: f32 = -0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentState {
    Pooled,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorState {
    Locked,
    Closed,
    Open,
}

/// Data carried by a wired door. The embedding application detects the
/// traversal and hands this value back to the assembly controller, which
/// pattern-matches on it; no callback is captured anywhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoorTrigger {
    pub source: SegmentId,
    pub next_kind: LayoutKind,
    pub offset: Vec3,
    pub rotation_euler_degrees: Vec3,
    pub starts_sweep: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Door {
    state: DoorState,
    local_rotation_euler_degrees: Vec3,
    trigger: Option<DoorTrigger>,
}

impl Door {
    fn new(local_rotation_euler_degrees: Vec3) -> Self {
        Self {
            state: DoorState::Locked,
            local_rotation_euler_degrees,
            trigger: None,
        }
    }

    pub fn state(&self) -> DoorState {
        self.state
    }

    /// State changes come from the external door behavior (animation,
    /// interaction), not from the controller.
    pub fn set_state(&mut self, state: DoorState) {
        self.state = state;
    }

    pub fn trigger(&self) -> Option<DoorTrigger> {
        self.trigger
    }

    pub fn local_rotation_euler_degrees(&self) -> Vec3 {
        self.local_rotation_euler_degrees
    }

    pub fn set_local_rotation_euler_degrees(&mut self, rotation: Vec3) {
        self.local_rotation_euler_degrees = rotation;
    }
}

/// One slot that can host at most one item instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorSlot {
    pub local_position: Vec3,
    occupant: Option<ItemId>,
}

impl AnchorSlot {
    fn new(local_position: Vec3) -> Self {
        Self {
            local_position,
            occupant: None,
        }
    }

    pub fn occupant(&self) -> Option<ItemId> {
        self.occupant
    }

    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }
}

/// Stable reference to an anchor slot on a specific segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnchorRef {
    pub segment: SegmentId,
    pub tier: AnchorTier,
    pub index: usize,
}

/// Snapshot of a segment's anchor references, one list per tier. These are
/// copies; mutating them cannot touch the segment's own slot arrays.
#[derive(Debug, Clone, Default)]
pub struct SegmentAnchors {
    pub small: Vec<AnchorRef>,
    pub medium: Vec<AnchorRef>,
    pub large: Vec<AnchorRef>,
}

/// A placed (or pooled) instance of a layout prototype. Cycles between
/// `Pooled` and `Active` for the lifetime of the world; never destroyed.
#[derive(Debug, Clone)]
pub struct LayoutSegment {
    id: SegmentId,
    kind: LayoutKind,
    state: SegmentState,
    map_index: Option<usize>,
    pose: WorldPose,
    entrance_door_enabled: bool,
    doors: Vec<Door>,
    recorded_door_rotations: Vec<Vec3>,
    next_offsets: Vec<Vec3>,
    next_rotations: Vec<Vec3>,
    small_anchors: Vec<AnchorSlot>,
    medium_anchors: Vec<AnchorSlot>,
    large_anchors: Vec<AnchorSlot>,
    nav_link: Option<NavLinkId>,
    item_list: Vec<ItemId>,
}

impl LayoutSegment {
    pub(crate) fn from_prototype(id: SegmentId, prototype: &LayoutPrototype) -> Self {
        Self {
            id,
            kind: prototype.kind,
            state: SegmentState::Pooled,
            map_index: None,
            pose: WorldPose::ORIGIN,
            entrance_door_enabled: false,
            doors: prototype
                .door_rotations
                .iter()
                .map(|rotation| Door::new(*rotation))
                .collect(),
            recorded_door_rotations: Vec::new(),
            next_offsets: prototype.next_offsets.clone(),
            next_rotations: prototype.next_rotations.clone(),
            small_anchors: prototype
                .small_anchors
                .iter()
                .map(|position| AnchorSlot::new(*position))
                .collect(),
            medium_anchors: prototype
                .medium_anchors
                .iter()
                .map(|position| AnchorSlot::new(*position))
                .collect(),
            large_anchors: prototype
                .large_anchors
                .iter()
                .map(|position| AnchorSlot::new(*position))
                .collect(),
            nav_link: None,
            item_list: Vec::new(),
        }
    }

    pub fn id(&self) -> SegmentId {
        self.id
    }

    pub fn kind(&self) -> LayoutKind {
        self.kind
    }

    pub fn state(&self) -> SegmentState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SegmentState::Active
    }

    pub fn map_index(&self) -> Option<usize> {
        self.map_index
    }

    pub(crate) fn clear_map_index(&mut self) {
        self.map_index = None;
    }

    pub fn pose(&self) -> WorldPose {
        self.pose
    }

    pub(crate) fn activate_at(&mut self, pose: WorldPose) {
        self.pose = pose;
        self.state = SegmentState::Active;
    }

    /// Connector offsets handed to the successor segment as link points.
    pub fn next_offsets(&self) -> &[Vec3] {
        &self.next_offsets
    }

    pub fn has_doors(&self) -> bool {
        !self.doors.is_empty()
    }

    pub fn doors(&self) -> &[Door] {
        &self.doors
    }

    pub fn door_mut(&mut self, index: usize) -> Option<&mut Door> {
        self.doors.get_mut(index)
    }

    pub fn entrance_door_enabled(&self) -> bool {
        self.entrance_door_enabled
    }

    pub fn set_entrance_door_enabled(&mut self, enabled: bool) {
        self.entrance_door_enabled = enabled;
    }

    pub fn item_list(&self) -> &[ItemId] {
        &self.item_list
    }

    pub(crate) fn set_item_list(&mut self, items: Vec<ItemId>) {
        self.item_list = items;
    }

    pub fn anchors(&self) -> SegmentAnchors {
        SegmentAnchors {
            small: self.anchor_refs(AnchorTier::Small),
            medium: self.anchor_refs(AnchorTier::Medium),
            large: self.anchor_refs(AnchorTier::Large),
        }
    }

    fn anchor_refs(&self, tier: AnchorTier) -> Vec<AnchorRef> {
        (0..self.tier_slots(tier).len())
            .map(|index| AnchorRef {
                segment: self.id,
                tier,
                index,
            })
            .collect()
    }

    fn tier_slots(&self, tier: AnchorTier) -> &[AnchorSlot] {
        match tier {
            AnchorTier::Small => &self.small_anchors,
            AnchorTier::Medium => &self.medium_anchors,
            AnchorTier::Large => &self.large_anchors,
        }
    }

    fn tier_slots_mut(&mut self, tier: AnchorTier) -> &mut [AnchorSlot] {
        match tier {
            AnchorTier::Small => &mut self.small_anchors,
            AnchorTier::Medium => &mut self.medium_anchors,
            AnchorTier::Large => &mut self.large_anchors,
        }
    }

    pub fn anchor(&self, tier: AnchorTier, index: usize) -> Option<&AnchorSlot> {
        self.tier_slots(tier).get(index)
    }

    pub(crate) fn set_anchor_occupant(
        &mut self,
        tier: AnchorTier,
        index: usize,
        occupant: Option<ItemId>,
    ) {
        if let Some(slot) = self.tier_slots_mut(tier).get_mut(index) {
            slot.occupant = occupant;
        }
    }

    pub fn free_anchor_count(&self, tier: AnchorTier) -> usize {
        self.tier_slots(tier)
            .iter()
            .filter(|slot| !slot.is_occupied())
            .count()
    }

    /// Activation-time wiring: assign the map position, register the nav
    /// connector back to the predecessor, shut the entrance, arm the exit
    /// doors.
    pub(crate) fn setup(
        &mut self,
        map_index: usize,
        next_kinds: &[LayoutKind],
        is_end_of_zone: bool,
        previous_link_points: Option<&[Vec3]>,
        nav: &mut NavLinkRegistry,
    ) {
        self.map_index = Some(map_index);

        if let Some(points) = previous_link_points {
            self.register_nav_link(points, nav);
        }

        self.entrance_door_enabled = false;
        if !self.doors.is_empty() {
            self.wire_doors(next_kinds, is_end_of_zone);
        }
    }

    // Only a single connector pair is registered even when the segment has
    // several doors; the first link point stands in for all of them.
    fn register_nav_link(&mut self, previous_link_points: &[Vec3], nav: &mut NavLinkRegistry) {
        let Some(first_point) = previous_link_points.first() else {
            return;
        };
        let start = first_point.add(Vec3::new(NAV_LINK_START_NUDGE_X, 0.0, 0.0));
        let end = self
            .pose
            .position
            .add(Vec3::new(NAV_LINK_END_NUDGE_X, 0.0, 0.0));
        self.nav_link = Some(nav.add_link(NavLinkData::between(start, end)));
    }

    fn wire_doors(&mut self, next_kinds: &[LayoutKind], is_end_of_zone: bool) {
        for index in 0..self.doors.len() {
            self.recorded_door_rotations
                .push(self.doors[index].local_rotation_euler_degrees);

            let next_kind = next_kinds.get(index).copied();
            let Some(next_kind) = next_kind.filter(|kind| *kind != LayoutKind::None) else {
                self.doors[index].state = DoorState::Locked;
                self.doors[index].trigger = None;
                continue;
            };

            let offset = self.next_offsets.get(index).copied().unwrap_or(Vec3::ZERO);
            let rotation = self
                .next_rotations
                .get(index)
                .copied()
                .unwrap_or(Vec3::ZERO);
            let starts_sweep = is_end_of_zone && index == next_kinds.len() - 1;

            self.doors[index].state = DoorState::Closed;
            self.doors[index].trigger = Some(DoorTrigger {
                source: self.id,
                next_kind,
                offset,
                rotation_euler_degrees: rotation,
                starts_sweep,
            });
        }
    }

    /// Deactivation teardown: drop the nav connector, restore the door
    /// rotations recorded at setup time, disarm all triggers, return to the
    /// pool.
    pub(crate) fn deactivate(&mut self, nav: &mut NavLinkRegistry) {
        if let Some(link) = self.nav_link.take() {
            nav.remove_link(link);
        }

        for (door, recorded) in self
            .doors
            .iter_mut()
            .zip(self.recorded_door_rotations.iter())
        {
            door.local_rotation_euler_degrees = *recorded;
            door.trigger = None;
        }
        self.recorded_door_rotations.clear();

        self.state = SegmentState::Pooled;
    }
}
