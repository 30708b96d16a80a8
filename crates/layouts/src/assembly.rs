use std::collections::VecDeque;

use tracing::{debug, info, warn};

use crate::error::AssemblyError;
use crate::items::ItemPool;
use crate::map::{LayoutMap, MapEntry};
use crate::math::{Vec3, WorldPose};
use crate::registry::LayoutRegistry;
use crate::segment::DoorTrigger;
use crate::style::{LevelStyle, StyleSink};
use crate::types::{LayoutKind, SegmentId};
use crate::world::LevelWorld;

/// Borrows the controller needs for one operation. Built fresh per call by
/// the owning orchestrator; nothing here is retained.
pub struct AssemblyContext<'a> {
    pub world: &'a mut LevelWorld,
    pub registry: &'a LayoutRegistry,
    pub items: &'a mut ItemPool,
    pub style: &'a mut dyn StyleSink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SweepState {
    Idle,
    Running,
}

/// Walks the loaded map: activates segments as doors are traversed, and
/// recycles stale ones through the step-wise deactivation sweep.
#[derive(Debug)]
pub struct LevelAssembly {
    loaded_map: Vec<MapEntry>,
    current_index: usize,
    deactivate_queue: VecDeque<SegmentId>,
    sweep_state: SweepState,
}

impl LevelAssembly {
    pub fn new(map: &LayoutMap) -> Self {
        Self {
            loaded_map: map.enabled_entries(),
            current_index: 0,
            deactivate_queue: VecDeque::new(),
            sweep_state: SweepState::Idle,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn map_len(&self) -> usize {
        self.loaded_map.len()
    }

    pub fn sweep_is_running(&self) -> bool {
        self.sweep_state == SweepState::Running
    }

    pub fn pending_deactivations(&self) -> usize {
        self.deactivate_queue.len()
    }

    /// Activates the first map entry at the world origin.
    pub fn activate_first(
        &mut self,
        ctx: &mut AssemblyContext<'_>,
    ) -> Result<SegmentId, AssemblyError> {
        let Some(entry) = self.loaded_map.get(self.current_index) else {
            return Err(AssemblyError::EndOfSequence {
                index: self.current_index,
            });
        };
        let kind = entry.kind;
        self.activate_layout(ctx, None, kind, Vec3::ZERO, Vec3::ZERO)
    }

    /// Resolves and activates the next segment, chained after `previous` at
    /// the given local offset and rotation.
    pub fn activate_layout(
        &mut self,
        ctx: &mut AssemblyContext<'_>,
        previous: Option<SegmentId>,
        next_kind: LayoutKind,
        offset: Vec3,
        rotation_euler_degrees: Vec3,
    ) -> Result<SegmentId, AssemblyError> {
        if self.current_index >= self.loaded_map.len() {
            debug!(index = self.current_index, "end of map");
            return Err(AssemblyError::EndOfSequence {
                index: self.current_index,
            });
        }

        let segment_id = ctx.registry.get_layout(ctx.world, next_kind)?;

        // Parent under the predecessor just long enough to resolve the
        // world pose, then stand alone.
        let parent_pose = previous
            .and_then(|id| ctx.world.segment(id))
            .map(|segment| segment.pose());
        let pose = match parent_pose {
            Some(parent) => parent.compose_local(offset, rotation_euler_degrees),
            None => WorldPose::from_local(offset, rotation_euler_degrees),
        };
        if let Some(segment) = ctx.world.segment_mut(segment_id) {
            segment.activate_at(pose);
        }

        let index = self.current_index;
        let entry = self.loaded_map[index].clone();
        let is_end_of_zone =
            index + 1 < self.loaded_map.len() && entry.zone != self.loaded_map[index + 1].zone;

        let segment_kind = ctx
            .world
            .segment(segment_id)
            .map(|segment| segment.kind())
            .unwrap_or(next_kind);
        ctx.style
            .set_current_style(LevelStyle::for_kind(segment_kind));

        let previous_link_points = previous
            .and_then(|id| ctx.world.segment(id))
            .map(|segment| segment.next_offsets().to_vec());
        ctx.world.setup_segment(
            segment_id,
            index,
            &entry.next_kinds,
            is_end_of_zone,
            previous_link_points.as_deref(),
        );

        if index == 0 {
            if let Some(segment) = ctx.world.segment_mut(segment_id) {
                segment.set_entrance_door_enabled(true);
            }
        }

        if let Some(segment) = ctx.world.segment_mut(segment_id) {
            segment.set_item_list(entry.items.iter().map(|reference| reference.id).collect());
        }
        let fill = ctx.items.fill_items(ctx.world, segment_id);

        let has_doors = ctx
            .world
            .segment(segment_id)
            .map(|segment| segment.has_doors())
            .unwrap_or(false);
        if has_doors {
            self.current_index += 1;
        }

        info!(
            segment = %segment_id,
            kind = ?segment_kind,
            index,
            is_end_of_zone,
            items_placed = fill.placed,
            "segment_activated"
        );
        Ok(segment_id)
    }

    /// Entry point for traversal events coming back from the door
    /// subsystem. Chain-activates the trigger's target and, on zone-final
    /// doors, kicks off the deactivation sweep.
    pub fn handle_door_trigger(&mut self, ctx: &mut AssemblyContext<'_>, trigger: DoorTrigger) {
        if trigger.starts_sweep {
            self.start_sweep();
        }

        match self.activate_layout(
            ctx,
            Some(trigger.source),
            trigger.next_kind,
            trigger.offset,
            trigger.rotation_euler_degrees,
        ) {
            Ok(_) => {}
            Err(AssemblyError::EndOfSequence { index }) => {
                debug!(index, "door trigger past end of map");
            }
            Err(error) => {
                warn!(%error, "door trigger could not activate next layout");
            }
        }
    }

    /// Starts the sweep if it is idle. A sweep that is already running is
    /// left alone; there is no cancellation.
    pub fn start_sweep(&mut self) {
        if self.sweep_state == SweepState::Idle {
            debug!(
                pending = self.deactivate_queue.len(),
                "deactivation_sweep_started"
            );
            self.sweep_state = SweepState::Running;
        }
    }

    /// One sweep increment, called once per scheduler tick. Deactivates a
    /// single queued segment; once the queue drains, re-scans for stale
    /// segments to queue up for the next sweep and goes idle.
    pub fn step_sweep(&mut self, ctx: &mut AssemblyContext<'_>) {
        if self.sweep_state != SweepState::Running {
            return;
        }

        if let Some(segment_id) = self.deactivate_queue.pop_front() {
            let map_index = ctx
                .world
                .segment(segment_id)
                .and_then(|segment| segment.map_index());
            ctx.world.deactivate_segment(segment_id);
            if let Some(map_index) = map_index {
                self.open_zone_entrance_door(ctx, map_index + 1);
            }
            let reclaimed = ctx.items.remove_from(ctx.world, segment_id);
            if let Some(segment) = ctx.world.segment_mut(segment_id) {
                segment.clear_map_index();
            }
            debug!(segment = %segment_id, items_reclaimed = reclaimed, "segment_deactivated");
        } else {
            self.mark_for_deactivation(ctx);
            self.sweep_state = SweepState::Idle;
        }
    }

    // Re-checked on every dequeue: a still-pending queue means the zone is
    // not yet confirmed clear, so the next entrance stays shut.
    fn open_zone_entrance_door(&self, ctx: &mut AssemblyContext<'_>, index: usize) {
        if !self.deactivate_queue.is_empty() || index >= self.loaded_map.len() {
            return;
        }
        if let Some(next) = ctx.world.active_segment_at_index(index) {
            if let Some(segment) = ctx.world.segment_mut(next) {
                segment.set_entrance_door_enabled(true);
            }
        }
    }

    fn mark_for_deactivation(&mut self, ctx: &mut AssemblyContext<'_>) {
        for segment in ctx.world.segments() {
            if let Some(map_index) = segment.map_index() {
                if map_index <= self.current_index {
                    self.deactivate_queue.push_back(segment.id());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_support::{item_prototype, layout_prototype};
    use crate::catalog::{ItemCatalog, LayoutCatalog};
    use crate::map::{ItemRef, MapEntryConfig};
    use crate::segment::DoorState;
    use crate::types::{ItemId, ItemSize};

    #[derive(Debug, Default)]
    struct RecordingStyleSink {
        seen: Vec<LevelStyle>,
    }

    impl StyleSink for RecordingStyleSink {
        fn set_current_style(&mut self, style: LevelStyle) {
            self.seen.push(style);
        }
    }

    struct Harness {
        world: LevelWorld,
        registry: LayoutRegistry,
        items: ItemPool,
        style: RecordingStyleSink,
        assembly: LevelAssembly,
    }

    impl Harness {
        fn new(map: &LayoutMap) -> Self {
            let mut world = LevelWorld::new();
            let registry = LayoutRegistry::new(
                LayoutCatalog::from_prototypes(vec![
                    layout_prototype(LayoutKind::MainHall, 1),
                    layout_prototype(LayoutKind::StraightHallModern, 1),
                    layout_prototype(LayoutKind::TeeHallVintage, 2),
                    layout_prototype(LayoutKind::StudyModern, 0),
                ]),
                &mut world,
            );
            let items = ItemPool::new(
                ItemCatalog::from_prototypes(vec![
                    item_prototype(1, ItemSize::Large),
                    item_prototype(2, ItemSize::Medium),
                ]),
                11,
            );
            Self {
                world,
                registry,
                items,
                style: RecordingStyleSink::default(),
                assembly: LevelAssembly::new(map),
            }
        }

        fn activate_first(&mut self) -> Result<SegmentId, AssemblyError> {
            let mut ctx = AssemblyContext {
                world: &mut self.world,
                registry: &self.registry,
                items: &mut self.items,
                style: &mut self.style,
            };
            self.assembly.activate_first(&mut ctx)
        }

        fn trigger_first_closed_door(&mut self, segment: SegmentId) -> Option<SegmentId> {
            let trigger = self
                .world
                .segment(segment)
                .expect("segment")
                .doors()
                .iter()
                .find(|door| door.state() == DoorState::Closed)
                .and_then(|door| door.trigger())?;
            let before = self.assembly.current_index();
            let mut ctx = AssemblyContext {
                world: &mut self.world,
                registry: &self.registry,
                items: &mut self.items,
                style: &mut self.style,
            };
            self.assembly.handle_door_trigger(&mut ctx, trigger);
            self.world
                .active_segment_at_index(before)
                .filter(|id| *id != segment)
        }

        fn step_sweep(&mut self) {
            let mut ctx = AssemblyContext {
                world: &mut self.world,
                registry: &self.registry,
                items: &mut self.items,
                style: &mut self.style,
            };
            self.assembly.step_sweep(&mut ctx);
        }
    }

    fn entry(
        zone: i32,
        kind: LayoutKind,
        items: &[u32],
        next_kinds: &[LayoutKind],
    ) -> MapEntry {
        MapEntry {
            enable: true,
            zone,
            kind,
            items: items.iter().map(|id| ItemRef { id: ItemId(*id) }).collect(),
            next_kinds: next_kinds.to_vec(),
            config: MapEntryConfig::default(),
        }
    }

    fn map_of(entries: Vec<MapEntry>) -> LayoutMap {
        LayoutMap { layouts: entries }
    }

    #[test]
    fn first_segment_opens_its_entrance_door() {
        let map = map_of(vec![entry(
            0,
            LayoutKind::MainHall,
            &[],
            &[LayoutKind::StraightHallModern],
        )]);
        let mut harness = Harness::new(&map);
        let first = harness.activate_first().expect("first segment");
        assert!(harness
            .world
            .segment(first)
            .expect("segment")
            .entrance_door_enabled());
        assert_eq!(harness.style.seen, vec![LevelStyle::Base]);
    }

    #[test]
    fn locked_terminal_door_still_advances_the_index() {
        // Single entry whose only door points at None: the door is locked,
        // but the segment still counts as having doors.
        let map = map_of(vec![entry(0, LayoutKind::MainHall, &[], &[LayoutKind::None])]);
        let mut harness = Harness::new(&map);
        let first = harness.activate_first().expect("first segment");

        let segment = harness.world.segment(first).expect("segment");
        assert_eq!(segment.doors()[0].state(), DoorState::Locked);
        assert!(segment.doors()[0].trigger().is_none());
        assert_eq!(harness.assembly.current_index(), 1);

        // The next activation attempt hits the end of the sequence.
        let mut ctx = AssemblyContext {
            world: &mut harness.world,
            registry: &harness.registry,
            items: &mut harness.items,
            style: &mut harness.style,
        };
        let result = harness.assembly.activate_layout(
            &mut ctx,
            Some(first),
            LayoutKind::StraightHallModern,
            Vec3::ZERO,
            Vec3::ZERO,
        );
        assert_eq!(result, Err(AssemblyError::EndOfSequence { index: 1 }));
    }

    #[test]
    fn dead_end_segment_never_advances_the_index() {
        let map = map_of(vec![
            entry(0, LayoutKind::StudyModern, &[], &[]),
            entry(0, LayoutKind::StraightHallModern, &[], &[LayoutKind::None]),
        ]);
        let mut harness = Harness::new(&map);
        let first = harness.activate_first().expect("first segment");
        assert!(!harness.world.segment(first).expect("segment").has_doors());
        assert_eq!(harness.assembly.current_index(), 0);
    }

    #[test]
    fn unknown_layout_kind_degrades_without_advancing() {
        let map = map_of(vec![entry(
            0,
            LayoutKind::ShedDerelict,
            &[],
            &[LayoutKind::None],
        )]);
        let mut harness = Harness::new(&map);
        assert_eq!(
            harness.activate_first(),
            Err(AssemblyError::LayoutNotFound {
                kind: LayoutKind::ShedDerelict
            })
        );
        assert_eq!(harness.assembly.current_index(), 0);
    }

    #[test]
    fn zone_final_door_starts_sweep_and_chains_next_entry() {
        let map = map_of(vec![
            entry(0, LayoutKind::MainHall, &[], &[LayoutKind::StraightHallModern]),
            entry(1, LayoutKind::StraightHallModern, &[], &[LayoutKind::None]),
        ]);
        let mut harness = Harness::new(&map);
        let first = harness.activate_first().expect("first segment");

        let trigger = harness.world.segment(first).expect("segment").doors()[0]
            .trigger()
            .expect("wired trigger");
        assert!(trigger.starts_sweep);

        let second = harness
            .trigger_first_closed_door(first)
            .expect("second segment");
        assert!(harness.assembly.sweep_is_running());
        assert_eq!(
            harness.world.segment(second).expect("segment").map_index(),
            Some(1)
        );
        assert_eq!(harness.assembly.current_index(), 2);

        // First step finds an empty queue, so it only scans and enqueues
        // the now-stale segments for the next sweep.
        harness.step_sweep();
        assert!(!harness.assembly.sweep_is_running());
        assert_eq!(harness.assembly.pending_deactivations(), 2);
        assert!(harness.world.segment(first).expect("segment").is_active());
    }

    #[test]
    fn sweep_drains_one_segment_per_step_and_reclaims_items() {
        let map = map_of(vec![
            entry(
                0,
                LayoutKind::MainHall,
                &[1, 2],
                &[LayoutKind::StraightHallModern],
            ),
            entry(1, LayoutKind::StraightHallModern, &[], &[LayoutKind::None]),
        ]);
        let mut harness = Harness::new(&map);
        let first = harness.activate_first().expect("first segment");
        assert!(harness
            .items
            .instance(ItemId(1))
            .map(|instance| instance.in_use())
            .unwrap_or(false));

        harness.trigger_first_closed_door(first).expect("second");
        harness.step_sweep(); // scan-and-enqueue, go idle
        harness.assembly.start_sweep();

        harness.step_sweep(); // deactivates the first stale segment
        assert_eq!(harness.assembly.pending_deactivations(), 1);
        harness.step_sweep(); // deactivates the second
        harness.step_sweep(); // drained: rescan finds nothing, go idle
        assert!(!harness.assembly.sweep_is_running());

        let segment = harness.world.segment(first).expect("segment");
        assert!(!segment.is_active());
        assert_eq!(segment.map_index(), None);
        assert!(!harness
            .items
            .instance(ItemId(1))
            .map(|instance| instance.in_use())
            .unwrap_or(true));
        assert!(harness.world.nav().is_empty());
    }

    #[test]
    fn entrance_door_opens_only_after_queue_fully_drains() {
        let map = map_of(vec![
            entry(0, LayoutKind::MainHall, &[], &[LayoutKind::StraightHallModern]),
            entry(1, LayoutKind::StraightHallModern, &[], &[LayoutKind::TeeHallVintage]),
            entry(
                1,
                LayoutKind::TeeHallVintage,
                &[],
                &[LayoutKind::None, LayoutKind::None],
            ),
        ]);
        let mut harness = Harness::new(&map);
        let first = harness.activate_first().expect("first segment");
        let second = harness
            .trigger_first_closed_door(first)
            .expect("second segment");
        harness.step_sweep(); // enqueue first and second, go idle

        let third = harness
            .trigger_first_closed_door(second)
            .expect("third segment");
        assert!(!harness
            .world
            .segment(third)
            .expect("segment")
            .entrance_door_enabled());

        harness.assembly.start_sweep();
        harness.step_sweep(); // first dequeued, queue still pending
        assert!(!harness
            .world
            .segment(third)
            .expect("segment")
            .entrance_door_enabled());

        harness.step_sweep(); // second dequeued (map index 1), queue empty
        assert!(harness
            .world
            .segment(third)
            .expect("segment")
            .entrance_door_enabled());
    }

    #[test]
    fn starting_an_already_running_sweep_is_a_noop() {
        let map = map_of(vec![entry(0, LayoutKind::MainHall, &[], &[LayoutKind::None])]);
        let mut harness = Harness::new(&map);
        harness.activate_first().expect("first segment");

        harness.assembly.start_sweep();
        assert!(harness.assembly.sweep_is_running());
        harness.assembly.start_sweep();
        assert!(harness.assembly.sweep_is_running());
    }

    #[test]
    fn style_notifications_follow_activated_segment_kinds() {
        let map = map_of(vec![
            entry(0, LayoutKind::MainHall, &[], &[LayoutKind::TeeHallVintage]),
            entry(
                0,
                LayoutKind::TeeHallVintage,
                &[],
                &[LayoutKind::None, LayoutKind::None],
            ),
        ]);
        let mut harness = Harness::new(&map);
        let first = harness.activate_first().expect("first segment");
        harness.trigger_first_closed_door(first).expect("second");
        assert_eq!(
            harness.style.seen,
            vec![LevelStyle::Base, LevelStyle::Vintage]
        );
    }
}
