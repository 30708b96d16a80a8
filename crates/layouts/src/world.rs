use crate::catalog::LayoutPrototype;
use crate::math::Vec3;
use crate::nav::NavLinkRegistry;
use crate::segment::{AnchorRef, LayoutSegment};
use crate::types::{ItemId, LayoutKind, SegmentId};

/// Arena of segment instances plus the nav-link registry they publish
/// into. Segments are inserted once and recycled forever after; a
/// `SegmentId` is an index that never dangles.
#[derive(Debug, Default)]
pub struct LevelWorld {
    segments: Vec<LayoutSegment>,
    nav: NavLinkRegistry,
}

impl LevelWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_from_prototype(&mut self, prototype: &LayoutPrototype) -> SegmentId {
        let id = SegmentId(self.segments.len() as u32);
        self.segments.push(LayoutSegment::from_prototype(id, prototype));
        id
    }

    pub fn segment(&self, id: SegmentId) -> Option<&LayoutSegment> {
        self.segments.get(id.0 as usize)
    }

    pub fn segment_mut(&mut self, id: SegmentId) -> Option<&mut LayoutSegment> {
        self.segments.get_mut(id.0 as usize)
    }

    pub fn segments(&self) -> impl Iterator<Item = &LayoutSegment> {
        self.segments.iter()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn nav(&self) -> &NavLinkRegistry {
        &self.nav
    }

    /// The active segment currently holding a map position, if any. At most
    /// one segment can hold a given index while active.
    pub fn active_segment_at_index(&self, map_index: usize) -> Option<SegmentId> {
        self.segments
            .iter()
            .find(|segment| segment.is_active() && segment.map_index() == Some(map_index))
            .map(|segment| segment.id())
    }

    /// Pooled instance of the requested kind, for recycling.
    pub fn pooled_segment_of_kind(&self, kind: LayoutKind) -> Option<SegmentId> {
        self.segments
            .iter()
            .find(|segment| !segment.is_active() && segment.kind() == kind)
            .map(|segment| segment.id())
    }

    pub fn setup_segment(
        &mut self,
        id: SegmentId,
        map_index: usize,
        next_kinds: &[LayoutKind],
        is_end_of_zone: bool,
        previous_link_points: Option<&[Vec3]>,
    ) {
        let Self { segments, nav } = self;
        if let Some(segment) = segments.get_mut(id.0 as usize) {
            segment.setup(
                map_index,
                next_kinds,
                is_end_of_zone,
                previous_link_points,
                nav,
            );
        }
    }

    pub fn deactivate_segment(&mut self, id: SegmentId) {
        let Self { segments, nav } = self;
        if let Some(segment) = segments.get_mut(id.0 as usize) {
            segment.deactivate(nav);
        }
    }

    pub fn anchor_occupant(&self, anchor: AnchorRef) -> Option<ItemId> {
        self.segment(anchor.segment)
            .and_then(|segment| segment.anchor(anchor.tier, anchor.index))
            .and_then(|slot| slot.occupant())
    }

    pub(crate) fn set_anchor_occupant(&mut self, anchor: AnchorRef, occupant: Option<ItemId>) {
        if let Some(segment) = self.segment_mut(anchor.segment) {
            segment.set_anchor_occupant(anchor.tier, anchor.index, occupant);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_support::layout_prototype;
    use crate::math::WorldPose;

    #[test]
    fn inserted_segments_get_sequential_stable_ids() {
        let mut world = LevelWorld::new();
        let a = world.insert_from_prototype(&layout_prototype(LayoutKind::MainHall, 1));
        let b = world.insert_from_prototype(&layout_prototype(LayoutKind::StudyModern, 0));
        assert_ne!(a, b);
        assert_eq!(world.segment(a).expect("a").kind(), LayoutKind::MainHall);
        assert_eq!(world.segment(b).expect("b").kind(), LayoutKind::StudyModern);
    }

    #[test]
    fn active_segment_lookup_ignores_pooled_instances() {
        let mut world = LevelWorld::new();
        let id = world.insert_from_prototype(&layout_prototype(LayoutKind::StudyModern, 1));
        world.setup_segment(id, 2, &[], false, None);
        assert_eq!(world.active_segment_at_index(2), None);

        world
            .segment_mut(id)
            .expect("segment")
            .activate_at(WorldPose::ORIGIN);
        assert_eq!(world.active_segment_at_index(2), Some(id));
    }

    #[test]
    fn pooled_lookup_skips_active_instances() {
        let mut world = LevelWorld::new();
        let id = world.insert_from_prototype(&layout_prototype(LayoutKind::StudyModern, 1));
        assert_eq!(world.pooled_segment_of_kind(LayoutKind::StudyModern), Some(id));

        world
            .segment_mut(id)
            .expect("segment")
            .activate_at(WorldPose::ORIGIN);
        assert_eq!(world.pooled_segment_of_kind(LayoutKind::StudyModern), None);

        world.deactivate_segment(id);
        assert_eq!(world.pooled_segment_of_kind(LayoutKind::StudyModern), Some(id));
    }
}
