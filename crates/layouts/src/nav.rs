use std::collections::BTreeMap;

use crate::math::Vec3;

pub const NAV_LINK_WIDTH: f32 = 1.0;
pub const NAV_LINK_DEFAULT_COST: f32 = 1.0;

/// Handle to a registered connector. Owned by the segment that created it
/// and released on deactivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NavLinkId(u64);

/// A traversable connection between two world points, consumed by the
/// external path-planning subsystem.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavLinkData {
    pub start: Vec3,
    pub end: Vec3,
    pub width: f32,
    pub cost: f32,
    pub bidirectional: bool,
}

impl NavLinkData {
    pub fn between(start: Vec3, end: Vec3) -> Self {
        Self {
            start,
            end,
            width: NAV_LINK_WIDTH,
            cost: NAV_LINK_DEFAULT_COST,
            bidirectional: true,
        }
    }
}

#[derive(Debug, Default)]
pub struct NavLinkRegistry {
    next_link_id: u64,
    links: BTreeMap<NavLinkId, NavLinkData>,
}

impl NavLinkRegistry {
    pub fn add_link(&mut self, data: NavLinkData) -> NavLinkId {
        let id = NavLinkId(self.next_link_id);
        self.next_link_id = self.next_link_id.saturating_add(1);
        self.links.insert(id, data);
        id
    }

    pub fn remove_link(&mut self, id: NavLinkId) -> bool {
        self.links.remove(&id).is_some()
    }

    pub fn link(&self, id: NavLinkId) -> Option<&NavLinkData> {
        self.links.get(&id)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
