use std::fmt;

use serde::{Deserialize, Serialize};

/// Build-time category of a layout segment's shape and theme. `None` is a
/// terminal marker inside next-kind lists: a door pointing at `None` is
/// locked forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayoutKind {
    None,

    MainHall,

    StraightHallModern,
    StraightHallVintage,
    StraightHallDerelict,
    StraightHallClinical,

    TeeHallModern,
    TeeHallVintage,
    TeeHallDerelict,
    TeeHallClinical,

    ElbowLeftModern,
    ElbowLeftVintage,
    ElbowLeftDerelict,

    ElbowRightModern,
    ElbowRightVintage,
    ElbowRightDerelict,

    StudyModern,
    PantryModern,
    GalleryModern,
    PlayroomModern,

    BedroomVintage,
    CabinVintage,
    PlayroomVintage,

    WashroomDerelict,
    ShedDerelict,

    CellClinical,
}

impl LayoutKind {
    /// The one layout kind the registry treats as a reusable singleton.
    pub fn is_main_singleton(self) -> bool {
        matches!(self, LayoutKind::MainHall)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ItemSize {
    Small,
    Medium,
    Large,
}

impl ItemSize {
    pub fn anchor_tier(self) -> AnchorTier {
        match self {
            ItemSize::Small => AnchorTier::Small,
            ItemSize::Medium => AnchorTier::Medium,
            ItemSize::Large => AnchorTier::Large,
        }
    }
}

/// Size class of an anchor slot. Larger tiers admit smaller items, never
/// the reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnchorTier {
    Small,
    Medium,
    Large,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable handle into the segment arena. Segments are pooled, never freed,
/// so a `SegmentId` stays valid for the lifetime of the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentId(pub u32);

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
