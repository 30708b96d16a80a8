use crate::types::LayoutKind;

/// Coarse theme bucket forwarded to the presentation layer whenever a
/// segment activates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevelStyle {
    Base,
    Modern,
    Vintage,
    Derelict,
    Clinical,
}

impl LevelStyle {
    /// Fixed kind-to-style lookup. Kinds without a themed bucket fall back
    /// to `Base`.
    pub fn for_kind(kind: LayoutKind) -> LevelStyle {
        match kind {
            LayoutKind::MainHall => LevelStyle::Base,
            LayoutKind::StraightHallModern
            | LayoutKind::TeeHallModern
            | LayoutKind::ElbowLeftModern
            | LayoutKind::ElbowRightModern
            | LayoutKind::StudyModern
            | LayoutKind::PantryModern
            | LayoutKind::GalleryModern
            | LayoutKind::PlayroomModern => LevelStyle::Modern,
            LayoutKind::StraightHallVintage
            | LayoutKind::TeeHallVintage
            | LayoutKind::ElbowLeftVintage
            | LayoutKind::ElbowRightVintage
            | LayoutKind::BedroomVintage
            | LayoutKind::CabinVintage
            | LayoutKind::PlayroomVintage => LevelStyle::Vintage,
            LayoutKind::StraightHallDerelict
            | LayoutKind::TeeHallDerelict
            | LayoutKind::ElbowLeftDerelict
            | LayoutKind::ElbowRightDerelict
            | LayoutKind::WashroomDerelict
            | LayoutKind::ShedDerelict => LevelStyle::Derelict,
            LayoutKind::StraightHallClinical
            | LayoutKind::TeeHallClinical
            | LayoutKind::CellClinical => LevelStyle::Clinical,
            _ => LevelStyle::Base,
        }
    }
}

/// Outbound notification seam to the theming subsystem. Fire-and-forget:
/// the controller never reads anything back.
pub trait StyleSink {
    fn set_current_style(&mut self, style: LevelStyle);
}

/// Sink that drops every notification. Useful when no presentation layer
/// is attached.
#[derive(Debug, Default)]
pub struct NullStyleSink;

impl StyleSink for NullStyleSink {
    fn set_current_style(&mut self, _style: LevelStyle) {}
}
