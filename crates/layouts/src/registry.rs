use tracing::debug;

use crate::catalog::LayoutCatalog;
use crate::error::AssemblyError;
use crate::types::{LayoutKind, SegmentId};
use crate::world::LevelWorld;

/// Resolves layout kinds to segment instances: recycles pooled instances
/// when one exists, instantiates from the catalog otherwise. The main hall
/// is a singleton instantiated eagerly and always handed back as-is.
#[derive(Debug)]
pub struct LayoutRegistry {
    catalog: LayoutCatalog,
    main_hall: Option<SegmentId>,
}

impl LayoutRegistry {
    pub fn new(catalog: LayoutCatalog, world: &mut LevelWorld) -> Self {
        let main_hall = catalog
            .get(LayoutKind::MainHall)
            .map(|prototype| world.insert_from_prototype(prototype));
        Self { catalog, main_hall }
    }

    pub fn main_hall(&self) -> Option<SegmentId> {
        self.main_hall
    }

    pub fn get_layout(
        &self,
        world: &mut LevelWorld,
        kind: LayoutKind,
    ) -> Result<SegmentId, AssemblyError> {
        if kind.is_main_singleton() {
            if let Some(main_hall) = self.main_hall {
                return Ok(main_hall);
            }
        }

        if let Some(pooled) = world.pooled_segment_of_kind(kind) {
            return Ok(pooled);
        }

        if let Some(prototype) = self.catalog.get(kind) {
            return Ok(world.insert_from_prototype(prototype));
        }

        debug!(?kind, "layout kind not found");
        Err(AssemblyError::LayoutNotFound { kind })
    }
}
