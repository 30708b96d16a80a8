use thiserror::Error;

use crate::types::{AnchorTier, ItemId, LayoutKind};

/// Recoverable failures of the assembly pipeline. None of these is fatal:
/// callers log the error and degrade by omitting the segment or item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AssemblyError {
    #[error("no layout prototype registered for kind {kind:?}")]
    LayoutNotFound { kind: LayoutKind },
    #[error("item {id} is not in the item catalog")]
    ItemNotFound { id: ItemId },
    #[error("item {id} is already in use")]
    ItemBusy { id: ItemId },
    #[error("map sequence exhausted at index {index}")]
    EndOfSequence { index: usize },
    #[error("no free {tier:?} anchor remains")]
    AnchorsExhausted { tier: AnchorTier },
}
