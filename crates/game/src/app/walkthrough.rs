use layouts::{AssemblyContext, DoorState, DoorTrigger, LevelStyle, SegmentId, StyleSink};
use tracing::{debug, info};

use super::bootstrap::LevelRuntime;

const MAX_TICKS: u32 = 256;

/// Stand-in for the presentation subsystem: remembers the current theme and
/// logs transitions.
#[derive(Debug, Default)]
struct ThemeTracker {
    current: Option<LevelStyle>,
}

impl StyleSink for ThemeTracker {
    fn set_current_style(&mut self, style: LevelStyle) {
        if self.current != Some(style) {
            info!(?style, "level_style_changed");
            self.current = Some(style);
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct WalkthroughSummary {
    pub(crate) ticks: u32,
    pub(crate) doors_traversed: u32,
}

/// Walks the level to its end on a cooperative tick loop: one sweep step
/// per tick, then at most one door traversal, the way a player moving
/// through the level would drive the controller.
pub(crate) fn run_walkthrough(runtime: &mut LevelRuntime) -> Result<WalkthroughSummary, String> {
    let mut theme = ThemeTracker::default();

    {
        let mut ctx = AssemblyContext {
            world: &mut runtime.world,
            registry: &runtime.registry,
            items: &mut runtime.items,
            style: &mut theme,
        };
        runtime
            .assembly
            .activate_first(&mut ctx)
            .map_err(|error| format!("activate first layout: {error}"))?;
    }

    let mut summary = WalkthroughSummary::default();
    for tick in 0..MAX_TICKS {
        summary.ticks = tick + 1;

        {
            let mut ctx = AssemblyContext {
                world: &mut runtime.world,
                registry: &runtime.registry,
                items: &mut runtime.items,
                style: &mut theme,
            };
            runtime.assembly.step_sweep(&mut ctx);
        }

        if let Some((segment, door_index, trigger)) = frontier_door(runtime) {
            if let Some(door) = runtime
                .world
                .segment_mut(segment)
                .and_then(|segment| segment.door_mut(door_index))
            {
                door.set_state(DoorState::Open);
            }
            debug!(segment = %segment, door = door_index, "door_traversed");

            let mut ctx = AssemblyContext {
                world: &mut runtime.world,
                registry: &runtime.registry,
                items: &mut runtime.items,
                style: &mut theme,
            };
            runtime.assembly.handle_door_trigger(&mut ctx, trigger);
            summary.doors_traversed += 1;
        } else if !runtime.assembly.sweep_is_running() {
            break;
        }
    }

    Ok(summary)
}

/// The first still-closed wired door on the newest active segment.
fn frontier_door(runtime: &LevelRuntime) -> Option<(SegmentId, usize, DoorTrigger)> {
    let frontier = runtime
        .world
        .segments()
        .filter(|segment| segment.is_active() && segment.map_index().is_some())
        .max_by_key(|segment| segment.map_index())?;

    frontier
        .doors()
        .iter()
        .enumerate()
        .find(|(_, door)| door.state() == DoorState::Closed && door.trigger().is_some())
        .and_then(|(index, door)| {
            door.trigger()
                .map(|trigger| (frontier.id(), index, trigger))
        })
}
