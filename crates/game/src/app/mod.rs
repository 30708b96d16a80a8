use tracing::info;

pub(crate) mod bootstrap;
pub(crate) mod walkthrough;

const DEMO_RNG_SEED: u64 = 1107;

pub(crate) fn run() -> Result<(), String> {
    let mut runtime = bootstrap::build_runtime(DEMO_RNG_SEED)?;
    let summary = walkthrough::run_walkthrough(&mut runtime)?;

    info!(
        ticks = summary.ticks,
        doors_traversed = summary.doors_traversed,
        segments_live = runtime.world.segment_count(),
        items_live = runtime.items.live_instance_count(),
        nav_links = runtime.world.nav().len(),
        final_index = runtime.assembly.current_index(),
        "walkthrough_complete"
    );
    Ok(())
}
