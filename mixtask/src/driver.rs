//! Fan a correlation task out over data frames.

use rayon::prelude::*;
use tracing::{info, warn};

use crate::budget::TaskBudget;
use crate::config::TaskConfig;
use crate::correlation::{CorrelationTask, MixedEventTask, SameEventTask, TaskOutput};
use crate::dataframe::DataFrame;
use crate::error::Result;

/// Process as many `frames` as `budget` allows, in parallel.
///
/// Frame `k` gets its own task seeded with `config.seed + k`, so the result
/// does not depend on the thread count. Outputs are merged in frame order.
pub fn run<T: CorrelationTask>(
    config: &TaskConfig,
    budget: &mut TaskBudget,
    frames: Vec<DataFrame>,
) -> Result<TaskOutput> {
    config.validate()?;
    let offered = frames.len();
    let accepted = budget.reserve(offered);
    if accepted < offered {
        warn!(offered, accepted, "frame budget exhausted, skipping remaining frames");
    }

    let outputs = frames
        .into_par_iter()
        .take(accepted)
        .enumerate()
        .map(|(k, mut frame)| -> Result<TaskOutput> {
            let removed = frame.apply_filter(&config.track_filter);
            if removed > 0 {
                info!(frame = k, removed, "global track filter");
            }
            let mut task = T::new(config, config.seed.wrapping_add(k as u64))?;
            task.process(&frame)?;
            Ok(task.into_output())
        })
        .collect::<Result<Vec<_>>>()?;

    let mut total = T::new(config, config.seed)?.into_output();
    for output in outputs {
        total.merge(output)?;
    }
    info!(
        frames = total.frames_processed,
        pairs = total.pairs.len(),
        budget_left = budget.remaining(),
        "run finished"
    );
    Ok(total)
}

pub fn run_same_event(
    config: &TaskConfig,
    budget: &mut TaskBudget,
    frames: Vec<DataFrame>,
) -> Result<TaskOutput> {
    run::<SameEventTask>(config, budget, frames)
}

pub fn run_mixed_event(
    config: &TaskConfig,
    budget: &mut TaskBudget,
    frames: Vec<DataFrame>,
) -> Result<TaskOutput> {
    run::<MixedEventTask>(config, budget, frames)
}
