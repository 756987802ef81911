use super::context::SearchContext;
use super::metadata::PlannedSegment;
use super::schedule::{RampPlan, Segment};
use super::search::{ColumnSearch, SearchOutcome};
use super::steady::SteadyScheduler;
use super::window::{DurationWindow, ToleranceSchedule};
use crate::error::{GenerationError, GenerationStage, Result};

/// Warmup ramp, steady target block, wind-down ramp
pub struct ClassicScheduler;

impl ClassicScheduler {
    pub fn build(ctx: &SearchContext) -> Result<Vec<PlannedSegment>> {
        let plan = RampPlan::new(&ctx.profile, ctx.settings)?;
        log::info!(
            "Classic plan: {} ramp segments of {:.1} bpm, {}ms transitions, {} target tracks",
            plan.warmup.len(),
            plan.tempo_step,
            plan.transition_ms,
            plan.target.tracks_needed
        );

        let mut segments = Self::transition(ctx, &plan.warmup, plan.transition_ms, GenerationStage::Warmup)?;
        segments.push(SteadyScheduler::block(ctx, &plan.target, GenerationStage::Target)?);
        segments.extend(Self::transition(
            ctx,
            &plan.wind_down,
            plan.transition_ms,
            GenerationStage::WindDown,
        )?);
        Ok(segments)
    }

    /// One track per ramp segment, together lasting the transition.
    ///
    /// Picks a column across the per-segment pools and, if the column alone
    /// misses, mixes it with the neighboring column. A pool that cannot bracket
    /// the window is refetched with a wider tempo band.
    fn transition(
        ctx: &SearchContext,
        ramp: &[Segment],
        transition_ms: u64,
        stage: GenerationStage,
    ) -> Result<Vec<PlannedSegment>> {
        let settings = ctx.settings;
        let schedule = ToleranceSchedule::new(
            settings.transition_tolerance,
            settings.transition_tolerance_step,
            settings.max_tolerance,
            settings.max_attempts,
        );
        let mut widen = 0.0;

        for (attempt, moe) in schedule.attempts() {
            let pools = ramp
                .iter()
                .map(|segment| ctx.sorted_pool(segment, settings.candidate_limit, widen, stage))
                .collect::<Result<Vec<_>>>()?;
            let window = DurationWindow::new(transition_ms, moe);

            match ColumnSearch::find_closest_column(&pools, &window) {
                SearchOutcome::Found(column) => {
                    if let Some(tracks) = ColumnSearch::best_fit(&pools, column, &window).found() {
                        log::info!("{stage}: fitted {} tracks on attempt {}", tracks.len(), attempt + 1);
                        return Ok(ramp
                            .iter()
                            .zip(tracks)
                            .map(|(segment, track)| PlannedSegment::new(segment, vec![track]))
                            .collect());
                    }
                }
                SearchOutcome::Infeasible(reason) => {
                    log::debug!("{stage}: pools cannot reach the window ({reason:?})");
                    widen += 1.0;
                }
                SearchOutcome::Exhausted => {}
            }
            log::debug!("{stage}: no fit at tolerance {moe:.3}, widening");
        }

        Err(GenerationError::Infeasible {
            stage,
            attempts: schedule.max_attempts,
            tolerance: schedule.final_tolerance(),
        })
    }
}
