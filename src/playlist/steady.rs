use super::context::SearchContext;
use super::metadata::PlannedSegment;
use super::schedule::{Segment, steady_segment};
use super::search::{SearchOutcome, WindowSearch};
use super::window::{DurationWindow, ToleranceSchedule};
use crate::error::{GenerationError, GenerationStage, Result};

/// Holds one tempo for a whole block
pub struct SteadyScheduler;

impl SteadyScheduler {
    /// Whole workout at the target tempo and energy
    pub fn build(ctx: &SearchContext) -> Result<Vec<PlannedSegment>> {
        let segment = steady_segment(&ctx.profile, ctx.settings);
        Ok(vec![Self::block(ctx, &segment, GenerationStage::Target)?])
    }

    /// Fill a block with a contiguous run of similarly long tracks.
    ///
    /// Each failed attempt throws the pool away, asks for a larger page with a
    /// wider tempo band, and widens the duration tolerance.
    pub fn block(ctx: &SearchContext, segment: &Segment, stage: GenerationStage) -> Result<PlannedSegment> {
        let settings = ctx.settings;
        let schedule = ToleranceSchedule::new(
            settings.base_tolerance,
            settings.tolerance_step,
            settings.max_tolerance,
            settings.max_attempts,
        );
        let needed = segment.tracks_needed.max(settings.candidate_limit as usize);
        let mut limit = (segment.tracks_needed as u32 * 2).clamp(1, settings.max_fetch_limit);
        let mut widen = 0.0;
        let base_window = DurationWindow::new(segment.target_duration_ms, schedule.base);

        for (attempt, moe) in schedule.attempts() {
            let pool = ctx.accumulated_pool(segment, limit, widen, needed, stage)?;
            let window = base_window.widened(moe);

            match WindowSearch::find_run(&pool, segment.tracks_needed, &window) {
                SearchOutcome::Found(tracks) => {
                    log::info!(
                        "{stage}: {} tracks at {:.1} bpm on attempt {}",
                        tracks.len(),
                        segment.target_tempo,
                        attempt + 1
                    );
                    return Ok(PlannedSegment::new(segment, tracks));
                }
                outcome => log::debug!(
                    "{stage}: no run of {} in {} candidates at tolerance {:.3} ({:?})",
                    segment.tracks_needed,
                    pool.len(),
                    moe,
                    outcome
                ),
            }

            limit = (limit + settings.steady_limit_step).min(settings.max_fetch_limit);
            widen += 1.0;
        }

        Err(GenerationError::Infeasible {
            stage,
            attempts: schedule.max_attempts,
            tolerance: schedule.final_tolerance(),
        })
    }
}
