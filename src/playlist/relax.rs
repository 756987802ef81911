use super::context::SearchContext;
use super::metadata::PlannedSegment;
use super::schedule::{RelaxPlan, Segment};
use super::search::{SearchOutcome, WindowSearch};
use super::window::{DurationWindow, ToleranceSchedule};
use crate::error::{GenerationError, GenerationStage, Result};

/// Cool-down from the listener's current heart rate to a resting floor
pub struct RelaxScheduler;

impl RelaxScheduler {
    pub fn build(ctx: &SearchContext, current_bpm: u32) -> Result<Vec<PlannedSegment>> {
        let plan = RelaxPlan::new(current_bpm, &ctx.profile, ctx.settings)?;
        log::info!(
            "Relax plan: {} segments from {:.1} bpm in steps of {:.1}",
            plan.segments.len(),
            plan.start_tempo,
            plan.tempo_step
        );

        plan.segments
            .iter()
            .enumerate()
            .map(|(index, segment)| Self::segment(ctx, segment, GenerationStage::RelaxSegment(index)))
            .collect()
    }

    fn segment(ctx: &SearchContext, segment: &Segment, stage: GenerationStage) -> Result<PlannedSegment> {
        let settings = ctx.settings;
        let schedule = ToleranceSchedule::new(
            settings.base_tolerance,
            settings.tolerance_step,
            settings.max_tolerance,
            settings.max_attempts,
        );
        let limit = (segment.tracks_needed as u32 * 3)
            .max(settings.candidate_limit)
            .min(settings.max_fetch_limit);
        let mut widen = 0.0;
        let base_window = DurationWindow::new(segment.target_duration_ms, schedule.base);

        for (_, moe) in schedule.attempts() {
            let pool = ctx.sorted_pool(segment, limit, widen, stage)?;
            let window = base_window.widened(moe);
            match WindowSearch::find_run(&pool, segment.tracks_needed, &window) {
                SearchOutcome::Found(tracks) => return Ok(PlannedSegment::new(segment, tracks)),
                outcome => log::debug!("{stage}: {outcome:?} at tolerance {moe:.3}"),
            }
            widen += 1.0;
        }

        Err(GenerationError::Infeasible {
            stage,
            attempts: schedule.max_attempts,
            tolerance: schedule.final_tolerance(),
        })
    }
}
