use super::config::IntervalShape;
use super::context::SearchContext;
use super::metadata::PlannedSegment;
use super::schedule::{IntervalPlan, Phase, Segment, pyramid_levels};
use super::search::{SearchOutcome, WindowSearch};
use super::utils::PlaylistOrdering;
use super::window::{DurationWindow, ToleranceSchedule};
use crate::error::{GenerationError, GenerationStage, Result};
use crate::models::Track;
use std::collections::HashSet;

/// Alternating slow and fast segments, slow at both ends
pub struct IntervalScheduler;

impl IntervalScheduler {
    pub fn build(ctx: &SearchContext, shape: IntervalShape) -> Result<Vec<PlannedSegment>> {
        let settings = ctx.settings;
        let profile = &ctx.profile;
        let plan = IntervalPlan::new(profile, settings)?;
        log::info!(
            "Interval plan: {} slow + {} fast segments of {} tracks, {}ms each",
            plan.slow_count,
            plan.fast_count,
            plan.tracks_per_segment,
            plan.segment_ms
        );

        let slow_segment = plan.segment(Phase::Slow, profile.resting_tempo, profile.starting_energy, settings);
        let slow = Self::fill(
            ctx,
            &slow_segment,
            plan.slow_count,
            plan.pool_limit,
            GenerationStage::SlowIntervals,
        )?;

        let fast = match shape {
            IntervalShape::Pyramid => Self::pyramid(ctx, &plan)?,
            IntervalShape::Flat => {
                let fast_segment = plan.segment(Phase::Fast, profile.target_tempo, profile.target_energy, settings);
                Self::fill(
                    ctx,
                    &fast_segment,
                    plan.fast_count,
                    plan.pool_limit,
                    GenerationStage::FastIntervals,
                )?
            }
        };

        Ok(PlaylistOrdering::alternate(slow, fast))
    }

    /// Fast segments climbing to the peak and mirroring back down.
    ///
    /// Every ramp level is fetched as a double batch: the first half joins the
    /// climb, the second half is stacked and replayed in reverse after the peak.
    fn pyramid(ctx: &SearchContext, plan: &IntervalPlan) -> Result<Vec<PlannedSegment>> {
        let settings = ctx.settings;
        let profile = &ctx.profile;
        let (tempos, has_peak) = pyramid_levels(profile.resting_tempo, profile.target_tempo, plan.fast_count);
        let (energies, _) = pyramid_levels(profile.starting_energy, profile.target_energy, plan.fast_count);

        let mut climb = Vec::with_capacity(plan.fast_count);
        let mut stack = Vec::with_capacity(tempos.len());
        for (&tempo, &energy) in tempos.iter().zip(&energies) {
            let segment = plan.segment(Phase::Fast, tempo, energy, settings);
            let mut batch = Self::fill(
                ctx,
                &segment,
                2,
                settings.double_pool_limit,
                GenerationStage::FastIntervals,
            )?;
            let second_half = batch.split_off(batch.len() / 2);
            climb.extend(batch);
            stack.push(second_half);
        }

        if has_peak {
            let peak = plan.segment(Phase::Peak, profile.target_tempo, profile.target_energy, settings);
            climb.extend(Self::fill(
                ctx,
                &peak,
                1,
                settings.peak_pool_limit,
                GenerationStage::PeakInterval,
            )?);
        }

        while let Some(batch) = stack.pop() {
            climb.extend(batch);
        }
        Ok(climb)
    }

    /// `count` segments of the same shape carved from one shared pool.
    ///
    /// A pool that fills most of the segments is kept and the rest are topped
    /// up one by one; otherwise the tolerance widens and the pool is refetched.
    fn fill(
        ctx: &SearchContext,
        segment: &Segment,
        count: usize,
        pool_limit: u32,
        stage: GenerationStage,
    ) -> Result<Vec<PlannedSegment>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let settings = ctx.settings;
        let schedule = ToleranceSchedule::new(
            settings.base_tolerance,
            settings.tolerance_step,
            settings.max_tolerance,
            settings.max_attempts,
        );
        let needed = (pool_limit as usize).max(count * segment.tracks_needed);
        let mut widen = 0.0;

        for (attempt, moe) in schedule.attempts() {
            let pool = ctx.accumulated_pool(segment, pool_limit, widen, needed, stage)?;
            let window = DurationWindow::new(segment.target_duration_ms, moe);
            let mut runs = WindowSearch::fill_segments(&pool, count, segment.tracks_needed, &window);

            if runs.len() as f64 >= count as f64 * settings.rough_fill_ratio {
                let mut used: HashSet<String> = runs.iter().flatten().map(|t| t.id.clone()).collect();
                while runs.len() < count {
                    let run = Self::top_up(ctx, segment, &used, stage)?;
                    used.extend(run.iter().map(|t| t.id.clone()));
                    runs.push(run);
                }
                log::info!("{stage}: {count} segments at {:.1} bpm on attempt {}", segment.target_tempo, attempt + 1);
                return Ok(runs
                    .into_iter()
                    .map(|tracks| PlannedSegment::new(segment, tracks))
                    .collect());
            }

            log::debug!(
                "{stage}: filled {}/{} at tolerance {:.3}, widening",
                runs.len(),
                count,
                moe
            );
            widen += 1.0;
        }

        Err(GenerationError::Infeasible {
            stage,
            attempts: schedule.max_attempts,
            tolerance: schedule.final_tolerance(),
        })
    }

    /// A single segment from a fresh pool, skipping tracks already placed
    fn top_up(
        ctx: &SearchContext,
        segment: &Segment,
        used: &HashSet<String>,
        stage: GenerationStage,
    ) -> Result<Vec<Track>> {
        let settings = ctx.settings;
        let schedule = ToleranceSchedule::new(
            settings.base_tolerance,
            settings.tolerance_step,
            settings.max_tolerance,
            settings.max_attempts,
        );
        let mut widen = 0.0;

        for (_, moe) in schedule.attempts() {
            let mut pool = ctx.sorted_pool(segment, settings.candidate_limit, widen, stage)?;
            pool.retain(|t| !used.contains(&t.id));
            let window = DurationWindow::new(segment.target_duration_ms, moe);
            if let SearchOutcome::Found(run) = WindowSearch::find_run(&pool, segment.tracks_needed, &window) {
                return Ok(run);
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
