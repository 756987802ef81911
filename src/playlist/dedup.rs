use super::context::SearchContext;
use super::schedule::{Phase, Segment};
use super::window::{DurationVerdict, DurationWindow, ToleranceSchedule};
use crate::error::{CatalogCall, GenerationError, GenerationStage, Result};
use crate::models::{AudioFeatures, Track};
use std::collections::HashMap;

/// Tempo band half-width for the first replacement request
const INITIAL_TEMPO_OFFSET: f64 = 1.0;

/// Removes repeated and unplayable tracks while keeping every slot filled
pub struct Deduplicator;

impl Deduplicator {
    /// Same length and order as `tracks`, with no repeated ids and no
    /// unplayable tracks. Each replaced slot gets a track of similar tempo,
    /// energy and duration.
    pub fn eliminate_duplicates_and_unplayable(
        ctx: &SearchContext,
        mut tracks: Vec<Track>,
    ) -> Result<Vec<Track>> {
        let mut placed: HashMap<String, usize> = HashMap::new();
        let mut queued = Vec::new();

        for (index, track) in tracks.iter().enumerate() {
            if track.is_playable && !placed.contains_key(&track.id) {
                placed.insert(track.id.clone(), index);
            } else {
                queued.push(index);
            }
        }

        if !queued.is_empty() {
            log::info!("Replacing {} duplicate or unplayable tracks", queued.len());
        }

        for index in queued {
            let features = ctx
                .catalog
                .fetch_audio_features(&tracks[index].id)
                .map_err(|e| GenerationError::collaborator(CatalogCall::FetchAudioFeatures, e))?;
            let replacement = Self::replacement(ctx, &features, &placed)?;
            log::debug!(
                "Slot {}: '{}' replaced by '{}'",
                index + 1,
                tracks[index].name,
                replacement.name
            );
            placed.insert(replacement.id.clone(), index);
            tracks[index] = replacement;
        }

        Ok(tracks)
    }

    /// Closest-duration unused playable candidate near the original's tempo and energy
    fn replacement(
        ctx: &SearchContext,
        features: &AudioFeatures,
        placed: &HashMap<String, usize>,
    ) -> Result<Track> {
        let settings = ctx.settings;
        let schedule = ToleranceSchedule::new(
            settings.replacement_tolerance,
            settings.replacement_tolerance_step,
            1.0,
            settings.max_attempts,
        );
        let mut offset = INITIAL_TEMPO_OFFSET;

        for (_, moe) in schedule.attempts() {
            let segment = Segment::around(
                Phase::Target,
                features.tempo,
                offset,
                Some(features.energy),
                features.duration_ms,
                1,
            );
            let candidates = ctx.fetch(&ctx.query(&segment, settings.candidate_limit, 0.0, &ctx.seeds))?;

            let closest = candidates
                .into_iter()
                .filter(|t| t.is_playable && !placed.contains_key(&t.id))
                .min_by_key(|t| t.duration_ms.abs_diff(features.duration_ms));

            if let Some(track) = closest {
                let window = DurationWindow::new(features.duration_ms, moe);
                if window.classify(track.duration_ms) == DurationVerdict::Acceptable {
                    return Ok(track);
                }
            }
            offset += 1.0;
        }

        Err(GenerationError::Infeasible {
            stage: GenerationStage::Replacement,
            attempts: schedule.max_attempts,
            tolerance: schedule.final_tolerance(),
        })
    }
}
