use super::config::SearchSettings;
use super::profile::WorkoutProfile;
use super::schedule::Segment;
use super::seeds::SeedSet;
use crate::client::MusicCatalog;
use crate::error::{CatalogCall, GenerationError, GenerationStage, Result};
use crate::models::{CandidateQuery, EnergyBand, Track};
use std::collections::HashSet;

/// Everything one generation run shares. Built once per request and never mutated.
pub struct SearchContext<'a> {
    pub catalog: &'a dyn MusicCatalog,
    pub settings: &'a SearchSettings,
    pub profile: WorkoutProfile,
    pub seeds: SeedSet,
    pub market: Option<String>,
    /// Also pull candidates seeded by genre alone
    pub mix_genre_only: bool,
}

impl<'a> SearchContext<'a> {
    /// Recommendation request for a segment's band widened by `widen` bpm on each side
    pub fn query(&self, segment: &Segment, limit: u32, widen: f64, seeds: &SeedSet) -> CandidateQuery {
        CandidateQuery {
            limit: limit.clamp(1, self.settings.max_fetch_limit),
            min_tempo: (segment.min_tempo - widen).max(0.0),
            max_tempo: segment.max_tempo + widen,
            target_tempo: Some(segment.target_tempo),
            energy: segment
                .target_energy
                .map(|e| EnergyBand::around(e, self.settings.energy_offset)),
            seed_genres: seeds.genres.clone(),
            seed_artists: seeds.artists.clone(),
            seed_tracks: seeds.tracks.clone(),
            market: self.market.clone(),
        }
    }

    pub fn fetch(&self, query: &CandidateQuery) -> Result<Vec<Track>> {
        self.catalog
            .fetch_candidates(query)
            .map_err(|e| GenerationError::collaborator(CatalogCall::FetchCandidates, e))
    }

    /// Exactly `limit` candidates for the segment, sorted by duration.
    ///
    /// The tempo band grows by one bpm per fetch until the catalog returns a
    /// full page.
    pub fn sorted_pool(
        &self,
        segment: &Segment,
        limit: u32,
        initial_widen: f64,
        stage: GenerationStage,
    ) -> Result<Vec<Track>> {
        let mut widen = initial_widen;
        for _ in 0..self.settings.max_fetch_attempts {
            let mut tracks = self.fetch(&self.query(segment, limit, widen, &self.seeds))?;
            if tracks.len() >= limit as usize {
                tracks.sort_by_key(|t| t.duration_ms);
                tracks.truncate(limit as usize);
                return Ok(tracks);
            }
            log::debug!(
                "{stage}: {} of {} candidates around {:.1} bpm, widening band",
                tracks.len(),
                limit,
                segment.target_tempo
            );
            widen += 1.0;
        }
        Err(self.pool_exhausted(widen))
    }

    /// At least `needed` distinct candidates for the segment, sorted by duration.
    ///
    /// Fetches of `limit` tracks are merged until enough distinct tracks have
    /// been seen, widening the tempo band after every fetch.
    pub fn accumulated_pool(
        &self,
        segment: &Segment,
        limit: u32,
        initial_widen: f64,
        needed: usize,
        stage: GenerationStage,
    ) -> Result<Vec<Track>> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut pool: Vec<Track> = Vec::new();
        let mut widen = initial_widen;
        let genre_only = self.seeds.without_history();

        for _ in 0..self.settings.max_fetch_attempts {
            let mut batch = self.fetch(&self.query(segment, limit, widen, &self.seeds))?;
            if self.mix_genre_only && self.seeds.is_personalized() {
                batch.extend(self.fetch(&self.query(segment, limit, widen, &genre_only))?);
            }
            for track in batch {
                if seen.insert(track.id.clone()) {
                    pool.push(track);
                }
            }
            if pool.len() >= needed {
                pool.sort_by_key(|t| t.duration_ms);
                return Ok(pool);
            }
            log::debug!(
                "{stage}: {} of {} distinct candidates around {:.1} bpm",
                pool.len(),
                needed,
                segment.target_tempo
            );
            widen += 1.0;
        }
        Err(self.pool_exhausted(widen))
    }

    fn pool_exhausted(&self, widen: f64) -> GenerationError {
        GenerationError::Infeasible {
            stage: GenerationStage::CandidatePool,
            attempts: self.settings.max_fetch_attempts,
            tolerance: widen,
        }
    }
}
