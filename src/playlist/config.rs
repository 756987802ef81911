use crate::error::{GenerationError, Result};
use serde::{Deserialize, Serialize};

/// Maximum number of genre seeds a request may carry
pub const MAX_GENRES: usize = 3;
/// Heart rates the relax style accepts as the listener's current rate
pub const CURRENT_BPM_RANGE: std::ops::RangeInclusive<u32> = 45..=140;

/// How hard the listener wants to work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Low,
    Medium,
    High,
}

/// Shape of the fast half of an interval workout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalShape {
    /// Fast segments climb toward the peak tempo and mirror back down
    Pyramid,
    /// Every fast segment sits at the target tempo
    Flat,
}

/// Tempo profile the playlist follows over the workout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "style", rename_all = "lowercase")]
pub enum PlaylistStyle {
    /// Warm up from resting tempo, hold the target, wind back down
    Classic,
    /// Hold the target tempo for the whole workout
    Steady,
    /// Alternate slow and fast segments, starting and ending slow
    Interval { shape: IntervalShape },
    /// Descend from the current heart rate to a resting floor
    Relax { current_bpm: u32 },
}

impl PlaylistStyle {
    pub fn label(&self) -> &'static str {
        match self {
            PlaylistStyle::Classic => "classic",
            PlaylistStyle::Steady => "steady",
            PlaylistStyle::Interval {
                shape: IntervalShape::Pyramid,
            } => "pyramid interval",
            PlaylistStyle::Interval {
                shape: IntervalShape::Flat,
            } => "interval",
            PlaylistStyle::Relax { .. } => "relax",
        }
    }

    /// Styles that mix genre-only candidates into their pools
    pub fn mixes_genre_only_candidates(&self) -> bool {
        matches!(self, PlaylistStyle::Interval { .. })
    }
}

/// A single playlist request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub age: u32,
    pub intensity: Intensity,
    pub workout_length_min: u32,
    pub style: PlaylistStyle,
    pub genres: Vec<String>,
    pub personalized: bool,
}

impl GenerationRequest {
    pub fn validate(&self) -> Result<()> {
        if !(1..=120).contains(&self.age) {
            return Err(GenerationError::InvalidRequest(format!(
                "age must be between 1 and 120, got {}",
                self.age
            )));
        }
        if !(5..=300).contains(&self.workout_length_min) {
            return Err(GenerationError::InvalidRequest(format!(
                "workout length must be between 5 and 300 minutes, got {}",
                self.workout_length_min
            )));
        }
        if self.genres.is_empty() || self.genres.len() > MAX_GENRES {
            return Err(GenerationError::InvalidRequest(format!(
                "between 1 and {} genres are required, got {}",
                MAX_GENRES,
                self.genres.len()
            )));
        }
        if self.genres.iter().any(|g| g.trim().is_empty()) {
            return Err(GenerationError::InvalidRequest(
                "genre names must not be empty".to_string(),
            ));
        }
        if let PlaylistStyle::Relax { current_bpm } = self.style {
            if !CURRENT_BPM_RANGE.contains(&current_bpm) {
                return Err(GenerationError::InvalidRequest(format!(
                    "current heart rate must be between {} and {} bpm, got {}",
                    CURRENT_BPM_RANGE.start(),
                    CURRENT_BPM_RANGE.end(),
                    current_bpm
                )));
            }
        }
        Ok(())
    }
}

/// Tuning knobs for the search engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub resting_tempo: f64,
    pub avg_song_minutes: f64,
    pub starting_energy: f64,

    pub base_tolerance: f64,     // Duration margin for steady blocks and intervals
    pub tolerance_step: f64,     // Added per failed attempt
    pub transition_tolerance: f64, // Duration margin for warmup and wind-down
    pub transition_tolerance_step: f64,
    pub max_tolerance: f64,
    pub max_attempts: usize,

    pub candidate_limit: u32, // Tracks per column-search pool
    pub max_fetch_limit: u32, // Largest request the catalog accepts
    pub steady_limit_step: u32,
    pub double_pool_limit: u32,
    pub peak_pool_limit: u32,
    pub tempo_offset: f64, // Initial half-width of the tempo band
    pub energy_offset: f64,
    pub max_fetch_attempts: usize, // Widening fetches before a pool is given up
    pub rough_fill_ratio: f64,

    pub relax_floor_tempo: f64,
    pub relax_min_start_tempo: f64,
    pub relax_decay_per_minute: f64,

    pub replacement_tolerance: f64,
    pub replacement_tolerance_step: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            resting_tempo: 80.0,
            avg_song_minutes: 3.5,
            starting_energy: 0.5,
            base_tolerance: 0.02,
            tolerance_step: 0.01,
            transition_tolerance: 0.015,
            transition_tolerance_step: 0.005,
            max_tolerance: 0.25,
            max_attempts: 40,
            candidate_limit: 21,
            max_fetch_limit: 100,
            steady_limit_step: 5,
            double_pool_limit: 60,
            peak_pool_limit: 30,
            tempo_offset: 3.0,
            energy_offset: 0.1,
            max_fetch_attempts: 30,
            rough_fill_ratio: 0.75,
            relax_floor_tempo: 60.0,
            relax_min_start_tempo: 75.0,
            relax_decay_per_minute: 7.0,
            replacement_tolerance: 0.1,
            replacement_tolerance_step: 0.01,
        }
    }
}

impl SearchSettings {
    /// Load settings from a JSON file; missing fields keep their defaults
    pub fn load_from_file(path: &str) -> anyhow::Result<SearchSettings> {
        let content = std::fs::read_to_string(path)?;
        let settings: SearchSettings = serde_json::from_str(&content)?;
        Ok(settings)
    }
}
