use super::config::SearchSettings;
use super::profile::WorkoutProfile;
use crate::error::{GenerationError, Result};
use std::fmt;

/// Fewest segments an interval workout can have: slow, fast, slow
pub const MIN_INTERVAL_SEGMENTS: usize = 3;
/// Fewest relax segments: two descending steps and the floor
pub const MIN_RELAX_SEGMENTS: usize = 3;

/// Role a segment plays in the workout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Warmup,
    Target,
    WindDown,
    Slow,
    Fast,
    Peak,
    Descent,
    Floor,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Warmup => "warmup",
            Phase::Target => "target",
            Phase::WindDown => "wind-down",
            Phase::Slow => "slow",
            Phase::Fast => "fast",
            Phase::Peak => "peak",
            Phase::Descent => "descent",
            Phase::Floor => "floor",
        };
        write!(f, "{label}")
    }
}

/// A slice of the workout with its tempo band and duration target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub phase: Phase,
    pub target_tempo: f64,
    pub min_tempo: f64,
    pub max_tempo: f64,
    pub target_energy: Option<f64>,
    pub target_duration_ms: u64,
    pub tracks_needed: usize,
}

impl Segment {
    /// Segment whose tempo band is `target ± offset`
    pub fn around(
        phase: Phase,
        target_tempo: f64,
        offset: f64,
        target_energy: Option<f64>,
        target_duration_ms: u64,
        tracks_needed: usize,
    ) -> Self {
        Self {
            phase,
            target_tempo,
            min_tempo: (target_tempo - offset).max(0.0),
            max_tempo: target_tempo + offset,
            target_energy,
            target_duration_ms,
            tracks_needed,
        }
    }
}

/// How many average songs fit in a span, never fewer than one
pub fn tracks_for(duration_ms: u64, settings: &SearchSettings) -> usize {
    let minutes = duration_ms as f64 / 60_000.0;
    ((minutes / settings.avg_song_minutes).round() as usize).max(1)
}

/// Warmup, target block and wind-down of a classic workout
#[derive(Debug, Clone, PartialEq)]
pub struct RampPlan {
    pub transition_ms: u64,
    pub tempo_step: f64,
    pub warmup: Vec<Segment>,
    pub target: Segment,
    pub wind_down: Vec<Segment>,
}

impl RampPlan {
    /// Minutes spent on each of warmup and wind-down
    pub fn transition_minutes(workout_length_min: u32, settings: &SearchSettings) -> f64 {
        if workout_length_min > 30 {
            f64::from(workout_length_min) * 0.1
        } else {
            settings.avg_song_minutes
        }
    }

    /// Segment count and tempo step for one transition.
    ///
    /// Transitions too short for two songs collapse to a single segment placed
    /// at the midpoint between resting and target tempo.
    pub fn ramp_steps(
        transition_minutes: f64,
        resting_tempo: f64,
        target_tempo: f64,
        settings: &SearchSettings,
    ) -> (usize, f64) {
        let raw = (transition_minutes / settings.avg_song_minutes).round() as usize;
        if raw < 2 {
            (1, (target_tempo - resting_tempo) / 2.0)
        } else {
            (raw, (target_tempo - resting_tempo) / raw as f64)
        }
    }

    pub fn new(profile: &WorkoutProfile, settings: &SearchSettings) -> Result<Self> {
        let transition_minutes = Self::transition_minutes(profile.workout_length_min, settings);
        let transition_ms = (transition_minutes * 60_000.0).round() as u64;
        let workout_ms = profile.workout_ms();
        if workout_ms <= 2 * transition_ms {
            return Err(GenerationError::InvalidRequest(format!(
                "a {} minute workout is too short for a warmup and wind-down",
                profile.workout_length_min
            )));
        }

        let (count, step) = Self::ramp_steps(
            transition_minutes,
            profile.resting_tempo,
            profile.target_tempo,
            settings,
        );
        let per_segment_ms = transition_ms / count as u64;

        let warmup = (0..count)
            .map(|i| {
                let tempo = profile.resting_tempo + step * (i + 1) as f64;
                Segment::around(Phase::Warmup, tempo, settings.tempo_offset, None, per_segment_ms, 1)
            })
            .collect();
        let wind_down = (0..count)
            .map(|i| {
                let tempo = profile.target_tempo - step * (i + 1) as f64;
                Segment::around(Phase::WindDown, tempo, settings.tempo_offset, None, per_segment_ms, 1)
            })
            .collect();

        let target_ms = workout_ms - 2 * transition_ms;
        let target = Segment::around(
            Phase::Target,
            profile.target_tempo,
            settings.tempo_offset,
            None,
            target_ms,
            tracks_for(target_ms, settings),
        );

        Ok(Self {
            transition_ms,
            tempo_step: step,
            warmup,
            target,
            wind_down,
        })
    }
}

/// The single block of a steady workout
pub fn steady_segment(profile: &WorkoutProfile, settings: &SearchSettings) -> Segment {
    let workout_ms = profile.workout_ms();
    Segment::around(
        Phase::Target,
        profile.target_tempo,
        settings.tempo_offset,
        Some(profile.target_energy),
        workout_ms,
        tracks_for(workout_ms, settings),
    )
}

/// Segment layout of an interval workout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalPlan {
    pub segment_count: usize,
    pub slow_count: usize,
    pub fast_count: usize,
    pub tracks_per_segment: usize,
    pub segment_ms: u64,
    pub pool_limit: u32,
}

impl IntervalPlan {
    /// Longer workouts get longer segments
    pub fn tracks_per_segment(workout_length_min: u32) -> usize {
        match workout_length_min {
            0..=30 => 1,
            31..=60 => 2,
            61..=120 => 3,
            _ => 4,
        }
    }

    /// `(total, slow, fast)` for a raw segment count. The total is forced odd
    /// and to at least three so the workout starts and ends slow.
    pub fn segment_counts(raw: usize) -> (usize, usize, usize) {
        let mut total = raw.max(MIN_INTERVAL_SEGMENTS);
        if total % 2 == 0 {
            total += 1;
        }
        let slow = total / 2 + 1;
        (total, slow, total - slow)
    }

    pub fn new(profile: &WorkoutProfile, settings: &SearchSettings) -> Result<Self> {
        let minutes = f64::from(profile.workout_length_min);
        let tracks_per_segment = Self::tracks_per_segment(profile.workout_length_min);
        let raw = (minutes / (tracks_per_segment as f64 * settings.avg_song_minutes)) as usize;
        if raw < MIN_INTERVAL_SEGMENTS {
            return Err(GenerationError::InvalidRequest(format!(
                "a {} minute workout is too short for {} interval segments",
                profile.workout_length_min, MIN_INTERVAL_SEGMENTS
            )));
        }
        let (segment_count, slow_count, fast_count) = Self::segment_counts(raw);

        let pool_limit = ((minutes / 180.0 * 100.0).round() as u32)
            .max(settings.candidate_limit)
            .min(settings.max_fetch_limit);

        Ok(Self {
            segment_count,
            slow_count,
            fast_count,
            tracks_per_segment,
            segment_ms: profile.workout_ms() / segment_count as u64,
            pool_limit,
        })
    }

    pub fn segment(&self, phase: Phase, tempo: f64, energy: f64, settings: &SearchSettings) -> Segment {
        Segment::around(
            phase,
            tempo,
            settings.tempo_offset,
            Some(energy),
            self.segment_ms,
            self.tracks_per_segment,
        )
    }
}

/// Levels the fast segments climb through on the way to `peak`.
///
/// Each level is used twice, once climbing and once descending. The flag is
/// set when an odd fast count leaves a single segment for the peak itself.
pub fn pyramid_levels(floor: f64, peak: f64, fast_count: usize) -> (Vec<f64>, bool) {
    let pairs = fast_count / 2;
    let has_peak = fast_count % 2 == 1;
    let divisions = if has_peak { pairs + 1 } else { pairs };
    let levels = (1..=pairs)
        .map(|i| floor + (peak - floor) * i as f64 / divisions as f64)
        .collect();
    (levels, has_peak)
}

/// Descending segments from the current heart rate down to the resting floor
#[derive(Debug, Clone, PartialEq)]
pub struct RelaxPlan {
    pub start_tempo: f64,
    pub tempo_step: f64,
    pub segments: Vec<Segment>,
}

impl RelaxPlan {
    pub fn new(current_bpm: u32, profile: &WorkoutProfile, settings: &SearchSettings) -> Result<Self> {
        // Every segment should hold at least one average song
        let songs_in_workout =
            (f64::from(profile.workout_length_min) / settings.avg_song_minutes) as usize;
        if songs_in_workout < MIN_RELAX_SEGMENTS {
            return Err(GenerationError::InvalidRequest(format!(
                "a {} minute workout is too short to relax over {} segments",
                profile.workout_length_min, MIN_RELAX_SEGMENTS
            )));
        }

        let floor = settings.relax_floor_tempo;
        let start = f64::from(current_bpm).max(settings.relax_min_start_tempo);
        let span = start - floor;

        let mut descending = (span / settings.relax_decay_per_minute) as usize;
        if descending == 0 {
            descending = 2;
        }
        descending = descending.min(songs_in_workout - 1);

        let step = span / descending as f64;
        let offset = (step / 2.0).max(1.0);
        let segment_ms = profile.workout_ms() / (descending as u64 + 1);
        let tracks_needed = tracks_for(segment_ms, settings);

        let mut segments: Vec<Segment> = (0..descending)
            .map(|i| {
                Segment::around(
                    Phase::Descent,
                    start - step * i as f64,
                    offset,
                    None,
                    segment_ms,
                    tracks_needed,
                )
            })
            .collect();
        segments.push(Segment {
            phase: Phase::Floor,
            target_tempo: floor,
            min_tempo: floor,
            max_tempo: settings.relax_min_start_tempo,
            target_energy: None,
            target_duration_ms: segment_ms,
            tracks_needed,
        });

        Ok(Self {
            start_tempo: start,
            tempo_step: step,
            segments,
        })
    }
}
