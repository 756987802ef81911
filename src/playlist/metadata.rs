use super::schedule::{Phase, Segment};
use crate::models::Track;
use std::collections::HashSet;

/// Tracks chosen for one segment of the workout
#[derive(Debug, Clone)]
pub struct PlannedSegment {
    pub phase: Phase,
    pub target_tempo: f64,
    pub target_duration_ms: u64,
    pub tracks: Vec<Track>,
}

impl PlannedSegment {
    pub fn new(segment: &Segment, tracks: Vec<Track>) -> Self {
        Self {
            phase: segment.phase,
            target_tempo: segment.target_tempo,
            target_duration_ms: segment.target_duration_ms,
            tracks,
        }
    }

    pub fn duration_ms(&self) -> u64 {
        self.tracks.iter().map(|t| t.duration_ms).sum()
    }
}

/// Represents a generated playlist with metadata
#[derive(Debug)]
pub struct PlaylistPlan {
    pub name: String,
    pub description: String,
    pub segments: Vec<PlannedSegment>,
    pub metadata: PlaylistMetadata,
}

impl PlaylistPlan {
    pub fn new(name: String, description: String, segments: Vec<PlannedSegment>) -> Self {
        let metadata = PlaylistMetadata::from_tracks(segments.iter().flat_map(|s| &s.tracks));
        Self {
            name,
            description,
            segments,
            metadata,
        }
    }

    /// Tracks in playback order
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.segments.iter().flat_map(|s| &s.tracks)
    }

    pub fn track_uris(&self) -> Vec<String> {
        self.tracks().map(|t| t.uri.clone()).collect()
    }
}

/// Metadata about the playlist composition
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistMetadata {
    pub total_duration_ms: u64,
    pub total_tracks: usize,
    pub average_tempo: f64,
    pub tempo_range: (f64, f64),
    pub average_energy: f64,
    pub artist_count: usize,
}

impl PlaylistMetadata {
    pub fn from_tracks<'a, I>(tracks: I) -> Self
    where
        I: IntoIterator<Item = &'a Track>,
    {
        let mut total_duration_ms = 0;
        let mut total_tracks = 0;
        let mut tempo_sum = 0.0;
        let mut energy_sum = 0.0;
        let mut tempo_range: Option<(f64, f64)> = None;
        let mut artists = HashSet::new();

        for track in tracks {
            total_duration_ms += track.duration_ms;
            total_tracks += 1;
            tempo_sum += track.tempo;
            energy_sum += track.energy;
            tempo_range = Some(match tempo_range {
                None => (track.tempo, track.tempo),
                Some((lo, hi)) => (lo.min(track.tempo), hi.max(track.tempo)),
            });
            artists.extend(track.artists.iter().cloned());
        }

        let count = total_tracks.max(1) as f64;
        Self {
            total_duration_ms,
            total_tracks,
            average_tempo: tempo_sum / count,
            tempo_range: tempo_range.unwrap_or((0.0, 0.0)),
            average_energy: energy_sum / count,
            artist_count: artists.len(),
        }
    }
}
