use super::config::PlaylistStyle;
use super::metadata::PlannedSegment;
use super::profile::WorkoutProfile;
use crate::models::Track;
use chrono::Local;
use rand::seq::SliceRandom;

/// Helper trait for string formatting
pub trait ToTitleCase {
    fn to_title_case(&self) -> String;
}

impl ToTitleCase for str {
    fn to_title_case(&self) -> String {
        self.split_whitespace()
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => {
                        first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                    }
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

const NAME_SUFFIXES: [&str; 6] = ["beats", "session", "run", "mix", "set", "pulse"];

/// Playlist naming utilities
pub struct PlaylistNaming;

impl PlaylistNaming {
    /// e.g. "heartBeats Pyramid Interval Tuesday session"
    pub fn playlist_name(style: &PlaylistStyle) -> String {
        let day_of_week = Local::now().format("%A").to_string();
        let mut rng = rand::thread_rng();
        let suffix = NAME_SUFFIXES.choose(&mut rng).copied().unwrap_or("beats");
        format!("heartBeats {} {} {}", style.label().to_title_case(), day_of_week, suffix)
    }

    pub fn description(style: &PlaylistStyle, profile: &WorkoutProfile) -> String {
        format!(
            "A {} minute {} playlist targeting {:.0} bpm, created by heartBeats {}",
            profile.workout_length_min,
            style.label(),
            profile.target_tempo,
            Local::now().format("%Y/%m/%d %H:%M")
        )
    }
}

/// Playlist ordering utilities
pub struct PlaylistOrdering;

impl PlaylistOrdering {
    /// slow, fast, slow, fast, ..., with leftover segments of either kind at the end
    pub fn alternate(slow: Vec<PlannedSegment>, fast: Vec<PlannedSegment>) -> Vec<PlannedSegment> {
        let mut ordered = Vec::with_capacity(slow.len() + fast.len());
        let mut slow = slow.into_iter();
        let mut fast = fast.into_iter();
        loop {
            match (slow.next(), fast.next()) {
                (None, None) => break,
                (s, f) => {
                    ordered.extend(s);
                    ordered.extend(f);
                }
            }
        }
        ordered
    }

    /// Fastest first; tracks with equal tempo keep their order
    pub fn sort_by_tempo_descending(tracks: &mut [Track]) {
        tracks.sort_by(|a, b| b.tempo.total_cmp(&a.tempo));
    }

    /// Split `tracks` back into segments of the given sizes, in order
    pub fn rechunk(segments: Vec<PlannedSegment>, tracks: Vec<Track>) -> Vec<PlannedSegment> {
        let mut tracks = tracks.into_iter();
        segments
            .into_iter()
            .map(|segment| {
                let count = segment.tracks.len();
                PlannedSegment {
                    tracks: tracks.by_ref().take(count).collect(),
                    ..segment
                }
            })
            .collect()
    }
}
