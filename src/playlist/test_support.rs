use crate::client::MusicCatalog;
use crate::models::{Artist, AudioFeatures, CandidateQuery, TopTrack, Track, UserProfile};
use anyhow::Result;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

pub fn create_test_track(id: &str, duration_ms: u64, tempo: f64) -> Track {
    Track {
        id: id.to_string(),
        uri: format!("spotify:track:{id}"),
        name: format!("Track {id}"),
        artists: vec!["Test Artist".to_string()],
        duration_ms,
        tempo,
        energy: 0.7,
        is_playable: true,
    }
}

/// Sorted pool with the given durations, ids `{prefix}{index}`
pub fn pool_of(prefix: &str, durations: &[u64]) -> Vec<Track> {
    durations
        .iter()
        .enumerate()
        .map(|(i, &d)| create_test_track(&format!("{prefix}{i}"), d, 120.0))
        .collect()
}

/// Deterministic catalog answering every request with a fresh page of tracks.
///
/// Durations of a page walk a 7919ms stride through 150s..300s, shifted per
/// call, so any window wider than about 8s contains at least one track.
/// With `repeat_page` set every call returns the first page again, ids `same{i}`.
pub struct FakeCatalog {
    calls: Cell<u64>,
    pub queries: RefCell<Vec<CandidateQuery>>,
    pub features: HashMap<String, AudioFeatures>,
    pub page_size_cap: Option<usize>,
    pub repeat_page: bool,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self {
            calls: Cell::new(0),
            queries: RefCell::new(Vec::new()),
            features: HashMap::new(),
            page_size_cap: None,
            repeat_page: false,
        }
    }

    pub fn candidate_calls(&self) -> usize {
        self.queries.borrow().len()
    }
}

impl MusicCatalog for FakeCatalog {
    fn fetch_candidates(&self, query: &CandidateQuery) -> Result<Vec<Track>> {
        let call = if self.repeat_page { 0 } else { self.calls.get() };
        self.calls.set(self.calls.get() + 1);
        self.queries.borrow_mut().push(query.clone());

        let tempo = query
            .target_tempo
            .unwrap_or((query.min_tempo + query.max_tempo) / 2.0);
        let energy = query.energy.map(|e| e.target).unwrap_or(0.6);
        let count = self
            .page_size_cap
            .map_or(query.limit as usize, |cap| cap.min(query.limit as usize));

        Ok((0..count as u64)
            .map(|i| {
                let id = if self.repeat_page {
                    format!("same{i}")
                } else {
                    format!("c{call}-{i}")
                };
                let mut track = create_test_track(
                    &id,
                    150_000 + (i * 7_919 + call * 104_729) % 150_000,
                    tempo,
                );
                track.energy = energy;
                track
            })
            .collect())
    }

    fn fetch_audio_features(&self, track_id: &str) -> Result<AudioFeatures> {
        Ok(self.features.get(track_id).copied().unwrap_or(AudioFeatures {
            tempo: 120.0,
            energy: 0.7,
            duration_ms: 210_000,
        }))
    }

    fn fetch_current_user_profile(&self) -> Result<UserProfile> {
        Ok(UserProfile {
            id: "listener".to_string(),
            display_name: Some("Listener".to_string()),
            country: Some("US".to_string()),
        })
    }

    fn fetch_top_artists(&self, _limit: u32) -> Result<Vec<Artist>> {
        Ok(vec![
            Artist {
                id: "artist-pop".to_string(),
                name: "Pop Star".to_string(),
                genres: vec!["dance pop".to_string()],
            },
            Artist {
                id: "artist-metal".to_string(),
                name: "Metal Band".to_string(),
                genres: vec!["metal".to_string()],
            },
        ])
    }

    fn fetch_top_tracks(&self, _limit: u32) -> Result<Vec<TopTrack>> {
        Ok(vec![TopTrack {
            id: "top-1".to_string(),
            name: "Hit".to_string(),
            artist_ids: vec!["artist-pop".to_string()],
        }])
    }

    fn fetch_artists(&self, artist_ids: &[String]) -> Result<Vec<Artist>> {
        Ok(self
            .fetch_top_artists(50)?
            .into_iter()
            .filter(|a| artist_ids.contains(&a.id))
            .collect())
    }

    fn create_playlist(&self, _user_id: &str, _name: &str, _description: &str, _is_public: bool) -> Result<String> {
        Ok("playlist-1".to_string())
    }

    fn add_tracks(&self, _playlist_id: &str, _track_uris: &[String]) -> Result<()> {
        Ok(())
    }
}
