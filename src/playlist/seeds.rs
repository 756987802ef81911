use crate::client::MusicCatalog;
use crate::error::{CatalogCall, GenerationError, Result};
use std::collections::{HashMap, HashSet};

/// How many of the listener's top artists and tracks to look through
const HISTORY_LIMIT: u32 = 50;

/// Seeds attached to every recommendation request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedSet {
    pub genres: Vec<String>,
    pub artists: Vec<String>,
    pub tracks: Vec<String>,
}

impl SeedSet {
    pub fn genre_only(genres: &[String]) -> Self {
        Self {
            genres: genres.to_vec(),
            ..Default::default()
        }
    }

    pub fn is_personalized(&self) -> bool {
        !self.artists.is_empty() || !self.tracks.is_empty()
    }

    /// Same genres without the listener's artists and tracks
    pub fn without_history(&self) -> Self {
        Self::genre_only(&self.genres)
    }
}

/// Seed selection from the listener's history
pub struct SeedSelection;

impl SeedSelection {
    /// `(artists, tracks)` to add next to the genre seeds. The catalog accepts
    /// five seeds in total.
    pub fn seed_counts(genre_count: usize, personalized: bool) -> (usize, usize) {
        if !personalized {
            return (0, 0);
        }
        match genre_count {
            1 => (2, 2),
            2 => (1, 2),
            3 => (1, 1),
            _ => (0, 0),
        }
    }

    /// Genre slug as it appears in artist genre lists
    pub fn normalize_genre(genre: &str) -> String {
        match genre.trim().to_lowercase().as_str() {
            "hip-hop" => "hip hop".to_string(),
            "indie-pop" => "indie pop".to_string(),
            "r-n-b" => "r&b".to_string(),
            "synth-pop" => "synthpop".to_string(),
            "work-out" => "workout".to_string(),
            "world-music" => "world".to_string(),
            other => other.to_string(),
        }
    }

    fn matches_any(artist_genres: &[String], wanted: &[String]) -> bool {
        artist_genres.iter().any(|g| {
            let g = g.to_lowercase();
            wanted.iter().any(|w| g.contains(w.as_str()))
        })
    }

    /// Build the seed set for a request, consulting the listener's history when personalized
    pub fn select(catalog: &dyn MusicCatalog, genres: &[String], personalized: bool) -> Result<SeedSet> {
        let mut seeds = SeedSet::genre_only(genres);
        let (artist_count, track_count) = Self::seed_counts(genres.len(), personalized);
        if artist_count == 0 && track_count == 0 {
            return Ok(seeds);
        }

        let wanted: Vec<String> = genres.iter().map(|g| Self::normalize_genre(g)).collect();

        let top_artists = catalog
            .fetch_top_artists(HISTORY_LIMIT)
            .map_err(|e| GenerationError::collaborator(CatalogCall::FetchTopArtists, e))?;
        seeds.artists = top_artists
            .iter()
            .filter(|a| Self::matches_any(&a.genres, &wanted))
            .take(artist_count)
            .inspect(|a| log::debug!("Seed artist {} ({})", a.name, a.genres.join(", ")))
            .map(|a| a.id.clone())
            .collect();

        if track_count > 0 {
            let top_tracks = catalog
                .fetch_top_tracks(HISTORY_LIMIT)
                .map_err(|e| GenerationError::collaborator(CatalogCall::FetchTopTracks, e))?;

            let mut seen: HashSet<String> = HashSet::new();
            let mut artist_ids: Vec<String> = Vec::new();
            for id in top_tracks.iter().flat_map(|t| &t.artist_ids) {
                if seen.insert(id.clone()) {
                    artist_ids.push(id.clone());
                }
            }

            if !artist_ids.is_empty() {
                let artists = catalog
                    .fetch_artists(&artist_ids)
                    .map_err(|e| GenerationError::collaborator(CatalogCall::FetchArtists, e))?;
                let genres_by_artist: HashMap<&str, &[String]> = artists
                    .iter()
                    .map(|a| (a.id.as_str(), a.genres.as_slice()))
                    .collect();

                seeds.tracks = top_tracks
                    .iter()
                    .filter(|t| {
                        t.artist_ids.iter().any(|id| {
                            genres_by_artist
                                .get(id.as_str())
                                .is_some_and(|g| Self::matches_any(g, &wanted))
                        })
                    })
                    .take(track_count)
                    .inspect(|t| log::debug!("Seed track {}", t.name))
                    .map(|t| t.id.clone())
                    .collect();
            }
        }

        log::info!(
            "Seeding with {} genres, {} artists, {} tracks",
            seeds.genres.len(),
            seeds.artists.len(),
            seeds.tracks.len()
        );
        Ok(seeds)
    }
}
