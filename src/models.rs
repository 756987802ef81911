use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A playable track with the audio features the sequencer works on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub uri: String,
    pub name: String,
    pub artists: Vec<String>,
    pub duration_ms: u64,
    pub tempo: f64,
    pub energy: f64,
    pub is_playable: bool,
}

// Identity is the catalog id; the same recording fetched twice is the same track.
impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Track {}

impl Hash for Track {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Track {
    /// Artist names joined for display
    pub fn artist_display(&self) -> String {
        if self.artists.is_empty() {
            "Unknown Artist".to_string()
        } else {
            self.artists.join(", ")
        }
    }
}

/// Audio analysis of a single track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub tempo: f64,
    pub energy: f64,
    pub duration_ms: u64,
}

/// Profile of the listener the playlist is created for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub display_name: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
}

/// One of the listener's most played tracks, used for seeding
#[derive(Debug, Clone, PartialEq)]
pub struct TopTrack {
    pub id: String,
    pub name: String,
    pub artist_ids: Vec<String>,
}

/// Energy constraint attached to a candidate request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyBand {
    pub min: f64,
    pub max: f64,
    pub target: f64,
}

impl EnergyBand {
    /// Band of `target ± offset`, clamped to the valid 0..1 range
    pub fn around(target: f64, offset: f64) -> Self {
        Self {
            min: (target - offset).clamp(0.0, 1.0),
            max: (target + offset).clamp(0.0, 1.0),
            target: target.clamp(0.0, 1.0),
        }
    }
}

/// Parameters of a single recommendation request
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CandidateQuery {
    pub limit: u32,
    pub min_tempo: f64,
    pub max_tempo: f64,
    pub target_tempo: Option<f64>,
    pub energy: Option<EnergyBand>,
    pub seed_genres: Vec<String>,
    pub seed_artists: Vec<String>,
    pub seed_tracks: Vec<String>,
    pub market: Option<String>,
}

// Wire formats of the Spotify Web API

#[derive(Debug, Deserialize)]
pub struct RecommendationsResponse {
    pub tracks: Vec<ApiTrack>,
}

#[derive(Debug, Deserialize)]
pub struct ApiTrack {
    pub id: Option<String>,
    pub uri: String,
    pub name: String,
    pub duration_ms: u64,
    #[serde(default)]
    pub artists: Vec<ApiArtistRef>,
    // Only present when the request carried a market
    pub is_playable: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ApiArtistRef {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AudioFeaturesResponse {
    pub audio_features: Vec<Option<ApiAudioFeatures>>,
}

#[derive(Debug, Deserialize)]
pub struct ApiAudioFeatures {
    pub id: String,
    pub tempo: f64,
    pub energy: f64,
    pub duration_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct ApiUserProfile {
    pub id: String,
    pub display_name: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Paging<T> {
    pub items: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct ApiTopTrack {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ApiArtistRef>,
}

#[derive(Debug, Deserialize)]
pub struct SeveralArtistsResponse {
    pub artists: Vec<Option<Artist>>,
}

#[derive(Debug, Serialize)]
pub struct CreatePlaylistRequest<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub public: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreatePlaylistResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct AddTracksRequest<'a> {
    pub uris: &'a [String],
}

impl ApiTrack {
    /// Combine a recommendation with its audio analysis
    pub fn into_track(self, features: &ApiAudioFeatures) -> Option<Track> {
        let id = self.id?;
        Some(Track {
            id,
            uri: self.uri,
            name: self.name,
            artists: self.artists.into_iter().map(|a| a.name).collect(),
            duration_ms: self.duration_ms,
            tempo: features.tempo,
            energy: features.energy,
            is_playable: self.is_playable.unwrap_or(true),
        })
    }
}
