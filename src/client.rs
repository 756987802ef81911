use crate::config::Config;
use crate::models::{
    AddTracksRequest, ApiAudioFeatures, ApiTopTrack, ApiUserProfile, Artist, AudioFeatures,
    AudioFeaturesResponse, CandidateQuery, CreatePlaylistRequest, CreatePlaylistResponse, Paging,
    RecommendationsResponse, SeveralArtistsResponse, TopTrack, Track, UserProfile,
};
use anyhow::Result;
use std::collections::HashMap;
use std::time::Duration;
use ureq::{Agent, AgentBuilder};
use urlencoding::encode;

/// Largest id list the catalog accepts in one request
const MAX_IDS_PER_REQUEST: usize = 100;
/// Largest artist id list accepted by the several-artists endpoint
const MAX_ARTISTS_PER_REQUEST: usize = 50;

/// Everything the playlist engine needs from the music catalog
#[cfg_attr(test, mockall::automock)]
pub trait MusicCatalog {
    /// Recommendations matching the query, each with tempo and energy filled in.
    /// Returning fewer than `query.limit` tracks is not an error.
    fn fetch_candidates(&self, query: &CandidateQuery) -> Result<Vec<Track>>;

    fn fetch_audio_features(&self, track_id: &str) -> Result<AudioFeatures>;

    fn fetch_current_user_profile(&self) -> Result<UserProfile>;

    fn fetch_top_artists(&self, limit: u32) -> Result<Vec<Artist>>;

    fn fetch_top_tracks(&self, limit: u32) -> Result<Vec<TopTrack>>;

    fn fetch_artists(&self, artist_ids: &[String]) -> Result<Vec<Artist>>;

    /// Create an empty playlist and return its id
    fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
        is_public: bool,
    ) -> Result<String>;

    fn add_tracks(&self, playlist_id: &str, track_uris: &[String]) -> Result<()>;
}

/// A small Spotify Web API client using bearer authentication
pub struct SpotifyClient {
    agent: Agent,
    api_base: String,
    access_token: String,
}

impl SpotifyClient {
    /// Create a new client with configuration from environment
    pub fn new(config: Config) -> Self {
        let agent = AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();

        SpotifyClient {
            agent,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            access_token: config.access_token,
        }
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, path_and_query: &str) -> Result<T> {
        let url = format!("{}{}", self.api_base, path_and_query);
        log::debug!("GET {url}");

        let response = self
            .agent
            .get(&url)
            .set("Authorization", &self.bearer())
            .call()
            .map_err(|e| anyhow::anyhow!("HTTP request failed: {}", e))?;

        let response_text = response.into_string()?;

        serde_json::from_str(&response_text)
            .map_err(|e| anyhow::anyhow!("Failed to parse JSON response: {}", e))
    }

    /// Build the recommendations query string
    fn recommendations_path(query: &CandidateQuery) -> String {
        let mut path = format!(
            "/recommendations?limit={}&min_tempo={:.2}&max_tempo={:.2}",
            query.limit, query.min_tempo, query.max_tempo
        );
        if let Some(target) = query.target_tempo {
            path.push_str(&format!("&target_tempo={target:.2}"));
        }
        if let Some(energy) = query.energy {
            path.push_str(&format!(
                "&min_energy={:.3}&max_energy={:.3}&target_energy={:.3}",
                energy.min, energy.max, energy.target
            ));
        }
        for (key, seeds) in [
            ("seed_genres", &query.seed_genres),
            ("seed_artists", &query.seed_artists),
            ("seed_tracks", &query.seed_tracks),
        ] {
            if !seeds.is_empty() {
                path.push_str(&format!("&{}={}", key, encode(&seeds.join(","))));
            }
        }
        if let Some(market) = &query.market {
            path.push_str(&format!("&market={}", encode(market)));
        }
        path
    }

    /// Fetch audio analysis for many tracks, batched by the id limit
    fn fetch_features_batch(&self, ids: &[String]) -> Result<HashMap<String, ApiAudioFeatures>> {
        let mut features = HashMap::new();
        for chunk in ids.chunks(MAX_IDS_PER_REQUEST) {
            let path = format!("/audio-features?ids={}", encode(&chunk.join(",")));
            let parsed: AudioFeaturesResponse = self.get_json(&path)?;
            for item in parsed.audio_features.into_iter().flatten() {
                features.insert(item.id.clone(), item);
            }
        }
        Ok(features)
    }
}

impl MusicCatalog for SpotifyClient {
    fn fetch_candidates(&self, query: &CandidateQuery) -> Result<Vec<Track>> {
        let parsed: RecommendationsResponse = self.get_json(&Self::recommendations_path(query))?;

        let ids: Vec<String> = parsed.tracks.iter().filter_map(|t| t.id.clone()).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let features = self.fetch_features_batch(&ids)?;

        // Tracks without an analysis cannot be placed on a tempo profile
        let tracks: Vec<Track> = parsed
            .tracks
            .into_iter()
            .filter_map(|t| {
                let analysis = features.get(t.id.as_deref()?)?;
                t.into_track(analysis)
            })
            .collect();

        log::debug!(
            "Recommendations {:.1}-{:.1} bpm returned {} of {} requested",
            query.min_tempo,
            query.max_tempo,
            tracks.len(),
            query.limit
        );
        Ok(tracks)
    }

    fn fetch_audio_features(&self, track_id: &str) -> Result<AudioFeatures> {
        let parsed: ApiAudioFeatures =
            self.get_json(&format!("/audio-features/{}", encode(track_id)))?;
        Ok(AudioFeatures {
            tempo: parsed.tempo,
            energy: parsed.energy,
            duration_ms: parsed.duration_ms,
        })
    }

    fn fetch_current_user_profile(&self) -> Result<UserProfile> {
        let parsed: ApiUserProfile = self.get_json("/me")?;
        Ok(UserProfile {
            id: parsed.id,
            display_name: parsed.display_name,
            country: parsed.country,
        })
    }

    fn fetch_top_artists(&self, limit: u32) -> Result<Vec<Artist>> {
        let parsed: Paging<Artist> = self.get_json(&format!("/me/top/artists?limit={limit}"))?;
        Ok(parsed.items)
    }

    fn fetch_top_tracks(&self, limit: u32) -> Result<Vec<TopTrack>> {
        let parsed: Paging<ApiTopTrack> =
            self.get_json(&format!("/me/top/tracks?limit={limit}"))?;
        Ok(parsed
            .items
            .into_iter()
            .map(|t| TopTrack {
                id: t.id,
                name: t.name,
                artist_ids: t.artists.into_iter().filter_map(|a| a.id).collect(),
            })
            .collect())
    }

    fn fetch_artists(&self, artist_ids: &[String]) -> Result<Vec<Artist>> {
        let mut artists = Vec::new();
        for chunk in artist_ids.chunks(MAX_ARTISTS_PER_REQUEST) {
            let parsed: SeveralArtistsResponse =
                self.get_json(&format!("/artists?ids={}", encode(&chunk.join(","))))?;
            artists.extend(parsed.artists.into_iter().flatten());
        }
        Ok(artists)
    }

    fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
        is_public: bool,
    ) -> Result<String> {
        let url = format!("{}/users/{}/playlists", self.api_base, encode(user_id));
        log::debug!("POST {url}");

        let response = self
            .agent
            .post(&url)
            .set("Authorization", &self.bearer())
            .send_json(CreatePlaylistRequest {
                name,
                description,
                public: is_public,
            })
            .map_err(|e| anyhow::anyhow!("Failed to create playlist '{}': {}", name, e))?;

        let response_text = response.into_string()?;
        let parsed: CreatePlaylistResponse = serde_json::from_str(&response_text)?;
        Ok(parsed.id)
    }

    fn add_tracks(&self, playlist_id: &str, track_uris: &[String]) -> Result<()> {
        let url = format!("{}/playlists/{}/tracks", self.api_base, encode(playlist_id));

        for chunk in track_uris.chunks(MAX_IDS_PER_REQUEST) {
            log::debug!("POST {url} ({} uris)", chunk.len());
            self.agent
                .post(&url)
                .set("Authorization", &self.bearer())
                .send_json(AddTracksRequest { uris: chunk })
                .map_err(|e| anyhow::anyhow!("Failed to add tracks: {}", e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EnergyBand;

    #[test]
    fn test_recommendations_path_includes_bands_and_seeds() {
        let query = CandidateQuery {
            limit: 21,
            min_tempo: 117.0,
            max_tempo: 123.0,
            target_tempo: Some(120.0),
            energy: Some(EnergyBand::around(0.8, 0.1)),
            seed_genres: vec!["pop".to_string(), "hip-hop".to_string()],
            seed_artists: vec!["a1".to_string()],
            seed_tracks: Vec::new(),
            market: Some("US".to_string()),
        };

        let path = SpotifyClient::recommendations_path(&query);

        assert!(path.starts_with("/recommendations?limit=21&min_tempo=117.00&max_tempo=123.00"));
        assert!(path.contains("&target_tempo=120.00"));
        assert!(path.contains("&min_energy=0.700&max_energy=0.900&target_energy=0.800"));
        assert!(path.contains("&seed_genres=pop%2Chip-hop"));
        assert!(path.contains("&seed_artists=a1"));
        assert!(!path.contains("seed_tracks"));
        assert!(path.ends_with("&market=US"));
    }

    #[test]
    fn test_recommendations_path_without_optional_parts() {
        let query = CandidateQuery {
            limit: 5,
            min_tempo: 60.0,
            max_tempo: 75.0,
            seed_genres: vec!["ambient".to_string()],
            ..Default::default()
        };

        let path = SpotifyClient::recommendations_path(&query);

        assert_eq!(
            path,
            "/recommendations?limit=5&min_tempo=60.00&max_tempo=75.00&seed_genres=ambient"
        );
    }
}
