use super::classic::ClassicScheduler;
use super::config::{GenerationRequest, PlaylistStyle, SearchSettings};
use super::context::SearchContext;
use super::dedup::Deduplicator;
use super::interval::IntervalScheduler;
use super::metadata::PlaylistPlan;
use super::profile::WorkoutProfile;
use super::relax::RelaxScheduler;
use super::seeds::SeedSelection;
use super::steady::SteadyScheduler;
use super::utils::{PlaylistNaming, PlaylistOrdering};
use crate::client::MusicCatalog;
use crate::error::{CatalogCall, GenerationError, Result};
use crate::models::{Track, UserProfile};

/// Main playlist generator
pub struct PlaylistGenerator<'a> {
    catalog: &'a dyn MusicCatalog,
    request: GenerationRequest,
    settings: SearchSettings,
    user: UserProfile,
}

impl<'a> PlaylistGenerator<'a> {
    /// Validate the request and look up the listener
    pub fn prepare(
        catalog: &'a dyn MusicCatalog,
        request: GenerationRequest,
        settings: SearchSettings,
    ) -> Result<Self> {
        request.validate()?;
        let user = catalog
            .fetch_current_user_profile()
            .map_err(|e| GenerationError::collaborator(CatalogCall::FetchCurrentUserProfile, e))?;
        log::info!("Generating for user {} ({})", user.id, user.country.as_deref().unwrap_or("no market"));
        Ok(Self {
            catalog,
            request,
            settings,
            user,
        })
    }

    pub fn user(&self) -> &UserProfile {
        &self.user
    }

    pub fn profile(&self) -> WorkoutProfile {
        WorkoutProfile::from_request(&self.request, &self.settings)
    }

    /// Run the style's scheduler and clean up the result
    pub fn generate(&self) -> Result<PlaylistPlan> {
        let profile = self.profile();
        let style = self.request.style;
        let seeds = SeedSelection::select(self.catalog, &self.request.genres, self.request.personalized)?;
        let ctx = SearchContext {
            catalog: self.catalog,
            settings: &self.settings,
            profile,
            seeds,
            market: self.user.country.clone(),
            mix_genre_only: style.mixes_genre_only_candidates(),
        };

        let segments = match style {
            PlaylistStyle::Classic => ClassicScheduler::build(&ctx)?,
            PlaylistStyle::Steady => SteadyScheduler::build(&ctx)?,
            PlaylistStyle::Interval { shape } => IntervalScheduler::build(&ctx, shape)?,
            PlaylistStyle::Relax { current_bpm } => RelaxScheduler::build(&ctx, current_bpm)?,
        };

        let tracks: Vec<Track> = segments.iter().flat_map(|s| s.tracks.iter().cloned()).collect();
        let mut tracks = Deduplicator::eliminate_duplicates_and_unplayable(&ctx, tracks)?;
        if matches!(style, PlaylistStyle::Relax { .. }) {
            PlaylistOrdering::sort_by_tempo_descending(&mut tracks);
        }
        let segments = PlaylistOrdering::rechunk(segments, tracks);

        Ok(PlaylistPlan::new(
            PlaylistNaming::playlist_name(&style),
            PlaylistNaming::description(&style, &profile),
            segments,
        ))
    }

    /// Create the playlist for the listener and fill it, returning its id
    pub fn publish(&self, plan: &PlaylistPlan) -> Result<String> {
        let playlist_id = self
            .catalog
            .create_playlist(&self.user.id, &plan.name, &plan.description, false)
            .map_err(|e| GenerationError::collaborator(CatalogCall::CreatePlaylist, e))?;

        let uris = plan.track_uris();
        if !uris.is_empty() {
            self.catalog
                .add_tracks(&playlist_id, &uris)
                .map_err(|e| GenerationError::collaborator(CatalogCall::AddTracks, e))?;
        }
        Ok(playlist_id)
    }
}
