use std::fmt;
use thiserror::Error;

/// External catalog operation that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogCall {
    FetchCandidates,
    FetchAudioFeatures,
    FetchCurrentUserProfile,
    FetchTopArtists,
    FetchTopTracks,
    FetchArtists,
    CreatePlaylist,
    AddTracks,
}

impl fmt::Display for CatalogCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CatalogCall::FetchCandidates => "fetch_candidates",
            CatalogCall::FetchAudioFeatures => "fetch_audio_features",
            CatalogCall::FetchCurrentUserProfile => "fetch_current_user_profile",
            CatalogCall::FetchTopArtists => "fetch_top_artists",
            CatalogCall::FetchTopTracks => "fetch_top_tracks",
            CatalogCall::FetchArtists => "fetch_artists",
            CatalogCall::CreatePlaylist => "create_playlist",
            CatalogCall::AddTracks => "add_tracks",
        };
        write!(f, "{name}")
    }
}

/// Part of the schedule a bounded search was working on when it gave up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStage {
    Warmup,
    Target,
    WindDown,
    SlowIntervals,
    FastIntervals,
    PeakInterval,
    RelaxSegment(usize),
    CandidatePool,
    Replacement,
}

impl fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationStage::Warmup => write!(f, "warmup"),
            GenerationStage::Target => write!(f, "target block"),
            GenerationStage::WindDown => write!(f, "wind-down"),
            GenerationStage::SlowIntervals => write!(f, "slow intervals"),
            GenerationStage::FastIntervals => write!(f, "fast intervals"),
            GenerationStage::PeakInterval => write!(f, "peak interval"),
            GenerationStage::RelaxSegment(index) => write!(f, "relax segment {}", index + 1),
            GenerationStage::CandidatePool => write!(f, "candidate pool"),
            GenerationStage::Replacement => write!(f, "track replacement"),
        }
    }
}

/// Errors surfaced by playlist generation
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("catalog call {call} failed: {message}")]
    Collaborator { call: CatalogCall, message: String },

    #[error("no arrangement fits the {stage} after {attempts} attempts (tolerance reached {tolerance:.3})")]
    Infeasible {
        stage: GenerationStage,
        attempts: usize,
        tolerance: f64,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl GenerationError {
    pub fn collaborator(call: CatalogCall, err: anyhow::Error) -> Self {
        GenerationError::Collaborator {
            call,
            message: format!("{err:#}"),
        }
    }

    pub fn is_infeasible(&self) -> bool {
        matches!(self, GenerationError::Infeasible { .. })
    }
}

pub type Result<T> = std::result::Result<T, GenerationError>;
